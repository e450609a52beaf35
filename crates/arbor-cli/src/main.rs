use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;

/// A git-backed helper for building source packages.
///
/// arbor tracks a set of PKGBUILD checkouts inside one git repository,
/// remembers which revision of each recipe you have reviewed, and builds
/// them in dependency order.
///
/// EXAMPLES:
///     arbor init                   Turn the current directory into an arbor repo
///     arbor add herbstluftwm       Register a package from the AUR
///     arbor fetch                  Update every checkout from upstream
///     arbor verify                 Review and approve recipe changes
///     arbor build                  Build (and install) everything, in order
#[derive(Parser)]
#[command(name = "arbor")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize an empty arbor repository in the current directory
    Init,

    /// Register a new package
    ///
    /// Adds a package named NAME, to be checked out under PATH (default:
    /// NAME, relative to the current directory). The origin URL is the
    /// package's AUR repository.
    Add {
        /// Mark the package as a dependency of another package
        #[arg(long)]
        asdeps: bool,
        /// Package name on the AUR
        name: String,
        /// Checkout directory, relative to the current directory
        path: Option<String>,
    },

    /// Unregister a package and delete its checkout
    Rm {
        /// Registered package path
        path: String,
    },

    /// Update checkouts from their upstreams, cloning them if necessary
    ///
    /// With no PATH arguments, every registered path is fetched.
    Fetch {
        /// Registered package paths
        paths: Vec<String>,
    },

    /// Show changes since the last verified revision
    ///
    /// With no PATH arguments, all paths with changes are shown.
    Diff {
        /// Registered package paths
        paths: Vec<String>,
    },

    /// Mark the current revision of a recipe as verified
    ///
    /// Verifying means the PKGBUILD (and the files next to it) may be
    /// sourced and executed. With no PATH arguments, every path is
    /// reviewed interactively, diff first.
    Verify {
        /// Registered package paths
        paths: Vec<String>,
    },

    /// Show each package's verified revision and HEAD
    #[command(visible_alias = "st")]
    Status {
        /// Registered package paths
        paths: Vec<String>,
    },

    /// Build verified packages in dependency order
    ///
    /// Computes the dependency graph over the requested paths, warns about
    /// and skips any cyclic remainder, then runs makepkg per package.
    /// Unverified packages are skipped. With no PATH arguments, every
    /// registered path is built and the results are installed.
    Build {
        /// Install the built packages afterwards
        #[arg(long)]
        install: bool,
        /// Registered package paths
        paths: Vec<String>,
    },

    /// Resolve missing dependencies for the given paths
    ///
    /// Unresolved dependency names are classified against the system
    /// package manager: repo-available ones can be installed as
    /// dependencies, unknown ones can be registered as new arbor packages.
    Depadd {
        /// Registered package paths
        paths: Vec<String>,
    },

    /// Explain why a package is in the repository
    ///
    /// Tells whether it was added explicitly or as a dependency, and which
    /// other packages need what it provides.
    Why {
        /// Registered package paths
        paths: Vec<String>,
    },

    /// Run a git command against the arbor repository
    ///
    /// Convenient from inside a package checkout, where plain git would
    /// address the checkout instead of the arbor repository.
    Git {
        /// Arguments passed to git verbatim
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Parse the given .SRCINFO files and print them again (debugging)
    ///
    /// The order of fields with different keys may change; the order of
    /// values under one key is preserved.
    CatSrcinfo {
        /// .SRCINFO files to reprint
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Add { asdeps, name, path } => commands::add::run(asdeps, &name, path.as_deref()),
        Commands::Rm { path } => commands::remove::run(&path),
        Commands::Fetch { paths } => commands::fetch::run(&paths),
        Commands::Diff { paths } => commands::diff::run(&paths),
        Commands::Verify { paths } => commands::verify::run(&paths),
        Commands::Status { paths } => commands::status::run(&paths),
        Commands::Build { install, paths } => commands::build::run(install, &paths),
        Commands::Depadd { paths } => commands::depadd::run(&paths),
        Commands::Why { paths } => commands::why::run(&paths),
        Commands::Git { args } => commands::git::run(&args),
        Commands::CatSrcinfo { files } => commands::cat_srcinfo::run(&files),
    };
    if let Err(err) = result {
        eprintln!("{} {err:#}", "arbor error:".red().bold());
        std::process::exit(1);
    }
}
