//! Conservative topological ordering of package paths
//!
//! Kahn's algorithm with one deliberate twist: a path waits for EVERY
//! in-scope provider of each name it depends on, not merely one. When
//! several paths can provide the same name the sorter cannot know which one
//! the consumer ends up using, so it orders all of them first. This can
//! over-constrain adversarial inputs (and report them as cyclic) but is
//! correct against any provider the build actually picks.

use crate::graph::DepGraph;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};

/// Result of a sort: the resolvable order plus the leftover paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOutcome {
    /// Paths in dependency-respecting order, each at most once
    pub order: Vec<String>,
    /// Paths whose requirements cannot be resolved within the scope; they
    /// are excluded from `order` and must be reported, never dropped quietly
    pub cyclic: Vec<String>,
}

impl SortOutcome {
    pub fn has_cycles(&self) -> bool {
        !self.cyclic.is_empty()
    }
}

/// Order the paths of `graph` so that every in-scope provider of a
/// dependency precedes each of its requesters.
///
/// Deterministic: in-degrees are accumulated in first-encounter order
/// (provider entries, then requester entries) and the ready queue is FIFO
/// seeded in that same order.
pub fn depsort(graph: &DepGraph) -> SortOutcome {
    // Outstanding provider-satisfactions per path, plus what each path
    // provides. IndexMap keeps the first-encounter order for determinism.
    let mut in_degree: IndexMap<&str, usize> = IndexMap::new();
    let mut provides_of: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (name, provided_by) in &graph.providers {
        for path in provided_by {
            in_degree.entry(path.as_str()).or_insert(0);
            provides_of
                .entry(path.as_str())
                .or_default()
                .push(name.as_str());
        }
    }
    for (dep, required_by) in &graph.requesters {
        // A name with no in-scope provider never blocks ordering.
        let blockers = graph.providers.get(dep).map_or(0, Vec::len);
        for path in required_by {
            *in_degree.entry(path.as_str()).or_insert(0) += blockers;
        }
    }

    let mut ready: VecDeque<&str> = VecDeque::new();
    let mut queued: HashSet<&str> = HashSet::new();
    for (path, degree) in &in_degree {
        if *degree == 0 && queued.insert(*path) {
            ready.push_back(*path);
        }
    }

    let mut order = Vec::new();
    while let Some(path) = ready.pop_front() {
        order.push(path.to_string());
        let Some(names) = provides_of.get(path) else {
            continue;
        };
        for name in names {
            let Some(requesters) = graph.requesters.get(*name) else {
                continue;
            };
            for requester in requesters {
                if let Some(degree) = in_degree.get_mut(requester.as_str()) {
                    *degree = degree.saturating_sub(1);
                    // The queued guard keeps a decrement past zero from
                    // enqueueing the same path twice.
                    if *degree == 0 && queued.insert(requester.as_str()) {
                        ready.push_back(requester.as_str());
                    }
                }
            }
        }
    }

    let cyclic = in_degree
        .iter()
        .filter(|(_, degree)| **degree > 0)
        .map(|(path, _)| path.to_string())
        .collect();
    SortOutcome { order, cyclic }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(requesters: &[(&str, &[&str])], providers: &[(&str, &[&str])]) -> DepGraph {
        let to_map = |entries: &[(&str, &[&str])]| {
            entries
                .iter()
                .map(|(name, paths)| {
                    (
                        name.to_string(),
                        paths.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
                    )
                })
                .collect()
        };
        DepGraph {
            requesters: to_map(requesters),
            providers: to_map(providers),
            guesses: Vec::new(),
        }
    }

    fn position(order: &[String], path: &str) -> usize {
        order
            .iter()
            .position(|p| p == path)
            .unwrap_or_else(|| panic!("{path} not in order {order:?}"))
    }

    #[test]
    fn test_empty_scope() {
        let outcome = depsort(&DepGraph::default());
        assert!(outcome.order.is_empty());
        assert!(outcome.cyclic.is_empty());
    }

    #[test]
    fn test_linear_chain() {
        // c provides libc needed by b; b provides libb needed by a.
        let g = graph(
            &[("libc", &["b"]), ("libb", &["a"])],
            &[
                ("a", &["a"]),
                ("b", &["b"]),
                ("c", &["c"]),
                ("libc", &["c"]),
                ("libb", &["b"]),
            ],
        );
        let outcome = depsort(&g);
        assert!(outcome.cyclic.is_empty());
        assert!(position(&outcome.order, "c") < position(&outcome.order, "b"));
        assert!(position(&outcome.order, "b") < position(&outcome.order, "a"));
    }

    #[test]
    fn test_every_provider_precedes_the_requester() {
        // Two paths provide libfoo; the requester waits for both.
        let g = graph(
            &[("libfoo", &["app"])],
            &[("libfoo", &["foo1", "foo2"]), ("app", &["app"])],
        );
        let outcome = depsort(&g);
        assert!(outcome.cyclic.is_empty());
        let app = position(&outcome.order, "app");
        assert!(position(&outcome.order, "foo1") < app);
        assert!(position(&outcome.order, "foo2") < app);
    }

    #[test]
    fn test_unresolved_dependency_never_blocks() {
        // glibc has no in-scope provider: externally satisfied.
        let g = graph(&[("glibc", &["app"])], &[("app", &["app"])]);
        let outcome = depsort(&g);
        assert_eq!(outcome.order, vec!["app"]);
        assert!(outcome.cyclic.is_empty());
    }

    #[test]
    fn test_mutual_cycle_is_excluded_and_reported() {
        // a needs x (only b provides it), b needs y (only a provides it).
        let g = graph(
            &[("x", &["a"]), ("y", &["b"])],
            &[("x", &["b"]), ("y", &["a"])],
        );
        let outcome = depsort(&g);
        assert!(outcome.order.is_empty());
        let mut cyclic = outcome.cyclic.clone();
        cyclic.sort();
        assert_eq!(cyclic, vec!["a", "b"]);
        assert!(outcome.has_cycles());
    }

    #[test]
    fn test_cycle_does_not_poison_the_rest() {
        let g = graph(
            &[("x", &["a"]), ("y", &["b"])],
            &[("x", &["b"]), ("y", &["a"]), ("z", &["standalone"])],
        );
        let outcome = depsort(&g);
        assert_eq!(outcome.order, vec!["standalone"]);
        assert_eq!(outcome.cyclic.len(), 2);
    }

    #[test]
    fn test_concrete_multi_provider_scenario() {
        // p1 needs n1 (two providers) and n2 (one provider): in-degree 3.
        // Everything else starts ready; p1 must come strictly last.
        let g = graph(
            &[("n1", &["p1"]), ("n2", &["p1"]), ("n3", &[])],
            &[
                ("n1", &["px", "p2"]),
                ("n2", &["fullpidgin"]),
                ("n3", &["someprotocolpath", "p1"]),
            ],
        );
        let outcome = depsort(&g);
        assert!(outcome.cyclic.is_empty());
        assert_eq!(
            outcome.order,
            vec!["px", "p2", "fullpidgin", "someprotocolpath", "p1"]
        );
        assert_eq!(outcome.order.last().map(String::as_str), Some("p1"));
    }

    #[test]
    fn test_idempotence() {
        let g = graph(
            &[("n1", &["p1"]), ("n2", &["p1"])],
            &[
                ("n1", &["px", "p2"]),
                ("n2", &["fullpidgin"]),
                ("n3", &["someprotocolpath", "p1"]),
            ],
        );
        assert_eq!(depsort(&g), depsort(&g));
    }

    #[test]
    fn test_requester_only_path_with_no_provides() {
        // A path that provides nothing still gets ordered once its
        // dependencies are satisfied.
        let g = graph(&[("lib", &["consumer"])], &[("lib", &["producer"])]);
        let outcome = depsort(&g);
        assert_eq!(outcome.order, vec!["producer", "consumer"]);
    }

    #[test]
    fn test_self_cycle() {
        // A path requiring a name only it provides can never be placed.
        let g = graph(&[("x", &["a"])], &[("x", &["a"])]);
        let outcome = depsort(&g);
        assert!(outcome.order.is_empty());
        assert_eq!(outcome.cyclic, vec!["a"]);
    }
}
