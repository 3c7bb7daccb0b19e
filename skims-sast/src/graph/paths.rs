//! Bounded CFG path enumeration.
//!
//! All searches are iterative depth-first walks over simple paths (no node
//! repeats), so loops are entered at most once per path. Bounds cut the
//! search short instead of failing; callers see the cut in `truncated`.

use skims_core::constants::{DEFAULT_MAX_PATHS_PER_SINK, DEFAULT_MAX_PATH_LENGTH};
use skims_core::types::collections::{Fanout, FxHashSet};

use super::model::{Graph, NodeId};

/// Limits for one path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathBounds {
    pub max_paths: usize,
    pub max_length: usize,
}

impl Default for PathBounds {
    fn default() -> Self {
        Self {
            max_paths: DEFAULT_MAX_PATHS_PER_SINK,
            max_length: DEFAULT_MAX_PATH_LENGTH,
        }
    }
}

/// Result of a path search. Paths are in forward (execution) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSearch {
    pub paths: Vec<Vec<NodeId>>,
    /// A bound was hit and some routes were not enumerated.
    pub truncated: bool,
}

impl PathSearch {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Depth-first enumeration of simple paths from `start` until `is_goal`.
fn search<N, G>(start: NodeId, bounds: PathBounds, neighbors: N, is_goal: G) -> PathSearch
where
    N: Fn(NodeId) -> Fanout<NodeId>,
    G: Fn(NodeId) -> bool,
{
    let mut result = PathSearch::default();
    if bounds.max_paths == 0 || bounds.max_length == 0 {
        result.truncated = true;
        return result;
    }
    if is_goal(start) {
        result.paths.push(vec![start]);
        return result;
    }

    let mut path = vec![start];
    let mut on_path: FxHashSet<NodeId> = FxHashSet::default();
    on_path.insert(start);
    let mut stack: Vec<(Fanout<NodeId>, usize)> = vec![(neighbors(start), 0)];

    loop {
        if result.paths.len() >= bounds.max_paths {
            result.truncated = true;
            break;
        }
        let Some(frame) = stack.last_mut() else {
            break;
        };
        if frame.1 >= frame.0.len() {
            stack.pop();
            if let Some(done) = path.pop() {
                on_path.remove(&done);
            }
            continue;
        }
        let next = frame.0[frame.1];
        frame.1 += 1;

        if on_path.contains(&next) {
            continue;
        }
        if path.len() >= bounds.max_length {
            result.truncated = true;
            continue;
        }
        path.push(next);
        if is_goal(next) {
            result.paths.push(path.clone());
            path.pop();
            continue;
        }
        on_path.insert(next);
        stack.push((neighbors(next), 0));
    }
    result
}

fn successors(graph: &Graph, n_id: NodeId) -> Fanout<NodeId> {
    let mut out: Fanout<NodeId> = graph.cfg_successors(n_id).into_iter().map(|(n, _)| n).collect();
    out.dedup();
    out
}

fn predecessors(graph: &Graph, n_id: NodeId) -> Fanout<NodeId> {
    let mut out: Fanout<NodeId> = graph.cfg_predecessors(n_id).into_iter().map(|(n, _)| n).collect();
    out.dedup();
    out
}

/// Every CFG route from `from` to `to`.
pub fn paths(graph: &Graph, from: NodeId, to: NodeId, bounds: PathBounds) -> PathSearch {
    search(from, bounds, |n| successors(graph, n), |n| n == to)
}

/// CFG routes from `n_id` to a leaf (a node without CFG successors).
pub fn branches_cfg(graph: &Graph, n_id: NodeId, bounds: PathBounds) -> PathSearch {
    search(
        n_id,
        bounds,
        |n| successors(graph, n),
        |n| graph.cfg_successors(n).is_empty(),
    )
}

/// CFG routes that end at the statement holding `sink`, each starting at the
/// entry of the enclosing method (or at a node nothing flows into).
pub fn backward_paths(graph: &Graph, sink: NodeId, bounds: PathBounds) -> PathSearch {
    let Some(start) = graph.lookup_first_cfg_parent(sink) else {
        return PathSearch::default();
    };
    let entry = graph.enclosing_method(sink).unwrap_or(graph.root());
    let mut found = search(
        start,
        bounds,
        |n| predecessors(graph, n),
        |n| n == entry || graph.cfg_predecessors(n).is_empty(),
    );
    for path in &mut found.paths {
        path.reverse();
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(edges: &[(u32, u32)]) -> impl Fn(NodeId) -> Fanout<NodeId> + '_ {
        move |n| {
            edges
                .iter()
                .filter(|(from, _)| *from == n.0)
                .map(|(_, to)| NodeId(*to))
                .collect()
        }
    }

    #[test]
    fn diamond_has_two_routes() {
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3)];
        let found = search(NodeId(0), PathBounds::default(), chain(&edges), |n| n.0 == 3);
        assert_eq!(found.paths.len(), 2);
        assert!(!found.truncated);
    }

    #[test]
    fn cycles_are_not_followed() {
        let edges = [(0, 1), (1, 2), (2, 1), (2, 3)];
        let found = search(NodeId(0), PathBounds::default(), chain(&edges), |n| n.0 == 3);
        assert_eq!(found.paths, vec![vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]]);
    }

    #[test]
    fn path_budget_truncates() {
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3)];
        let bounds = PathBounds {
            max_paths: 1,
            max_length: 16,
        };
        let found = search(NodeId(0), bounds, chain(&edges), |n| n.0 == 3);
        assert_eq!(found.paths.len(), 1);
        assert!(found.truncated);
    }

    #[test]
    fn length_budget_truncates() {
        let edges = [(0, 1), (1, 2), (2, 3)];
        let bounds = PathBounds {
            max_paths: 8,
            max_length: 3,
        };
        let found = search(NodeId(0), bounds, chain(&edges), |n| n.0 == 3);
        assert!(found.paths.is_empty());
        assert!(found.truncated);
    }
}
