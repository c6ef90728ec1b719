//! Dependency graph container for ordering and cycle analysis.
//!
//! Edges point from dependent to dependency: `add_edge("a", "b")` records
//! that `a` depends on `b`. Cycle chains therefore read in depends-on
//! direction (`a → b → a`).

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is on the current DFS path.
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Directed graph over configuration ids.
///
/// Both traversals are deterministic: node order follows insertion, and a
/// node's successors follow the order its edges were added in.
pub(crate) struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Adds a node if it does not already exist and returns its index.
    pub(crate) fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(id) {
            index
        } else {
            let index = self.graph.add_node(id.to_string());
            self.node_map.insert(id.to_string(), index);
            index
        }
    }

    /// Records that `from` depends on `to`. Duplicate edges are ignored.
    pub(crate) fn add_edge(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Successors of a node in edge insertion order.
    ///
    /// petgraph iterates a node's edges newest first; reversing restores
    /// the order they were declared in.
    fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut successors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        successors.reverse();
        successors
    }

    /// Kahn's algorithm with a FIFO queue: every dependency is emitted
    /// before its dependents.
    ///
    /// Nodes stuck in cycles never reach in-degree zero; they are appended
    /// at the end in insertion order so callers still receive every node
    /// exactly once.
    pub(crate) fn topological_order(&self) -> Vec<String> {
        // Count unmet dependencies per node (outgoing edges).
        let mut pending: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|n| (n, self.graph.neighbors_directed(n, Direction::Outgoing).count()))
            .collect();

        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|n| pending.get(n) == Some(&0))
            .collect();

        let mut order: Vec<NodeIndex> = Vec::with_capacity(self.graph.node_count());
        let mut emitted: HashSet<NodeIndex> = HashSet::new();

        while let Some(node) = queue.pop_front() {
            order.push(node);
            emitted.insert(node);
            for dependent in self.graph.neighbors_directed(node, Direction::Incoming) {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        for node in self.graph.node_indices() {
            if !emitted.contains(&node) {
                order.push(node);
            }
        }

        order.into_iter().map(|n| self.graph[n].clone()).collect()
    }

    /// Finds every cycle reachable in the graph using an iterative DFS
    /// with white/gray/black coloring.
    ///
    /// Each back edge yields one cycle chain that starts and ends on the
    /// same id. Start nodes are walked in sorted id order so the output is
    /// independent of insertion history.
    pub(crate) fn find_cycles(&self) -> Vec<Vec<String>> {
        enum Step {
            Descend(NodeIndex),
            Retreat,
        }

        let mut colors: HashMap<NodeIndex, Color> = self
            .graph
            .node_indices()
            .map(|n| (n, Color::White))
            .collect();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        let mut starts: Vec<NodeIndex> = self.graph.node_indices().collect();
        starts.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));

        for start in starts {
            if colors.get(&start) != Some(&Color::White) {
                continue;
            }

            let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
            let mut path: Vec<NodeIndex> = Vec::new();

            colors.insert(start, Color::Gray);
            path.push(start);
            stack.push((start, self.successors(start), 0));

            while !stack.is_empty() {
                let step = {
                    let Some((_, successors, cursor)) = stack.last_mut() else {
                        break;
                    };
                    let mut step = Step::Retreat;
                    while *cursor < successors.len() {
                        let next = successors[*cursor];
                        *cursor += 1;
                        match colors.get(&next) {
                            Some(Color::Gray) => {
                                // Back edge: the cycle is the path suffix
                                // from `next`, closed by `next` itself.
                                if let Some(pos) = path.iter().position(|&n| n == next) {
                                    let mut cycle: Vec<String> = path[pos..]
                                        .iter()
                                        .map(|&n| self.graph[n].clone())
                                        .collect();
                                    cycle.push(self.graph[next].clone());
                                    cycles.push(cycle);
                                }
                            }
                            Some(Color::White) => {
                                step = Step::Descend(next);
                                break;
                            }
                            _ => {}
                        }
                    }
                    step
                };

                match step {
                    Step::Descend(next) => {
                        colors.insert(next, Color::Gray);
                        path.push(next);
                        stack.push((next, self.successors(next), 0));
                    }
                    Step::Retreat => {
                        if let Some((node, _, _)) = stack.pop() {
                            colors.insert(node, Color::Black);
                            path.pop();
                        }
                    }
                }
            }
        }

        cycles
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_dependency_chain() {
        let mut graph = DependencyGraph::new();

        // a depends on b, b depends on c.
        graph.ensure_node("a");
        graph.ensure_node("b");
        graph.ensure_node("c");
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");

        assert!(graph.find_cycles().is_empty());
        assert_eq!(graph.topological_order(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_diamond_dependency() {
        let mut graph = DependencyGraph::new();

        for id in ["a", "b", "c", "d"] {
            graph.ensure_node(id);
        }
        graph.add_edge("a", "b");
        graph.add_edge("a", "c");
        graph.add_edge("b", "d");
        graph.add_edge("c", "d");

        let order = graph.topological_order();
        assert_eq!(order.len(), 4);
        let pos = |id: &str| order.iter().position(|n| n == id).unwrap();
        assert!(pos("d") < pos("b"));
        assert!(pos("d") < pos("c"));
        assert!(pos("b") < pos("a"));
        assert!(pos("c") < pos("a"));
    }

    #[test]
    fn test_cycle_members_appended_after_acyclic_part() {
        let mut graph = DependencyGraph::new();

        // x is clean; a and b form a cycle.
        graph.ensure_node("x");
        graph.ensure_node("a");
        graph.ensure_node("b");
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");

        let order = graph.topological_order();
        assert_eq!(order[0], "x");
        assert_eq!(order.len(), 3);
        assert!(order.contains(&"a".to_string()));
        assert!(order.contains(&"b".to_string()));
    }

    #[test]
    fn test_find_cycles_reports_chain() {
        let mut graph = DependencyGraph::new();

        graph.add_edge("a", "b");
        graph.add_edge("b", "a");

        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["a", "b", "a"]);
    }

    #[test]
    fn test_find_cycles_self_dependency() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "a");

        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["a", "a"]);
    }

    #[test]
    fn test_two_cycles_through_shared_node() {
        let mut graph = DependencyGraph::new();

        graph.add_edge("a", "b");
        graph.add_edge("b", "a");
        graph.add_edge("a", "c");
        graph.add_edge("c", "a");

        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 2);
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.find_cycles().is_empty());
        assert!(graph.topological_order().is_empty());
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let mut graph = DependencyGraph::new();

        graph.add_edge("a", "b");
        graph.add_edge("a", "b");

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.topological_order(), vec!["b", "a"]);
    }

    #[test]
    fn test_disconnected_components_keep_insertion_order() {
        let mut graph = DependencyGraph::new();

        graph.ensure_node("first");
        graph.ensure_node("second");
        graph.ensure_node("third");

        assert_eq!(graph.topological_order(), vec!["first", "second", "third"]);
    }
}
