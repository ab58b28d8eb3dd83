use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Cannot perform topological sort: graph contains cycles")]
    Cyclic,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// One node on the search path and the successors still to visit
struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    cursor: usize,
}

/// Directed graph of artifact dependencies.
///
/// An edge `a -> b` means artifact `a` declares a dependency on `b`. Targets
/// that have not been registered as artifacts yet get a placeholder node,
/// which a later [`add_artifact`](Self::add_artifact) claims through its id
/// or one of its aliases.
///
/// Ids and aliases live in separate maps. An id always wins over an alias
/// of the same spelling, so a bare `tool` artifact never resolves to the
/// node of `com.example/tool`.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// The directed graph of artifact dependencies
    graph: DiGraph<String, ()>,
    /// Registered artifact ids and unclaimed placeholder targets
    ids: HashMap<String, NodeIndex>,
    /// Alternative names, owned by the first artifact that declared them
    aliases: HashMap<String, NodeIndex>,
    /// Nodes that belong to a registered artifact rather than a bare target
    claimed: HashSet<NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact under its id, claiming any placeholder it matches
    pub fn add_artifact(&mut self, id: &str, aliases: &[String]) -> NodeIndex {
        let node = match self.ids.get(id) {
            Some(&node) => node,
            None => {
                let placeholder = aliases.iter().find_map(|alias| {
                    self.ids
                        .get(alias)
                        .copied()
                        .filter(|node| !self.claimed.contains(node))
                        .map(|node| (alias, node))
                });

                match placeholder {
                    Some((alias, node)) => {
                        // The placeholder's name becomes an alias of its new owner
                        self.ids.remove(alias);
                        self.graph[node] = id.to_string();
                        node
                    }
                    None => self.graph.add_node(id.to_string()),
                }
            }
        };

        self.ids.insert(id.to_string(), node);
        for alias in aliases {
            if alias != id {
                self.aliases.entry(alias.clone()).or_insert(node);
            }
        }
        self.claimed.insert(node);
        node
    }

    /// Add a `source -> target` edge, creating nodes as needed
    pub fn add_dependency(&mut self, source: &str, target: &str) {
        let source_node = self.node_or_placeholder(source);
        let target_node = self.node_or_placeholder(target);
        self.graph.update_edge(source_node, target_node, ());
    }

    /// Node for an id, falling back to an alias
    fn resolve(&self, name: &str) -> Option<NodeIndex> {
        self.ids
            .get(name)
            .or_else(|| self.aliases.get(name))
            .copied()
    }

    fn node_or_placeholder(&mut self, name: &str) -> NodeIndex {
        if let Some(node) = self.resolve(name) {
            return node;
        }
        let node = self.graph.add_node(name.to_string());
        self.ids.insert(name.to_string(), node);
        node
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if the graph has any cycles
    pub fn has_cycles(&self) -> bool {
        toposort(&self.graph, None).is_err()
    }

    /// Find cycles with a coloured depth-first search.
    ///
    /// Nodes and successors are visited in label order so results are
    /// stable. Each back edge yields one cycle, written as the path from the
    /// revisited node back to itself (`[a, b, a]`). The search keeps its own
    /// stack, so chain length is bounded by memory only.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut marks = vec![Mark::White; self.graph.node_count()];
        let mut frames: Vec<Frame> = Vec::new();
        let mut cycles = Vec::new();

        for root in self.sorted(self.graph.node_indices()) {
            if marks[root.index()] != Mark::White {
                continue;
            }
            marks[root.index()] = Mark::Grey;
            frames.push(self.frame(root));

            while let Some(frame) = frames.last_mut() {
                let Some(next) = frame.successors.get(frame.cursor).copied() else {
                    marks[frame.node.index()] = Mark::Black;
                    frames.pop();
                    continue;
                };
                frame.cursor += 1;

                match marks[next.index()] {
                    Mark::White => {
                        marks[next.index()] = Mark::Grey;
                        frames.push(self.frame(next));
                    }
                    Mark::Grey => {
                        if let Some(start) = frames.iter().position(|f| f.node == next) {
                            let mut cycle: Vec<String> = frames[start..]
                                .iter()
                                .map(|f| self.graph[f.node].clone())
                                .collect();
                            cycle.push(self.graph[next].clone());
                            cycles.push(cycle);
                        }
                    }
                    Mark::Black => {}
                }
            }
        }

        cycles
    }

    fn frame(&self, node: NodeIndex) -> Frame {
        Frame {
            node,
            successors: self.sorted(self.graph.neighbors(node)),
            cursor: 0,
        }
    }

    fn sorted(&self, nodes: impl Iterator<Item = NodeIndex>) -> Vec<NodeIndex> {
        let mut nodes: Vec<_> = nodes.collect();
        nodes.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        nodes.dedup();
        nodes
    }

    /// Cycles that pass through the artifact known by `name` (id or alias)
    pub fn cycles_through(&self, name: &str) -> Vec<Vec<String>> {
        let Some(node) = self.resolve(name) else {
            return Vec::new();
        };
        let label = &self.graph[node];
        self.find_cycles()
            .into_iter()
            .filter(|cycle| cycle.contains(label))
            .collect()
    }

    /// Artifacts ordered so every dependency comes before its dependents
    pub fn topological_sort(&self) -> Result<Vec<String>, GraphError> {
        let sorted_nodes = toposort(&self.graph, None).map_err(|_| GraphError::Cyclic)?;
        Ok(sorted_nodes
            .into_iter()
            .rev()
            .map(|node| self.graph[node].clone())
            .collect())
    }

    /// Get all artifacts the given artifact depends on directly
    pub fn get_dependencies(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Get all artifacts that directly depend on the given artifact
    pub fn get_dependents(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<String> {
        match self.resolve(name) {
            Some(node) => {
                let mut names: Vec<String> = self
                    .graph
                    .neighbors_directed(node, direction)
                    .map(|n| self.graph[n].clone())
                    .collect();
                names.sort();
                names
            }
            None => Vec::new(),
        }
    }

    /// Get the graph for visualization
    pub fn graph(&self) -> &DiGraph<String, ()> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (source, target) in edges {
            graph.add_artifact(source, &[]);
            graph.add_dependency(source, target);
        }
        graph
    }

    #[test]
    fn test_simple_dependency_chain() {
        let graph = graph_of(&[("c", "b"), ("b", "a")]);
        assert!(!graph.has_cycles());
        assert!(graph.find_cycles().is_empty());

        let sorted = graph.topological_sort().unwrap();
        // a should come before b, b before c
        let a_pos = sorted.iter().position(|j| j == "a").unwrap();
        let b_pos = sorted.iter().position(|j| j == "b").unwrap();
        let c_pos = sorted.iter().position(|j| j == "c").unwrap();
        assert!(a_pos < b_pos);
        assert!(b_pos < c_pos);
    }

    #[test]
    fn test_two_node_cycle() {
        let graph = graph_of(&[("a", "b"), ("b", "a")]);
        assert!(graph.has_cycles());
        assert_eq!(graph.find_cycles(), vec![vec!["a", "b", "a"]]);
        assert_eq!(graph.topological_sort(), Err(GraphError::Cyclic));
    }

    #[test]
    fn test_three_node_cycle_starts_at_smallest_label() {
        let graph = graph_of(&[("c", "a"), ("a", "b"), ("b", "c")]);
        assert_eq!(graph.find_cycles(), vec![vec!["a", "b", "c", "a"]]);
    }

    #[test]
    fn test_self_loop() {
        let graph = graph_of(&[("a", "a")]);
        assert_eq!(graph.find_cycles(), vec![vec!["a", "a"]]);
    }

    #[test]
    fn test_cycle_detection_is_idempotent() {
        let graph = graph_of(&[("a", "b"), ("b", "a"), ("b", "c")]);
        let first = graph.find_cycles();
        let second = graph.find_cycles();
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_duplicate_edges_are_collapsed() {
        let graph = graph_of(&[("a", "b"), ("a", "b")]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_multiple_dependencies() {
        let graph = graph_of(&[
            ("install_gems", "setup"),
            ("install_npm", "setup"),
            ("test", "install_gems"),
            ("test", "install_npm"),
        ]);

        assert_eq!(
            graph.get_dependencies("test"),
            vec!["install_gems", "install_npm"]
        );
        assert_eq!(
            graph.get_dependents("setup"),
            vec!["install_gems", "install_npm"]
        );
        assert!(graph.get_dependencies("missing").is_empty());
    }

    #[test]
    fn test_placeholder_claimed_by_alias() {
        let mut graph = DependencyGraph::new();
        graph.add_artifact("com.example/a", &["a".to_string()]);
        graph.add_dependency("com.example/a", "b");

        // b arrives later under its namespaced id
        graph.add_artifact("com.example/b", &["b".to_string()]);
        graph.add_dependency("com.example/b", "a");

        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains("b"));
        assert_eq!(
            graph.find_cycles(),
            vec![vec!["com.example/a", "com.example/b", "com.example/a"]]
        );
    }

    #[test]
    fn test_claimed_alias_is_not_reused() {
        let mut graph = DependencyGraph::new();
        graph.add_artifact("com.one/tool", &["tool".to_string()]);
        graph.add_artifact("com.two/tool", &["tool".to_string()]);

        assert_eq!(graph.node_count(), 2);
        graph.add_dependency("com.two/tool", "tool");
        assert_eq!(graph.get_dependencies("com.two/tool"), vec!["com.one/tool"]);
    }

    #[test]
    fn test_id_wins_over_alias_of_same_spelling() {
        let mut graph = DependencyGraph::new();
        graph.add_artifact("com.alpha/tool", &["tool".to_string()]);
        graph.add_artifact("tool", &[]);
        graph.add_dependency("com.alpha/tool", "leaf");
        graph.add_dependency("tool", "middle");
        graph.add_dependency("middle", "com.alpha/tool");

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.get_dependencies("com.alpha/tool"), vec!["leaf"]);
        assert_eq!(graph.get_dependencies("tool"), vec!["middle"]);
        assert!(!graph.has_cycles());
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn test_claimed_placeholder_frees_its_name() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("app", "tool");
        graph.add_artifact("com.alpha/tool", &["tool".to_string()]);
        let bare = graph.add_artifact("tool", &[]);

        assert_ne!(graph.graph()[bare], "com.alpha/tool");
        assert_eq!(graph.get_dependencies("app"), vec!["com.alpha/tool"]);
        assert!(graph.get_dependents("tool").is_empty());
    }

    #[test]
    fn test_long_chain_does_not_exhaust_the_stack() {
        let names: Vec<String> = (0..100_000).map(|i| format!("n{i:06}")).collect();
        let mut graph = DependencyGraph::new();
        for pair in names.windows(2) {
            graph.add_dependency(&pair[0], &pair[1]);
        }
        graph.add_dependency(names.last().unwrap(), &names[0]);

        let cycles = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || graph.find_cycles())
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), names.len() + 1);
        assert_eq!(cycles[0].first(), cycles[0].last());
    }

    #[test]
    fn test_cycles_through() {
        let graph = graph_of(&[("a", "b"), ("b", "a"), ("c", "d")]);
        assert_eq!(graph.cycles_through("b").len(), 1);
        assert!(graph.cycles_through("c").is_empty());
        assert!(graph.cycles_through("nope").is_empty());
    }
}
