use std::collections::HashMap;

use petgraph::{
    Direction,
    algo::{is_cyclic_directed, toposort},
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use thiserror::Error;

use crate::{Connection, Source, Target};

/// Error returned when block dependencies would form a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cycle detected in block dependencies")]
pub struct CycleError;

/// A directed graph of the connections between blocks.
///
/// Nodes are block names and edges are [`Connection`]s from a producing block
/// to a consuming block. The graph is kept acyclic so a step order always
/// exists.
#[derive(Debug)]
pub struct CascadeGraph {
    graph: DiGraph<String, Connection>,
    node_map: HashMap<String, NodeIndex>,
}

impl CascadeGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Adds a block without connections, if it is not already present.
    pub fn add_block(&mut self, block: impl Into<String>) {
        self.get_or_add_block(block);
    }

    /// Returns `true` if the graph has a node for `block`.
    #[must_use]
    pub fn contains_block(&self, block: &str) -> bool {
        self.node_map.contains_key(block)
    }

    /// Connects a source block's output to a target block's input.
    ///
    /// Blocks that are not yet in the graph are added. `Source` and `Target`
    /// implement `From<(T, T)>` for string-like `T`, so `(&str, &str)` tuples
    /// can be passed directly.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] and leaves the edge out if the connection would
    /// make the dependencies cyclic.
    ///
    /// # Examples
    ///
    /// ```
    /// use cascade_core::CascadeGraph;
    ///
    /// let mut graph = CascadeGraph::new();
    /// graph.connect(("inlet", "value"), ("pipe", "left")).unwrap();
    /// graph.connect(("pipe", "right.x"), ("tank", "inflow")).unwrap();
    ///
    /// assert!(graph.connect(("tank", "state"), ("inlet", "u")).is_err());
    /// ```
    pub fn connect<S: Into<Source>, T: Into<Target>>(
        &mut self,
        source: S,
        target: T,
    ) -> Result<(), CycleError> {
        let connection = Connection::new(source, target);

        let source_index = self.get_or_add_block(connection.source.block.as_str());
        let target_index = self.get_or_add_block(connection.target.block.as_str());

        let edge = self.graph.add_edge(source_index, target_index, connection);
        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            return Err(CycleError);
        }
        Ok(())
    }

    /// Returns the block names in dependency order.
    ///
    /// Every block appears after all blocks it receives values from.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if the graph contains a cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// use cascade_core::CascadeGraph;
    ///
    /// let mut graph = CascadeGraph::new();
    /// graph.connect(("a", "out"), ("b", "in")).unwrap();
    /// graph.connect(("b", "out"), ("c", "in")).unwrap();
    ///
    /// let order: Vec<_> = graph.call_order().unwrap().collect();
    /// assert_eq!(order, vec!["a", "b", "c"]);
    /// ```
    pub fn call_order(&self) -> Result<impl Iterator<Item = &str>, CycleError> {
        Ok(toposort(&self.graph, None)
            .map_err(|_| CycleError)?
            .into_iter()
            .map(|node_index| self.graph[node_index].as_str()))
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the connections feeding into `block`.
    pub fn incoming(&self, block: &str) -> impl Iterator<Item = &Connection> {
        self.edges(block, Direction::Incoming)
    }

    /// Returns the connections leaving `block`.
    pub fn outgoing(&self, block: &str) -> impl Iterator<Item = &Connection> {
        self.edges(block, Direction::Outgoing)
    }

    /// Marks every connection leaving `block` as ready up to `until`.
    pub fn mark_ready(&mut self, block: &str, until: f64) {
        let Some(&node) = self.node_map.get(block) else {
            return;
        };
        let edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| edge.id())
            .collect();
        for edge in edges {
            self.graph[edge].mark_ready(until);
        }
    }

    /// Clears the readiness mark of every connection.
    pub fn reset(&mut self) {
        for connection in self.graph.edge_weights_mut() {
            connection.reset();
        }
    }

    fn edges(&self, block: &str, direction: Direction) -> impl Iterator<Item = &Connection> {
        self.node_map
            .get(block)
            .into_iter()
            .flat_map(move |&node| self.graph.edges_directed(node, direction))
            .map(|edge| edge.weight())
    }

    fn get_or_add_block(&mut self, block: impl Into<String>) -> NodeIndex {
        let block = block.into();
        *self
            .node_map
            .entry(block.clone())
            .or_insert_with(|| self.graph.add_node(block))
    }
}

impl Default for CascadeGraph {
    fn default() -> Self {
        Self::new()
    }
}
