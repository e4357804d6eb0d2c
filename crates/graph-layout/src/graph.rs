use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;

use crate::{Point, Vec2};

/// Role of a vertex inside the layout model
///
/// Only [`VertexKind::Node`] vertices are backed by a caller-supplied record
/// and appear in the output position map; every other kind exists for the
/// benefit of the algorithms and stays internal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    /// A station or delivery target supplied by the caller
    Node,
    /// Several collapsed stations represented as one vertex; its aggregate
    /// size proportions the virtual vertices inserted along split edges
    Group,
    /// Routing-only vertex inserted when a multi-tier edge is split
    Virtual,
    /// Synthetic anchor holding one connected component together during a
    /// force-directed run
    Hub,
}

/// A positioned vertex of the layout graph
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Current position on the drawing surface
    pub position: Point,
    /// Force accumulator, reset at the start of every simulation round
    pub displacement: Vec2,
    /// Diameter of the rendered node
    pub size: f64,
    /// Pinned vertices keep their position but still push others away
    pub fixed: bool,
    pub kind: VertexKind,
    /// Supply-chain tier assigned by the upstream staging pass
    pub layer: Option<usize>,
    /// Position within the tier, assigned at insertion
    pub index_in_layer: Option<usize>,
}

impl Vertex {
    /// A real vertex of the given size
    pub fn node(size: f64) -> Self {
        Self {
            position: Point::default(),
            displacement: Vec2::zero(),
            size,
            fixed: false,
            kind: VertexKind::Node,
            layer: None,
            index_in_layer: None,
        }
    }

    /// A vertex standing in for several collapsed stations
    pub fn group(size: f64) -> Self {
        Self {
            kind: VertexKind::Group,
            ..Self::node(size)
        }
    }

    pub(crate) fn hub(position: Point) -> Self {
        Self {
            position,
            kind: VertexKind::Hub,
            ..Self::node(0.0)
        }
    }

    pub(crate) fn virtual_in_layer(layer: usize, position: Point, size: f64) -> Self {
        Self {
            position,
            kind: VertexKind::Virtual,
            layer: Some(layer),
            ..Self::node(size)
        }
    }

    /// True for vertices that belong to the caller's network rather than to
    /// the layout machinery
    pub fn is_real(&self) -> bool {
        self.kind == VertexKind::Node
    }
}

/// Attributes carried by one directed edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAttrs {
    /// Delivery amount, forwarded to the renderer as line thickness
    pub weight: f64,
    /// True for edges manufactured by the layout itself (hub spokes and
    /// split-edge chain segments)
    pub is_virtual: bool,
}

/// Vertex/edge storage shared by both layout engines
///
/// Vertices live in an arena addressed by stable integer index: indices are
/// assigned at insertion and never reassigned, and edges hold index pairs
/// instead of owning their endpoints. The graph additionally keeps an
/// ordered tier table so the layered engine can address whole layers.
#[derive(Debug, Default, Clone)]
pub struct NetworkGraph {
    arena: StableDiGraph<Vertex, EdgeAttrs>,
    layers: Vec<Vec<NodeIndex>>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex, assigning its stable index
    ///
    /// A vertex carrying a tier is also appended to that tier's list and
    /// receives its in-layer index from the insertion order.
    pub fn insert_vertex(&mut self, vertex: Vertex) -> NodeIndex {
        let layer = vertex.layer;
        let index = self.arena.add_node(vertex);
        if let Some(layer) = layer {
            if self.layers.len() <= layer {
                self.layers.resize_with(layer + 1, Vec::new);
            }
            self.arena[index].index_in_layer = Some(self.layers[layer].len());
            self.layers[layer].push(index);
        }
        index
    }

    /// Connect two existing vertices
    ///
    /// The edge is reachable from both endpoints: it appears in the source's
    /// outgoing adjacency and the target's incoming adjacency.
    pub fn insert_edge(&mut self, source: NodeIndex, target: NodeIndex, weight: f64) -> EdgeIndex {
        self.arena.add_edge(
            source,
            target,
            EdgeAttrs {
                weight,
                is_virtual: false,
            },
        )
    }

    pub(crate) fn insert_virtual_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        weight: f64,
    ) -> EdgeIndex {
        self.arena.add_edge(
            source,
            target,
            EdgeAttrs {
                weight,
                is_virtual: true,
            },
        )
    }

    pub(crate) fn remove_edge(&mut self, edge: EdgeIndex) -> Option<EdgeAttrs> {
        self.arena.remove_edge(edge)
    }

    pub fn vertex_count(&self) -> usize {
        self.arena.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.arena.edge_count()
    }

    pub fn vertex(&self, index: NodeIndex) -> &Vertex {
        &self.arena[index]
    }

    pub fn vertex_mut(&mut self, index: NodeIndex) -> &mut Vertex {
        &mut self.arena[index]
    }

    pub fn vertex_indices(&self) -> Vec<NodeIndex> {
        self.arena.node_indices().collect()
    }

    pub fn edge_indices(&self) -> Vec<EdgeIndex> {
        self.arena.edge_indices().collect()
    }

    pub fn endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.arena.edge_endpoints(edge)
    }

    /// All edges as `(source, target, attributes)` triples
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &EdgeAttrs)> + '_ {
        self.arena
            .edge_references()
            .map(|edge| (edge.source(), edge.target(), edge.weight()))
    }

    pub fn neighbors_undirected(&self, vertex: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.arena.neighbors_undirected(vertex)
    }

    pub fn out_neighbors(&self, vertex: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.arena.neighbors_directed(vertex, Direction::Outgoing)
    }

    pub fn in_neighbors(&self, vertex: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.arena.neighbors_directed(vertex, Direction::Incoming)
    }

    /// Tier table: one ordered vertex list per layer index
    pub fn layers(&self) -> &[Vec<NodeIndex>] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Indices of the caller-visible vertices
    pub fn real_vertices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.arena
            .node_indices()
            .filter(|&index| self.arena[index].is_real())
    }

    /// Positions of all real vertices
    ///
    /// Hub, virtual and group vertices never appear here.
    pub fn positions(&self) -> HashMap<NodeIndex, Point> {
        self.real_vertices()
            .map(|index| (index, self.arena[index].position))
            .collect()
    }
}

impl Index<NodeIndex> for NetworkGraph {
    type Output = Vertex;

    fn index(&self, index: NodeIndex) -> &Vertex {
        &self.arena[index]
    }
}

impl IndexMut<NodeIndex> for NetworkGraph {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Vertex {
        &mut self.arena[index]
    }
}

impl Index<EdgeIndex> for NetworkGraph {
    type Output = EdgeAttrs;

    fn index(&self, index: EdgeIndex) -> &EdgeAttrs {
        &self.arena[index]
    }
}
