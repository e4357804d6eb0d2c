use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use petgraph::stable_graph::NodeIndex;
use thiserror::Error;

use crate::force::ForceDirected;
use crate::graph::{NetworkGraph, Vertex};
use crate::layered::Layered;
use crate::Point;

/// A viewport with a non-positive dimension
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("viewport {width}x{height} has a non-positive dimension")]
pub struct InvalidViewport {
    pub width: f64,
    pub height: f64,
}

/// Target drawing area for a layout pass
///
/// Construction validates the dimensions, so every `Viewport` a layout
/// engine receives is known to be positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Result<Self, InvalidViewport> {
        if width > 0.0 && height > 0.0 {
            Ok(Self { width, height })
        } else {
            Err(InvalidViewport { width, height })
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Errors surfaced while building a layout graph from caller records
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError<K>
where
    K: Debug,
{
    /// Two node records share an id
    #[error("duplicate node id {0:?}")]
    DuplicateNode(K),
    /// An edge record references an id with no node record
    #[error("edge endpoint {0:?} is not a known node")]
    UnknownEndpoint(K),
    #[error(transparent)]
    Viewport(#[from] InvalidViewport),
}

/// A layout engine computes a position per real vertex
///
/// Both engines mutate the graph they are given (the force engine moves
/// vertices and may add hubs, the layered engine splits multi-tier edges),
/// which is why a graph instance belongs to a single layout invocation.
pub trait LayoutEngine {
    fn compute(&self, graph: &mut NetworkGraph, viewport: Viewport) -> HashMap<NodeIndex, Point>;
}

/// The closed set of layout strategies offered to the viewer
#[derive(Debug, Clone)]
pub enum Strategy {
    ForceDirected(ForceDirected),
    Layered(Layered),
}

impl LayoutEngine for Strategy {
    fn compute(&self, graph: &mut NetworkGraph, viewport: Viewport) -> HashMap<NodeIndex, Point> {
        match self {
            Strategy::ForceDirected(engine) => engine.compute(graph, viewport),
            Strategy::Layered(engine) => engine.compute(graph, viewport),
        }
    }
}

/// Caller-facing description of one station
#[derive(Debug, Clone)]
pub struct NodeRecord<K> {
    pub id: K,
    pub size: f64,
    /// Current position on the drawing surface; the force simulation starts
    /// from here and `iterations = 0` returns it unchanged
    pub position: Point,
    /// Pinned nodes keep their position but still push others away
    pub fixed: bool,
    /// Supply-chain tier assigned by the upstream staging pass
    pub layer: Option<usize>,
    /// Marks a record standing in for several collapsed stations
    pub group: bool,
}

impl<K> NodeRecord<K> {
    pub fn new(id: K, size: f64) -> Self {
        Self {
            id,
            size,
            position: Point::default(),
            fixed: false,
            layer: None,
            group: false,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn in_layer(mut self, layer: usize) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn grouped(mut self) -> Self {
        self.group = true;
        self
    }
}

/// Caller-facing description of one delivery
#[derive(Debug, Clone)]
pub struct EdgeRecord<K> {
    pub source: K,
    pub target: K,
    pub weight: f64,
}

impl<K> EdgeRecord<K> {
    pub fn new(source: K, target: K) -> Self {
        Self {
            source,
            target,
            weight: 1.0,
        }
    }

    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Build a layout graph from caller records
///
/// Fails fast on duplicate node ids and on edges referencing unknown ids,
/// before any layout work happens. The returned map translates caller ids
/// to the arena indices used by the engines.
pub fn build_graph<K>(
    nodes: &[NodeRecord<K>],
    edges: &[EdgeRecord<K>],
) -> Result<(NetworkGraph, HashMap<K, NodeIndex>), LayoutError<K>>
where
    K: Clone + Eq + Hash + Debug,
{
    let mut graph = NetworkGraph::new();
    let mut index_of = HashMap::with_capacity(nodes.len());

    for record in nodes {
        let mut vertex = if record.group {
            Vertex::group(record.size)
        } else {
            Vertex::node(record.size)
        };
        vertex.position = record.position;
        vertex.fixed = record.fixed;
        vertex.layer = record.layer;

        let index = graph.insert_vertex(vertex);
        if index_of.insert(record.id.clone(), index).is_some() {
            return Err(LayoutError::DuplicateNode(record.id.clone()));
        }
    }

    for record in edges {
        let source = *index_of
            .get(&record.source)
            .ok_or_else(|| LayoutError::UnknownEndpoint(record.source.clone()))?;
        let target = *index_of
            .get(&record.target)
            .ok_or_else(|| LayoutError::UnknownEndpoint(record.target.clone()))?;
        graph.insert_edge(source, target, record.weight);
    }

    Ok((graph, index_of))
}

/// One-call boundary for the viewer: build the model, run the strategy, and
/// map positions back to caller ids
///
/// Group records take part in the layout but, like hub and virtual
/// vertices, never appear in the result.
pub fn layout<K>(
    nodes: &[NodeRecord<K>],
    edges: &[EdgeRecord<K>],
    engine: &impl LayoutEngine,
    viewport: Viewport,
) -> Result<HashMap<K, Point>, LayoutError<K>>
where
    K: Clone + Eq + Hash + Debug,
{
    let (mut graph, index_of) = build_graph(nodes, edges)?;
    let positions = engine.compute(&mut graph, viewport);

    Ok(index_of
        .into_iter()
        .filter_map(|(id, index)| positions.get(&index).map(|&position| (id, position)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn viewport_rejects_non_positive_dimensions() {
        assert!(Viewport::new(800.0, 600.0).is_ok());
        assert_eq!(
            Viewport::new(0.0, 600.0),
            Err(InvalidViewport {
                width: 0.0,
                height: 600.0
            })
        );
        assert!(Viewport::new(800.0, -1.0).is_err());
    }

    #[test]
    fn build_graph_rejects_duplicate_ids() {
        let nodes = vec![NodeRecord::new("farm", 10.0), NodeRecord::new("farm", 10.0)];
        let result = build_graph(&nodes, &[]);
        assert_eq!(result.unwrap_err(), LayoutError::DuplicateNode("farm"));
    }

    #[test]
    fn build_graph_rejects_unknown_endpoints() {
        let nodes = vec![NodeRecord::new("farm", 10.0)];
        let edges = vec![EdgeRecord::new("farm", "retailer")];
        let result = build_graph(&nodes, &edges);
        assert_eq!(result.unwrap_err(), LayoutError::UnknownEndpoint("retailer"));
    }

    #[test]
    fn build_graph_translates_records() {
        let nodes = vec![
            NodeRecord::new("farm", 10.0).at(5.0, 6.0).pinned(),
            NodeRecord::new("packer", 20.0).in_layer(1),
            NodeRecord::new("region", 40.0).grouped(),
        ];
        let edges = vec![EdgeRecord::new("farm", "packer").weighted(2.5)];

        let (graph, index_of) = build_graph(&nodes, &edges).unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 1);

        let farm = &graph[index_of["farm"]];
        assert_eq!(farm.position, Point::new(5.0, 6.0));
        assert!(farm.fixed);

        let packer = &graph[index_of["packer"]];
        assert_eq!(packer.layer, Some(1));
        assert_eq!(packer.index_in_layer, Some(0));

        assert!(!graph[index_of["region"]].is_real());
    }
}
