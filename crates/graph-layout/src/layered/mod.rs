mod scale;
mod split;

pub use scale::scale_to_size;
pub use split::create_virtual_vertices;

use std::collections::HashMap;

use petgraph::stable_graph::NodeIndex;

use crate::engine::{LayoutEngine, Viewport};
use crate::graph::NetworkGraph;
use crate::Point;

/// Configuration for the tiered supply-chain layout
///
/// Tier indices and the initial vertical ordering are expected on the
/// vertices already, assigned by the upstream staging pass; this engine
/// routes multi-tier edges and fits the result into the viewport.
#[derive(Debug, Clone)]
pub struct Layered {
    /// Nominal spacing between neighbouring vertices; four times this value
    /// is the floor for the distance between adjacent tiers
    pub vertex_distance: f64,
}

impl Default for Layered {
    fn default() -> Self {
        Self {
            vertex_distance: 40.0,
        }
    }
}

impl Layered {
    pub fn new(vertex_distance: f64) -> Self {
        Self { vertex_distance }
    }
}

impl LayoutEngine for Layered {
    fn compute(&self, graph: &mut NetworkGraph, viewport: Viewport) -> HashMap<NodeIndex, Point> {
        create_virtual_vertices(graph);
        scale_to_size(graph, viewport.width(), viewport.height(), self.vertex_distance);
        graph.positions()
    }
}
