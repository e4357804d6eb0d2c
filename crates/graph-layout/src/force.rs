use std::collections::HashMap;

use petgraph::stable_graph::NodeIndex;
use tracing::{debug, trace};

use crate::components::identify_components;
use crate::engine::{LayoutEngine, Viewport};
use crate::graph::NetworkGraph;
use crate::{Point, Vec2};

/// Distance floor for the force denominators
///
/// Coincident or near-coincident vertices interact as if they were this far
/// apart, which keeps every term finite without special-casing degenerate
/// inputs.
const MIN_DISTANCE: f64 = 20.0;

/// Attraction tuning constant
const ATTRACTION: f64 = 1.5;

/// Repulsion tuning constant
const REPULSION: f64 = 0.5;

/// Configuration for the force-directed (spring embedder) layout
#[derive(Debug, Clone)]
pub struct ForceDirected {
    /// Number of simulation rounds
    pub iterations: usize,
}

impl Default for ForceDirected {
    fn default() -> Self {
        Self { iterations: 50 }
    }
}

impl ForceDirected {
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }
}

impl LayoutEngine for ForceDirected {
    fn compute(&self, graph: &mut NetworkGraph, viewport: Viewport) -> HashMap<NodeIndex, Point> {
        let mut simulation = Simulation::new(graph, viewport, self.iterations);
        while simulation.step() {}
        graph.positions()
    }
}

/// One force-directed run over a graph
///
/// The whole run is `Simulation::new` followed by [`Simulation::step`] until
/// it returns `false`. The per-iteration granularity exists because a run is
/// O(n²·iterations): callers on a latency-sensitive thread can interleave
/// steps with polling and abandon the simulation between any two iterations,
/// with no cleanup beyond dropping the graph.
pub struct Simulation<'g> {
    graph: &'g mut NetworkGraph,
    vertices: Vec<NodeIndex>,
    springs: Vec<(NodeIndex, NodeIndex)>,
    /// Ideal inter-vertex spacing
    k: f64,
    /// Current temperature: the longest distance a vertex may travel in one
    /// iteration
    t: f64,
    /// Per-iteration cooling step
    dt: f64,
    remaining: usize,
}

impl<'g> Simulation<'g> {
    /// Prepare a run: bridge disconnected components, then derive the
    /// simulation parameters from the viewport and vertex count
    pub fn new(graph: &'g mut NetworkGraph, viewport: Viewport, iterations: usize) -> Self {
        identify_components(graph);

        let count = graph.vertex_count();
        let k = if count == 0 {
            0.0
        } else {
            (viewport.width() * viewport.height() / count as f64).sqrt()
        };
        let t = viewport.width() / 10.0;
        let dt = t / (iterations as f64 + 1.0);

        debug!(vertices = count, k, t, iterations, "force-directed run");

        let vertices = graph.vertex_indices();
        let springs = graph
            .edges()
            .map(|(source, target, _)| (source, target))
            .collect();

        Self {
            graph,
            vertices,
            springs,
            k,
            t,
            dt,
            remaining: iterations,
        }
    }

    /// Run one simulation round
    ///
    /// Returns `false`, doing nothing, once the configured number of
    /// iterations has been performed.
    pub fn step(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }

        for &vertex in &self.vertices {
            self.graph[vertex].displacement = Vec2::zero();
        }

        // Repulsion between every vertex pair. Fixed vertices push others
        // away but accumulate nothing themselves.
        for &vertex in &self.vertices {
            if self.graph[vertex].fixed {
                continue;
            }
            let position = self.graph[vertex].position;
            let mut displacement = self.graph[vertex].displacement;
            for &other in &self.vertices {
                if other == vertex {
                    continue;
                }
                let delta = position - self.graph[other].position;
                let distance = delta.length().max(MIN_DISTANCE);
                displacement += delta * (REPULSION * self.k * self.k / (distance * distance));
            }
            self.graph[vertex].displacement = displacement;
        }

        // Attraction along every edge, accumulated on both endpoints. A
        // fixed endpoint's accumulator fills up too but is never applied.
        for &(source, target) in &self.springs {
            let delta = self.graph[source].position - self.graph[target].position;
            let distance = delta.length().max(MIN_DISTANCE);
            let shift = delta * (ATTRACTION * distance / self.k);
            self.graph[source].displacement -= shift;
            self.graph[target].displacement += shift;
        }

        // Move every non-fixed vertex, no further than the current
        // temperature allows.
        for &vertex in &self.vertices {
            if self.graph[vertex].fixed {
                continue;
            }
            let step = self.graph[vertex].displacement.clamp_length(self.t);
            self.graph[vertex].position = (self.graph[vertex].position + step).rounded();
        }

        self.t -= self.dt;
        self.remaining -= 1;
        trace!(t = self.t, remaining = self.remaining, "cooled");
        true
    }

    /// Iterations still to run
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Current temperature
    pub fn temperature(&self) -> f64 {
        self.t
    }
}
