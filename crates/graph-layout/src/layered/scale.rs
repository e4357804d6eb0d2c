use petgraph::stable_graph::NodeIndex;
use tracing::debug;

use crate::graph::{NetworkGraph, VertexKind};

/// Fraction of the width reserved as margin on each side
const MARGIN_RATIO: f64 = 0.1;

/// Fit a tiered layout into the viewport
///
/// Works on real vertices only; virtual waypoints and group stand-ins are
/// not part of the drawing extent. The vertical pass magnifies the content
/// up to 2x but never shrinks it; content taller than the viewport widens
/// the nominal drawing width instead of being clipped. The horizontal pass
/// then spreads the tiers right to left, spacing them by the tighter of
/// "fit every tier between the margins" and a floor derived from the
/// nominal vertex distance and the steepest edge slope.
pub fn scale_to_size(graph: &mut NetworkGraph, width: f64, height: f64, vertex_distance: f64) {
    let real: Vec<NodeIndex> = graph.real_vertices().collect();
    if real.is_empty() {
        return;
    }

    let mut max_size = real
        .iter()
        .map(|&vertex| graph[vertex].position.y + graph[vertex].size / 2.0)
        .fold(f64::NEG_INFINITY, f64::max);

    let scale = (height / max_size).clamp(1.0, 2.0);
    max_size *= scale;

    let mut width = width;
    if max_size > height {
        // Too tall even without magnification: grow the drawing
        // horizontally to preserve the aspect ratio instead of clipping.
        width *= max_size / height;
    } else {
        let offset = (height - max_size) / 2.0;
        for &vertex in &real {
            let v = &mut graph[vertex];
            v.position.y = v.position.y * scale + offset;
        }
    }

    let slope_bound = max_neighbour_distance(graph, &real);

    let layer_count = graph.layer_count();
    let layer_distance = if layer_count > 1 {
        let margin = width * MARGIN_RATIO;
        let fit = (width - 2.0 * margin) / (layer_count - 1) as f64;
        fit.min((4.0 * vertex_distance).max(1.5 * slope_bound))
    } else {
        0.0
    };
    let offset = (width - layer_distance * layer_count.saturating_sub(1) as f64) / 2.0;

    debug!(scale, layer_distance, width, "fitted tiered layout");

    // Tier 0 sits rightmost; x falls as the tier index rises, and every
    // vertex of a tier shares the tier's x.
    for &vertex in &real {
        if let Some(layer) = graph[vertex].layer {
            graph[vertex].position.x = width - offset - layer as f64 * layer_distance;
        }
    }
}

/// Steepest vertical difference per tier crossed over all real-to-real
/// adjacencies, including those routed through virtual chains
fn max_neighbour_distance(graph: &NetworkGraph, real: &[NodeIndex]) -> f64 {
    let mut steepest = 0.0f64;
    for &vertex in real {
        let Some(layer) = graph[vertex].layer else {
            continue;
        };
        let starts: Vec<NodeIndex> = graph.out_neighbors(vertex).collect();
        for start in starts {
            let Some((neighbor, hops)) = follow_chain(graph, start) else {
                continue;
            };
            let gap = match graph[neighbor].layer {
                Some(other) => layer.abs_diff(other),
                None => hops,
            };
            if gap == 0 {
                continue;
            }
            let slope =
                (graph[vertex].position.y - graph[neighbor].position.y).abs() / gap as f64;
            steepest = steepest.max(slope);
        }
    }
    steepest
}

/// Walk a split-edge chain to the first non-virtual vertex
///
/// Returns the real vertex at the end of the chain and the number of tiers
/// crossed to reach it, or `None` when the chain ends at a group or hub.
fn follow_chain(graph: &NetworkGraph, start: NodeIndex) -> Option<(NodeIndex, usize)> {
    let mut current = start;
    let mut hops = 1usize;
    while graph[current].kind == VertexKind::Virtual {
        current = graph.out_neighbors(current).next()?;
        hops += 1;
    }
    (graph[current].kind == VertexKind::Node).then_some((current, hops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Vertex;
    use crate::layered::create_virtual_vertices;
    use test_log::test;

    fn tiered_vertex(graph: &mut NetworkGraph, layer: usize, y: f64, size: f64) -> NodeIndex {
        let mut vertex = Vertex::node(size);
        vertex.layer = Some(layer);
        vertex.position.y = y;
        graph.insert_vertex(vertex)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn short_content_is_magnified_at_most_twofold_and_centered() {
        let mut graph = NetworkGraph::new();
        let a = tiered_vertex(&mut graph, 0, 50.0, 20.0);
        let b = tiered_vertex(&mut graph, 1, 100.0, 20.0);
        let c = tiered_vertex(&mut graph, 2, 145.0, 20.0);
        let d = tiered_vertex(&mut graph, 1, 60.0, 20.0);
        graph.insert_edge(a, b, 1.0);
        graph.insert_edge(b, c, 1.0);

        scale_to_size(&mut graph, 800.0, 600.0, 40.0);

        // extent 155, scale clamped to 2, centering offset (600-310)/2.
        assert_close(graph[a].position.y, 245.0);
        assert_close(graph[b].position.y, 345.0);
        assert_close(graph[c].position.y, 435.0);
        assert_close(graph[d].position.y, 265.0);

        // slope bound 100 -> spacing floor max(160, 150); margins leave 640
        // for two gaps, so the floor wins.
        assert_close(graph[a].position.x, 560.0);
        assert_close(graph[b].position.x, 400.0);
        assert_close(graph[c].position.x, 240.0);

        // Same tier, same x.
        assert_close(graph[d].position.x, graph[b].position.x);
    }

    #[test]
    fn tall_content_widens_the_drawing_instead_of_clipping() {
        let mut graph = NetworkGraph::new();
        let a = tiered_vertex(&mut graph, 0, 250.0, 20.0);
        let b = tiered_vertex(&mut graph, 1, 100.0, 20.0);
        graph.insert_edge(a, b, 1.0);

        scale_to_size(&mut graph, 400.0, 200.0, 40.0);

        // extent 260 > height 200 at scale 1: y stays put, width grows to
        // 400 * 260/200 = 520.
        assert_close(graph[a].position.y, 250.0);
        assert_close(graph[b].position.y, 100.0);

        // slope 150 -> spacing min(416, max(160, 225)) = 225, centered in
        // the widened drawing.
        assert_close(graph[a].position.x, 372.5);
        assert_close(graph[b].position.x, 147.5);
    }

    #[test]
    fn single_tier_is_centered() {
        let mut graph = NetworkGraph::new();
        let a = tiered_vertex(&mut graph, 0, 10.0, 10.0);
        let b = tiered_vertex(&mut graph, 0, 60.0, 10.0);

        scale_to_size(&mut graph, 400.0, 300.0, 40.0);

        assert_close(graph[a].position.x, 200.0);
        assert_close(graph[b].position.x, 200.0);
    }

    #[test]
    fn slope_bound_follows_virtual_chains() {
        let mut graph = NetworkGraph::new();
        let a = tiered_vertex(&mut graph, 0, 0.0, 0.0);
        let b = tiered_vertex(&mut graph, 3, 270.0, 0.0);
        graph.insert_edge(a, b, 1.0);
        create_virtual_vertices(&mut graph);

        // 270 of vertical difference across a 3-tier chain: 90 per tier.
        let real: Vec<NodeIndex> = graph.real_vertices().collect();
        assert_close(max_neighbour_distance(&graph, &real), 90.0);
    }

    #[test]
    fn vertices_without_a_tier_keep_their_x() {
        let mut graph = NetworkGraph::new();
        scale_to_size(&mut graph, 400.0, 300.0, 40.0);
        assert_eq!(graph.vertex_count(), 0);

        let free = graph.insert_vertex(Vertex::node(10.0));
        graph[free].position.x = 123.0;
        scale_to_size(&mut graph, 400.0, 300.0, 40.0);
        assert_close(graph[free].position.x, 123.0);
    }
}
