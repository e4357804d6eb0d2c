use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use tracing::debug;

use crate::graph::{NetworkGraph, Vertex, VertexKind};

/// Replace every multi-tier edge with a chain of unit-span segments
///
/// An edge whose endpoints sit more than one tier apart cannot be drawn
/// tier by tier, so it is routed through one new virtual vertex per
/// intermediate tier. Each virtual vertex is appended to the arena and to
/// its tier's list; every chain segment copies the original edge weight.
/// Afterwards every edge in the graph connects vertices whose tiers differ
/// by exactly 1.
pub fn create_virtual_vertices(graph: &mut NetworkGraph) {
    let mut split = 0usize;
    for edge in graph.edge_indices() {
        if split_edge(graph, edge) {
            split += 1;
        }
    }
    if split > 0 {
        debug!(edges = split, "split multi-tier edges");
    }
}

fn split_edge(graph: &mut NetworkGraph, edge: EdgeIndex) -> bool {
    let Some((source, target)) = graph.endpoints(edge) else {
        return false;
    };
    let (Some(source_layer), Some(target_layer)) = (graph[source].layer, graph[target].layer)
    else {
        return false;
    };
    let span = source_layer.abs_diff(target_layer);
    if span <= 1 {
        return false;
    }
    let Some(attrs) = graph.remove_edge(edge) else {
        return false;
    };

    // A group endpoint lends the chain its aggregate size, tapering to
    // nothing at the far end so the collapsed stations keep their visual
    // thickness along the route.
    let source_size = group_size(graph, source);
    let target_size = group_size(graph, target);
    let source_position = graph[source].position;
    let target_position = graph[target].position;

    let descending = target_layer < source_layer;
    let mut previous = source;
    for hop in 1..span {
        let layer = if descending {
            source_layer - hop
        } else {
            source_layer + hop
        };
        let fraction = hop as f64 / span as f64;
        let position = source_position + (target_position - source_position) * fraction;
        let size = source_size + (target_size - source_size) * fraction;

        let waypoint = graph.insert_vertex(Vertex::virtual_in_layer(layer, position, size));
        graph.insert_virtual_edge(previous, waypoint, attrs.weight);
        previous = waypoint;
    }
    graph.insert_virtual_edge(previous, target, attrs.weight);
    true
}

fn group_size(graph: &NetworkGraph, vertex: NodeIndex) -> f64 {
    if graph[vertex].kind == VertexKind::Group {
        graph[vertex].size
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn tiered_vertex(graph: &mut NetworkGraph, layer: usize, y: f64) -> NodeIndex {
        let mut vertex = Vertex::node(20.0);
        vertex.layer = Some(layer);
        vertex.position.y = y;
        graph.insert_vertex(vertex)
    }

    fn chain_from(graph: &NetworkGraph, start: NodeIndex) -> Vec<NodeIndex> {
        let mut chain = vec![start];
        let mut current = start;
        while let Some(next) = graph.out_neighbors(current).next() {
            chain.push(next);
            if graph[next].kind != VertexKind::Virtual {
                break;
            }
            current = next;
        }
        chain
    }

    #[test]
    fn unit_span_edges_are_left_alone() {
        let mut graph = NetworkGraph::new();
        let a = tiered_vertex(&mut graph, 0, 0.0);
        let b = tiered_vertex(&mut graph, 1, 0.0);
        let c = tiered_vertex(&mut graph, 1, 50.0);
        graph.insert_edge(a, b, 1.0);
        graph.insert_edge(b, c, 1.0);

        create_virtual_vertices(&mut graph);

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn descending_three_tier_span_gains_two_waypoints() {
        let mut graph = NetworkGraph::new();
        let source = tiered_vertex(&mut graph, 5, 0.0);
        let target = tiered_vertex(&mut graph, 2, 90.0);
        graph.insert_edge(source, target, 7.0);

        create_virtual_vertices(&mut graph);

        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 3);

        let chain = chain_from(&graph, source);
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[3], target);
        assert_eq!(graph[chain[1]].layer, Some(4));
        assert_eq!(graph[chain[2]].layer, Some(3));

        // Weight is copied onto every segment; the segments are virtual and
        // each spans exactly one tier.
        for (edge_source, edge_target, attrs) in graph.edges() {
            assert_eq!(attrs.weight, 7.0);
            assert!(attrs.is_virtual);
            let gap = graph[edge_source]
                .layer
                .unwrap()
                .abs_diff(graph[edge_target].layer.unwrap());
            assert_eq!(gap, 1);
        }

        // The waypoints joined their tier lists.
        assert!(graph.layers()[4].contains(&chain[1]));
        assert!(graph.layers()[3].contains(&chain[2]));
        assert!((graph[chain[1]].position.y - 30.0).abs() < 1e-9);
        assert!((graph[chain[2]].position.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn group_endpoint_tapers_the_chain() {
        let mut graph = NetworkGraph::new();
        let mut group = Vertex::group(12.0);
        group.layer = Some(0);
        let source = graph.insert_vertex(group);
        let target = tiered_vertex(&mut graph, 3, 0.0);
        graph.insert_edge(source, target, 1.0);

        create_virtual_vertices(&mut graph);

        let chain = chain_from(&graph, source);
        let sizes: Vec<f64> = chain[1..3].iter().map(|&v| graph[v].size).collect();
        assert!((sizes[0] - 8.0).abs() < 1e-9, "sizes: {sizes:?}");
        assert!((sizes[1] - 4.0).abs() < 1e-9, "sizes: {sizes:?}");
        assert!(sizes[0] > sizes[1], "taper must shrink away from the group");
    }

    #[test]
    fn two_group_endpoints_interpolate_between_their_sizes() {
        let mut graph = NetworkGraph::new();
        let mut big = Vertex::group(12.0);
        big.layer = Some(0);
        let mut small = Vertex::group(6.0);
        small.layer = Some(3);
        let source = graph.insert_vertex(big);
        let target = graph.insert_vertex(small);
        graph.insert_edge(source, target, 1.0);

        create_virtual_vertices(&mut graph);

        let chain = chain_from(&graph, source);
        let sizes: Vec<f64> = chain[1..3].iter().map(|&v| graph[v].size).collect();
        assert!((sizes[0] - 10.0).abs() < 1e-9, "sizes: {sizes:?}");
        assert!((sizes[1] - 8.0).abs() < 1e-9, "sizes: {sizes:?}");
    }

    #[test]
    fn untiered_edges_are_ignored() {
        let mut graph = NetworkGraph::new();
        let a = graph.insert_vertex(Vertex::node(10.0));
        let b = tiered_vertex(&mut graph, 4, 0.0);
        graph.insert_edge(a, b, 1.0);

        create_virtual_vertices(&mut graph);

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
}
