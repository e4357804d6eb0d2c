use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use tracing::debug;

use crate::graph::{NetworkGraph, Vertex};
use crate::Point;

/// Spacing between successive hub start positions, left of the frame
const HUB_SPACING: f64 = 100.0;

const HUB_EDGE_WEIGHT: f64 = 1.0;

/// Detect connected components and bridge them with synthetic hubs
///
/// Pure repulsion has no restoring force between disconnected parts of a
/// graph, so a force-directed run would push separate components apart
/// without bound. When the graph has more than one component this inserts
/// one hub vertex per component, connects the hubs into a clique so the
/// components compete for a shared center, and connects every member of a
/// component to its hub. Hubs start out of frame and are never part of the
/// output position map.
pub fn identify_components(graph: &mut NetworkGraph) {
    let components = find_components(graph);
    debug!(components = components.len(), "connectivity analysis");
    if components.len() < 2 {
        return;
    }

    let mut hubs: Vec<NodeIndex> = Vec::with_capacity(components.len());
    for (slot, members) in components.iter().enumerate() {
        let start = Point::new(-HUB_SPACING * (slot + 1) as f64, -HUB_SPACING);
        let hub = graph.insert_vertex(Vertex::hub(start));
        for &earlier in &hubs {
            graph.insert_virtual_edge(hub, earlier, HUB_EDGE_WEIGHT);
        }
        for &member in members {
            graph.insert_virtual_edge(member, hub, HUB_EDGE_WEIGHT);
        }
        hubs.push(hub);
    }
}

/// Group vertices into connected components, treating edges as undirected
///
/// Iterative traversal with an explicit stack; supply-chain graphs can be
/// deep enough to overflow the call stack with recursive DFS.
fn find_components(graph: &NetworkGraph) -> Vec<Vec<NodeIndex>> {
    let mut visited: HashSet<NodeIndex> = HashSet::with_capacity(graph.vertex_count());
    let mut components = Vec::new();

    for start in graph.vertex_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut members = Vec::new();
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(vertex) = stack.pop() {
            members.push(vertex);
            for neighbor in graph.neighbors_undirected(vertex) {
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        components.push(members);
    }

    components
}
