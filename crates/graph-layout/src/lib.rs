//! Layout engines for supply-chain network graphs
//!
//! The viewer hands this crate a set of station and delivery records plus a
//! viewport, and gets back a position per station. Two engines are
//! available, both working on the same [`NetworkGraph`] model:
//!
//! - [`ForceDirected`]: a spring embedder for exploratory views. Repulsion
//!   between all vertices, attraction along deliveries, cooled over a fixed
//!   number of iterations. Disconnected parts of the network are bridged
//!   with synthetic hubs first so they cannot drift apart.
//! - [`Layered`]: a tiered layout for networks whose stations carry a
//!   supply-chain tier. Deliveries spanning several tiers are routed
//!   through virtual waypoints, then the drawing is scaled and centered to
//!   fit the viewport.
//!
//! # Example
//!
//! ```
//! use foodweb_graph_layout::{
//!     layout, EdgeRecord, ForceDirected, NodeRecord, Strategy, Viewport,
//! };
//!
//! let nodes = vec![
//!     NodeRecord::new("farm", 10.0).at(0.0, 0.0),
//!     NodeRecord::new("dairy", 10.0).at(80.0, 0.0),
//! ];
//! let edges = vec![EdgeRecord::new("farm", "dairy")];
//!
//! let viewport = Viewport::new(800.0, 600.0)?;
//! let strategy = Strategy::ForceDirected(ForceDirected::default());
//! let positions = layout(&nodes, &edges, &strategy, viewport)?;
//! assert_eq!(positions.len(), 2);
//! # Ok::<(), foodweb_graph_layout::LayoutError<&'static str>>(())
//! ```
//!
//! A graph instance belongs to a single layout invocation: both engines
//! mutate it while they work, and nothing is shared between runs.

mod components;
mod engine;
mod force;
mod geometry;
mod graph;
mod layered;

pub use components::identify_components;
pub use engine::{
    build_graph, layout, EdgeRecord, InvalidViewport, LayoutEngine, LayoutError, NodeRecord,
    Strategy, Viewport,
};
pub use force::{ForceDirected, Simulation};
pub use geometry::{Point, Vec2};
pub use graph::{EdgeAttrs, NetworkGraph, Vertex, VertexKind};
pub use layered::{create_virtual_vertices, scale_to_size, Layered};

// The arena index types callers receive from `build_graph`.
pub use petgraph::stable_graph::{EdgeIndex, NodeIndex};
