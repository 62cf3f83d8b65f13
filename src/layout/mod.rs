//! Track-grid layout primitives and the per-master drawing context.

pub mod context;
pub mod floorplan;
pub mod geom;
pub mod grid;
pub mod master;
pub mod resolver;
pub mod state;
pub mod tracks;
pub mod wire;

pub use context::{Instance, LayoutCtx, MosPorts};
pub use floorplan::{LaygoConfig, MosKind, RowLayoutInfo, TrackKind};
pub use geom::{ColSpan, HalfInt, Span};
pub use grid::RoutingGrid;
pub use master::Master;
pub use resolver::TrackResolver;
pub use state::DrawState;
pub use tracks::{TrackId, TrackLayer, TrackManager};
pub use wire::WireArray;
