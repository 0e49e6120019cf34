//! Modal bridge between host editing surfaces and a modal engine.
//!
//! Each host surface gets a [`BridgeState`] in the [`Registry`]. Host events
//! enter through the [`Coordinator`], which builds a [`Bridge`] for the
//! surface involved: keys are translated and pressed into the engine, engine
//! text divergence is written back inside one scoped edit, engine selections
//! are resolved into host ranges and written back through the deferred
//! [`TaskQueue`], and host selection changes are pushed into the engine.

pub mod bridge;
pub mod coordinator;
mod error;
pub mod panel;
pub mod queue;
pub mod registry;
pub mod state;

pub use bridge::Bridge;
pub use coordinator::Coordinator;
pub use error::BridgeError;
pub use panel::{Panel, PanelOutcome};
pub use queue::{Deferred, TaskQueue};
pub use registry::Registry;
pub use state::{BridgeState, BridgeStateV1, CaretStyle};
