//! HTTP API handlers for sims-di
//!
//! The portal UI drives the import workflow through these endpoints; the
//! handlers are thin wrappers and all decision state lives in the service
//! layer.

pub mod health;
pub mod import_workflow;
pub mod sse;

pub use health::health_routes;
pub use import_workflow::import_routes;
pub use sse::event_stream;
