//! Webhook entry point: HTTP routes, payload parsing, and the
//! per-message orchestrator.

pub mod orchestrator;
pub mod payload;
pub mod reply;
pub mod routes;

pub use orchestrator::Orchestrator;
pub use payload::{DeliveryPayload, InboundMessage};
pub use routes::{AppState, router};
