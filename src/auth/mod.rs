//! Authentication — chat commands, the per-phone login state machine, and
//! the external Auth Service boundary.

pub mod command;
pub mod flow;
pub mod service;

pub use command::Command;
pub use flow::AuthFlow;
pub use service::{AuthService, HttpAuthService, UserProfile};
