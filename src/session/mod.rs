//! Session persistence — durable phone-number → authenticated-user mapping.

pub mod migrations;
pub mod model;
pub mod store;

pub use model::{Session, normalize_phone};
pub use store::SessionStore;
