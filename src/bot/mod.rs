//! Message handling: reference extraction, custom triggers and dispatch.

pub mod dispatcher;
pub mod extract;
pub mod triggers;

pub use dispatcher::Dispatcher;
pub use triggers::TriggerMatcher;
