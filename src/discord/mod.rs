//! Discord integration.
//!
//! The gateway client feeds a single ordered channel; the dispatch loop
//! consumes it and posts replies back to the originating channel.

pub mod client;
pub mod handler;

pub use client::ChatBot;
pub use handler::{run_dispatch_loop, DiscordReplySink};
