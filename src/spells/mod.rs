//! Spell lookups.
//!
//! Resolves `<Spell Name>` references (HTML-escaped as `&lt;...&gt;`) against
//! a local SQLite spell database.

pub mod resolver;
pub mod store;

pub use resolver::{SpellOutcome, SpellResolver};
pub use store::SqliteSpellStore;
