//! Trading card lookups.
//!
//! Resolves `[[Card Name]]` and `[[Card Name|Set]]` references to the image
//! of the most relevant printing.

pub mod api;
pub mod query;
pub mod rarity;
pub mod resolver;

pub use api::HttpCardApi;
pub use query::CardEndpoints;
pub use resolver::CardResolver;
