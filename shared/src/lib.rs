//! Shared types and logic for the Scrapyard Ledger
//!
//! This crate holds the lot/sale models, the canonical record sets and the
//! dashboard aggregation engine. It is used by the backend server and compiled
//! to WebAssembly for the browser dashboard.

pub mod analytics;
pub mod listing;
pub mod models;
pub mod records;
pub mod types;
pub mod validation;

pub use models::*;
pub use records::*;
pub use types::*;
pub use validation::*;
