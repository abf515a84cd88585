//! HTTP handlers

pub mod health;
pub mod lot;
pub mod records;
pub mod reporting;
pub mod sale;

pub use health::health_check;
pub use lot::*;
pub use records::*;
pub use reporting::*;
pub use sale::*;
