//! Domain models for the Scrapyard Ledger

mod lot;
mod sale;

pub use lot::*;
pub use sale::*;
