//! Business logic services for the Scrapyard Ledger server

pub mod dashboard;
pub mod editor;
pub mod records;

pub use dashboard::DashboardQuery;
pub use editor::RecordEditor;
