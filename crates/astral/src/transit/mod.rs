//! Day-by-day transit scanning over a calendar month or year.

pub mod scanner;
pub mod types;

pub use scanner::{ScanStats, TransitScan, TransitScanner, DEFAULT_FAILURE_THRESHOLD};
pub use types::{ScanWindow, TransitEvent, TransitPlan, TransitReport};
