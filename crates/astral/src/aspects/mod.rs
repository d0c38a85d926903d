pub mod calculator;
pub mod types;

pub use calculator::{angular_separation, classify, AspectCalculator};
pub use types::{AspectKind, AspectPair};
