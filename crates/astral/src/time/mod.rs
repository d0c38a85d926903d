pub mod converter;
pub mod julian;

pub use converter::{AmbiguityPolicy, BirthMoment, TimeConverter};
pub use julian::JulianDay;
