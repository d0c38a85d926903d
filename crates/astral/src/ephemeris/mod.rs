pub mod adapter;
pub mod engine;
pub mod types;

pub use adapter::SwissEphemeris;
pub use engine::{EphemerisEngine, SignPlacement};
pub use types::{Body, BodyClass, BodyPosition, GeoCoordinate, HouseCusps, HouseSystem};

use crate::error::Result;
use crate::time::JulianDay;

/// Source of planetary and house positions.
///
/// Implementations must be deterministic for a given input.
pub trait EphemerisProvider: Send + Sync {
    fn body_position(&self, body: Body, jd: JulianDay) -> Result<BodyPosition>;

    fn house_cusps(
        &self,
        jd: JulianDay,
        location: GeoCoordinate,
        system: HouseSystem,
    ) -> Result<HouseCusps>;
}
