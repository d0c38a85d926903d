pub mod aspects;
pub mod ephemeris;
pub mod error;
pub mod geocode;
pub mod lunar;
pub mod period;
pub mod service;
pub mod time;
pub mod transit;
pub mod zodiac;

pub use aspects::{classify, AspectCalculator, AspectKind, AspectPair};
pub use ephemeris::{
    Body, BodyClass, BodyPosition, EphemerisEngine, EphemerisProvider, GeoCoordinate, HouseCusps,
    HouseSystem, SwissEphemeris,
};
pub use error::{AstralError, Result};
pub use geocode::{GeocodeResolver, GeocodingProvider, LookupError, NominatimProvider, RetryPolicy};
pub use lunar::LunarSnapshot;
pub use period::HoroscopePeriod;
pub use service::{AstralService, NatalPositions, NatalReport};
pub use time::{AmbiguityPolicy, BirthMoment, JulianDay, TimeConverter};
pub use transit::{ScanWindow, TransitEvent, TransitPlan, TransitReport, TransitScanner};
pub use zodiac::ZodiacSign;
