use chrono::NaiveDateTime;
use thiserror::Error;

use crate::ephemeris::Body;

/// Errors that can occur while computing natal and transit data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstralError {
    #[error("Invalid civil time {datetime} in zone {zone}: {message}")]
    InvalidTime {
        datetime: String,
        zone: String,
        message: String,
    },
    #[error("Unknown time zone: {zone}")]
    InvalidTimeZone { zone: String },
    #[error("No geocoding match for place: {place}")]
    PlaceNotFound { place: String },
    #[error("Geocoding unavailable for {place} after {attempts} attempt(s): {message}")]
    GeocodingUnavailable {
        place: String,
        attempts: u32,
        message: String,
    },
    #[error("House cusps require geographic coordinates")]
    MissingCoordinates,
    #[error("Failed to calculate {target} at JD {julian_day}: {message}")]
    EphemerisComputation {
        target: String,
        julian_day: f64,
        message: String,
    },
    #[error("Invalid house system: {system}. Valid systems: {valid:?}")]
    InvalidHouseSystem { system: String, valid: Vec<String> },
    #[error("Ephemeris path not found: {path}")]
    EphemerisPathNotFound { path: String },
    #[error("Invalid transit window: {window}")]
    InvalidScanWindow { window: String },
}

impl AstralError {
    pub(crate) fn invalid_time(datetime: NaiveDateTime, zone: &str, message: impl Into<String>) -> Self {
        Self::InvalidTime {
            datetime: datetime.format("%Y-%m-%d %H:%M").to_string(),
            zone: zone.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn body_failed(body: Body, julian_day: f64, message: impl Into<String>) -> Self {
        Self::EphemerisComputation {
            target: body.name().to_string(),
            julian_day,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AstralError>;
