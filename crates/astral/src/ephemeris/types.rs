use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AstralError, Result};
use crate::zodiac::ZodiacSign;

/// Bodies tracked for natal and transit charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

/// Speed class of a body, which sets how long a transit stays active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyClass {
    Personal,
    Social,
    Outer,
}

impl BodyClass {
    /// Days of influence on either side of an exact transit hit.
    pub fn orb_days(self) -> i64 {
        match self {
            BodyClass::Personal => 2,
            BodyClass::Social | BodyClass::Outer => 7,
        }
    }
}

impl Body {
    pub const ALL: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Bodies whose natal aspects are reported individually.
    pub const PERSONAL: [Body; 5] = [Body::Sun, Body::Moon, Body::Mercury, Body::Venus, Body::Mars];

    // Swiss Ephemeris planet numbers: SUN=0 .. PLUTO=9
    pub fn swe_id(self) -> i32 {
        self as i32
    }

    pub fn class(self) -> BodyClass {
        match self {
            Body::Sun | Body::Moon | Body::Mercury | Body::Venus | Body::Mars => BodyClass::Personal,
            Body::Jupiter | Body::Saturn => BodyClass::Social,
            Body::Uranus | Body::Neptune | Body::Pluto => BodyClass::Outer,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Body::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown body: {s}"))
    }
}

/// Geographic location coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Returns `None` if either value is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// Position of a body at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub body: Body,
    /// Ecliptic longitude in degrees [0, 360)
    pub longitude: f64,
    /// Ecliptic latitude in degrees
    pub latitude: f64,
    /// Speed in longitude (degrees per day)
    pub speed: f64,
    pub retrograde: bool,
}

impl BodyPosition {
    pub fn sign(&self) -> ZodiacSign {
        ZodiacSign::from_longitude(self.longitude)
    }
}

/// House division algorithms understood by the ephemeris
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    #[default]
    Placidus,
    Koch,
    Equal,
    WholeSign,
    Regiomontanus,
    Campanus,
    Alcabitius,
    Morinus,
}

/// House system mapping
const HOUSE_SYSTEMS: &[(&str, HouseSystem, u8)] = &[
    ("placidus", HouseSystem::Placidus, b'P'),
    ("koch", HouseSystem::Koch, b'K'),
    ("equal", HouseSystem::Equal, b'E'),
    ("whole_sign", HouseSystem::WholeSign, b'W'),
    ("regiomontanus", HouseSystem::Regiomontanus, b'R'),
    ("campanus", HouseSystem::Campanus, b'C'),
    ("alcabitius", HouseSystem::Alcabitius, b'A'),
    ("morinus", HouseSystem::Morinus, b'M'),
];

impl HouseSystem {
    /// Single-letter code used by the Swiss Ephemeris.
    pub fn code(self) -> u8 {
        HOUSE_SYSTEMS
            .iter()
            .find(|(_, system, _)| *system == self)
            .map(|(_, _, code)| *code)
            .unwrap_or(b'P')
    }

    pub fn name(self) -> &'static str {
        HOUSE_SYSTEMS
            .iter()
            .find(|(_, system, _)| *system == self)
            .map(|(name, _, _)| *name)
            .unwrap_or("placidus")
    }
}

impl FromStr for HouseSystem {
    type Err = AstralError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        HOUSE_SYSTEMS
            .iter()
            .find(|(name, _, _)| *name == wanted)
            .map(|(_, system, _)| *system)
            .ok_or_else(|| AstralError::InvalidHouseSystem {
                system: s.to_string(),
                valid: HOUSE_SYSTEMS.iter().map(|(name, _, _)| name.to_string()).collect(),
            })
    }
}

/// House cusps and the two main angles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseCusps {
    pub system: HouseSystem,
    /// Cusp of house 1 at index 0 through house 12 at index 11
    pub cusps: [f64; 12],
    pub ascendant: f64,
    pub midheaven: f64,
}

impl HouseCusps {
    /// House (1..=12) containing `longitude`.
    pub fn house_of(&self, longitude: f64) -> u8 {
        let lon = crate::zodiac::normalize_degrees(longitude);
        for i in 0..12 {
            let start = self.cusps[i];
            let end = self.cusps[(i + 1) % 12];
            let span = crate::zodiac::normalize_degrees(end - start);
            let offset = crate::zodiac::normalize_degrees(lon - start);
            if offset < span {
                return i as u8 + 1;
            }
        }
        1
    }
}
