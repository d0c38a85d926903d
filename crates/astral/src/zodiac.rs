//! Tropical zodiac signs.
//!
//! The ecliptic is split into twelve 30° bands starting at 0° Aries. Longitudes
//! are normalized into [0, 360) before classification, so 360° is Aries and
//! negative longitudes wrap around.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Sign containing `longitude`; the lower bound of each band is inclusive.
    pub fn from_longitude(longitude: f64) -> Self {
        let idx = (normalize_degrees(longitude) / 30.0).floor() as usize;
        Self::ALL[idx.min(11)]
    }

    /// 0 for Aries through 11 for Pisces.
    pub fn index(self) -> usize {
        self as usize
    }

    /// House of the natural wheel, 1 for Aries through 12 for Pisces.
    pub fn natural_house(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 6) % 12]
    }

    pub fn start_longitude(self) -> f64 {
        self.index() as f64 * 30.0
    }

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(ZodiacSign::from_longitude(15.0), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(29.999), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(30.0), ZodiacSign::Taurus);
        assert_eq!(ZodiacSign::from_longitude(359.999), ZodiacSign::Pisces);
    }

    #[test]
    fn full_circle_is_aries() {
        assert_eq!(ZodiacSign::from_longitude(360.0), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(-1e-15), ZodiacSign::Aries);
    }

    #[test]
    fn periodic_in_full_turns() {
        for step in 0..72 {
            let lon = step as f64 * 5.0 + 0.25;
            let sign = ZodiacSign::from_longitude(lon);
            for k in [-3.0, -1.0, 1.0, 2.0, 10.0] {
                assert_eq!(ZodiacSign::from_longitude(lon + 360.0 * k), sign, "lon {lon} k {k}");
            }
        }
    }

    #[test]
    fn opposite_and_houses() {
        assert_eq!(ZodiacSign::Aries.opposite(), ZodiacSign::Libra);
        assert_eq!(ZodiacSign::Virgo.opposite(), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::Pisces.opposite(), ZodiacSign::Virgo);
        assert_eq!(ZodiacSign::Aries.natural_house(), 1);
        assert_eq!(ZodiacSign::Pisces.natural_house(), 12);
    }

    #[test]
    fn normalizes_negative_angles() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.5), 0.5);
    }
}
