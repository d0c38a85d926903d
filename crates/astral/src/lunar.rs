//! Moon placement and lunar day for a single instant.
//!
//! The lunar day counts whole days since the previous new moon, starting at 1.
//! The new moon is located by stepping backwards one day at a time on the
//! signed Moon-Sun elongation until it changes sign through zero, then
//! bisecting that bracket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ephemeris::{Body, EphemerisEngine, EphemerisProvider};
use crate::error::{AstralError, Result};
use crate::time::JulianDay;
use crate::zodiac::ZodiacSign;

/// A synodic month is about 29.53 days; this leaves room for slack.
const MAX_SEARCH_DAYS: u32 = 35;
const STEP_DAYS: f64 = 1.0;
const MAX_BISECTIONS: u32 = 60;
/// Roughly a tenth of a second.
const CONVERGENCE_DAYS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarSnapshot {
    pub julian_day: JulianDay,
    pub moon_longitude: f64,
    pub moon_sign: ZodiacSign,
    pub moon_house: u8,
    pub opposite_sign: ZodiacSign,
    pub opposite_house: u8,
    pub previous_new_moon: JulianDay,
    pub lunar_day: u32,
}

impl LunarSnapshot {
    pub fn at(provider: &dyn EphemerisProvider, jd: JulianDay) -> Result<Self> {
        let moon_longitude = EphemerisEngine::new(provider, jd, None).body_longitude(Body::Moon)?;
        let moon_sign = ZodiacSign::from_longitude(moon_longitude);
        let opposite_sign = moon_sign.opposite();
        let previous_new_moon = previous_new_moon(provider, jd)?;
        let lunar_day = jd.days_since(previous_new_moon).floor() as u32 + 1;

        Ok(Self {
            julian_day: jd,
            moon_longitude,
            moon_sign,
            moon_house: moon_sign.natural_house(),
            opposite_sign,
            opposite_house: opposite_sign.natural_house(),
            previous_new_moon,
            lunar_day,
        })
    }

    pub fn at_utc(provider: &dyn EphemerisProvider, instant: DateTime<Utc>) -> Result<Self> {
        Self::at(provider, JulianDay::from_utc(instant))
    }
}

/// Wrap an angle into (-180, 180].
fn signed_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Moon minus Sun, signed; zero at new moon.
fn elongation(provider: &dyn EphemerisProvider, jd: JulianDay) -> Result<f64> {
    let moon = provider.body_position(Body::Moon, jd)?.longitude;
    let sun = provider.body_position(Body::Sun, jd)?.longitude;
    Ok(signed_degrees(moon - sun))
}

/// A sign change between small values, not the wrap at full moon.
fn crosses_zero(earlier: f64, later: f64) -> bool {
    earlier <= 0.0 && later >= 0.0 && (later - earlier).abs() < 180.0
}

/// Latest new moon at or before `jd`.
pub fn previous_new_moon(provider: &dyn EphemerisProvider, jd: JulianDay) -> Result<JulianDay> {
    let mut later = jd;
    let mut f_later = elongation(provider, later)?;
    if f_later == 0.0 {
        return Ok(jd);
    }

    for _ in 0..MAX_SEARCH_DAYS {
        let earlier = later.add_days(-STEP_DAYS);
        let f_earlier = elongation(provider, earlier)?;
        if crosses_zero(f_earlier, f_later) {
            return bisect(provider, earlier, later);
        }
        later = earlier;
        f_later = f_earlier;
    }

    Err(AstralError::EphemerisComputation {
        target: "new moon".to_string(),
        julian_day: jd.value(),
        message: format!("no new moon within {} days", MAX_SEARCH_DAYS),
    })
}

/// Narrow a bracket with the elongation at or below zero at `lo` and at or
/// above zero at `hi`.
fn bisect(provider: &dyn EphemerisProvider, mut lo: JulianDay, mut hi: JulianDay) -> Result<JulianDay> {
    for _ in 0..MAX_BISECTIONS {
        if hi.days_since(lo) < CONVERGENCE_DAYS {
            break;
        }
        let mid = JulianDay::new(0.5 * (lo.value() + hi.value()));
        if elongation(provider, mid)? >= 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(JulianDay::new(0.5 * (lo.value() + hi.value())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{BodyPosition, GeoCoordinate, HouseCusps, HouseSystem};

    const SYNODIC: f64 = 29.530588;

    /// Sun parked at 0°, Moon circling it once per synodic month.
    struct Circling {
        new_moon: f64,
    }

    impl EphemerisProvider for Circling {
        fn body_position(&self, body: Body, jd: JulianDay) -> Result<BodyPosition> {
            let longitude = match body {
                Body::Moon => {
                    crate::zodiac::normalize_degrees((jd.value() - self.new_moon) * 360.0 / SYNODIC)
                }
                _ => 0.0,
            };
            Ok(BodyPosition {
                body,
                longitude,
                latitude: 0.0,
                speed: 0.0,
                retrograde: false,
            })
        }

        fn house_cusps(&self, _: JulianDay, _: GeoCoordinate, _: HouseSystem) -> Result<HouseCusps> {
            Err(AstralError::MissingCoordinates)
        }
    }

    struct Stuck;

    impl EphemerisProvider for Stuck {
        fn body_position(&self, body: Body, _jd: JulianDay) -> Result<BodyPosition> {
            let longitude = if body == Body::Moon { 90.0 } else { 0.0 };
            Ok(BodyPosition {
                body,
                longitude,
                latitude: 0.0,
                speed: 0.0,
                retrograde: false,
            })
        }

        fn house_cusps(&self, _: JulianDay, _: GeoCoordinate, _: HouseSystem) -> Result<HouseCusps> {
            Err(AstralError::MissingCoordinates)
        }
    }

    #[test]
    fn signed_degrees_wraps() {
        assert_eq!(signed_degrees(190.0), -170.0);
        assert_eq!(signed_degrees(-10.0), -10.0);
        assert_eq!(signed_degrees(180.0), 180.0);
    }

    #[test]
    fn finds_previous_new_moon() {
        let provider = Circling { new_moon: 2_460_000.3 };
        let jd = JulianDay::new(2_460_005.8);
        let found = previous_new_moon(&provider, jd).unwrap();
        assert!((found.value() - 2_460_000.3).abs() < 1e-4);

        let snapshot = LunarSnapshot::at(&provider, jd).unwrap();
        assert_eq!(snapshot.lunar_day, 6);
    }

    #[test]
    fn skips_full_moon_wrap() {
        // 20.5 days after new moon the backward walk passes full moon first.
        let provider = Circling { new_moon: 2_460_000.3 };
        let snapshot = LunarSnapshot::at(&provider, JulianDay::new(2_460_020.8)).unwrap();
        assert_eq!(snapshot.lunar_day, 21);
    }

    #[test]
    fn moon_sign_and_opposite() {
        // Five days in, the Moon is near 61°, in Gemini.
        let provider = Circling { new_moon: 2_460_000.0 };
        let snapshot = LunarSnapshot::at(&provider, JulianDay::new(2_460_005.0)).unwrap();
        assert_eq!(snapshot.moon_sign, ZodiacSign::Gemini);
        assert_eq!(snapshot.moon_house, 3);
        assert_eq!(snapshot.opposite_sign, ZodiacSign::Sagittarius);
        assert_eq!(snapshot.opposite_house, 9);
    }

    #[test]
    fn gives_up_without_new_moon() {
        let err = LunarSnapshot::at(&Stuck, JulianDay::J2000).unwrap_err();
        assert!(matches!(err, AstralError::EphemerisComputation { ref target, .. } if target == "new moon"));
    }
}
