use lazy_static::lazy_static;
use std::path::PathBuf;
use std::sync::Mutex;
use swisseph::swe::{calc_ut, houses_ex, set_ephe_path};
use swisseph::{AscMc, Cusp};

use crate::ephemeris::types::{Body, BodyPosition, GeoCoordinate, HouseCusps, HouseSystem};
use crate::ephemeris::EphemerisProvider;
use crate::error::{AstralError, Result};
use crate::time::JulianDay;
use crate::zodiac::normalize_degrees;

// Swiss Ephemeris calculation flags
const FLG_SWIEPH: i32 = 2;
const FLG_MOSEPH: i32 = 4;
const FLG_SPEED: i32 = 256;

lazy_static! {
    // The C library keeps global state between calls.
    static ref SWE_LOCK: Mutex<()> = Mutex::new(());
}

/// Swiss Ephemeris adapter implementation
#[derive(Debug, Clone)]
pub struct SwissEphemeris {
    ephemeris_path: Option<PathBuf>,
    flags: i32,
}

impl SwissEphemeris {
    /// Use the data files under `ephemeris_path`, or the built-in Moshier
    /// ephemeris when no path is given.
    ///
    /// The data path is process-wide in the C library, so the last adapter
    /// built with a path decides where every instance reads its files from.
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self> {
        let flags = match &ephemeris_path {
            Some(path) => {
                let dir = path.to_string_lossy();
                if dir.contains('\0') || !path.exists() {
                    return Err(AstralError::EphemerisPathNotFound {
                        path: path.display().to_string(),
                    });
                }
                let _guard = SWE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                set_ephe_path(&dir);
                FLG_SWIEPH | FLG_SPEED
            }
            None => FLG_MOSEPH | FLG_SPEED,
        };
        log::debug!(
            "Swiss Ephemeris ready ({})",
            ephemeris_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "moshier".to_string())
        );

        Ok(Self {
            ephemeris_path,
            flags,
        })
    }

    pub fn moshier() -> Self {
        Self {
            ephemeris_path: None,
            flags: FLG_MOSEPH | FLG_SPEED,
        }
    }

    pub fn ephemeris_path(&self) -> Option<&PathBuf> {
        self.ephemeris_path.as_ref()
    }
}

impl EphemerisProvider for SwissEphemeris {
    fn body_position(&self, body: Body, jd: JulianDay) -> Result<BodyPosition> {
        let result = {
            let _guard = SWE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            calc_ut(jd.value(), body.swe_id() as u32, self.flags as u32)
        }
        .map_err(|e| AstralError::body_failed(body, jd.value(), format!("Swiss Ephemeris error: {}", e)))?;

        let out = result.out;
        if !out[0].is_finite() {
            return Err(AstralError::body_failed(body, jd.value(), "non-finite longitude"));
        }
        let speed = out[3];

        Ok(BodyPosition {
            body,
            longitude: normalize_degrees(out[0]),
            latitude: out[1],
            speed,
            retrograde: speed < 0.0,
        })
    }

    fn house_cusps(
        &self,
        jd: JulianDay,
        location: GeoCoordinate,
        system: HouseSystem,
    ) -> Result<HouseCusps> {
        let (c, a) = {
            let _guard = SWE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            houses_ex(
                jd.value(),
                self.flags & !FLG_SPEED,
                location.latitude,
                location.longitude,
                system.code() as i32,
            )
        };

        let cusps = Cusp::from_array(c);
        let ascmc = AscMc::from_array(a);
        let raw = [
            cusps.first, cusps.second, cusps.third, cusps.fourth,
            cusps.fifth, cusps.sixth, cusps.seventh, cusps.eighth,
            cusps.ninth, cusps.tenth, cusps.eleventh, cusps.twelfth,
        ];
        if raw.iter().any(|v| !v.is_finite()) || !ascmc.ascendant.is_finite() {
            return Err(AstralError::EphemerisComputation {
                target: format!("{} houses", system.name()),
                julian_day: jd.value(),
                message: "house calculation produced non-finite cusps".to_string(),
            });
        }

        Ok(HouseCusps {
            system,
            cusps: raw.map(normalize_degrees),
            ascendant: normalize_degrees(ascmc.ascendant),
            midheaven: normalize_degrees(ascmc.mc),
        })
    }
}
