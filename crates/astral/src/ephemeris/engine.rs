use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ephemeris::types::{Body, BodyPosition, GeoCoordinate, HouseCusps, HouseSystem};
use crate::ephemeris::EphemerisProvider;
use crate::error::{AstralError, Result};
use crate::time::JulianDay;
use crate::zodiac::ZodiacSign;

/// A body's sign together with a short human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignPlacement {
    pub sign: ZodiacSign,
    pub label: String,
}

/// Positions for one instant and, optionally, one place.
pub struct EphemerisEngine<'a> {
    provider: &'a dyn EphemerisProvider,
    jd: JulianDay,
    location: Option<GeoCoordinate>,
    house_system: HouseSystem,
}

impl<'a> EphemerisEngine<'a> {
    pub fn new(
        provider: &'a dyn EphemerisProvider,
        jd: JulianDay,
        location: Option<GeoCoordinate>,
    ) -> Self {
        Self {
            provider,
            jd,
            location,
            house_system: HouseSystem::default(),
        }
    }

    pub fn with_house_system(mut self, house_system: HouseSystem) -> Self {
        self.house_system = house_system;
        self
    }

    pub fn julian_day(&self) -> JulianDay {
        self.jd
    }

    pub fn location(&self) -> Option<GeoCoordinate> {
        self.location
    }

    pub fn body_position(&self, body: Body) -> Result<BodyPosition> {
        self.provider.body_position(body, self.jd)
    }

    pub fn body_longitude(&self, body: Body) -> Result<f64> {
        Ok(self.body_position(body)?.longitude)
    }

    pub fn all_body_positions(&self) -> Result<BTreeMap<Body, BodyPosition>> {
        Body::ALL
            .iter()
            .map(|&body| Ok((body, self.body_position(body)?)))
            .collect()
    }

    /// Longitudes of all ten bodies, the snapshot used for natal and transit work.
    pub fn all_body_longitudes(&self) -> Result<BTreeMap<Body, f64>> {
        Ok(self
            .all_body_positions()?
            .into_iter()
            .map(|(body, pos)| (body, pos.longitude))
            .collect())
    }

    pub fn houses(&self) -> Result<HouseCusps> {
        let location = self.location.ok_or(AstralError::MissingCoordinates)?;
        self.provider.house_cusps(self.jd, location, self.house_system)
    }

    pub fn house_cusps(&self) -> Result<[f64; 12]> {
        Ok(self.houses()?.cusps)
    }

    pub fn zodiac_sign_of(longitude: f64) -> ZodiacSign {
        ZodiacSign::from_longitude(longitude)
    }

    pub fn find_zodiac_signs(&self) -> Result<BTreeMap<Body, SignPlacement>> {
        Ok(Self::zodiac_signs_of(&self.all_body_longitudes()?))
    }

    /// Sign placements for longitudes already computed.
    pub fn zodiac_signs_of(longitudes: &BTreeMap<Body, f64>) -> BTreeMap<Body, SignPlacement> {
        longitudes
            .iter()
            .map(|(&body, &lon)| {
                let sign = Self::zodiac_sign_of(lon);
                let label = format!("{} in {}", body, sign);
                (body, SignPlacement { sign, label })
            })
            .collect()
    }
}
