use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use astral_config::AstralConfig;

use crate::aspects::{classify, AspectCalculator, AspectKind, AspectPair};
use crate::ephemeris::{
    Body, EphemerisEngine, EphemerisProvider, GeoCoordinate, HouseCusps, HouseSystem,
    SignPlacement, SwissEphemeris,
};
use crate::error::Result;
use crate::geocode::{GeocodeResolver, GeocodingProvider, NominatimProvider, RetryPolicy};
use crate::lunar::LunarSnapshot;
use crate::time::{BirthMoment, JulianDay, TimeConverter};
use crate::transit::{ScanWindow, TransitPlan, TransitReport, TransitScanner, DEFAULT_FAILURE_THRESHOLD};

pub const DEFAULT_NATAL_ORB: f64 = 8.0;
pub const DEFAULT_TRANSIT_ORB: f64 = 0.3;

/// Natal snapshot for one birth moment and place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalPositions {
    pub julian_day: JulianDay,
    pub coordinate: GeoCoordinate,
    pub longitudes: BTreeMap<Body, f64>,
    pub house_cusps: HouseCusps,
    /// House (1..=12) each body falls in
    pub body_houses: BTreeMap<Body, u8>,
    pub zodiac_signs: BTreeMap<Body, SignPlacement>,
}

/// Natal positions plus the aspects of each personal body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalReport {
    pub positions: NatalPositions,
    pub orb: f64,
    pub aspects: BTreeMap<Body, Vec<AspectPair>>,
}

/// Entry point tying time conversion, geocoding and the ephemeris together.
pub struct AstralService<G: GeocodingProvider> {
    converter: TimeConverter,
    resolver: GeocodeResolver<G>,
    ephemeris: Arc<dyn EphemerisProvider>,
    house_system: HouseSystem,
    natal_orb: f64,
    transit_orb: f64,
    failure_threshold: f64,
}

impl AstralService<NominatimProvider> {
    /// Production wiring: Nominatim geocoding over the Swiss Ephemeris.
    pub fn from_config(config: &AstralConfig) -> Result<Self> {
        let converter = TimeConverter::from_config(&config.time)?;
        let house_system: HouseSystem = config.ephemeris.house_system.parse()?;
        let ephemeris = SwissEphemeris::new(config.ephemeris.path.clone())?;
        let resolver = GeocodeResolver::new(
            NominatimProvider::new(config.geocoding.endpoint.clone()),
            config.geocoding.client_id.clone(),
            RetryPolicy::from(&config.geocoding),
        );

        Ok(Self::new(converter, resolver, Arc::new(ephemeris))
            .with_house_system(house_system)
            .with_orbs(config.aspects.natal_orb, config.aspects.transit_orb)
            .with_failure_threshold(config.transits.failure_threshold))
    }
}

impl<G: GeocodingProvider> AstralService<G> {
    pub fn new(
        converter: TimeConverter,
        resolver: GeocodeResolver<G>,
        ephemeris: Arc<dyn EphemerisProvider>,
    ) -> Self {
        Self {
            converter,
            resolver,
            ephemeris,
            house_system: HouseSystem::default(),
            natal_orb: DEFAULT_NATAL_ORB,
            transit_orb: DEFAULT_TRANSIT_ORB,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }

    pub fn with_house_system(mut self, house_system: HouseSystem) -> Self {
        self.house_system = house_system;
        self
    }

    pub fn with_orbs(mut self, natal_orb: f64, transit_orb: f64) -> Self {
        self.natal_orb = natal_orb;
        self.transit_orb = transit_orb;
        self
    }

    pub fn with_failure_threshold(mut self, threshold: f64) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn converter(&self) -> &TimeConverter {
        &self.converter
    }

    pub fn ephemeris(&self) -> &dyn EphemerisProvider {
        self.ephemeris.as_ref()
    }

    pub async fn resolve_place(&self, place: &str) -> Result<GeoCoordinate> {
        self.resolver.resolve(place).await
    }

    /// Longitudes, houses and signs of all ten bodies at birth.
    pub async fn compute_natal_positions(
        &self,
        moment: &BirthMoment,
        place: &str,
    ) -> Result<NatalPositions> {
        let julian_day = self.converter.to_julian_day(moment)?;
        let coordinate = self.resolver.resolve(place).await?;
        log::debug!("Natal chart for {} at JD {}", place.trim(), julian_day);

        let engine = EphemerisEngine::new(self.ephemeris.as_ref(), julian_day, Some(coordinate))
            .with_house_system(self.house_system);
        let longitudes = engine.all_body_longitudes()?;
        let house_cusps = engine.houses()?;
        let body_houses = longitudes
            .iter()
            .map(|(&body, &lon)| (body, house_cusps.house_of(lon)))
            .collect();
        let zodiac_signs = EphemerisEngine::zodiac_signs_of(&longitudes);

        Ok(NatalPositions {
            julian_day,
            coordinate,
            longitudes,
            house_cusps,
            body_houses,
            zodiac_signs,
        })
    }

    pub fn classify_aspect(&self, lon1: f64, lon2: f64, orb: f64) -> Option<AspectKind> {
        classify(lon1, lon2, orb)
    }

    /// Natal positions with the aspects of each personal body at the natal orb.
    pub async fn natal_report(&self, moment: &BirthMoment, place: &str) -> Result<NatalReport> {
        let positions = self.compute_natal_positions(moment, place).await?;
        let aspects =
            AspectCalculator::new().natal_aspects(&positions.longitudes, &Body::PERSONAL, self.natal_orb);
        Ok(NatalReport {
            positions,
            orb: self.natal_orb,
            aspects,
        })
    }

    /// Scan `window` with the default plan for that window.
    ///
    /// Only a geocoding failure aborts the scan; days the ephemeris cannot
    /// compute are skipped and counted in the report.
    pub async fn scan_transits(
        &self,
        natal: &BTreeMap<Body, f64>,
        place: &str,
        window: ScanWindow,
    ) -> Result<TransitReport> {
        self.scan_transits_with_plan(natal, place, window, TransitPlan::for_window(&window))
            .await
    }

    pub async fn scan_transits_with_plan(
        &self,
        natal: &BTreeMap<Body, f64>,
        place: &str,
        window: ScanWindow,
        plan: TransitPlan,
    ) -> Result<TransitReport> {
        let coordinate = self.resolver.resolve(place).await?;
        log::info!(
            "Scanning transits for {} over {} from ({:.4}, {:.4})",
            place.trim(),
            window,
            coordinate.latitude,
            coordinate.longitude
        );

        let scanner = TransitScanner::new(
            self.ephemeris.as_ref(),
            &self.converter,
            natal.clone(),
            window,
            plan,
            self.transit_orb,
        )?
        .with_failure_threshold(self.failure_threshold);
        Ok(scanner.collect_report())
    }

    pub fn lunar_snapshot(&self, instant: DateTime<Utc>) -> Result<LunarSnapshot> {
        LunarSnapshot::at_utc(self.ephemeris.as_ref(), instant)
    }
}
