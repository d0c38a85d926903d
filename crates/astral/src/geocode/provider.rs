use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::ephemeris::GeoCoordinate;

/// Outcome of a single failed lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The service answered but knows no such place. Never retried.
    #[error("place not found")]
    NotFound,
    /// Anything else: transport errors, throttling, bad payloads.
    #[error("transient geocoding failure: {0}")]
    Transient(String),
}

/// A remote place-name lookup service.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Resolve `place` once, identifying the caller as `client_id`.
    async fn lookup(&self, place: &str, client_id: &str) -> Result<GeoCoordinate, LookupError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Geocoding over the Nominatim search API.
pub struct NominatimProvider {
    client: Client,
    endpoint: String,
}

impl NominatimProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parse_place(place: &NominatimPlace) -> Result<GeoCoordinate, LookupError> {
        let lat: f64 = place
            .lat
            .trim()
            .parse()
            .map_err(|_| LookupError::Transient(format!("bad latitude {:?}", place.lat)))?;
        let lon: f64 = place
            .lon
            .trim()
            .parse()
            .map_err(|_| LookupError::Transient(format!("bad longitude {:?}", place.lon)))?;
        GeoCoordinate::new(lat, lon)
            .ok_or_else(|| LookupError::Transient(format!("coordinates out of range: {lat}, {lon}")))
    }
}

#[async_trait]
impl GeocodingProvider for NominatimProvider {
    async fn lookup(&self, place: &str, client_id: &str) -> Result<GeoCoordinate, LookupError> {
        let url = format!("{}/search", self.endpoint);
        log::debug!("Nominatim request for {:?} as {}", place, client_id);

        let response = self
            .client
            .get(&url)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, client_id)
            .send()
            .await
            .map_err(|e| LookupError::Transient(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::Transient("rate limited".to_string()));
        }
        if !status.is_success() {
            return Err(LookupError::Transient(format!("HTTP {}", status)));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| LookupError::Transient(format!("unreadable response: {e}")))?;

        match places.first() {
            Some(first) => Self::parse_place(first),
            None => Err(LookupError::NotFound),
        }
    }
}
