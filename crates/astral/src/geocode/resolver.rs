use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use astral_config::GeocodingSection;

use crate::ephemeris::GeoCoordinate;
use crate::error::{AstralError, Result};
use crate::geocode::provider::{GeocodingProvider, LookupError};

const RANDOM_CLIENT_ID_LEN: usize = 8;

/// Bounds on how hard the resolver tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&GeocodingSection::default())
    }
}

impl From<&GeocodingSection> for RetryPolicy {
    fn from(section: &GeocodingSection) -> Self {
        Self {
            max_attempts: section.max_attempts,
            timeout: section.timeout(),
            initial_backoff: section.initial_backoff(),
            max_backoff: section.max_backoff(),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, where `attempt` counts from 1.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Resolves place names to coordinates with bounded retries and a cache.
pub struct GeocodeResolver<G: GeocodingProvider> {
    provider: G,
    client_id: String,
    policy: RetryPolicy,
    cache: Mutex<HashMap<String, GeoCoordinate>>,
}

impl<G: GeocodingProvider> GeocodeResolver<G> {
    pub fn new(provider: G, client_id: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            client_id: client_id.into(),
            policy,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn provider(&self) -> &G {
        &self.provider
    }

    fn cached(&self, key: &str) -> Option<GeoCoordinate> {
        self.cache.lock().ok().and_then(|cache| cache.get(key).copied())
    }

    fn remember(&self, key: String, coord: GeoCoordinate) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, coord);
        }
    }

    fn random_client_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_CLIENT_ID_LEN)
            .map(char::from)
            .collect()
    }

    /// Resolve `place`, retrying transient failures up to the policy's limit.
    ///
    /// The first attempt identifies as the configured client id; every retry
    /// uses a fresh random one. A definitive "no such place" answer is
    /// returned at once as [`AstralError::PlaceNotFound`].
    pub async fn resolve(&self, place: &str) -> Result<GeoCoordinate> {
        let key = place.trim();
        if let Some(coord) = self.cached(key) {
            log::debug!("Geocode cache hit for {:?}", key);
            return Ok(coord);
        }

        let mut last_error = String::from("no attempt made");
        for attempt in 1..=self.policy.max_attempts {
            let client_id = if attempt == 1 {
                self.client_id.clone()
            } else {
                Self::random_client_id()
            };

            let outcome = tokio::time::timeout(
                self.policy.timeout,
                self.provider.lookup(key, &client_id),
            )
            .await
            .unwrap_or_else(|_| {
                Err(LookupError::Transient(format!(
                    "timed out after {:?}",
                    self.policy.timeout
                )))
            });

            match outcome {
                Ok(coord) => {
                    log::info!(
                        "Resolved {:?} to ({:.4}, {:.4}) on attempt {}",
                        key,
                        coord.latitude,
                        coord.longitude,
                        attempt
                    );
                    self.remember(key.to_string(), coord);
                    return Ok(coord);
                }
                Err(LookupError::NotFound) => {
                    return Err(AstralError::PlaceNotFound {
                        place: key.to_string(),
                    });
                }
                Err(LookupError::Transient(message)) => {
                    log::warn!(
                        "Geocoding attempt {}/{} for {:?} failed: {}",
                        attempt,
                        self.policy.max_attempts,
                        key,
                        message
                    );
                    last_error = message;
                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.backoff_after(attempt)).await;
                    }
                }
            }
        }

        Err(AstralError::GeocodingUnavailable {
            place: key.to_string(),
            attempts: self.policy.max_attempts,
            message: last_error,
        })
    }
}
