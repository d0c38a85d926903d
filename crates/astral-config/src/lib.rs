use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ZONE: &str = "Europe/Moscow";
pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_CLIENT_ID: &str = "astral";

/// How a civil time that falls inside a DST fold is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguousTime {
    #[default]
    Reject,
    Earliest,
    Latest,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimeSection {
    pub zone: String,
    pub ambiguous: AmbiguousTime,
}

impl Default for TimeSection {
    fn default() -> Self {
        Self {
            zone: DEFAULT_ZONE.to_string(),
            ambiguous: AmbiguousTime::Reject,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocodingSection {
    pub endpoint: String,
    pub client_id: String,
    pub max_attempts: u32,
    pub timeout_secs: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for GeocodingSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODING_ENDPOINT.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            max_attempts: 5,
            timeout_secs: 10,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl GeocodingSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EphemerisSection {
    /// Swiss Ephemeris data directory. The analytic Moshier ephemeris is used when unset.
    pub path: Option<PathBuf>,
    pub house_system: String,
}

impl Default for EphemerisSection {
    fn default() -> Self {
        Self {
            path: None,
            house_system: "placidus".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AspectSection {
    pub natal_orb: f64,
    pub transit_orb: f64,
}

impl Default for AspectSection {
    fn default() -> Self {
        Self {
            natal_orb: 8.0,
            transit_orb: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransitSection {
    pub failure_threshold: f64,
}

impl Default for TransitSection {
    fn default() -> Self {
        Self {
            failure_threshold: 0.25,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AstralConfig {
    pub time: TimeSection,
    pub geocoding: GeocodingSection,
    pub ephemeris: EphemerisSection,
    pub aspects: AspectSection,
    pub transits: TransitSection,
}

impl AstralConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: AstralConfig = toml::from_str(text)
            .map_err(|e| anyhow::anyhow!("Failed to parse astral.toml: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.time.zone.trim().is_empty() {
            anyhow::bail!("time.zone must name an IANA time zone");
        }
        if self.geocoding.max_attempts == 0 {
            anyhow::bail!("geocoding.max_attempts must be at least 1");
        }
        if self.geocoding.timeout_secs == 0 {
            anyhow::bail!("geocoding.timeout_secs must be at least 1");
        }
        if self.geocoding.max_backoff_ms < self.geocoding.initial_backoff_ms {
            anyhow::bail!(
                "geocoding.max_backoff_ms ({}) is smaller than geocoding.initial_backoff_ms ({})",
                self.geocoding.max_backoff_ms,
                self.geocoding.initial_backoff_ms
            );
        }
        for (name, orb) in [
            ("aspects.natal_orb", self.aspects.natal_orb),
            ("aspects.transit_orb", self.aspects.transit_orb),
        ] {
            if !orb.is_finite() || orb < 0.0 {
                anyhow::bail!("{name} must be a non-negative number of degrees, got {orb}");
            }
        }
        if !(0.0..=1.0).contains(&self.transits.failure_threshold) {
            anyhow::bail!(
                "transits.failure_threshold must be within [0, 1], got {}",
                self.transits.failure_threshold
            );
        }
        if let Some(path) = &self.ephemeris.path {
            if !path.exists() {
                anyhow::bail!("ephemeris.path does not exist: {}", path.display());
            }
        }
        Ok(())
    }
}

/// Try common relative paths for `configs/astral.toml`.
pub fn read_config_toml_text() -> Option<String> {
    let paths = ["configs/astral.toml", "../../configs/astral.toml"];
    paths.iter().find_map(|p| fs::read_to_string(p).ok())
}

/// Load from an explicit path, falling back to the default locations and then to defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AstralConfig> {
    if let Some(path) = path {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", path.display()))?;
        return AstralConfig::from_toml_str(&text);
    }
    match read_config_toml_text() {
        Some(text) => AstralConfig::from_toml_str(&text),
        None => Ok(AstralConfig::default()),
    }
}
