use astral_config::{AmbiguousTime, TimeSection};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AstralError, Result};
use crate::time::JulianDay;

/// Civil birth date and time, interpreted in the converter's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BirthMoment(NaiveDateTime);

impl BirthMoment {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<Self> {
        let datetime = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| AstralError::InvalidTime {
                datetime: format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}"),
                zone: "-".to_string(),
                message: "not a valid Gregorian date and time".to_string(),
            })?;
        Ok(Self(datetime))
    }

    /// Seconds are dropped; civil input carries minute precision.
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        use chrono::Timelike;
        Self(datetime.with_second(0).and_then(|d| d.with_nanosecond(0)).unwrap_or(datetime))
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }
}

/// Resolution rule for civil times repeated by a DST fold.
/// Civil times skipped by a DST gap are always rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    #[default]
    Reject,
    Earliest,
    Latest,
}

impl From<AmbiguousTime> for AmbiguityPolicy {
    fn from(value: AmbiguousTime) -> Self {
        match value {
            AmbiguousTime::Reject => Self::Reject,
            AmbiguousTime::Earliest => Self::Earliest,
            AmbiguousTime::Latest => Self::Latest,
        }
    }
}

/// Localizes civil times in one fixed zone and converts them to UTC and Julian Day.
#[derive(Debug, Clone, Copy)]
pub struct TimeConverter {
    zone: Tz,
    policy: AmbiguityPolicy,
}

impl TimeConverter {
    pub fn new(zone: Tz, policy: AmbiguityPolicy) -> Self {
        Self { zone, policy }
    }

    pub fn from_config(section: &TimeSection) -> Result<Self> {
        let zone: Tz = section
            .zone
            .parse()
            .map_err(|_| AstralError::InvalidTimeZone {
                zone: section.zone.clone(),
            })?;
        Ok(Self::new(zone, section.ambiguous.into()))
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn localize(&self, local: NaiveDateTime) -> Result<DateTime<Tz>> {
        match self.zone.from_local_datetime(&local) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earliest, latest) => match self.policy {
                AmbiguityPolicy::Earliest => Ok(earliest),
                AmbiguityPolicy::Latest => Ok(latest),
                AmbiguityPolicy::Reject => Err(AstralError::invalid_time(
                    local,
                    self.zone.name(),
                    format!(
                        "ambiguous, occurs at both {} and {}",
                        earliest.with_timezone(&Utc).format("%H:%M UTC"),
                        latest.with_timezone(&Utc).format("%H:%M UTC")
                    ),
                )),
            },
            LocalResult::None => Err(AstralError::invalid_time(
                local,
                self.zone.name(),
                "skipped by a daylight-saving transition",
            )),
        }
    }

    pub fn to_utc(&self, moment: &BirthMoment) -> Result<DateTime<Utc>> {
        Ok(self.localize(moment.naive())?.with_timezone(&Utc))
    }

    pub fn to_julian_day(&self, moment: &BirthMoment) -> Result<JulianDay> {
        Ok(JulianDay::from_utc(self.to_utc(moment)?))
    }

    /// 12:00 civil time on `date`, the representative instant of a transit day.
    pub fn local_noon(&self, date: NaiveDate) -> Result<JulianDay> {
        let noon = date.and_hms_opt(12, 0, 0).ok_or_else(|| {
            AstralError::invalid_time(date.and_time(chrono::NaiveTime::MIN), self.zone.name(), "no noon")
        })?;
        let local = self.localize(noon)?;
        Ok(JulianDay::from_utc(local.with_timezone(&Utc)))
    }

    pub fn to_local(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.with_timezone(&self.zone).naive_local()
    }
}

impl Default for TimeConverter {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Moscow, AmbiguityPolicy::Reject)
    }
}
