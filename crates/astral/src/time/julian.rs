use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use swisseph::swe::{julday, revjul};

// GREG_CAL
const GREGORIAN: i32 = 1;

/// Continuous day count used for ephemeris queries (UT based).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDay(f64);

impl JulianDay {
    /// JD of 2000-01-01 12:00 UTC.
    pub const J2000: JulianDay = JulianDay(2_451_545.0);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Gregorian calendar date with a fractional hour.
    pub fn from_calendar(year: i32, month: u32, day: u32, hour: f64) -> Self {
        Self(julday(year, month as i32, day as i32, hour, GREGORIAN as u32))
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        let hour = dt.hour() as f64 + dt.minute() as f64 / 60.0 + dt.second() as f64 / 3600.0;
        Self::from_calendar(dt.year(), dt.month(), dt.day(), hour)
    }

    /// Inverse of [`JulianDay::from_calendar`], rounded to the millisecond.
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        if !self.0.is_finite() {
            return None;
        }
        let (year, month, day, hour) = revjul(self.0, GREGORIAN);
        let midnight = NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)?
            .and_hms_opt(0, 0, 0)?;
        let millis = (hour * 3_600_000.0).round() as i64;
        Some((midnight + Duration::milliseconds(millis)).and_utc())
    }

    pub fn add_days(self, days: f64) -> Self {
        Self(self.0 + days)
    }

    pub fn days_since(self, earlier: JulianDay) -> f64 {
        self.0 - earlier.0
    }
}

impl fmt::Display for JulianDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl From<JulianDay> for f64 {
    fn from(jd: JulianDay) -> Self {
        jd.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn j2000_epoch() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(JulianDay::from_utc(dt), JulianDay::J2000);
    }

    #[test]
    fn january_uses_previous_year_branch() {
        // 1988-01-29 14:45 UTC
        let jd = JulianDay::from_calendar(1988, 1, 29, 14.75);
        assert!((jd.value() - 2_447_190.114_583_333_5).abs() < 1e-6);
    }

    #[test]
    fn late_evening_rounds_into_the_same_day() {
        let dt = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(JulianDay::from_utc(dt).to_utc().unwrap(), dt);
    }

    #[test]
    fn round_trips_through_utc() {
        let dt = Utc.with_ymd_and_hms(1988, 6, 15, 13, 45, 0).unwrap();
        let back = JulianDay::from_utc(dt).to_utc().unwrap();
        assert_eq!(back, dt);
    }

    #[test]
    fn non_finite_has_no_utc() {
        assert!(JulianDay::new(f64::NAN).to_utc().is_none());
    }
}
