use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::transit::ScanWindow;

/// Span a horoscope is written for, always anchored on an explicit `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoroscopePeriod {
    Today,
    Week,
    Month,
    Year,
}

impl HoroscopePeriod {
    pub const ALL: [HoroscopePeriod; 4] = [
        HoroscopePeriod::Today,
        HoroscopePeriod::Week,
        HoroscopePeriod::Month,
        HoroscopePeriod::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HoroscopePeriod::Today => "today",
            HoroscopePeriod::Week => "week",
            HoroscopePeriod::Month => "month",
            HoroscopePeriod::Year => "year",
        }
    }

    /// First day of the period containing `today`; weeks start on Monday.
    pub fn start_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            HoroscopePeriod::Today => today,
            HoroscopePeriod::Week => {
                let back = u64::from(today.weekday().num_days_from_monday());
                today.checked_sub_days(Days::new(back)).unwrap_or(today)
            }
            HoroscopePeriod::Month => today.with_day(1).unwrap_or(today),
            HoroscopePeriod::Year => today.with_ordinal(1).unwrap_or(today),
        }
    }

    /// Last day of the period containing `today`.
    pub fn end_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            HoroscopePeriod::Today => today,
            HoroscopePeriod::Week => {
                let start = self.start_date(today);
                start.checked_add_days(Days::new(6)).unwrap_or(start)
            }
            HoroscopePeriod::Month => ScanWindow::current_month(today).last_day().unwrap_or(today),
            HoroscopePeriod::Year => ScanWindow::current_year(today).last_day().unwrap_or(today),
        }
    }

    /// The transit window matching this period, where one exists.
    pub fn transit_window(self, today: NaiveDate) -> Option<ScanWindow> {
        match self {
            HoroscopePeriod::Month => Some(ScanWindow::current_month(today)),
            HoroscopePeriod::Year => Some(ScanWindow::current_year(today)),
            HoroscopePeriod::Today | HoroscopePeriod::Week => None,
        }
    }
}

impl fmt::Display for HoroscopePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HoroscopePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown period '{}', expected today|week|month|year", s))
    }
}
