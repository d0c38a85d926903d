use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::aspects::AspectKind;
use crate::ephemeris::Body;

/// The calendar range a transit scan walks, one day at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScanWindow {
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl ScanWindow {
    pub fn current_month(today: NaiveDate) -> Self {
        ScanWindow::Month {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn current_year(today: NaiveDate) -> Self {
        ScanWindow::Year { year: today.year() }
    }

    /// `None` when the window does not name a real calendar month or year.
    pub fn first_day(&self) -> Option<NaiveDate> {
        match *self {
            ScanWindow::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            ScanWindow::Year { year } => NaiveDate::from_ymd_opt(year, 1, 1),
        }
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        match *self {
            ScanWindow::Month { year, month } => {
                let first = self.first_day()?;
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)
                } else {
                    first.with_month(month + 1)
                };
                next?.pred_opt()
            }
            ScanWindow::Year { year } => NaiveDate::from_ymd_opt(year, 12, 31),
        }
    }

    /// Every day of the window in calendar order; empty for an invalid window.
    pub fn days(&self) -> Vec<NaiveDate> {
        match (self.first_day(), self.last_day()) {
            (Some(first), Some(last)) => first.iter_days().take_while(|d| *d <= last).collect(),
            _ => Vec::new(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.first_day(), self.last_day()) {
            (Some(first), Some(last)) => first <= date && date <= last,
            _ => false,
        }
    }
}

impl fmt::Display for ScanWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWindow::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            ScanWindow::Year { year } => write!(f, "{:04}", year),
        }
    }
}

/// Which natal bodies are checked against which transiting bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitPlan {
    pub natal: Vec<Body>,
    pub transiting: Vec<Body>,
}

impl TransitPlan {
    pub fn new(natal: Vec<Body>, transiting: Vec<Body>) -> Self {
        Self { natal, transiting }
    }

    /// Fast movers plus Jupiter and Saturn against the personal bodies.
    pub fn month() -> Self {
        Self::new(
            Body::PERSONAL.to_vec(),
            vec![
                Body::Sun,
                Body::Mercury,
                Body::Venus,
                Body::Mars,
                Body::Jupiter,
                Body::Saturn,
            ],
        )
    }

    /// The slow outer bodies against the personal bodies.
    pub fn year() -> Self {
        Self::new(
            Body::PERSONAL.to_vec(),
            vec![Body::Uranus, Body::Neptune, Body::Pluto],
        )
    }

    pub fn for_window(window: &ScanWindow) -> Self {
        match window {
            ScanWindow::Month { .. } => Self::month(),
            ScanWindow::Year { .. } => Self::year(),
        }
    }

    /// (natal, transiting) pairs, natal-major.
    pub fn pairs(&self) -> impl Iterator<Item = (Body, Body)> + '_ {
        self.natal
            .iter()
            .flat_map(move |&n| self.transiting.iter().map(move |&t| (n, t)))
    }
}

/// A near-exact aspect between a natal body and a transiting body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitEvent {
    pub natal: Body,
    pub transiting: Body,
    pub kind: AspectKind,
    pub hit_date: NaiveDate,
    /// First day of influence, clamped to the scan window
    pub influence_start: NaiveDate,
    /// Last day of influence, clamped to the scan window
    pub influence_end: NaiveDate,
    /// Distance from the exact aspect angle on `hit_date`
    pub deviation: f64,
}

impl fmt::Display for TransitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} natal {} on {}, strongest from {} to {}",
            self.transiting,
            self.kind,
            self.natal,
            self.hit_date,
            self.influence_start,
            self.influence_end
        )
    }
}

/// Everything a finished scan produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitReport {
    pub window: ScanWindow,
    pub events: Vec<TransitEvent>,
    pub days_scanned: usize,
    pub days_failed: usize,
    /// True when the failed fraction exceeded the configured threshold
    pub degraded: bool,
}

impl TransitReport {
    /// Merge hits of the same (natal, transiting, kind) on consecutive days.
    ///
    /// A merged event spans the union of the influence windows and keeps the
    /// hit day with the smallest deviation. Runs appear in the order their
    /// first day was reported.
    pub fn coalesce(mut self) -> Self {
        type Key = (Body, Body, AspectKind);
        // key -> (index into merged, last raw hit date of the open run)
        let mut open: HashMap<Key, (usize, NaiveDate)> = HashMap::new();
        let mut merged: Vec<TransitEvent> = Vec::with_capacity(self.events.len());

        for event in self.events.drain(..) {
            let key = (event.natal, event.transiting, event.kind);
            let extends = open
                .get(&key)
                .filter(|(_, last)| *last + Duration::days(1) == event.hit_date)
                .map(|(idx, _)| *idx);

            match extends {
                Some(idx) => {
                    let run = &mut merged[idx];
                    run.influence_start = run.influence_start.min(event.influence_start);
                    run.influence_end = run.influence_end.max(event.influence_end);
                    if event.deviation < run.deviation {
                        run.hit_date = event.hit_date;
                        run.deviation = event.deviation;
                    }
                    open.insert(key, (idx, event.hit_date));
                }
                None => {
                    open.insert(key, (merged.len(), event.hit_date));
                    merged.push(event);
                }
            }
        }

        self.events = merged;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_and_year_bounds() {
        let feb = ScanWindow::Month { year: 2024, month: 2 };
        assert_eq!(feb.first_day(), Some(date(2024, 2, 1)));
        assert_eq!(feb.last_day(), Some(date(2024, 2, 29)));
        assert_eq!(feb.days().len(), 29);

        let dec = ScanWindow::current_month(date(2023, 12, 17));
        assert_eq!(dec.last_day(), Some(date(2023, 12, 31)));
        assert_eq!(dec.to_string(), "2023-12");

        assert_eq!(ScanWindow::current_year(date(2024, 5, 5)).days().len(), 366);
        assert_eq!(ScanWindow::Year { year: 2023 }.days().len(), 365);
    }

    #[test]
    fn invalid_month_has_no_days() {
        let bad = ScanWindow::Month { year: 2024, month: 13 };
        assert_eq!(bad.first_day(), None);
        assert_eq!(bad.last_day(), None);
        assert!(bad.days().is_empty());
        assert!(!bad.contains(date(2024, 1, 1)));
    }

    #[test]
    fn default_plans() {
        let month = TransitPlan::month();
        assert_eq!(month.natal, Body::PERSONAL.to_vec());
        assert_eq!(month.pairs().count(), 5 * 6);
        assert_eq!(month.pairs().next(), Some((Body::Sun, Body::Sun)));
        assert_eq!(month.pairs().nth(1), Some((Body::Sun, Body::Mercury)));

        let year = TransitPlan::for_window(&ScanWindow::Year { year: 2024 });
        assert_eq!(year.transiting, vec![Body::Uranus, Body::Neptune, Body::Pluto]);
    }

    fn hit(transiting: Body, day: u32, deviation: f64, orb_days: i64) -> TransitEvent {
        let hit_date = date(2024, 3, day);
        TransitEvent {
            natal: Body::Sun,
            transiting,
            kind: AspectKind::Square,
            hit_date,
            influence_start: hit_date - Duration::days(orb_days),
            influence_end: hit_date + Duration::days(orb_days),
            deviation,
        }
    }

    #[test]
    fn coalesce_merges_consecutive_days_only() {
        let report = TransitReport {
            window: ScanWindow::Month { year: 2024, month: 3 },
            events: vec![
                hit(Body::Saturn, 10, 0.25, 7),
                hit(Body::Mars, 10, 0.1, 2),
                hit(Body::Saturn, 11, 0.05, 7),
                hit(Body::Saturn, 12, 0.2, 7),
                hit(Body::Saturn, 20, 0.1, 7),
            ],
            days_scanned: 31,
            days_failed: 0,
            degraded: false,
        };

        let merged = report.coalesce();
        assert_eq!(merged.events.len(), 3);

        let saturn = &merged.events[0];
        assert_eq!(saturn.transiting, Body::Saturn);
        assert_eq!(saturn.hit_date, date(2024, 3, 11));
        assert_eq!(saturn.influence_start, date(2024, 3, 3));
        assert_eq!(saturn.influence_end, date(2024, 3, 19));

        assert_eq!(merged.events[1].transiting, Body::Mars);
        assert_eq!(merged.events[2].hit_date, date(2024, 3, 20));
    }
}
