use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, VecDeque};

use crate::aspects::{angular_separation, classify};
use crate::ephemeris::{Body, EphemerisEngine, EphemerisProvider};
use crate::error::{AstralError, Result};
use crate::time::TimeConverter;
use crate::transit::types::{ScanWindow, TransitEvent, TransitPlan, TransitReport};

/// Default fraction of failed days above which a scan is reported as degraded.
pub const DEFAULT_FAILURE_THRESHOLD: f64 = 0.25;

/// Day counters for a scan in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub days_scanned: usize,
    pub days_failed: usize,
}

impl ScanStats {
    pub fn failure_fraction(&self) -> f64 {
        if self.days_scanned == 0 {
            0.0
        } else {
            self.days_failed as f64 / self.days_scanned as f64
        }
    }
}

/// Walks a calendar window checking transiting bodies against natal longitudes.
pub struct TransitScanner<'a> {
    provider: &'a dyn EphemerisProvider,
    converter: &'a TimeConverter,
    natal: BTreeMap<Body, f64>,
    window: ScanWindow,
    first_day: NaiveDate,
    last_day: NaiveDate,
    plan: TransitPlan,
    orb: f64,
    failure_threshold: f64,
}

impl<'a> TransitScanner<'a> {
    pub fn new(
        provider: &'a dyn EphemerisProvider,
        converter: &'a TimeConverter,
        natal: BTreeMap<Body, f64>,
        window: ScanWindow,
        plan: TransitPlan,
        orb: f64,
    ) -> Result<Self> {
        let (first_day, last_day) = match (window.first_day(), window.last_day()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AstralError::InvalidScanWindow {
                    window: format!("{:?}", window),
                })
            }
        };

        for body in &plan.natal {
            if !natal.contains_key(body) {
                log::debug!("No natal longitude for {}, its pairs are skipped", body);
            }
        }

        Ok(Self {
            provider,
            converter,
            natal,
            window,
            first_day,
            last_day,
            plan,
            orb,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        })
    }

    pub fn with_failure_threshold(mut self, threshold: f64) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn window(&self) -> ScanWindow {
        self.window
    }

    pub fn plan(&self) -> &TransitPlan {
        &self.plan
    }

    /// Start a fresh scan over the whole window.
    pub fn scan(&self) -> TransitScan<'_> {
        TransitScan {
            scanner: self,
            days: self.window.days().into_iter(),
            pending: VecDeque::new(),
            stats: ScanStats::default(),
            finished: false,
        }
    }

    /// Run a scan to completion and gather its events and counters.
    pub fn collect_report(&self) -> TransitReport {
        let mut scan = self.scan();
        let events: Vec<TransitEvent> = scan.by_ref().collect();
        let stats = scan.stats();
        TransitReport {
            window: self.window,
            events,
            days_scanned: stats.days_scanned,
            days_failed: stats.days_failed,
            degraded: self.is_degraded(&stats),
        }
    }

    fn is_degraded(&self, stats: &ScanStats) -> bool {
        stats.failure_fraction() > self.failure_threshold
    }

    fn influence(&self, day: NaiveDate, transiting: Body) -> (NaiveDate, NaiveDate) {
        let reach = Duration::days(transiting.class().orb_days());
        let start = (day - reach).max(self.first_day);
        let end = (day + reach).min(self.last_day);
        (start, end)
    }

    /// All events for one day, or the error that prevented computing it.
    fn events_on(&self, day: NaiveDate) -> Result<Vec<TransitEvent>> {
        let jd = self.converter.local_noon(day)?;
        let engine = EphemerisEngine::new(self.provider, jd, None);

        let mut transiting = BTreeMap::new();
        for &body in &self.plan.transiting {
            if !transiting.contains_key(&body) {
                transiting.insert(body, engine.body_longitude(body)?);
            }
        }

        let mut events = Vec::new();
        for (natal_body, transiting_body) in self.plan.pairs() {
            let Some(&natal_lon) = self.natal.get(&natal_body) else {
                continue;
            };
            let transit_lon = transiting[&transiting_body];
            if let Some(kind) = classify(natal_lon, transit_lon, self.orb) {
                let (influence_start, influence_end) = self.influence(day, transiting_body);
                events.push(TransitEvent {
                    natal: natal_body,
                    transiting: transiting_body,
                    kind,
                    hit_date: day,
                    influence_start,
                    influence_end,
                    deviation: (angular_separation(natal_lon, transit_lon) - kind.angle()).abs(),
                });
            }
        }
        Ok(events)
    }
}

/// Lazy sequence of transit events in day-then-pair order.
///
/// A day whose positions cannot be computed is logged and skipped. Once the
/// last day has been visited a single warning is logged if the share of
/// failed days exceeds the scanner's threshold.
pub struct TransitScan<'s> {
    scanner: &'s TransitScanner<'s>,
    days: std::vec::IntoIter<NaiveDate>,
    pending: VecDeque<TransitEvent>,
    stats: ScanStats,
    finished: bool,
}

impl<'s> TransitScan<'s> {
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.scanner.is_degraded(&self.stats) {
            log::warn!(
                "Transit scan of {} degraded: {} of {} days failed",
                self.scanner.window,
                self.stats.days_failed,
                self.stats.days_scanned
            );
        }
    }
}

impl<'s> Iterator for TransitScan<'s> {
    type Item = TransitEvent;

    fn next(&mut self) -> Option<TransitEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let Some(day) = self.days.next() else {
                self.finish();
                return None;
            };
            self.stats.days_scanned += 1;
            match self.scanner.events_on(day) {
                Ok(events) => self.pending.extend(events),
                Err(e) => {
                    self.stats.days_failed += 1;
                    log::warn!("Skipping transit day {}: {}", day, e);
                }
            }
        }
    }
}
