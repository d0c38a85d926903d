use astral::ephemeris::{BodyPosition, GeoCoordinate, HouseCusps, HouseSystem};
use astral::transit::{ScanWindow, TransitPlan, TransitScanner};
use astral::{AspectKind, AstralError, Body, EphemerisProvider, JulianDay, TimeConverter};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Mars crosses 90° on the configured day at one degree per day.
struct MarsCrossing {
    exact_at: JulianDay,
}

impl EphemerisProvider for MarsCrossing {
    fn body_position(&self, body: Body, jd: JulianDay) -> astral::Result<BodyPosition> {
        let longitude = match body {
            Body::Mars => 90.0 + jd.days_since(self.exact_at),
            _ => 10.0,
        };
        Ok(BodyPosition {
            body,
            longitude,
            latitude: 0.0,
            speed: 1.0,
            retrograde: false,
        })
    }

    fn house_cusps(
        &self,
        _jd: JulianDay,
        _location: GeoCoordinate,
        _system: HouseSystem,
    ) -> astral::Result<HouseCusps> {
        Err(AstralError::MissingCoordinates)
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, d).unwrap()
}

#[test]
fn test_single_hit_in_thirty_day_window() {
    let converter = TimeConverter::default();
    let provider = MarsCrossing {
        exact_at: converter.local_noon(day(29)).unwrap(),
    };
    let natal = BTreeMap::from([(Body::Sun, 90.0)]);
    let scanner = TransitScanner::new(
        &provider,
        &converter,
        natal,
        ScanWindow::Month { year: 2023, month: 11 },
        TransitPlan::new(vec![Body::Sun], vec![Body::Mars]),
        0.3,
    )
    .unwrap();

    let report = scanner.collect_report();
    assert_eq!(report.days_scanned, 30);
    assert_eq!(report.days_failed, 0);
    assert!(!report.degraded);
    assert_eq!(report.events.len(), 1);

    let event = &report.events[0];
    assert_eq!(event.natal, Body::Sun);
    assert_eq!(event.transiting, Body::Mars);
    assert_eq!(event.kind, AspectKind::Conjunction);
    assert_eq!(event.hit_date, day(29));
    assert_eq!(event.influence_start, day(27));
    // Clamped to the last day of November
    assert_eq!(event.influence_end, day(30));
}

#[test]
fn test_scan_is_repeatable() {
    let converter = TimeConverter::default();
    let provider = MarsCrossing {
        exact_at: converter.local_noon(day(12)).unwrap(),
    };
    let natal = BTreeMap::from([(Body::Sun, 90.0), (Body::Moon, 180.0)]);
    let scanner = TransitScanner::new(
        &provider,
        &converter,
        natal,
        ScanWindow::Month { year: 2023, month: 11 },
        TransitPlan::month(),
        0.3,
    )
    .unwrap();

    let first: Vec<_> = scanner.scan().collect();
    let second: Vec<_> = scanner.scan().collect();
    assert_eq!(first, second);
    // Sun conjunct and Moon square on the same day, natal-major order
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].natal, Body::Sun);
    assert_eq!(first[1].natal, Body::Moon);
    assert_eq!(first[1].kind, AspectKind::Square);
}

#[test]
fn test_report_serializes() {
    let converter = TimeConverter::default();
    let provider = MarsCrossing {
        exact_at: converter.local_noon(day(5)).unwrap(),
    };
    let scanner = TransitScanner::new(
        &provider,
        &converter,
        BTreeMap::from([(Body::Sun, 90.0)]),
        ScanWindow::Month { year: 2023, month: 11 },
        TransitPlan::new(vec![Body::Sun], vec![Body::Mars]),
        0.3,
    )
    .unwrap();

    let json = serde_json::to_value(scanner.collect_report()).unwrap();
    assert_eq!(json["window"]["kind"], "month");
    assert_eq!(json["events"][0]["hit_date"], "2023-11-05");
    assert_eq!(json["events"][0]["kind"], "conjunction");
}
