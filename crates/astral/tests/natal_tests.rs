use astral::geocode::{GeocodeResolver, GeocodingProvider, LookupError, RetryPolicy};
use astral::transit::ScanWindow;
use astral::{
    AstralService, Body, BirthMoment, GeoCoordinate, JulianDay, SwissEphemeris, TimeConverter,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fails the first lookup of every place, then answers.
struct Throttled {
    calls: AtomicU32,
}

#[async_trait]
impl GeocodingProvider for Throttled {
    async fn lookup(&self, place: &str, _client_id: &str) -> Result<GeoCoordinate, LookupError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            return Err(LookupError::Transient("429".to_string()));
        }
        match place {
            "Smolensk" => Ok(GeoCoordinate::new(54.7818, 32.0401).unwrap()),
            _ => Err(LookupError::NotFound),
        }
    }
}

fn service() -> AstralService<Throttled> {
    let resolver = GeocodeResolver::new(
        Throttled {
            calls: AtomicU32::new(0),
        },
        "astral-test",
        RetryPolicy {
            max_attempts: 5,
            timeout: Duration::from_secs(5),
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        },
    );
    AstralService::new(
        TimeConverter::default(),
        resolver,
        Arc::new(SwissEphemeris::moshier()),
    )
}

#[tokio::test]
async fn test_natal_positions_are_byte_identical() {
    let service = service();
    let moment = BirthMoment::new(1988, 6, 15, 17, 45).unwrap();

    let first = service.compute_natal_positions(&moment, "Smolensk").await.unwrap();
    let second = service.compute_natal_positions(&moment, " Smolensk").await.unwrap();

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert!((first.julian_day.value() - 2_447_328.072_916_666_5).abs() < 1e-6);
}

#[tokio::test]
async fn test_house_cusps_are_normalized() {
    let moment = BirthMoment::new(1988, 1, 29, 17, 45).unwrap();
    let natal = service().compute_natal_positions(&moment, "Smolensk").await.unwrap();

    let houses = &natal.house_cusps;
    assert!(houses.cusps.iter().all(|c| (0.0..360.0).contains(c)));
    assert!((houses.cusps[0] - houses.ascendant).abs() < 1e-6);
    assert!((houses.cusps[9] - houses.midheaven).abs() < 1e-6);
    // Late January: the Sun is in Aquarius
    assert_eq!(natal.zodiac_signs[&Body::Sun].label, "Sun in Aquarius");
}

#[tokio::test]
async fn test_natal_report_lists_personal_bodies() {
    let moment = BirthMoment::new(1988, 6, 15, 17, 45).unwrap();
    let report = service().natal_report(&moment, "Smolensk").await.unwrap();

    assert_eq!(report.orb, 8.0);
    assert_eq!(report.aspects.len(), Body::PERSONAL.len());
    for (focus, pairs) in &report.aspects {
        assert!(pairs.iter().all(|p| p.from == *focus && p.to != *focus));
        assert!(pairs.iter().all(|p| p.deviation <= 8.0));
    }
}

#[tokio::test]
async fn test_month_scan_with_real_ephemeris() {
    let service = service();
    let moment = BirthMoment::new(1988, 6, 15, 17, 45).unwrap();
    let natal = service.compute_natal_positions(&moment, "Smolensk").await.unwrap();

    let report = service
        .scan_transits(
            &natal.longitudes,
            "Smolensk",
            ScanWindow::Month { year: 2024, month: 3 },
        )
        .await
        .unwrap();

    assert_eq!(report.days_scanned, 31);
    assert_eq!(report.days_failed, 0);
    assert!(!report.degraded);
    assert!(report
        .events
        .windows(2)
        .all(|w| w[0].hit_date <= w[1].hit_date));
}

#[test]
fn test_lunar_day_after_january_2024_new_moon() {
    // New moon on 2024-01-11 at about 11:57 UTC
    let instant = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    let snapshot = service().lunar_snapshot(instant).unwrap();

    let expected = JulianDay::from_calendar(2024, 1, 11, 11.95);
    assert!((snapshot.previous_new_moon.value() - expected.value()).abs() < 0.02);
    assert_eq!(snapshot.lunar_day, 5);
    assert_eq!(snapshot.opposite_sign, snapshot.moon_sign.opposite());
}
