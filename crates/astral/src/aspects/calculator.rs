use std::collections::BTreeMap;

use crate::aspects::types::{AspectKind, AspectPair};
use crate::ephemeris::Body;

/// Absorbs rounding in the longitude difference, e.g. `76.4 - 256.4`.
const ANGLE_EPSILON: f64 = 1e-9;

/// Shortest angular distance between two longitudes, in [0, 180].
pub fn angular_separation(lon1: f64, lon2: f64) -> f64 {
    let difference = (lon1 - lon2).abs() % 360.0;
    if difference > 180.0 {
        360.0 - difference
    } else {
        difference
    }
}

/// Classify the separation of two longitudes against the five major aspects.
///
/// Kinds are tried in [`AspectKind::ALL`] order and the first one whose exact
/// angle lies within `orb` degrees is returned, so with orbs of 15° or more a
/// separation close to both 60° and 90° resolves to the sextile. A negative or
/// NaN orb, or a non-finite longitude, never matches.
pub fn classify(lon1: f64, lon2: f64, orb: f64) -> Option<AspectKind> {
    if !lon1.is_finite() || !lon2.is_finite() || orb.is_nan() || orb < 0.0 {
        return None;
    }
    let separation = angular_separation(lon1, lon2);
    AspectKind::ALL
        .into_iter()
        .find(|kind| deviation_from(separation, *kind) <= orb + ANGLE_EPSILON)
}

/// Distance from the exact aspect angle; below [`ANGLE_EPSILON`] counts as exact.
fn deviation_from(separation: f64, kind: AspectKind) -> f64 {
    let deviation = (separation - kind.angle()).abs();
    if deviation <= ANGLE_EPSILON {
        0.0
    } else {
        deviation
    }
}

/// Aspect calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct AspectCalculator;

impl AspectCalculator {
    /// Create a new aspect calculator
    pub fn new() -> Self {
        Self
    }

    /// Build an aspect pair when the two longitudes are within `orb` of an aspect.
    pub fn pair(&self, from: Body, lon_from: f64, to: Body, lon_to: f64, orb: f64) -> Option<AspectPair> {
        let kind = classify(lon_from, lon_to, orb)?;
        let separation = angular_separation(lon_from, lon_to);
        Some(AspectPair {
            from,
            to,
            kind,
            separation,
            deviation: deviation_from(separation, kind),
        })
    }

    /// Aspects between `focus` and every other body in `positions`.
    pub fn aspects_of(&self, positions: &BTreeMap<Body, f64>, focus: Body, orb: f64) -> Vec<AspectPair> {
        let Some(&focus_lon) = positions.get(&focus) else {
            return Vec::new();
        };
        positions
            .iter()
            .filter(|(body, _)| **body != focus)
            .filter_map(|(&body, &lon)| self.pair(focus, focus_lon, body, lon, orb))
            .collect()
    }

    /// Aspects for each focus body, keyed by that body.
    pub fn natal_aspects(
        &self,
        positions: &BTreeMap<Body, f64>,
        focus_bodies: &[Body],
        orb: f64,
    ) -> BTreeMap<Body, Vec<AspectPair>> {
        focus_bodies
            .iter()
            .filter(|body| positions.contains_key(*body))
            .map(|&body| (body, self.aspects_of(positions, body, orb)))
            .collect()
    }

    /// Each unordered pair once, in body order.
    pub fn all_pairs(&self, positions: &BTreeMap<Body, f64>, orb: f64) -> Vec<AspectPair> {
        let entries: Vec<(Body, f64)> = positions.iter().map(|(b, l)| (*b, *l)).collect();
        let mut pairs = Vec::new();
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (b1, l1) = entries[i];
                let (b2, l2) = entries[j];
                if let Some(pair) = self.pair(b1, l1, b2, l2, orb) {
                    pairs.push(pair);
                }
            }
        }
        pairs
    }
}
