//! Property-based tests for distance and radius filtering.
//!
//! These tests verify:
//! - P1: distance is zero from a point to itself, positive between distinct
//!   points, and symmetric
//! - P2: distance is bounded by half the Earth's circumference
//! - P3: invalid coordinates are always rejected
//! - P4: a filter never includes a point it would measure outside its radius

use proptest::prelude::*;
use saferide_core::geo::{
    distance_km, is_within_radius, AlertRadius, GeoPoint, ProximityFilter, EARTH_RADIUS_KM,
};

fn valid_point() -> impl Strategy<Value = GeoPoint> {
    (-90.0..=90.0_f64, -180.0..=180.0_f64)
        .prop_map(|(lat, lon)| GeoPoint::new(lat, lon).expect("in-range point"))
}

/// Points on a microdegree grid away from the poles and the antimeridian,
/// where distinct coordinates always name distinct places.
fn unaliased_point() -> impl Strategy<Value = GeoPoint> {
    (-89_999_999..=89_999_999_i32, -179_999_999..=179_999_999_i32).prop_map(|(lat, lon)| {
        GeoPoint::new(f64::from(lat) / 1e6, f64::from(lon) / 1e6).expect("in-range point")
    })
}

fn valid_radius() -> impl Strategy<Value = AlertRadius> {
    (0.001..=10.0_f64).prop_map(|km| AlertRadius::new(km).expect("in-range radius"))
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn equator_one_degree_fixture() {
    let a = GeoPoint::new(0.0, 0.0).unwrap();
    let b = GeoPoint::new(0.0, 1.0).unwrap();
    let d = distance_km(a, b);
    assert!((d - 111.19).abs() <= 0.5, "expected ~111.19 km, got {d}");
}

#[test]
fn sao_paulo_rio_fixture() {
    let sp = GeoPoint::new(-23.5505, -46.6333).unwrap();
    let rio = GeoPoint::new(-22.9068, -43.1729).unwrap();
    let d = distance_km(sp, rio);
    assert!((d - 357.0).abs() <= 5.0, "expected ~357 km, got {d}");
}

#[test]
fn radius_boundary_fixture() {
    assert!(is_within_radius(5.0, 10.0));
    assert!(!is_within_radius(10.1, 10.0));
    assert!(is_within_radius(10.0, 10.0));
}

#[test]
fn latitude_200_is_rejected() {
    assert!(GeoPoint::new(200.0, 0.0).is_err());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// P1: a point is at distance zero from itself.
    #[test]
    fn p1_distance_to_self_is_zero(p in valid_point()) {
        prop_assert_eq!(distance_km(p, p), 0.0);
    }

    /// P1: distinct places are a positive distance apart.
    #[test]
    fn p1_distinct_points_are_apart(a in unaliased_point(), b in unaliased_point()) {
        prop_assume!(a != b);
        prop_assert!(distance_km(a, b) > 0.0, "{:?} and {:?} measured 0 km", a, b);
    }

    /// P1: points one microdegree apart are still distinguished.
    #[test]
    fn p1_neighbouring_points_are_apart(a in unaliased_point(), north in any::<bool>()) {
        let step = if north { 1e-6 } else { -1e-6 };
        let lat = (a.latitude() + step).clamp(-90.0, 90.0);
        let b = GeoPoint::new(lat, a.longitude()).expect("in-range point");
        prop_assert!(distance_km(a, b) > 0.0);
    }

    /// P1: swapping arguments does not change the distance.
    #[test]
    fn p1_distance_is_symmetric(a in valid_point(), b in valid_point()) {
        let ab = distance_km(a, b);
        let ba = distance_km(b, a);
        prop_assert!((ab - ba).abs() < 1e-9, "{} vs {}", ab, ba);
    }

    /// P2: distances are finite, non-negative and at most half a great circle.
    #[test]
    fn p2_distance_is_bounded(a in valid_point(), b in valid_point()) {
        let d = distance_km(a, b);
        prop_assert!(d.is_finite());
        prop_assert!(d >= 0.0);
        prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
    }

    /// P3: any latitude beyond the poles is rejected.
    #[test]
    fn p3_out_of_range_latitude_rejected(
        excess in 0.000_001..1_000.0_f64,
        south in any::<bool>(),
        lon in -180.0..=180.0_f64,
    ) {
        let lat = if south { -90.0 - excess } else { 90.0 + excess };
        prop_assert!(GeoPoint::new(lat, lon).is_err());
    }

    /// P3: any longitude beyond the antimeridian is rejected.
    #[test]
    fn p3_out_of_range_longitude_rejected(
        excess in 0.000_001..1_000.0_f64,
        west in any::<bool>(),
        lat in -90.0..=90.0_f64,
    ) {
        let lon = if west { -180.0 - excess } else { 180.0 + excess };
        prop_assert!(GeoPoint::new(lat, lon).is_err());
    }

    /// P4: inclusion agrees with the raw distance and the reported distance
    /// is that distance rounded to two decimals.
    #[test]
    fn p4_filter_agrees_with_distance(
        origin in valid_point(),
        target in valid_point(),
        radius in valid_radius(),
    ) {
        let filter = ProximityFilter::new(origin, radius);
        let raw = distance_km(origin, target);

        match filter.contains(target) {
            Some(reported) => {
                prop_assert!(raw <= radius.km());
                prop_assert!((reported - raw).abs() <= 0.005 + 1e-9);
            }
            None => prop_assert!(raw > radius.km()),
        }
    }

    /// P4: the origin itself is always in range.
    #[test]
    fn p4_origin_always_in_range(origin in valid_point(), radius in valid_radius()) {
        let filter = ProximityFilter::new(origin, radius);
        prop_assert_eq!(filter.contains(origin), Some(0.0));
    }
}
