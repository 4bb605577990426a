//! Great-circle distance and radius filtering.
//!
//! Distances use the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_KM`]. Every emergency alert and chat message the client
//! receives is checked against the device location with these functions.

use log::debug;

use super::types::{AlertRadius, GeoPoint};
use crate::error::Result;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers.
///
/// Symmetric, and zero only for identical points.
///
/// # Examples
///
/// ```
/// use saferide_core::geo::{distance_km, GeoPoint};
///
/// let a = GeoPoint::new(0.0, 0.0).unwrap();
/// let b = GeoPoint::new(0.0, 1.0).unwrap();
/// assert!((distance_km(a, b) - 111.19).abs() < 0.5);
/// ```
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Returns whether `distance` falls inside `radius` (boundary inclusive).
#[must_use]
pub fn is_within_radius(distance: f64, radius: f64) -> bool {
    distance <= radius
}

/// Rounds a distance to two decimals for display.
#[must_use]
pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

/// Something that happened at a location.
pub trait Located {
    /// Latitude in degrees, as received.
    fn latitude(&self) -> f64;

    /// Longitude in degrees, as received.
    fn longitude(&self) -> f64;

    /// Validated location of this item.
    ///
    /// # Errors
    ///
    /// Returns an error if the received coordinates are invalid.
    fn point(&self) -> Result<GeoPoint> {
        GeoPoint::new(self.latitude(), self.longitude())
    }
}

/// Decides whether incoming events are near the device.
///
/// # Examples
///
/// ```
/// use saferide_core::geo::{AlertRadius, GeoPoint, ProximityFilter};
///
/// let here = GeoPoint::new(-23.5505, -46.6333).unwrap();
/// let filter = ProximityFilter::new(here, AlertRadius::new(5.0).unwrap());
///
/// let close = GeoPoint::new(-23.56, -46.64).unwrap();
/// assert!(filter.contains(close).is_some());
///
/// let rio = GeoPoint::new(-22.9068, -43.1729).unwrap();
/// assert!(filter.contains(rio).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityFilter {
    origin: GeoPoint,
    radius: AlertRadius,
}

impl ProximityFilter {
    /// Creates a filter centered on `origin`.
    #[must_use]
    pub const fn new(origin: GeoPoint, radius: AlertRadius) -> Self {
        Self { origin, radius }
    }

    /// The device location the filter measures from.
    #[must_use]
    pub const fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// The configured radius.
    #[must_use]
    pub const fn radius(&self) -> AlertRadius {
        self.radius
    }

    /// Unrounded distance from the origin to `point`.
    #[must_use]
    pub fn distance_to(&self, point: GeoPoint) -> f64 {
        distance_km(self.origin, point)
    }

    /// Rounded distance to `point` if it lies inside the radius.
    ///
    /// The inclusion decision is made on the unrounded distance.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> Option<f64> {
        let distance = self.distance_to(point);
        let inside = is_within_radius(distance, self.radius.km());
        debug!(
            "distance {distance:.3} km vs radius {:.3} km: {}",
            self.radius.km(),
            if inside { "in range" } else { "out of range" }
        );
        inside.then(|| round_km(distance))
    }

    /// Validates the item's location and annotates it when in range.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SafeRideError::InvalidCoordinate`] if the item carries
    /// invalid coordinates.
    pub fn annotate<T: Located>(&self, item: T) -> Result<Option<Nearby<T>>> {
        let point = item.point()?;
        Ok(self
            .contains(point)
            .map(|distance_km| Nearby { item, distance_km }))
    }
}

/// An item annotated with its rounded distance from the device.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Nearby<T> {
    /// The annotated item.
    #[serde(flatten)]
    pub item: T,
    /// Distance from the device, rounded to two decimals.
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    struct Pin {
        lat: f64,
        lon: f64,
    }

    impl Located for Pin {
        fn latitude(&self) -> f64 {
            self.lat
        }

        fn longitude(&self) -> f64 {
            self.lon
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = point(-23.5505, -46.6333);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn distance_one_degree_of_longitude_at_equator() {
        let d = distance_km(point(0.0, 0.0), point(0.0, 1.0));
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }

    #[test]
    fn distance_sao_paulo_to_rio() {
        let d = distance_km(point(-23.5505, -46.6333), point(-22.9068, -43.1729));
        assert!((d - 357.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = point(51.5074, -0.1278);
        let b = point(40.7128, -74.0060);
        assert_eq!(distance_km(a, b), distance_km(b, a));
    }

    #[test]
    fn distance_antipodal_is_half_circumference() {
        let d = distance_km(point(0.0, 0.0), point(0.0, 180.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - half).abs() < 1e-6);
    }

    #[test]
    fn within_radius_cases() {
        assert!(is_within_radius(5.0, 10.0));
        assert!(!is_within_radius(10.1, 10.0));
        assert!(is_within_radius(10.0, 10.0));
    }

    #[test]
    fn round_km_two_decimals() {
        assert_eq!(round_km(1.234_56), 1.23);
        assert_eq!(round_km(1.235_1), 1.24);
        assert_eq!(round_km(0.0), 0.0);
    }

    #[test]
    fn filter_contains_returns_rounded_distance() {
        let filter = ProximityFilter::new(point(0.0, 0.0), AlertRadius::default());
        let d = filter.contains(point(0.0, 0.05)).unwrap();
        assert_eq!(d, 5.56);
    }

    #[test]
    fn filter_excludes_far_points() {
        let filter = ProximityFilter::new(point(0.0, 0.0), AlertRadius::new(1.0).unwrap());
        assert!(filter.contains(point(0.0, 1.0)).is_none());
    }

    #[test]
    fn annotate_rejects_invalid_coordinates() {
        let filter = ProximityFilter::new(point(0.0, 0.0), AlertRadius::default());
        let result = filter.annotate(Pin {
            lat: 200.0,
            lon: 0.0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn annotate_wraps_in_range_item() {
        let filter = ProximityFilter::new(point(0.0, 0.0), AlertRadius::default());
        let nearby = filter
            .annotate(Pin {
                lat: 0.0,
                lon: 0.01,
            })
            .unwrap()
            .unwrap();
        assert_eq!(nearby.distance_km, 1.11);
        assert_eq!(nearby.item.lon, 0.01);
    }
}
