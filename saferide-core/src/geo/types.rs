//! Geographic value types.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SafeRideError};

/// Smallest alert radius the settings screen accepts (1 meter).
pub const MIN_ALERT_RADIUS_KM: f64 = 0.001;

/// Largest alert radius the settings screen accepts.
pub const MAX_ALERT_RADIUS_KM: f64 = 10.0;

/// Alert radius used when the user has not saved settings.
pub const DEFAULT_ALERT_RADIUS_KM: f64 = 10.0;

/// A validated latitude/longitude pair in degrees.
///
/// The only way to build a `GeoPoint` is through [`GeoPoint::new`], so every
/// point in the crate is finite and inside `[-90, 90]` / `[-180, 180]`.
///
/// # Examples
///
/// ```
/// use saferide_core::geo::GeoPoint;
///
/// let sao_paulo = GeoPoint::new(-23.5505, -46.6333).unwrap();
/// assert_eq!(sao_paulo.latitude(), -23.5505);
///
/// assert!(GeoPoint::new(200.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting NaN, infinities and out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::InvalidCoordinate`] if either component is
    /// invalid.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);

        if lat_ok && lon_ok {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(SafeRideError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Unvalidated wire form of a point.
#[derive(Serialize, Deserialize)]
struct RawPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = SafeRideError;

    fn try_from(raw: RawPoint) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl From<GeoPoint> for RawPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// User-configured distance threshold for nearby alerts, in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AlertRadius(f64);

impl AlertRadius {
    /// Creates a radius in `[0.001, 10.0]` km.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::InvalidRadius`] if `km` is non-finite or out
    /// of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use saferide_core::geo::AlertRadius;
    ///
    /// assert!(AlertRadius::new(2.5).is_ok());
    /// assert!(AlertRadius::new(0.0).is_err());
    /// assert!(AlertRadius::new(10.5).is_err());
    /// ```
    pub fn new(km: f64) -> Result<Self> {
        if km.is_finite() && (MIN_ALERT_RADIUS_KM..=MAX_ALERT_RADIUS_KM).contains(&km) {
            Ok(Self(km))
        } else {
            Err(SafeRideError::InvalidRadius(km))
        }
    }

    /// Radius in kilometers.
    #[must_use]
    pub const fn km(self) -> f64 {
        self.0
    }
}

impl Default for AlertRadius {
    fn default() -> Self {
        Self(DEFAULT_ALERT_RADIUS_KM)
    }
}

impl TryFrom<f64> for AlertRadius {
    type Error = SafeRideError;

    fn try_from(km: f64) -> Result<Self> {
        Self::new(km)
    }
}

impl From<AlertRadius> for f64 {
    fn from(radius: AlertRadius) -> Self {
        radius.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_point_accepts_boundaries() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert!(GeoPoint::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn geo_point_rejects_out_of_range_latitude() {
        let err = GeoPoint::new(200.0, 0.0).unwrap_err();
        assert!(matches!(err, SafeRideError::InvalidCoordinate { .. }));
        assert!(GeoPoint::new(-90.000_1, 0.0).is_err());
    }

    #[test]
    fn geo_point_rejects_out_of_range_longitude() {
        assert!(GeoPoint::new(0.0, 180.5).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
    }

    #[test]
    fn geo_point_rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn geo_point_deserialize_validates() {
        let ok: GeoPoint = serde_json::from_str(r#"{"latitude":1.5,"longitude":2.5}"#).unwrap();
        assert_eq!(ok.latitude(), 1.5);
        assert_eq!(ok.longitude(), 2.5);

        let bad = serde_json::from_str::<GeoPoint>(r#"{"latitude":95.0,"longitude":0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn geo_point_serializes_as_lat_lon_object() {
        let point = GeoPoint::new(-22.9068, -43.1729).unwrap();
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"latitude":-22.9068,"longitude":-43.1729}"#);
    }

    #[test]
    fn alert_radius_range() {
        assert!(AlertRadius::new(MIN_ALERT_RADIUS_KM).is_ok());
        assert!(AlertRadius::new(MAX_ALERT_RADIUS_KM).is_ok());
        assert!(AlertRadius::new(0.000_5).is_err());
        assert!(AlertRadius::new(10.01).is_err());
        assert!(AlertRadius::new(f64::NAN).is_err());
    }

    #[test]
    fn alert_radius_default_is_ten_km() {
        assert_eq!(AlertRadius::default().km(), 10.0);
    }

    #[test]
    fn alert_radius_deserialize_validates() {
        let radius: AlertRadius = serde_json::from_str("2.5").unwrap();
        assert_eq!(radius.km(), 2.5);
        assert!(serde_json::from_str::<AlertRadius>("42.0").is_err());
    }
}
