//! Geographic proximity for SafeRide.
//!
//! Provides the one piece of math every screen of the client relies on:
//! - Validated coordinates ([`GeoPoint`]) that fail fast on bad input
//! - Haversine great-circle distance in kilometers
//! - The user's alert radius ([`AlertRadius`], 1 m to 10 km)
//! - A [`ProximityFilter`] that decides whether an event is nearby
//!
//! # Example Usage
//!
//! ```
//! use saferide_core::geo::{distance_km, is_within_radius, GeoPoint};
//!
//! let sao_paulo = GeoPoint::new(-23.5505, -46.6333).unwrap();
//! let rio = GeoPoint::new(-22.9068, -43.1729).unwrap();
//!
//! let d = distance_km(sao_paulo, rio);
//! assert!((d - 357.0).abs() < 5.0);
//! assert!(!is_within_radius(d, 10.0));
//! ```

pub mod distance;
pub mod types;

pub use distance::{
    distance_km, is_within_radius, round_km, Located, Nearby, ProximityFilter, EARTH_RADIUS_KM,
};
pub use types::{
    AlertRadius, GeoPoint, DEFAULT_ALERT_RADIUS_KM, MAX_ALERT_RADIUS_KM, MIN_ALERT_RADIUS_KM,
};
