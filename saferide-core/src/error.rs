//! Error types for SafeRide core operations.
//!
//! Every fallible operation in the crate returns [`SafeRideError`], from
//! coordinate validation through local storage.

use thiserror::Error;

/// Error type for SafeRide core operations.
#[derive(Error, Debug)]
pub enum SafeRideError {
    /// A latitude/longitude pair was missing, non-finite or out of range.
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },

    /// Alert radius outside the supported range.
    #[error("Invalid alert radius: {0} km")]
    InvalidRadius(f64),

    /// Emergency contact that is not a usable phone number.
    #[error("Invalid phone number format: {0}")]
    InvalidPhoneNumber(String),

    /// Settings rejected for a reason other than radius or phone format.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Socket event name the client does not handle.
    #[error("Unknown socket event: {0}")]
    UnknownEvent(String),

    /// Operation requires a logged-in session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Operation requires a known device location.
    #[error("Device location unknown")]
    LocationUnknown,

    /// An SOS is already active for this device.
    #[error("An emergency is already active")]
    EmergencyActive,

    /// Email address that cannot receive a reset link.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Operation requires an unexpired subscription.
    #[error("No active subscription")]
    SubscriptionRequired,

    /// Chat message written by someone else.
    #[error("Chat message {0} belongs to another user")]
    NotMessageAuthor(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for SafeRide core operations.
pub type Result<T> = std::result::Result<T, SafeRideError>;
