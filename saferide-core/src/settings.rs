//! User alert settings.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SafeRideError};
use crate::geo::{AlertRadius, DEFAULT_ALERT_RADIUS_KM};

/// Most emergency contacts a user can register.
pub const MAX_EMERGENCY_CONTACTS: usize = 5;

/// Shortest accepted phone number after stripping separators.
const MIN_PHONE_LEN: usize = 8;

/// Settings edited on the settings screen and synced to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Phone numbers notified over WhatsApp when an SOS is raised.
    #[serde(default)]
    pub emergency_contacts: Vec<String>,
    /// Alert radius in kilometers.
    #[serde(default = "default_alert_distance")]
    pub alert_distance_km: f64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            emergency_contacts: Vec::new(),
            alert_distance_km: DEFAULT_ALERT_RADIUS_KM,
        }
    }
}

impl UserSettings {
    /// Validates settings before they are saved.
    ///
    /// # Errors
    ///
    /// - [`SafeRideError::InvalidSettings`] for zero or more than five contacts
    /// - [`SafeRideError::InvalidPhoneNumber`] for a malformed contact
    /// - [`SafeRideError::InvalidRadius`] for a radius outside 1 m to 10 km
    ///
    /// # Examples
    ///
    /// ```
    /// use saferide_core::settings::UserSettings;
    ///
    /// let settings = UserSettings {
    ///     emergency_contacts: vec!["+55 (11) 98765-4321".to_string()],
    ///     alert_distance_km: 2.0,
    /// };
    /// assert!(settings.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let count = self.emergency_contacts.len();
        if count == 0 {
            return Err(SafeRideError::InvalidSettings(
                "at least one emergency contact is required".to_string(),
            ));
        }
        if count > MAX_EMERGENCY_CONTACTS {
            return Err(SafeRideError::InvalidSettings(format!(
                "at most {MAX_EMERGENCY_CONTACTS} emergency contacts are allowed, got {count}"
            )));
        }

        for contact in &self.emergency_contacts {
            validate_phone(contact)?;
        }

        self.alert_radius().map(|_| ())
    }

    /// The alert radius as a validated value.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::InvalidRadius`] if the stored radius is out of
    /// range.
    pub fn alert_radius(&self) -> Result<AlertRadius> {
        AlertRadius::new(self.alert_distance_km)
    }
}

/// Checks one emergency contact number.
///
/// Spaces, dashes and parentheses are ignored. What remains must be digits
/// with an optional `+`, at least 8 characters long.
///
/// # Errors
///
/// Returns [`SafeRideError::InvalidPhoneNumber`] with the original contact.
pub fn validate_phone(contact: &str) -> Result<()> {
    if contact.trim().is_empty() {
        return Err(SafeRideError::InvalidPhoneNumber(contact.to_string()));
    }

    let clean: String = contact
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = clean.replace('+', "");

    if digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit())
        || clean.len() < MIN_PHONE_LEN
    {
        return Err(SafeRideError::InvalidPhoneNumber(contact.to_string()));
    }
    Ok(())
}

const fn default_alert_distance() -> f64 {
    DEFAULT_ALERT_RADIUS_KM
}
