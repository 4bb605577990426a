//! Core configuration.
//!
//! The host application supplies a [`CoreConfig`] when opening
//! [`SafeRideCore`](crate::SafeRideCore). All fields have defaults, so a
//! partial JSON document is enough.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;
use crate::feed::{DEFAULT_CHAT_LIMIT, DEFAULT_CHAT_WINDOW_HOURS};
use crate::geo::GeoPoint;

/// Settings for the core library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Base URL of the SafeRide backend, without the `/api` prefix.
    pub backend_url: String,

    /// Directory for the local database. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,

    /// How many hours of chat history the chat feed shows.
    pub chat_window_hours: i64,

    /// Maximum number of chat messages in the feed.
    pub chat_limit: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8001".to_string(),
            data_dir: None,
            chat_window_hours: DEFAULT_CHAT_WINDOW_HOURS,
            chat_limit: DEFAULT_CHAT_LIMIT,
        }
    }
}

impl CoreConfig {
    /// Parses a configuration from JSON. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use saferide_core::config::CoreConfig;
    ///
    /// let json = r#"{"backend_url":"https://api.saferide.app"}"#;
    /// let config = CoreConfig::from_json(json).unwrap();
    /// assert_eq!(config.backend_url, "https://api.saferide.app");
    /// assert_eq!(config.chat_limit, 50);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Absolute URL of a backend API path such as `emergency/cancel`.
    ///
    /// # Errors
    ///
    /// Returns an error if `backend_url` is not a valid base URL.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        let base = format!("{}/api/", self.backend_url.trim_end_matches('/'));
        Ok(Url::parse(&base)?.join(path.trim_start_matches('/'))?)
    }

    /// `GET /api/emergencies/nearby` for the device location.
    ///
    /// # Errors
    ///
    /// Returns an error if `backend_url` is not a valid base URL.
    pub fn nearby_emergencies_url(&self, origin: GeoPoint) -> Result<Url> {
        let mut url = self.api_url("emergencies/nearby")?;
        url.query_pairs_mut()
            .append_pair("latitude", &origin.latitude().to_string())
            .append_pair("longitude", &origin.longitude().to_string());
        Ok(url)
    }

    /// `GET /api/chat/nearby` for the device location.
    ///
    /// # Errors
    ///
    /// Returns an error if `backend_url` is not a valid base URL.
    pub fn nearby_chat_url(&self, origin: GeoPoint) -> Result<Url> {
        let mut url = self.api_url("chat/nearby")?;
        url.query_pairs_mut()
            .append_pair("latitude", &origin.latitude().to_string())
            .append_pair("longitude", &origin.longitude().to_string())
            .append_pair("limit", &self.chat_limit.to_string());
        Ok(url)
    }

    /// `DELETE /api/chat/{id}` for one of the user's own messages.
    ///
    /// # Errors
    ///
    /// Returns an error if `backend_url` is not a valid base URL.
    pub fn chat_message_url(&self, message_id: &str) -> Result<Url> {
        let mut url = self.api_url("chat/")?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(message_id);
        Ok(url)
    }

    /// `GET /api/subscription/check-device` for this install.
    ///
    /// # Errors
    ///
    /// Returns an error if `backend_url` is not a valid base URL.
    pub fn check_device_url(&self, device_id: &str) -> Result<Url> {
        let mut url = self.api_url("subscription/check-device")?;
        url.query_pairs_mut().append_pair("device_id", device_id);
        Ok(url)
    }
}
