//! Emergency and chat data types exchanged with the SafeRide backend.
//!
//! Coordinates are kept as received (`f64`) so that a malformed payload can
//! still be decoded and then rejected explicitly by the proximity filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, Located};

/// A registered driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user ID.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Display name shown in alerts and chat.
    pub name: String,
    /// Vehicle license plate shown in alerts.
    pub vehicle_plate: String,
    /// Account creation time.
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// An SOS raised by a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emergency {
    /// Emergency ID.
    pub id: String,
    /// Driver who raised it.
    pub user_id: String,
    /// Driver's display name.
    pub user_name: String,
    /// Driver's vehicle plate.
    pub vehicle_plate: String,
    /// Latitude where the SOS was raised.
    pub latitude: f64,
    /// Longitude where the SOS was raised.
    pub longitude: f64,
    /// When the SOS was raised.
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
    /// `false` once the driver cancels it.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Payload of the `emergency_alert` socket event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAlert {
    /// ID of the new emergency.
    pub emergency_id: String,
    /// Driver's display name.
    pub user_name: String,
    /// Driver's vehicle plate.
    pub vehicle_plate: String,
    /// Latitude of the SOS.
    pub latitude: f64,
    /// Longitude of the SOS.
    pub longitude: f64,
    /// When the SOS was raised.
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Kind of chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Plain text.
    #[default]
    Text,
    /// Message sent while in an emergency.
    Emergency,
    /// Shared location.
    Location,
}

/// A location-scoped chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message ID.
    pub id: String,
    /// Author ID. Absent for messages pushed over the socket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Author display name.
    pub user_name: String,
    /// Message text.
    pub message: String,
    /// Latitude where the message was sent.
    pub latitude: f64,
    /// Longitude where the message was sent.
    pub longitude: f64,
    /// Send time.
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Message kind.
    #[serde(default)]
    pub message_type: MessageType,
}

impl ChatMessage {
    /// Returns whether `user_id` wrote this message.
    #[must_use]
    pub fn is_from(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

/// Payload of the `new_chat_message` socket event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatBroadcast {
    /// Message ID.
    pub message_id: String,
    /// Author display name.
    pub user_name: String,
    /// Message text.
    pub message: String,
    /// Latitude where the message was sent.
    pub latitude: f64,
    /// Longitude where the message was sent.
    pub longitude: f64,
    /// Message kind.
    #[serde(default)]
    pub message_type: MessageType,
    /// Send time.
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
    /// The sender's own alert radius. Receivers filter with theirs.
    #[serde(default)]
    pub alert_distance_km: Option<f64>,
}

impl From<ChatBroadcast> for ChatMessage {
    fn from(b: ChatBroadcast) -> Self {
        Self {
            id: b.message_id,
            user_id: None,
            user_name: b.user_name,
            message: b.message,
            latitude: b.latitude,
            longitude: b.longitude,
            created_at: b.created_at,
            message_type: b.message_type,
        }
    }
}

/// Body of `POST /api/emergency`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmergencyRequest {
    /// Latitude of the SOS.
    pub latitude: f64,
    /// Longitude of the SOS.
    pub longitude: f64,
}

impl From<GeoPoint> for EmergencyRequest {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude(),
            longitude: point.longitude(),
        }
    }
}

/// Body of `POST /api/chat/send`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessageRequest {
    /// Message text.
    pub message: String,
    /// Sender latitude.
    pub latitude: f64,
    /// Sender longitude.
    pub longitude: f64,
    /// Message kind.
    pub message_type: MessageType,
}

impl ChatMessageRequest {
    /// Builds a request sent from `point`.
    #[must_use]
    pub fn new(message: impl Into<String>, point: GeoPoint, message_type: MessageType) -> Self {
        Self {
            message: message.into(),
            latitude: point.latitude(),
            longitude: point.longitude(),
            message_type,
        }
    }
}

macro_rules! impl_located {
    ($($ty:ty),*) => {
        $(impl Located for $ty {
            fn latitude(&self) -> f64 {
                self.latitude
            }

            fn longitude(&self) -> f64 {
                self.longitude
            }
        })*
    };
}

impl_located!(Emergency, EmergencyAlert, ChatMessage);

const fn default_true() -> bool {
    true
}

/// Timestamps from the backend.
///
/// The backend emits naive UTC ISO-8601 strings (no offset); RFC 3339 with
/// an offset is accepted too. Serialization always writes RFC 3339.
pub(crate) mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
            })
            .transpose()
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
