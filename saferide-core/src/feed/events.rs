//! Socket events pushed by the backend.

use serde::Deserialize;

use super::types::{ChatBroadcast, ChatMessage, EmergencyAlert};
use crate::error::{Result, SafeRideError};

/// Event name for a newly raised SOS.
pub const EMERGENCY_ALERT: &str = "emergency_alert";
/// Event name for a cancelled SOS.
pub const EMERGENCY_RESOLVED: &str = "emergency_resolved";
/// Event name for a new chat message.
pub const NEW_CHAT_MESSAGE: &str = "new_chat_message";
/// Event name for a deleted chat message.
pub const CHAT_MESSAGE_DELETED: &str = "chat_message_deleted";

/// A decoded socket event.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// A driver raised an SOS somewhere.
    EmergencyAlert(EmergencyAlert),
    /// An SOS was cancelled.
    EmergencyResolved {
        /// ID of the resolved emergency.
        emergency_id: String,
    },
    /// A chat message was posted somewhere.
    NewChatMessage(ChatMessage),
    /// A chat message was deleted by its author.
    ChatMessageDeleted {
        /// ID of the deleted message.
        message_id: String,
    },
}

#[derive(Deserialize)]
struct EmergencyResolvedPayload {
    emergency_id: String,
}

#[derive(Deserialize)]
struct ChatMessageDeletedPayload {
    message_id: String,
}

impl SocketEvent {
    /// Decodes an event from its name and JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::UnknownEvent`] for unhandled event names and
    /// [`SafeRideError::Serialization`] for malformed payloads.
    ///
    /// # Examples
    ///
    /// ```
    /// use saferide_core::feed::SocketEvent;
    ///
    /// let event = SocketEvent::decode("emergency_resolved", r#"{"emergency_id":"e1"}"#).unwrap();
    /// assert_eq!(event, SocketEvent::EmergencyResolved { emergency_id: "e1".into() });
    /// ```
    pub fn decode(name: &str, payload: &str) -> Result<Self> {
        match name {
            EMERGENCY_ALERT => Ok(Self::EmergencyAlert(serde_json::from_str(payload)?)),
            EMERGENCY_RESOLVED => {
                let p: EmergencyResolvedPayload = serde_json::from_str(payload)?;
                Ok(Self::EmergencyResolved {
                    emergency_id: p.emergency_id,
                })
            }
            NEW_CHAT_MESSAGE => {
                let broadcast: ChatBroadcast = serde_json::from_str(payload)?;
                Ok(Self::NewChatMessage(broadcast.into()))
            }
            CHAT_MESSAGE_DELETED => {
                let p: ChatMessageDeletedPayload = serde_json::from_str(payload)?;
                Ok(Self::ChatMessageDeleted {
                    message_id: p.message_id,
                })
            }
            other => Err(SafeRideError::UnknownEvent(other.to_string())),
        }
    }

    /// The wire name of this event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EmergencyAlert(_) => EMERGENCY_ALERT,
            Self::EmergencyResolved { .. } => EMERGENCY_RESOLVED,
            Self::NewChatMessage(_) => NEW_CHAT_MESSAGE,
            Self::ChatMessageDeleted { .. } => CHAT_MESSAGE_DELETED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_emergency_alert() {
        let payload = r#"{
            "emergency_id": "e1", "user_name": "Ana", "vehicle_plate": "ABC1D23",
            "latitude": -23.55, "longitude": -46.63, "created_at": "2024-03-01T12:00:00.5"
        }"#;
        let event = SocketEvent::decode(EMERGENCY_ALERT, payload).unwrap();
        match event {
            SocketEvent::EmergencyAlert(alert) => {
                assert_eq!(alert.emergency_id, "e1");
                assert_eq!(alert.vehicle_plate, "ABC1D23");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn decode_new_chat_message() {
        let payload = r#"{
            "message_id": "m1", "user_name": "Bia", "message": "via bloqueada",
            "latitude": 0.0, "longitude": 0.0, "message_type": "text",
            "created_at": "2024-03-01T12:00:00", "alert_distance_km": 10.0
        }"#;
        let event = SocketEvent::decode(NEW_CHAT_MESSAGE, payload).unwrap();
        assert_eq!(event.name(), NEW_CHAT_MESSAGE);
        let SocketEvent::NewChatMessage(message) = event else {
            panic!("expected chat message");
        };
        assert_eq!(message.id, "m1");
    }

    #[test]
    fn decode_chat_message_deleted() {
        let event = SocketEvent::decode(CHAT_MESSAGE_DELETED, r#"{"message_id":"m1"}"#).unwrap();
        assert_eq!(
            event,
            SocketEvent::ChatMessageDeleted {
                message_id: "m1".to_string()
            }
        );
    }

    #[test]
    fn decode_unknown_event_fails() {
        let err = SocketEvent::decode("connect", "{}").unwrap_err();
        assert!(matches!(err, SafeRideError::UnknownEvent(name) if name == "connect"));
    }

    #[test]
    fn decode_malformed_payload_fails() {
        let err = SocketEvent::decode(EMERGENCY_RESOLVED, r#"{"id":"e1"}"#).unwrap_err();
        assert!(matches!(err, SafeRideError::Serialization(_)));
    }
}
