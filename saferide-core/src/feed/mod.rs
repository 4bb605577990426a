//! Emergencies and chat near the device.
//!
//! The backend broadcasts every SOS and chat message to every connected
//! client; each client decides what is nearby. This module holds:
//! - The payload types the backend sends ([`Emergency`], [`ChatMessage`], ...)
//! - Socket event decoding ([`SocketEvent`])
//! - The nearby feeds kept by the emergency and chat screens
//!
//! # Example Usage
//!
//! ```
//! use saferide_core::feed::{EmergencyFeed, SocketEvent};
//! use saferide_core::geo::{AlertRadius, GeoPoint, ProximityFilter};
//!
//! let here = GeoPoint::new(-23.5505, -46.6333).unwrap();
//! let filter = ProximityFilter::new(here, AlertRadius::default());
//! let mut feed = EmergencyFeed::new();
//!
//! let payload = r#"{"emergency_id":"e1","user_name":"Ana","vehicle_plate":"ABC1D23",
//!     "latitude":-23.56,"longitude":-46.64,"created_at":"2024-03-01T12:00:00"}"#;
//! let event = SocketEvent::decode("emergency_alert", payload).unwrap();
//! if let SocketEvent::EmergencyAlert(alert) = event {
//!     let nearby = feed.apply_alert(&filter, alert).unwrap();
//!     assert!(nearby.is_some());
//! }
//! ```

pub mod events;
pub mod nearby;
pub mod types;

pub use events::SocketEvent;
pub use nearby::{ChatFeed, EmergencyFeed, DEFAULT_CHAT_LIMIT, DEFAULT_CHAT_WINDOW_HOURS};
pub use types::{
    ChatBroadcast, ChatMessage, ChatMessageRequest, Emergency, EmergencyAlert, EmergencyRequest,
    MessageType, User,
};
