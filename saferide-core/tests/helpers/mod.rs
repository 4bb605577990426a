//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use saferide_core::feed::{ChatMessage, Emergency, MessageType, User};
use saferide_core::session::Session;

/// Praça da Sé, São Paulo.
pub const SE_LAT: f64 = -23.5505;
pub const SE_LON: f64 = -46.6333;

/// Fixed "now" so window checks are deterministic.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        name: format!("Driver {id}"),
        vehicle_plate: "ABC1D23".to_string(),
        created_at: fixed_now(),
    }
}

pub fn session(id: &str) -> Session {
    Session::new(format!("token-{id}"), user(id))
}

/// An active emergency offset from Praça da Sé by `dlat`/`dlon` degrees.
pub fn emergency(id: &str, owner: &str, dlat: f64, dlon: f64) -> Emergency {
    Emergency {
        id: id.to_string(),
        user_id: owner.to_string(),
        user_name: format!("Driver {owner}"),
        vehicle_plate: "XYZ9K87".to_string(),
        latitude: SE_LAT + dlat,
        longitude: SE_LON + dlon,
        created_at: fixed_now(),
        is_active: true,
    }
}

/// A chat message offset from Praça da Sé, sent `minutes_ago` before [`fixed_now`].
pub fn chat(id: &str, dlat: f64, minutes_ago: i64) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        user_id: Some("author".to_string()),
        user_name: "Author".to_string(),
        message: format!("message {id}"),
        latitude: SE_LAT + dlat,
        longitude: SE_LON,
        created_at: fixed_now() - Duration::minutes(minutes_ago),
        message_type: MessageType::Text,
    }
}
