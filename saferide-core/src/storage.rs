//! `SQLite` storage for device-local state.
//!
//! Holds what the mobile client keeps between launches: the logged-in
//! session, the last saved settings, the cached subscription, where the
//! floating SOS button was left, and whether the SOS button is locked by an
//! active emergency.
//! Values are stored as JSON in a single key/value table.

// SQLite operations need to hold the lock for the duration of the operation.
#![allow(clippy::significant_drop_tightening)]

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SafeRideError};
use crate::floating::ButtonPosition;
use crate::session::Session;
use crate::settings::UserSettings;
use crate::subscription::Subscription;

/// File name of the store inside the data directory.
pub const DATABASE_FILE: &str = "saferide.db";

const KEY_SESSION: &str = "session";
const KEY_SETTINGS: &str = "user_settings";
const KEY_BUTTON_POSITION: &str = "floating_button_position";
const KEY_EMERGENCY_LOCK: &str = "emergency_button_disabled";
const KEY_DEVICE_ID: &str = "device_id";
const KEY_SUBSCRIPTION: &str = "user_subscription";

/// `SQLite`-based key/value store for local client state.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Creates an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.lock()?.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SafeRideError::Storage(format!("Failed to acquire database lock: {e}")))
    }

    // ==================== Raw Key/Value ====================

    /// Stores `value` as JSON under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.lock()?.execute(
            r"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, json, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Reads the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored JSON
    /// does not match `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let json: Option<String> = self
            .lock()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        json.map(|j| serde_json::from_str(&j).map_err(SafeRideError::from))
            .transpose()
    }

    /// Deletes the value under `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.lock()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ==================== Session ====================

    /// Persists the logged-in session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.put(KEY_SESSION, session)
    }

    /// Loads the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn load_session(&self) -> Result<Option<Session>> {
        self.get(KEY_SESSION)
    }

    /// Forgets the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_session(&self) -> Result<()> {
        self.remove(KEY_SESSION)
    }

    // ==================== Settings ====================

    /// Caches the user's settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_settings(&self, settings: &UserSettings) -> Result<()> {
        self.put(KEY_SETTINGS, settings)
    }

    /// Loads cached settings, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn load_settings(&self) -> Result<UserSettings> {
        Ok(self.get(KEY_SETTINGS)?.unwrap_or_default())
    }

    // ==================== Subscription ====================

    /// Caches the user's subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.put(KEY_SUBSCRIPTION, subscription)
    }

    /// Cached subscription, if one was ever activated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn load_subscription(&self) -> Result<Option<Subscription>> {
        self.get(KEY_SUBSCRIPTION)
    }

    // ==================== Floating Button ====================

    /// Remembers where the floating button was dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_button_position(&self, position: ButtonPosition) -> Result<()> {
        self.put(KEY_BUTTON_POSITION, &position)
    }

    /// Last saved floating button position.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn load_button_position(&self) -> Result<Option<ButtonPosition>> {
        self.get(KEY_BUTTON_POSITION)
    }

    // ==================== Emergency Lock ====================

    /// Locks or unlocks the SOS button.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_emergency_locked(&self, locked: bool) -> Result<()> {
        if locked {
            self.put(KEY_EMERGENCY_LOCK, &true)
        } else {
            self.remove(KEY_EMERGENCY_LOCK)
        }
    }

    /// Whether the SOS button is locked by an active emergency.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_emergency_locked(&self) -> Result<bool> {
        Ok(self.get(KEY_EMERGENCY_LOCK)?.unwrap_or(false))
    }

    // ==================== Device ====================

    /// Stable per-install device ID, generated on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn device_id(&self) -> Result<String> {
        if let Some(id) = self.get::<String>(KEY_DEVICE_ID)? {
            return Ok(id);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.put(KEY_DEVICE_ID, &id)?;
        Ok(id)
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::User;
    use crate::subscription::SubscriptionKind;

    fn session() -> Session {
        Session::new(
            "jwt".to_string(),
            User {
                id: "u1".to_string(),
                email: "ana@example.com".to_string(),
                name: "Ana".to_string(),
                vehicle_plate: "ABC1D23".to_string(),
                created_at: Utc::now(),
            },
        )
    }

    #[test]
    fn put_get_remove() {
        let store = LocalStore::in_memory().unwrap();
        store.put("answer", &42_u32).unwrap();
        assert_eq!(store.get::<u32>("answer").unwrap(), Some(42));

        store.put("answer", &43_u32).unwrap();
        assert_eq!(store.get::<u32>("answer").unwrap(), Some(43));

        store.remove("answer").unwrap();
        assert_eq!(store.get::<u32>("answer").unwrap(), None);
    }

    #[test]
    fn get_with_wrong_type_fails() {
        let store = LocalStore::in_memory().unwrap();
        store.put("name", &"Ana").unwrap();
        let err = store.get::<u32>("name").unwrap_err();
        assert!(matches!(err, SafeRideError::Serialization(_)));
    }

    #[test]
    fn remove_missing_key_succeeds() {
        let store = LocalStore::in_memory().unwrap();
        assert!(store.remove("nothing").is_ok());
    }

    #[test]
    fn session_lifecycle() {
        let store = LocalStore::in_memory().unwrap();
        assert!(store.load_session().unwrap().is_none());

        store.save_session(&session()).unwrap();
        let loaded = store.load_session().unwrap().unwrap();
        assert_eq!(loaded.token(), "jwt");

        store.clear_session().unwrap();
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn settings_default_when_missing() {
        let store = LocalStore::in_memory().unwrap();
        assert_eq!(store.load_settings().unwrap(), UserSettings::default());

        let settings = UserSettings {
            emergency_contacts: vec!["11987654321".to_string()],
            alert_distance_km: 3.0,
        };
        store.save_settings(&settings).unwrap();
        assert_eq!(store.load_settings().unwrap(), settings);
    }

    #[test]
    fn subscription_persists() {
        let store = LocalStore::in_memory().unwrap();
        assert!(store.load_subscription().unwrap().is_none());

        let trial = Subscription::activate(SubscriptionKind::Trial, Utc::now());
        store.save_subscription(&trial).unwrap();
        assert_eq!(store.load_subscription().unwrap(), Some(trial));
    }

    #[test]
    fn subscription_reads_client_format() {
        let store = LocalStore::in_memory().unwrap();
        let cached = serde_json::json!({
            "type": "premium",
            "expiresAt": "2099-01-01T00:00:00.000Z",
        });
        store.put("user_subscription", &cached).unwrap();

        let subscription = store.load_subscription().unwrap().unwrap();
        assert!(subscription.is_premium(Utc::now()));
    }

    #[test]
    fn button_position_persists() {
        let store = LocalStore::in_memory().unwrap();
        assert!(store.load_button_position().unwrap().is_none());

        let position = ButtonPosition { x: 20.0, y: 340.0 };
        store.save_button_position(position).unwrap();
        assert_eq!(store.load_button_position().unwrap(), Some(position));
    }

    #[test]
    fn emergency_lock_toggles() {
        let store = LocalStore::in_memory().unwrap();
        assert!(!store.is_emergency_locked().unwrap());

        store.set_emergency_locked(true).unwrap();
        assert!(store.is_emergency_locked().unwrap());

        store.set_emergency_locked(false).unwrap();
        assert!(!store.is_emergency_locked().unwrap());
    }

    #[test]
    fn device_id_is_stable() {
        let store = LocalStore::in_memory().unwrap();
        let first = store.device_id().unwrap();
        let second = store.device_id().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 36);
    }
}
