//! High-level API used by the mobile shell.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use url::Url;

use crate::config::CoreConfig;
use crate::contacts;
use crate::error::{Result, SafeRideError};
use crate::feed::{
    ChatFeed, ChatMessage, ChatMessageRequest, Emergency, EmergencyAlert, EmergencyFeed,
    EmergencyRequest, MessageType, SocketEvent,
};
use crate::floating::{ButtonPosition, FloatingLayout};
use crate::geo::{GeoPoint, Nearby, ProximityFilter};
use crate::session::Session;
use crate::settings::UserSettings;
use crate::storage::{LocalStore, DATABASE_FILE};
use crate::subscription::{DeviceBinding, Subscription, SubscriptionKind};

/// Something the UI should surface after a socket event.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// An SOS was raised within the alert radius.
    NearbyEmergency(Nearby<EmergencyAlert>),
    /// An emergency in the feed was resolved.
    EmergencyResolved(String),
    /// A chat message arrived from within the alert radius.
    NearbyChat(Nearby<ChatMessage>),
    /// A chat message in the feed was deleted.
    ChatDeleted(String),
}

/// Everything the shell needs to raise an SOS.
///
/// Built by [`SafeRideCore::prepare_sos`]. The SOS only counts as raised
/// once the backend accepts `body` and the shell calls
/// [`SafeRideCore::confirm_sos`].
#[derive(Debug, Clone, PartialEq)]
pub struct SosRequest {
    /// Body for `POST /api/emergency`.
    pub body: EmergencyRequest,
    /// Endpoint to post `body` to.
    pub endpoint: Url,
    /// One WhatsApp deep link per emergency contact.
    pub whatsapp_links: Vec<Url>,
}

/// Core interface for SafeRide functionality.
///
/// Owns the session, settings, device location, nearby feeds and local
/// store. The shell performs network I/O and feeds results back in.
#[derive(Debug)]
pub struct SafeRideCore {
    config: CoreConfig,
    store: LocalStore,
    session: Option<Session>,
    settings: UserSettings,
    location: Option<GeoPoint>,
    emergencies: EmergencyFeed,
    chat: ChatFeed,
}

impl SafeRideCore {
    /// Opens the core, restoring the session and settings from the store.
    ///
    /// With `config.data_dir` set, the store lives on disk; otherwise it is
    /// kept in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open(config: CoreConfig) -> Result<Self> {
        let store = match &config.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    SafeRideError::Storage(format!("Failed to create data directory: {e}"))
                })?;
                LocalStore::open(&dir.join(DATABASE_FILE))?
            }
            None => LocalStore::in_memory()?,
        };
        Self::with_store(config, store)
    }

    /// Opens the core on an in-memory store, ignoring `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory(config: CoreConfig) -> Result<Self> {
        Self::with_store(config, LocalStore::in_memory()?)
    }

    fn with_store(config: CoreConfig, store: LocalStore) -> Result<Self> {
        let session = store.load_session()?;
        let settings = store.load_settings()?;
        if let Some(ref s) = session {
            info!("Restored session for user {}", s.user().id);
        }

        let chat = ChatFeed::with_limit(config.chat_limit);
        Ok(Self {
            config,
            store,
            session,
            settings,
            location: None,
            emergencies: EmergencyFeed::new(),
            chat,
        })
    }

    /// The configuration the core was opened with.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    // ==================== Session ====================

    /// The current session, if logged in.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a session and persists it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored.
    pub fn login(&mut self, session: Session) -> Result<()> {
        self.store.save_session(&session)?;
        info!("Logged in as {}", session.user().id);
        self.session = Some(session);
        Ok(())
    }

    /// Ends the session and clears per-user state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    pub fn logout(&mut self) -> Result<()> {
        self.store.clear_session()?;
        self.store.set_emergency_locked(false)?;
        if let Some(session) = self.session.take() {
            info!("Logged out {}", session.user().id);
        }
        self.emergencies = EmergencyFeed::new();
        self.chat = ChatFeed::with_limit(self.config.chat_limit);
        Ok(())
    }

    /// `Authorization` header value for backend requests.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::NotAuthenticated`] when logged out.
    pub fn authorization(&self) -> Result<String> {
        self.require_session().map(Session::bearer)
    }

    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(SafeRideError::NotAuthenticated)
    }

    // ==================== Location & Settings ====================

    /// Records the latest device location.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::InvalidCoordinate`] for invalid input; the
    /// previous location is kept.
    pub fn update_location(&mut self, latitude: f64, longitude: f64) -> Result<GeoPoint> {
        let point = GeoPoint::new(latitude, longitude)?;
        self.location = Some(point);
        Ok(point)
    }

    /// The last known device location.
    #[must_use]
    pub const fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Validates and saves settings edited by the user.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or an error if the store cannot be
    /// updated.
    pub fn set_settings(&mut self, settings: UserSettings) -> Result<()> {
        settings.validate()?;
        self.store.save_settings(&settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Adopts settings fetched from the backend.
    ///
    /// The backend returns defaults with no contacts for new users, so only
    /// the radius is checked here.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::InvalidRadius`] or a storage error.
    pub fn sync_settings(&mut self, settings: UserSettings) -> Result<()> {
        settings.alert_radius()?;
        self.store.save_settings(&settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Filter centered on the device with the user's radius.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::LocationUnknown`] before the first location
    /// fix, or [`SafeRideError::InvalidRadius`] for a corrupt radius.
    pub fn proximity_filter(&self) -> Result<ProximityFilter> {
        let origin = self.location.ok_or(SafeRideError::LocationUnknown)?;
        Ok(ProximityFilter::new(origin, self.settings.alert_radius()?))
    }

    // ==================== Feeds ====================

    /// Handles one socket event.
    ///
    /// Alerts and chat messages are ignored until the device location is
    /// known.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown events, malformed payloads, or payloads
    /// with invalid coordinates.
    pub fn handle_socket_event(
        &mut self,
        name: &str,
        payload: &str,
    ) -> Result<Option<Notification>> {
        let event = SocketEvent::decode(name, payload)?;

        match event {
            SocketEvent::EmergencyAlert(alert) => {
                let Some(filter) = self.filter_if_located()? else {
                    return Ok(None);
                };
                let nearby = self.emergencies.apply_alert(&filter, alert)?;
                if let Some(ref n) = nearby {
                    info!(
                        "Nearby emergency {} at {} km",
                        n.item.emergency_id, n.distance_km
                    );
                }
                Ok(nearby.map(Notification::NearbyEmergency))
            }
            SocketEvent::EmergencyResolved { emergency_id } => Ok(self
                .emergencies
                .resolve(&emergency_id)
                .then_some(Notification::EmergencyResolved(emergency_id))),
            SocketEvent::NewChatMessage(message) => {
                let Some(filter) = self.filter_if_located()? else {
                    return Ok(None);
                };
                Ok(self
                    .chat
                    .apply_message(&filter, message)?
                    .map(Notification::NearbyChat))
            }
            SocketEvent::ChatMessageDeleted { message_id } => Ok(self
                .chat
                .remove(&message_id)
                .then_some(Notification::ChatDeleted(message_id))),
        }
    }

    fn filter_if_located(&self) -> Result<Option<ProximityFilter>> {
        match self.proximity_filter() {
            Ok(filter) => Ok(Some(filter)),
            Err(SafeRideError::LocationUnknown) => {
                debug!("Ignoring event received before first location fix");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Rebuilds the emergency feed from `GET /api/emergencies/nearby`.
    ///
    /// # Errors
    ///
    /// Returns an error when logged out or before the first location fix.
    pub fn refresh_emergencies(&mut self, emergencies: Vec<Emergency>) -> Result<usize> {
        let filter = self.proximity_filter()?;
        let viewer = self.require_session()?.user().id.clone();
        Ok(self.emergencies.replace(&filter, &viewer, emergencies))
    }

    /// Rebuilds the chat feed from `GET /api/chat/nearby`.
    ///
    /// # Errors
    ///
    /// Returns an error before the first location fix.
    pub fn refresh_chat(
        &mut self,
        messages: Vec<ChatMessage>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let filter = self.proximity_filter()?;
        let window = Duration::hours(self.config.chat_window_hours);
        Ok(self.chat.replace(&filter, messages, now, window))
    }

    /// Nearby emergencies.
    #[must_use]
    pub const fn emergencies(&self) -> &EmergencyFeed {
        &self.emergencies
    }

    /// Nearby chat.
    #[must_use]
    pub const fn chat(&self) -> &ChatFeed {
        &self.chat
    }

    /// URL to re-fetch nearby emergencies from.
    ///
    /// # Errors
    ///
    /// Returns an error before the first location fix or for a bad backend
    /// URL.
    pub fn nearby_emergencies_url(&self) -> Result<Url> {
        let origin = self.location.ok_or(SafeRideError::LocationUnknown)?;
        self.config.nearby_emergencies_url(origin)
    }

    /// URL to re-fetch nearby chat from.
    ///
    /// # Errors
    ///
    /// Returns an error before the first location fix or for a bad backend
    /// URL.
    pub fn nearby_chat_url(&self) -> Result<Url> {
        let origin = self.location.ok_or(SafeRideError::LocationUnknown)?;
        self.config.nearby_chat_url(origin)
    }

    /// Body for `POST /api/chat/send` from the current location.
    ///
    /// # Errors
    ///
    /// Returns an error when logged out or before the first location fix.
    pub fn chat_request(
        &self,
        message: impl Into<String>,
        message_type: MessageType,
    ) -> Result<ChatMessageRequest> {
        self.require_session()?;
        let origin = self.location.ok_or(SafeRideError::LocationUnknown)?;
        Ok(ChatMessageRequest::new(message, origin, message_type))
    }

    /// Endpoint for deleting one of the user's own chat messages.
    ///
    /// The feed entry is removed when the backend broadcasts
    /// `chat_message_deleted`.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::NotMessageAuthor`] if the feed shows the
    /// message was written by someone else, or an error when logged out.
    pub fn delete_chat_message(&self, message_id: &str) -> Result<Url> {
        let me = &self.require_session()?.user().id;
        let foreign = self.chat.messages().iter().any(|n| {
            n.item.id == message_id && n.item.user_id.as_ref().is_some_and(|id| id != me)
        });
        if foreign {
            return Err(SafeRideError::NotMessageAuthor(message_id.to_string()));
        }
        self.config.chat_message_url(message_id)
    }

    // ==================== SOS ====================

    /// Builds the SOS request for the current location.
    ///
    /// Returns the backend request plus WhatsApp links for every emergency
    /// contact. Nothing is locked yet: call [`confirm_sos`](Self::confirm_sos)
    /// once the backend accepts the request. If the request fails the button
    /// stays available and this can simply be called again.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::EmergencyActive`] if an SOS is already
    /// active, or an error when logged out or before the first location fix.
    pub fn prepare_sos(&self) -> Result<SosRequest> {
        let session = self.require_session()?;
        let origin = self.location.ok_or(SafeRideError::LocationUnknown)?;
        if self.store.is_emergency_locked()? {
            return Err(SafeRideError::EmergencyActive);
        }

        let whatsapp_links =
            contacts::emergency_links(session.user(), origin, &self.settings.emergency_contacts)?;
        debug!(
            "SOS prepared at {}, {} contacts to notify",
            contacts::maps_link(origin),
            whatsapp_links.len()
        );
        Ok(SosRequest {
            body: EmergencyRequest::from(origin),
            endpoint: self.config.api_url("emergency")?,
            whatsapp_links,
        })
    }

    /// Records that the backend accepted the SOS and locks the button until
    /// [`cancel_sos`](Self::cancel_sos).
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::EmergencyActive`] if an SOS is already
    /// active, or an error when logged out or if the store cannot be updated.
    pub fn confirm_sos(&mut self) -> Result<()> {
        self.require_session()?;
        if self.store.is_emergency_locked()? {
            return Err(SafeRideError::EmergencyActive);
        }
        self.store.set_emergency_locked(true)?;
        info!("SOS raised");
        Ok(())
    }

    /// Unlocks the SOS button after the emergency was cancelled.
    ///
    /// Returns the endpoint to post the cancellation to.
    ///
    /// # Errors
    ///
    /// Returns an error when logged out or if the store cannot be updated.
    pub fn cancel_sos(&mut self) -> Result<Url> {
        self.require_session()?;
        self.store.set_emergency_locked(false)?;
        info!("SOS cancelled");
        self.config.api_url("emergency/cancel")
    }

    /// Whether an SOS raised from this device is still active.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_sos_active(&self) -> Result<bool> {
        self.store.is_emergency_locked()
    }

    // ==================== Floating Button ====================

    /// Where to draw the floating SOS button.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn floating_button_position(&self, layout: &FloatingLayout) -> Result<ButtonPosition> {
        Ok(self
            .store
            .load_button_position()?
            .unwrap_or_else(|| layout.default_position()))
    }

    /// Finishes a drag of the floating button and remembers the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    pub fn release_floating_button(
        &self,
        layout: &FloatingLayout,
        dx: f64,
        dy: f64,
    ) -> Result<ButtonPosition> {
        let start = self.floating_button_position(layout)?;
        let position = layout.release(start, dx, dy);
        self.store.save_button_position(position)?;
        Ok(position)
    }

    // ==================== Subscription ====================

    /// Subscription cached on this device.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn subscription(&self) -> Result<Option<Subscription>> {
        self.store.load_subscription()
    }

    /// Whether the app may be used at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> Result<bool> {
        Ok(self
            .subscription()?
            .is_some_and(|subscription| subscription.is_active(now)))
    }

    /// Starts `kind` at `now` and caches it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    pub fn activate_subscription(
        &self,
        kind: SubscriptionKind,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        let subscription = Subscription::activate(kind, now);
        self.store.save_subscription(&subscription)?;
        info!("Activated {} subscription", kind.as_str());
        Ok(subscription)
    }

    /// Body binding the cached subscription to this device.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::SubscriptionRequired`] without a
    /// subscription that expires, or an error when logged out.
    pub fn device_binding(
        &self,
        device_name: impl Into<String>,
        device_brand: impl Into<String>,
    ) -> Result<DeviceBinding> {
        self.require_session()?;
        let subscription = self
            .subscription()?
            .ok_or(SafeRideError::SubscriptionRequired)?;
        DeviceBinding::new(self.device_id()?, device_name, device_brand, &subscription)
    }

    /// URL asking the backend whether this device holds the subscription.
    ///
    /// # Errors
    ///
    /// Returns an error when logged out or for a bad backend URL.
    pub fn check_device_url(&self) -> Result<Url> {
        self.require_session()?;
        self.config.check_device_url(&self.device_id()?)
    }

    /// Stable ID of this install, used for subscription device binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be accessed.
    pub fn device_id(&self) -> Result<String> {
        self.store.device_id()
    }
}
