//! Nearby emergency and chat feeds.
//!
//! Both feeds are rebuilt from a backend fetch (`replace`) and then kept up
//! to date by socket events in between fetches.

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};

use super::types::{ChatMessage, Emergency, EmergencyAlert};
use crate::error::Result;
use crate::geo::{Nearby, ProximityFilter};

/// How far back the chat feed looks.
pub const DEFAULT_CHAT_WINDOW_HOURS: i64 = 24;

/// Default number of chat messages kept in the feed.
pub const DEFAULT_CHAT_LIMIT: usize = 50;

/// Active emergencies near the device.
#[derive(Debug, Clone, Default)]
pub struct EmergencyFeed {
    entries: Vec<Nearby<Emergency>>,
    stale: bool,
}

impl EmergencyFeed {
    /// Creates an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the feed from a list of emergencies.
    ///
    /// Keeps active emergencies raised by someone other than `viewer_id`
    /// that lie inside the filter's radius. Entries with invalid coordinates
    /// are dropped with a warning. Returns the number of entries kept.
    pub fn replace(
        &mut self,
        filter: &ProximityFilter,
        viewer_id: &str,
        emergencies: Vec<Emergency>,
    ) -> usize {
        self.entries = emergencies
            .into_iter()
            .filter(|e| e.is_active && e.user_id != viewer_id)
            .filter_map(|e| {
                let id = e.id.clone();
                filter.annotate(e).unwrap_or_else(|err| {
                    warn!("Dropping emergency {id}: {err}");
                    None
                })
            })
            .collect();
        self.stale = false;
        debug!("Emergency feed rebuilt with {} entries", self.entries.len());
        self.entries.len()
    }

    /// Checks a pushed alert against the filter.
    ///
    /// Returns the annotated alert when it is in range and marks the feed
    /// stale so the host re-fetches the full list.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert carries invalid coordinates.
    pub fn apply_alert(
        &mut self,
        filter: &ProximityFilter,
        alert: EmergencyAlert,
    ) -> Result<Option<Nearby<EmergencyAlert>>> {
        let nearby = filter.annotate(alert)?;
        if nearby.is_some() {
            self.stale = true;
        }
        Ok(nearby)
    }

    /// Removes a resolved emergency. Returns whether it was present.
    pub fn resolve(&mut self, emergency_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.item.id != emergency_id);
        before != self.entries.len()
    }

    /// Current entries in fetch order.
    #[must_use]
    pub fn entries(&self) -> &[Nearby<Emergency>] {
        &self.entries
    }

    /// Whether an in-range alert arrived since the last rebuild.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the feed is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recent chat messages near the device, newest first, capped at a limit.
#[derive(Debug, Clone)]
pub struct ChatFeed {
    messages: Vec<Nearby<ChatMessage>>,
    limit: usize,
}

impl Default for ChatFeed {
    fn default() -> Self {
        Self::with_limit(DEFAULT_CHAT_LIMIT)
    }
}

impl ChatFeed {
    /// Creates an empty feed holding at most [`DEFAULT_CHAT_LIMIT`] messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty feed holding at most `limit` messages.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            messages: Vec::new(),
            limit,
        }
    }

    /// Maximum number of messages kept.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Rebuilds the feed from a list of messages.
    ///
    /// Keeps messages sent within `window` before `now` and inside the
    /// filter's radius, newest first, at most [`limit`](Self::limit) of them.
    pub fn replace(
        &mut self,
        filter: &ProximityFilter,
        mut messages: Vec<ChatMessage>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> usize {
        let cutoff = now - window;
        messages.retain(|m| m.created_at >= cutoff);
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.messages = messages
            .into_iter()
            .filter_map(|m| {
                let id = m.id.clone();
                filter.annotate(m).unwrap_or_else(|err| {
                    warn!("Dropping chat message {id}: {err}");
                    None
                })
            })
            .take(self.limit)
            .collect();
        self.messages.len()
    }

    /// Adds a pushed message to the top of the feed if it is in range.
    ///
    /// A message already in the feed is not added twice. The oldest
    /// messages fall off once the feed is over its limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the message carries invalid coordinates.
    pub fn apply_message(
        &mut self,
        filter: &ProximityFilter,
        message: ChatMessage,
    ) -> Result<Option<Nearby<ChatMessage>>> {
        if self.messages.iter().any(|n| n.item.id == message.id) {
            return Ok(None);
        }
        let nearby = filter.annotate(message)?;
        if let Some(ref entry) = nearby {
            self.messages.insert(0, entry.clone());
            self.messages.truncate(self.limit);
        }
        Ok(nearby)
    }

    /// Removes a deleted message. Returns whether it was present.
    pub fn remove(&mut self, message_id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|n| n.item.id != message_id);
        before != self.messages.len()
    }

    /// Current messages, newest first.
    #[must_use]
    pub fn messages(&self) -> &[Nearby<ChatMessage>] {
        &self.messages
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the feed is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
