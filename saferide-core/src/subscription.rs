//! Subscription status and device binding.
//!
//! The app is gated behind a subscription. A new user starts a 7-day trial,
//! then pays for Premium. The current subscription is cached on the device
//! and checked on every launch; the backend binds each subscription to a
//! single device.
//!
//! # Days Left
//!
//! Partial days round up, so a trial expiring in 25 hours shows 2 days.
//! An expired or missing subscription shows 0.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SafeRideError};
use crate::feed::types::utc_timestamp;

/// Length of the free trial.
pub const TRIAL_DAYS: i64 = 7;

/// Length of one Premium billing period.
pub const PREMIUM_DAYS: i64 = 30;

/// Trial banners turn into warnings at this many days left.
pub const EXPIRY_WARNING_DAYS: i64 = 2;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionKind {
    /// Basic plan without an expiry.
    Free,
    /// Time-limited free trial.
    Trial,
    /// Paid monthly plan.
    Premium,
}

impl SubscriptionKind {
    /// Wire name of the plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Trial => "trial",
            Self::Premium => "premium",
        }
    }

    /// How long a newly activated plan lasts, if it expires.
    #[must_use]
    pub fn period(self) -> Option<Duration> {
        match self {
            Self::Free => None,
            Self::Trial => Some(Duration::days(TRIAL_DAYS)),
            Self::Premium => Some(Duration::days(PREMIUM_DAYS)),
        }
    }
}

/// Subscription cached on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Plan.
    #[serde(rename = "type")]
    pub kind: SubscriptionKind,
    /// When access ends. `None` never grants access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// When the plan was activated on this device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Activates `kind` at `now`, expiring after the plan's period.
    #[must_use]
    pub fn activate(kind: SubscriptionKind, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            expires_at: kind.period().map(|period| now + period),
            activated_at: Some(now),
        }
    }

    /// Whether the subscription still grants access at `now`.
    ///
    /// A subscription without an expiry date does not.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires > now)
    }

    /// Whether this is an active Premium plan.
    #[must_use]
    pub fn is_premium(&self, now: DateTime<Utc>) -> bool {
        self.kind == SubscriptionKind::Premium && self.is_active(now)
    }

    /// Whole days of access left at `now`, rounded up, never negative.
    #[must_use]
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        let Some(expires) = self.expires_at else {
            return 0;
        };
        let remaining = (expires - now).num_milliseconds();
        if remaining <= 0 {
            return 0;
        }
        (remaining + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }

    /// Whether the trial banner should show a warning.
    #[must_use]
    pub fn is_expiring_soon(&self, now: DateTime<Utc>) -> bool {
        self.kind == SubscriptionKind::Trial && self.days_left(now) <= EXPIRY_WARNING_DAYS
    }
}

/// Body for `POST /api/subscription/bind-device`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceBinding {
    /// Stable ID of this install.
    pub device_id: String,
    /// Human-readable device model.
    pub device_name: String,
    /// Device manufacturer.
    pub device_brand: String,
    /// Plan being bound.
    pub subscription_type: SubscriptionKind,
    /// When the plan expires.
    pub expires_at: DateTime<Utc>,
}

impl DeviceBinding {
    /// Binds `subscription` to this device.
    ///
    /// # Errors
    ///
    /// Returns [`SafeRideError::SubscriptionRequired`] if the subscription
    /// has no expiry date.
    pub fn new(
        device_id: impl Into<String>,
        device_name: impl Into<String>,
        device_brand: impl Into<String>,
        subscription: &Subscription,
    ) -> Result<Self> {
        let expires_at = subscription
            .expires_at
            .ok_or(SafeRideError::SubscriptionRequired)?;
        Ok(Self {
            device_id: device_id.into(),
            device_name: device_name.into(),
            device_brand: device_brand.into(),
            subscription_type: subscription.kind,
            expires_at,
        })
    }
}

/// Response of `GET /api/subscription/check-device`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceStatus {
    /// Always true; an unbound device gets a 404 instead.
    pub device_bound: bool,
    /// Name the device was bound with.
    pub device_name: String,
    /// Plan bound to the device.
    pub subscription_type: SubscriptionKind,
    /// Expiry recorded by the backend.
    #[serde(default, deserialize_with = "utc_timestamp::deserialize_option")]
    pub expires_at: Option<DateTime<Utc>>,
}
