//! SafeRide Core Library
//!
//! Core functionality for SafeRide - driver safety alerts.
//! This crate provides the device-side logic shared by the SafeRide mobile
//! client: proximity filtering, nearby feeds, SOS and contact links, and
//! local state.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod config;
pub mod contacts;
pub mod error;
pub mod feed;
pub mod floating;
pub mod geo;
pub mod session;
pub mod settings;
pub mod storage;
pub mod subscription;

pub use api::{Notification, SafeRideCore, SosRequest};
pub use error::{Result, SafeRideError};
