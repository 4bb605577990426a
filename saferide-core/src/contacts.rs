//! WhatsApp notifications for emergency contacts.
//!
//! The client cannot send WhatsApp messages itself; it opens one `wa.me`
//! deep link per contact with the SOS text pre-filled. This module builds
//! those links. Opening them is left to the host platform.

use log::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::feed::User;
use crate::geo::GeoPoint;

const WHATSAPP_BASE: &str = "https://wa.me/";

/// Brazilian country code prepended to local numbers.
const COUNTRY_CODE: &str = "55";

/// Normalizes a contact number for `wa.me`.
///
/// Keeps only digits and `+`. Numbers without a leading `+` lose their
/// leading zeros; an 11-digit mobile number starting with `9` gets the
/// country code, and a 10-digit number gets the country code plus the
/// mobile `9` prefix.
///
/// # Examples
///
/// ```
/// use saferide_core::contacts::normalize_phone;
///
/// assert_eq!(normalize_phone("+55 (11) 98765-4321"), "+5511987654321");
/// assert_eq!(normalize_phone("0 91234-567890"), "5591234567890");
/// assert_eq!(normalize_phone("1123456789"), "5591123456789");
/// ```
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let clean: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if clean.starts_with('+') {
        return clean;
    }

    let local = clean.trim_start_matches('0');
    match local.len() {
        11 if local.starts_with('9') => format!("{COUNTRY_CODE}{local}"),
        10 => format!("{COUNTRY_CODE}9{local}"),
        _ => local.to_string(),
    }
}

/// Google Maps link for a point.
#[must_use]
pub fn maps_link(point: GeoPoint) -> String {
    format!(
        "https://www.google.com/maps?q={},{}",
        point.latitude(),
        point.longitude()
    )
}

/// The SOS text sent to every emergency contact.
#[must_use]
pub fn emergency_message(user: &User, point: GeoPoint) -> String {
    format!(
        "🚨 EMERGÊNCIA - SafeRide 🚨\n\n\
         {} ({}) está em uma situação de emergência!\n\n\
         📍 Localização em tempo real:\n{}\n\n\
         ⚠️ Entre em contato imediatamente ou acione as autoridades:\n\
         🚨 190 - Polícia\n\
         🚑 192 - SAMU\n\
         🚒 193 - Bombeiros",
        user.name,
        user.vehicle_plate,
        maps_link(point)
    )
}

/// Builds a `wa.me` deep link with `message` pre-filled.
///
/// # Errors
///
/// Returns an error if the resulting URL cannot be parsed.
///
/// # Examples
///
/// ```
/// use saferide_core::contacts::whatsapp_link;
///
/// let link = whatsapp_link("5511987654321", "socorro").unwrap();
/// assert_eq!(link.as_str(), "https://wa.me/5511987654321?text=socorro");
/// ```
pub fn whatsapp_link(phone: &str, message: &str) -> Result<Url> {
    let base = format!("{WHATSAPP_BASE}{phone}");
    Ok(Url::parse_with_params(&base, &[("text", message)])?)
}

/// One deep link per emergency contact.
///
/// Contacts that normalize to an empty number are skipped.
///
/// # Errors
///
/// Returns an error if a link cannot be built.
pub fn emergency_links(user: &User, point: GeoPoint, contacts: &[String]) -> Result<Vec<Url>> {
    let message = emergency_message(user, point);
    let mut links = Vec::with_capacity(contacts.len());

    for contact in contacts {
        let number = normalize_phone(contact);
        if number.is_empty() || number == "+" {
            warn!("Skipping emergency contact with no digits: {contact:?}");
            continue;
        }
        links.push(whatsapp_link(&number, &message)?);
    }

    debug!("Built {} WhatsApp links", links.len());
    Ok(links)
}
