//! Room rates and the optional-service catalog
//!
//! Pure data looked up by the pricing calculator and booking creation.
//! Live catalog changes never retroactively affect an existing booking:
//! bookings store price snapshots, not references into the catalog.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nightly rate and capacity limits for a room
///
/// Immutable per booking: the stored total is computed from the rate in
/// effect at creation/modification time and is never recomputed implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRate {
    pub room_id: Uuid,

    /// Human-readable room name for listings
    pub name: String,

    /// Price per night in minor units (cents) of the base currency
    pub nightly_price_minor: i64,

    pub max_adults: u32,
    pub max_children: u32,
}

impl RoomRate {
    /// Check whether the requested occupancy fits this room
    pub fn fits(&self, adults: u32, children: u32) -> bool {
        adults <= self.max_adults && children <= self.max_children
    }
}

/// How an optional service is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Charged once per booking, regardless of guest count
    FlatOnce,
    /// Charged per guest
    PerGuest,
}

/// An optional add-on service offered alongside a room
///
/// The `service_key` is assigned once when the catalog entry is created and
/// never re-derived at read time, so later renames cannot silently change
/// which service a stored selection refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Stable identifier, derived from the name at creation time
    pub service_key: String,

    /// Human-readable name shown on invoices
    pub name: String,

    /// Unit price in minor units of the base currency
    pub price_minor: i64,

    pub pricing_mode: PricingMode,
}

/// Derive a stable service key from a human-readable name
///
/// Lowercases, maps runs of non-alphanumeric characters to a single `-`,
/// and trims leading/trailing separators. "Airport Shuttle" → "airport-shuttle".
pub fn service_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut last_was_sep = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            key.push('-');
            last_was_sep = true;
        }
    }
    while key.ends_with('-') {
        key.pop();
    }
    key
}
