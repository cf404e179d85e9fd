//! The booking entity and its status enumerations
//!
//! A booking is created once by the engine's creation flow, mutated only
//! through guarded status/payment transitions (or a stay update while still
//! pending), and never hard-deleted: terminal statuses preserve history for
//! invoicing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reservation status
///
/// `Cancelled` and `Completed` are terminal. Only the lifecycle manager
/// mutates this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked-in",
            BookingStatus::CheckedOut => "checked-out",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// Cancelled bookings do not block room availability
    pub fn blocks_availability(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status, an axis independent of the reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a booking was paid; recorded when the payment transitions to paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    BankTransfer,
}

/// Guest contact snapshot captured at creation, immutable afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Price snapshot of one selected service
///
/// Copied from the catalog at pricing time so later catalog edits cannot
/// change what the guest agreed to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub name: String,
    pub unit_price_minor: i64,
    pub quantity: u32,
}

impl ServiceLine {
    pub fn total_minor(&self) -> i64 {
        self.unit_price_minor * self.quantity as i64
    }
}

/// The central booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,

    /// Stable invoice number, assigned once at creation and never reused
    pub invoice_number: String,

    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,

    pub adults: u32,
    pub children: u32,

    /// Selected-service snapshots in selection order
    pub services: Vec<ServiceLine>,

    /// Authoritative total in minor units of the base currency, stored at
    /// creation/modification and never recomputed implicitly
    pub total_minor: i64,

    pub status: BookingStatus,
    pub payment_status: PaymentStatus,

    /// Set exactly once, when payment_status transitions to paid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,

    pub guest: GuestInfo,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Optimistic-concurrency version, incremented on every mutation
    pub version: u64,
}

impl Booking {
    /// Length of stay in whole days
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Bump updated_at and the concurrency version after a mutation
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization_is_kebab_case() {
        let json = serde_json::to_string(&BookingStatus::CheckedIn).unwrap();
        assert_eq!(json, "\"checked-in\"");

        let parsed: BookingStatus = serde_json::from_str("\"checked-out\"").unwrap();
        assert_eq!(parsed, BookingStatus::CheckedOut);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(!BookingStatus::CheckedOut.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
    }

    #[test]
    fn test_cancelled_does_not_block_availability() {
        assert!(!BookingStatus::Cancelled.blocks_availability());
        assert!(BookingStatus::Pending.blocks_availability());
        assert!(BookingStatus::CheckedOut.blocks_availability());
    }

    #[test]
    fn test_service_line_total() {
        let line = ServiceLine {
            name: "Breakfast".to_string(),
            unit_price_minor: 1_500,
            quantity: 2,
        };
        assert_eq!(line.total_minor(), 3_000);
    }
}
