//! Store traits and backends for bookings and the rate catalog
//!
//! The persistence layer is an external collaborator; the engine only
//! depends on these traits. The in-memory backend doubles as the test
//! harness and the development default.

pub mod in_memory;

pub use in_memory::{InMemoryBookingStore, InMemoryCatalog};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::core::booking::{Booking, BookingStatus, PaymentMethod, PaymentStatus, ServiceLine};
use crate::core::catalog::{RoomRate, ServiceDefinition};
use crate::core::error::EngineError;

/// Errors surfaced by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("booking '{0}' not found")]
    BookingNotFound(Uuid),

    #[error("room '{room_id}' is already booked over the requested dates")]
    Unavailable { room_id: Uuid, conflicts: Vec<Uuid> },

    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BookingNotFound(id) => EngineError::NotFound {
                kind: "booking",
                id: id.to_string(),
            },
            StoreError::Unavailable { room_id, conflicts } => {
                EngineError::RoomUnavailable { room_id, conflicts }
            }
            StoreError::VersionConflict { expected, actual } => {
                EngineError::StaleVersion { expected, actual }
            }
            StoreError::Backend(msg) => EngineError::Internal(msg),
        }
    }
}

/// Store for bookings
///
/// Implementations must make `insert` atomic with respect to the overlap
/// check (a serializing transaction scope or an exclusion constraint), and
/// must apply `update_status`/`update_stay` as a compare-and-swap on the
/// booking version so concurrent mutations cannot apply against a stale read.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Insert a new booking after verifying no non-cancelled booking for the
    /// same room overlaps its date range; assigns the invoice number.
    ///
    /// Check and insert happen as one logical unit: of two concurrent
    /// inserts for overlapping dates on one room, exactly one succeeds and
    /// the other gets `StoreError::Unavailable`.
    async fn insert(&self, booking: Booking) -> Result<Booking, StoreError>;

    /// Get a booking by ID
    async fn get(&self, id: &Uuid) -> Result<Option<Booking>, StoreError>;

    /// List all bookings
    async fn list(&self) -> Result<Vec<Booking>, StoreError>;

    /// Non-cancelled bookings for `room_id` whose stay overlaps
    /// `[check_in, check_out)`, excluding `excluding` if given
    async fn find_overlapping(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        excluding: Option<Uuid>,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Compare-and-swap the status axes of a booking
    ///
    /// Fails with `VersionConflict` when `expected_version` does not match
    /// the stored version. On success the booking's `updated_at` is bumped
    /// and its version incremented.
    async fn update_status(
        &self,
        id: &Uuid,
        expected_version: u64,
        status: BookingStatus,
        payment_status: PaymentStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Booking, StoreError>;

    /// Compare-and-swap the stay of a pending booking: room, dates,
    /// occupancy, service snapshots, and the freshly computed total
    ///
    /// Re-runs the overlap check against the target room (excluding the
    /// booking itself) inside the same critical section as the write.
    #[allow(clippy::too_many_arguments)]
    async fn update_stay(
        &self,
        id: &Uuid,
        expected_version: u64,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
        children: u32,
        services: Vec<ServiceLine>,
        total_minor: i64,
    ) -> Result<Booking, StoreError>;
}

/// Read API over room rates and the optional-service catalog
///
/// Read-only from the engine's perspective. An empty catalog means "no
/// optional services", never an error.
#[async_trait]
pub trait RateCatalog: Send + Sync {
    /// Get a room's rate and capacity
    async fn get_room(&self, room_id: &Uuid) -> Result<Option<RoomRate>, StoreError>;

    /// List all rooms
    async fn list_rooms(&self) -> Result<Vec<RoomRate>, StoreError>;

    /// List the service catalog in display order
    async fn list_services(&self) -> Result<Vec<ServiceDefinition>, StoreError>;
}
