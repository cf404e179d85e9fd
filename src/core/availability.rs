//! Room availability resolution
//!
//! A room is available for a candidate range iff no non-cancelled booking
//! for that room overlaps it. Stay ranges are half-open: a booking checking
//! out on a date does not conflict with one checking in the same date.
//!
//! The resolver is the read-side used by search and the availability
//! endpoint. Booking creation does not rely on a prior resolver answer:
//! the store re-checks inside its insert so check + insert stay atomic.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::booking::Booking;
use crate::core::error::EngineError;
use crate::storage::BookingStore;

/// Half-open range overlap: [a1, a2) and [b1, b2) intersect iff
/// `a1 < b2 && b1 < a2`.
pub fn ranges_overlap(a1: NaiveDate, a2: NaiveDate, b1: NaiveDate, b2: NaiveDate) -> bool {
    a1 < b2 && b1 < a2
}

/// Read-side availability checks over the booking store
#[derive(Clone)]
pub struct AvailabilityResolver {
    store: Arc<dyn BookingStore>,
}

impl AvailabilityResolver {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Non-cancelled bookings for `room_id` overlapping the candidate range
    ///
    /// `excluding` exempts a booking from its own conflict check, used when
    /// modifying an existing booking's dates.
    pub async fn conflicts(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        excluding: Option<Uuid>,
    ) -> Result<Vec<Booking>, EngineError> {
        if check_out <= check_in {
            return Err(EngineError::InvalidDateRange {
                check_in,
                check_out,
            });
        }

        self.store
            .find_overlapping(room_id, check_in, check_out, excluding)
            .await
            .map_err(EngineError::from)
    }

    /// Whether the room is free over the candidate range
    pub async fn is_available(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        excluding: Option<Uuid>,
    ) -> Result<bool, EngineError> {
        Ok(self
            .conflicts(room_id, check_in, check_out, excluding)
            .await?
            .is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_overlapping_ranges() {
        // Contained
        assert!(ranges_overlap(
            date("2025-06-10"),
            date("2025-06-15"),
            date("2025-06-12"),
            date("2025-06-14"),
        ));
        // Partial overlap on either side
        assert!(ranges_overlap(
            date("2025-06-10"),
            date("2025-06-15"),
            date("2025-06-14"),
            date("2025-06-20"),
        ));
        assert!(ranges_overlap(
            date("2025-06-10"),
            date("2025-06-15"),
            date("2025-06-05"),
            date("2025-06-11"),
        ));
        // Identical
        assert!(ranges_overlap(
            date("2025-06-10"),
            date("2025-06-15"),
            date("2025-06-10"),
            date("2025-06-15"),
        ));
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        // Check-out day equals check-in day of the next stay
        assert!(!ranges_overlap(
            date("2025-06-10"),
            date("2025-06-15"),
            date("2025-06-15"),
            date("2025-06-20"),
        ));
        assert!(!ranges_overlap(
            date("2025-06-15"),
            date("2025-06-20"),
            date("2025-06-10"),
            date("2025-06-15"),
        ));
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        assert!(!ranges_overlap(
            date("2025-06-01"),
            date("2025-06-05"),
            date("2025-06-10"),
            date("2025-06-12"),
        ));
    }
}
