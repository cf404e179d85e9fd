//! In-memory store implementations for testing and development
//!
//! Uses RwLock for thread-safe access. The write lock doubles as the
//! serializing transaction scope required by the booking store contract:
//! overlap checks and version checks happen inside the same critical
//! section as the write they protect.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::core::availability::ranges_overlap;
use crate::core::booking::{Booking, BookingStatus, PaymentMethod, PaymentStatus, ServiceLine};
use crate::core::catalog::{PricingMode, RoomRate, ServiceDefinition, service_key};
use crate::storage::{BookingStore, RateCatalog, StoreError};

/// In-memory booking store
#[derive(Clone)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
    invoice_seq: Arc<AtomicU64>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self {
            bookings: Arc::new(RwLock::new(HashMap::new())),
            invoice_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    fn next_invoice_number(&self) -> String {
        let seq = self.invoice_seq.fetch_add(1, Ordering::SeqCst);
        format!("INV-{:06}", seq)
    }

    fn conflicts_locked(
        bookings: &HashMap<Uuid, Booking>,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        excluding: Option<Uuid>,
    ) -> Vec<Booking> {
        let mut conflicts: Vec<Booking> = bookings
            .values()
            .filter(|b| {
                b.room_id == room_id
                    && b.status.blocks_availability()
                    && excluding != Some(b.id)
                    && ranges_overlap(b.check_in, b.check_out, check_in, check_out)
            })
            .cloned()
            .collect();
        conflicts.sort_by_key(|b| b.check_in);
        conflicts
    }
}

impl Default for InMemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, mut booking: Booking) -> Result<Booking, StoreError> {
        let mut bookings = self
            .bookings
            .write()
            .map_err(|e| StoreError::Backend(format!("failed to acquire write lock: {}", e)))?;

        // Overlap check and insert share the write lock, so concurrent
        // inserts for the same room serialize here.
        let conflicts = Self::conflicts_locked(
            &bookings,
            booking.room_id,
            booking.check_in,
            booking.check_out,
            None,
        );
        if !conflicts.is_empty() {
            return Err(StoreError::Unavailable {
                room_id: booking.room_id,
                conflicts: conflicts.iter().map(|b| b.id).collect(),
            });
        }

        booking.invoice_number = self.next_invoice_number();
        bookings.insert(booking.id, booking.clone());

        Ok(booking)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Booking>, StoreError> {
        let bookings = self
            .bookings
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {}", e)))?;

        Ok(bookings.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Booking>, StoreError> {
        let bookings = self
            .bookings
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {}", e)))?;

        let mut all: Vec<Booking> = bookings.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn find_overlapping(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        excluding: Option<Uuid>,
    ) -> Result<Vec<Booking>, StoreError> {
        let bookings = self
            .bookings
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {}", e)))?;

        Ok(Self::conflicts_locked(
            &bookings, room_id, check_in, check_out, excluding,
        ))
    }

    async fn update_status(
        &self,
        id: &Uuid,
        expected_version: u64,
        status: BookingStatus,
        payment_status: PaymentStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Booking, StoreError> {
        let mut bookings = self
            .bookings
            .write()
            .map_err(|e| StoreError::Backend(format!("failed to acquire write lock: {}", e)))?;

        let booking = bookings
            .get_mut(id)
            .ok_or(StoreError::BookingNotFound(*id))?;

        if booking.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual: booking.version,
            });
        }

        booking.status = status;
        booking.payment_status = payment_status;
        if let Some(method) = payment_method {
            booking.payment_method = Some(method);
        }
        booking.touch();

        Ok(booking.clone())
    }

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
    ) -> Result<Booking, StoreError> {
        let mut bookings = self
            .bookings
            .write()
            .map_err(|e| StoreError::Backend(format!("failed to acquire write lock: {}", e)))?;

        let current = bookings.get(id).ok_or(StoreError::BookingNotFound(*id))?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual: current.version,
            });
        }

        let conflicts =
            Self::conflicts_locked(&bookings, room_id, check_in, check_out, Some(*id));
        if !conflicts.is_empty() {
            return Err(StoreError::Unavailable {
                room_id,
                conflicts: conflicts.iter().map(|b| b.id).collect(),
            });
        }

        let booking = bookings
            .get_mut(id)
            .ok_or(StoreError::BookingNotFound(*id))?;
        booking.room_id = room_id;
        booking.check_in = check_in;
        booking.check_out = check_out;
        booking.adults = adults;
        booking.children = children;
        booking.services = services;
        booking.total_minor = total_minor;
        booking.touch();

        Ok(booking.clone())
    }
}

/// In-memory room and service catalog
///
/// Services keep insertion order (display order). Service keys are derived
/// once at registration; a colliding key is rejected rather than silently
/// overwritten.
#[derive(Clone)]
pub struct InMemoryCatalog {
    rooms: Arc<RwLock<HashMap<Uuid, RoomRate>>>,
    services: Arc<RwLock<IndexMap<String, ServiceDefinition>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            services: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Register a room and return its rate entry
    pub fn add_room(
        &self,
        name: &str,
        nightly_price_minor: i64,
        max_adults: u32,
        max_children: u32,
    ) -> RoomRate {
        let rate = RoomRate {
            room_id: Uuid::new_v4(),
            name: name.to_string(),
            nightly_price_minor,
            max_adults,
            max_children,
        };
        self.rooms
            .write()
            .expect("room catalog lock poisoned")
            .insert(rate.room_id, rate.clone());
        rate
    }

    /// Register an optional service; the stable key is derived here, once
    pub fn add_service(
        &self,
        name: &str,
        price_minor: i64,
        pricing_mode: PricingMode,
    ) -> Result<ServiceDefinition> {
        let key = service_key(name);
        if key.is_empty() {
            bail!("service name '{}' produces an empty key", name);
        }

        let mut services = self
            .services
            .write()
            .map_err(|e| anyhow::anyhow!("failed to acquire write lock: {}", e))?;

        if services.contains_key(&key) {
            bail!("service key '{}' already exists in the catalog", key);
        }

        let definition = ServiceDefinition {
            service_key: key.clone(),
            name: name.to_string(),
            price_minor,
            pricing_mode,
        };
        services.insert(key, definition.clone());

        Ok(definition)
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateCatalog for InMemoryCatalog {
    async fn get_room(&self, room_id: &Uuid) -> Result<Option<RoomRate>, StoreError> {
        let rooms = self
            .rooms
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {}", e)))?;

        Ok(rooms.get(room_id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<RoomRate>, StoreError> {
        let rooms = self
            .rooms
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {}", e)))?;

        let mut all: Vec<RoomRate> = rooms.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn list_services(&self) -> Result<Vec<ServiceDefinition>, StoreError> {
        let services = self
            .services
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {}", e)))?;

        Ok(services.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::booking::GuestInfo;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn booking(room_id: Uuid, check_in: &str, check_out: &str) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            invoice_number: String::new(),
            room_id,
            check_in: date(check_in),
            check_out: date(check_out),
            adults: 2,
            children: 0,
            services: vec![],
            total_minor: 40_000,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            guest: GuestInfo {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: "+44 20 7946 0000".to_string(),
            },
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_invoice_numbers_in_sequence() {
        let store = InMemoryBookingStore::new();
        let room_a = Uuid::new_v4();
        let room_b = Uuid::new_v4();

        let first = store
            .insert(booking(room_a, "2025-06-01", "2025-06-04"))
            .await
            .unwrap();
        let second = store
            .insert(booking(room_b, "2025-06-01", "2025-06-04"))
            .await
            .unwrap();

        assert_eq!(first.invoice_number, "INV-000001");
        assert_eq!(second.invoice_number, "INV-000002");
    }

    #[tokio::test]
    async fn test_insert_rejects_overlap() {
        let store = InMemoryBookingStore::new();
        let room = Uuid::new_v4();

        let existing = store
            .insert(booking(room, "2025-06-10", "2025-06-15"))
            .await
            .unwrap();

        let err = store
            .insert(booking(room, "2025-06-12", "2025-06-14"))
            .await
            .unwrap_err();

        match err {
            StoreError::Unavailable { conflicts, .. } => {
                assert_eq!(conflicts, vec![existing.id]);
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_back_to_back_stays_are_allowed() {
        let store = InMemoryBookingStore::new();
        let room = Uuid::new_v4();

        store
            .insert(booking(room, "2025-06-10", "2025-06-15"))
            .await
            .unwrap();
        store
            .insert(booking(room, "2025-06-15", "2025-06-20"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_booking_frees_the_room() {
        let store = InMemoryBookingStore::new();
        let room = Uuid::new_v4();

        let existing = store
            .insert(booking(room, "2025-06-10", "2025-06-15"))
            .await
            .unwrap();

        store
            .update_status(
                &existing.id,
                existing.version,
                BookingStatus::Cancelled,
                PaymentStatus::Pending,
                None,
            )
            .await
            .unwrap();

        store
            .insert(booking(room, "2025-06-12", "2025-06-14"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_status_detects_stale_version() {
        let store = InMemoryBookingStore::new();
        let room = Uuid::new_v4();

        let created = store
            .insert(booking(room, "2025-06-10", "2025-06-15"))
            .await
            .unwrap();

        store
            .update_status(
                &created.id,
                created.version,
                BookingStatus::Confirmed,
                PaymentStatus::Pending,
                None,
            )
            .await
            .unwrap();

        // Second writer still holds the original version.
        let err = store
            .update_status(
                &created.id,
                created.version,
                BookingStatus::Cancelled,
                PaymentStatus::Pending,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn test_update_stay_excludes_self_from_overlap_check() {
        let store = InMemoryBookingStore::new();
        let room = Uuid::new_v4();

        let created = store
            .insert(booking(room, "2025-06-10", "2025-06-15"))
            .await
            .unwrap();

        // Shifting within the booking's own range must not self-conflict.
        let updated = store
            .update_stay(
                &created.id,
                created.version,
                room,
                date("2025-06-11"),
                date("2025-06-16"),
                2,
                1,
                vec![],
                50_000,
            )
            .await
            .unwrap();

        assert_eq!(updated.check_in, date("2025-06-11"));
        assert_eq!(updated.total_minor, 50_000);
        assert_eq!(updated.version, created.version + 1);
    }

    #[tokio::test]
    async fn test_catalog_rejects_duplicate_service_key() {
        let catalog = InMemoryCatalog::new();

        catalog
            .add_service("Airport Shuttle", 6_000, PricingMode::FlatOnce)
            .unwrap();

        // Same derived key, different display name.
        let err = catalog
            .add_service("airport   shuttle", 4_000, PricingMode::FlatOnce)
            .unwrap_err();
        assert!(err.to_string().contains("airport-shuttle"));
    }

    #[tokio::test]
    async fn test_catalog_preserves_insertion_order() {
        let catalog = InMemoryCatalog::new();

        catalog
            .add_service("Breakfast", 1_500, PricingMode::PerGuest)
            .unwrap();
        catalog
            .add_service("Airport Shuttle", 6_000, PricingMode::FlatOnce)
            .unwrap();
        catalog
            .add_service("Spa Access", 2_500, PricingMode::PerGuest)
            .unwrap();

        let services = catalog.list_services().await.unwrap();
        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Breakfast", "Airport Shuttle", "Spa Access"]);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_not_an_error() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.list_services().await.unwrap().is_empty());
        assert!(catalog.get_room(&Uuid::new_v4()).await.unwrap().is_none());
    }
}
