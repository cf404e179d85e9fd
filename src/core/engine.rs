//! The booking lifecycle manager
//!
//! Owns the authoritative status/payment-status state machine and is the
//! only component permitted to mutate those fields. Creation is the single
//! path that produces a booking; every later mutation goes through a
//! guarded, version-checked transition.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::core::availability::AvailabilityResolver;
use crate::core::booking::{
    Booking, BookingStatus, GuestInfo, PaymentMethod, PaymentStatus,
};
use crate::core::catalog::{RoomRate, ServiceDefinition};
use crate::core::error::EngineError;
use crate::core::lifecycle::{check_payment_transition, check_status_transition};
use crate::core::pricing::{PriceBreakdown, ServiceSelection, compute_total};
use crate::rates::{RateCache, RateSource};
use crate::storage::{BookingStore, RateCatalog};

/// Request payload for booking creation
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub services: Vec<ServiceSelection>,
    pub guest: GuestInfo,
}

/// Request payload for modifying a pending booking's stay
///
/// Fields left as `None` keep their current value. The stored total is
/// always recomputed from the result, never patched.
#[derive(Debug, Clone, Default)]
pub struct UpdateStay {
    pub room_id: Option<Uuid>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub services: Option<Vec<ServiceSelection>>,
    pub expected_version: u64,
}

/// Request payload for a non-persisting price preview
#[derive(Debug, Clone)]
pub struct PricePreview {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub services: Vec<ServiceSelection>,
    /// Display currency; omitted or unresolvable codes fall back to the
    /// base currency
    pub currency: Option<String>,
}

/// Booking lifecycle manager
///
/// Composes the rate catalog, the pricing calculator, the availability
/// resolver, and the booking store into the engine's public operations.
pub struct BookingEngine {
    store: Arc<dyn BookingStore>,
    catalog: Arc<dyn RateCatalog>,
    rates: Arc<RateCache>,
    rate_source: Option<Arc<dyn RateSource>>,
    resolver: AvailabilityResolver,
    base_currency: String,
}

impl BookingEngine {
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog: Arc<dyn RateCatalog>,
        rates: Arc<RateCache>,
    ) -> Self {
        let resolver = AvailabilityResolver::new(store.clone());
        Self {
            store,
            catalog,
            rates,
            rate_source: None,
            resolver,
            base_currency: "USD".to_string(),
        }
    }

    /// Attach a live rate source; without one the cache serves its fallback
    /// table forever
    pub fn with_rate_source(mut self, source: Arc<dyn RateSource>) -> Self {
        self.rate_source = Some(source);
        self
    }

    pub fn with_base_currency(mut self, code: impl Into<String>) -> Self {
        self.base_currency = code.into();
        self
    }

    /// Read-side availability: the conflicting bookings for a candidate range
    pub async fn availability(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        excluding: Option<Uuid>,
    ) -> Result<Vec<Booking>, EngineError> {
        self.room_rate(room_id).await?;
        self.resolver
            .conflicts(room_id, check_in, check_out, excluding)
            .await
    }

    /// Itemized price for a candidate stay, without persisting anything
    ///
    /// The same calculator used at creation, so the preview total always
    /// matches what a subsequent create would store.
    pub async fn price_preview(
        &self,
        request: PricePreview,
    ) -> Result<PriceBreakdown, EngineError> {
        let rate = self.room_rate(request.room_id).await?;
        let catalog = self.catalog.list_services().await?;

        let display = match request.currency.as_deref() {
            None => None,
            Some(code) if code == self.base_currency => None,
            Some(code) => self.display_rate(code).await.map(|r| (code, r)),
        };

        compute_total(
            &rate,
            request.check_in,
            request.check_out,
            &request.services,
            &catalog,
            display,
        )
    }

    /// Create a booking: validate, price, then atomically check availability
    /// and insert
    ///
    /// The only path that produces a new booking. Persisted with
    /// status = pending, payment pending, and a freshly assigned invoice
    /// number; every other field is set exactly once here.
    pub async fn create_booking(&self, request: CreateBooking) -> Result<Booking, EngineError> {
        let rate = self.room_rate(request.room_id).await?;

        Self::check_occupancy(&rate, request.adults, request.children)?;

        let catalog = self.catalog.list_services().await?;
        let breakdown = compute_total(
            &rate,
            request.check_in,
            request.check_out,
            &request.services,
            &catalog,
            None,
        )?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            invoice_number: String::new(), // assigned by the store
            room_id: request.room_id,
            check_in: request.check_in,
            check_out: request.check_out,
            adults: request.adults,
            children: request.children,
            services: breakdown.service_snapshots(),
            total_minor: breakdown.total_minor,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            guest: request.guest,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        let created = self.store.insert(booking).await?;

        tracing::info!(
            booking_id = %created.id,
            invoice = %created.invoice_number,
            room_id = %created.room_id,
            total_minor = created.total_minor,
            "booking created"
        );

        Ok(created)
    }

    /// Modify a pending booking's stay; recomputes and stores a fresh total
    ///
    /// Only legal while the booking is pending. The availability re-check
    /// excludes the booking itself so it never conflicts with its own dates.
    pub async fn update_stay(&self, id: Uuid, request: UpdateStay) -> Result<Booking, EngineError> {
        let current = self.get_booking(id).await?;

        if current.status != BookingStatus::Pending {
            return Err(EngineError::Validation {
                message: format!(
                    "stay can only be modified while status is 'pending' (currently '{}')",
                    current.status
                ),
                fields: None,
            });
        }
        if current.version != request.expected_version {
            return Err(EngineError::StaleVersion {
                expected: request.expected_version,
                actual: current.version,
            });
        }

        let room_id = request.room_id.unwrap_or(current.room_id);
        let check_in = request.check_in.unwrap_or(current.check_in);
        let check_out = request.check_out.unwrap_or(current.check_out);
        let adults = request.adults.unwrap_or(current.adults);
        let children = request.children.unwrap_or(current.children);

        let rate = self.room_rate(room_id).await?;
        Self::check_occupancy(&rate, adults, children)?;

        // Resubmitted selections are re-priced from the current catalog;
        // otherwise the stored snapshots keep their agreed prices.
        let (services, total_minor) = match request.services {
            Some(selections) => {
                let catalog = self.catalog.list_services().await?;
                let breakdown =
                    compute_total(&rate, check_in, check_out, &selections, &catalog, None)?;
                (breakdown.service_snapshots(), breakdown.total_minor)
            }
            None => {
                let nights = (check_out - check_in).num_days();
                if nights <= 0 {
                    return Err(EngineError::InvalidDateRange {
                        check_in,
                        check_out,
                    });
                }
                let services_total: i64 =
                    current.services.iter().map(|line| line.total_minor()).sum();
                (
                    current.services.clone(),
                    rate.nightly_price_minor * nights + services_total,
                )
            }
        };

        let updated = self
            .store
            .update_stay(
                &id,
                request.expected_version,
                room_id,
                check_in,
                check_out,
                adults,
                children,
                services,
                total_minor,
            )
            .await?;

        tracing::info!(
            booking_id = %updated.id,
            total_minor = updated.total_minor,
            "booking stay updated"
        );

        Ok(updated)
    }

    /// Apply a guarded reservation-status transition
    pub async fn transition_status(
        &self,
        id: Uuid,
        target: BookingStatus,
        expected_version: u64,
    ) -> Result<Booking, EngineError> {
        let current = self.get_booking(id).await?;

        if current.version != expected_version {
            return Err(EngineError::StaleVersion {
                expected: expected_version,
                actual: current.version,
            });
        }

        check_status_transition(current.status, target, current.payment_status)?;

        // The store re-checks the version, so a transition racing past the
        // read above still cannot apply twice.
        let updated = self
            .store
            .update_status(
                &id,
                expected_version,
                target,
                current.payment_status,
                None,
            )
            .await?;

        tracing::info!(
            booking_id = %updated.id,
            from = current.status.as_str(),
            to = target.as_str(),
            "booking status transition"
        );

        Ok(updated)
    }

    /// Apply a guarded payment-status transition
    ///
    /// `method` is required for pending → paid and recorded exactly once.
    pub async fn transition_payment(
        &self,
        id: Uuid,
        target: PaymentStatus,
        method: Option<PaymentMethod>,
        expected_version: u64,
    ) -> Result<Booking, EngineError> {
        let current = self.get_booking(id).await?;

        if current.version != expected_version {
            return Err(EngineError::StaleVersion {
                expected: expected_version,
                actual: current.version,
            });
        }

        check_payment_transition(current.payment_status, target, current.status, method)?;

        let updated = self
            .store
            .update_status(&id, expected_version, current.status, target, method)
            .await?;

        tracing::info!(
            booking_id = %updated.id,
            from = current.payment_status.as_str(),
            to = target.as_str(),
            "booking payment transition"
        );

        Ok(updated)
    }

    /// Get a booking by ID
    pub async fn get_booking(&self, id: Uuid) -> Result<Booking, EngineError> {
        self.store
            .get(&id)
            .await?
            .ok_or(EngineError::NotFound {
                kind: "booking",
                id: id.to_string(),
            })
    }

    /// All bookings in creation order
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, EngineError> {
        Ok(self.store.list().await?)
    }

    /// The service catalog in display order
    pub async fn list_services(&self) -> Result<Vec<ServiceDefinition>, EngineError> {
        Ok(self.catalog.list_services().await?)
    }

    async fn room_rate(&self, room_id: Uuid) -> Result<RoomRate, EngineError> {
        self.catalog
            .get_room(&room_id)
            .await?
            .ok_or(EngineError::NotFound {
                kind: "room",
                id: room_id.to_string(),
            })
    }

    fn check_occupancy(rate: &RoomRate, adults: u32, children: u32) -> Result<(), EngineError> {
        if adults == 0 {
            return Err(EngineError::Validation {
                message: "a booking requires at least one adult".to_string(),
                fields: None,
            });
        }
        if !rate.fits(adults, children) {
            return Err(EngineError::CapacityExceeded {
                adults,
                children,
                max_adults: rate.max_adults,
                max_children: rate.max_children,
            });
        }
        Ok(())
    }

    /// Best-effort display rate: refresh the cache if due, then look the
    /// code up; an unresolvable code degrades to base-currency output
    async fn display_rate(&self, code: &str) -> Option<f64> {
        if let Some(source) = &self.rate_source {
            self.rates.refresh_if_stale(source.as_ref()).await;
        }
        let rate = self.rates.rate_for(code);
        if rate.is_none() {
            tracing::warn!(currency = code, "no rate for display currency, using base");
        }
        rate
    }
}
