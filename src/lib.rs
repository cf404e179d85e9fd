//! # Innkeep
//!
//! A booking pricing and lifecycle engine for hotel reservation systems.
//!
//! ## Features
//!
//! - **Itemized Pricing**: Nightly rates, flat and per-guest add-on services,
//!   totals kept in integer minor units of the base currency
//! - **Lifecycle State Machine**: Guarded status and payment-status
//!   transitions that keep money and occupancy consistent
//! - **Availability Resolution**: Half-open date-range overlap checks that
//!   ignore cancelled bookings
//! - **Optimistic Concurrency**: Version-checked mutations so concurrent
//!   transitions on one booking cannot apply against a stale read
//! - **Display Currency Conversion**: Best-effort cached rate lookups;
//!   authoritative totals never leave the base currency
//! - **Automatic Timestamps**: created_at and updated_at managed by the engine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use innkeep::prelude::*;
//!
//! let catalog = InMemoryCatalog::new();
//! let room = catalog.add_room("Seaview Double", 20_000, 2, 2);
//! catalog.add_service("Airport Shuttle", 6_000, PricingMode::FlatOnce)?;
//!
//! let engine = BookingEngine::new(
//!     Arc::new(InMemoryBookingStore::new()),
//!     Arc::new(catalog),
//!     Arc::new(RateCache::new(Default::default())),
//! );
//!
//! let booking = engine.create_booking(CreateBooking { /* ... */ }).await?;
//! engine.transition_status(booking.id, BookingStatus::Confirmed, booking.version).await?;
//! ```

pub mod config;
pub mod core;
pub mod rates;
pub mod server;
pub mod storage;

/// Convenience re-exports for common usage
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::core::availability::{AvailabilityResolver, ranges_overlap};
    pub use crate::core::booking::{
        Booking, BookingStatus, GuestInfo, PaymentMethod, PaymentStatus, ServiceLine,
    };
    pub use crate::core::catalog::{PricingMode, RoomRate, ServiceDefinition, service_key};
    pub use crate::core::engine::{BookingEngine, CreateBooking, PricePreview, UpdateStay};
    pub use crate::core::error::{EngineError, ErrorResponse};
    pub use crate::core::pricing::{PriceBreakdown, PriceLine, ServiceSelection, compute_total};
    pub use crate::core::query::{PaginatedResponse, PaginationMeta, QueryParams};
    pub use crate::rates::{RateCache, RateSource, StaticRateSource};
    pub use crate::server::{AppState, build_router, serve};
    pub use crate::storage::{
        BookingStore, InMemoryBookingStore, InMemoryCatalog, RateCatalog, StoreError,
    };

    // Commonly used external types
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
