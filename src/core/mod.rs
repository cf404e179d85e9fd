//! Core domain types and operations for the booking engine

pub mod availability;
pub mod booking;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod pricing;
pub mod query;

pub use availability::{AvailabilityResolver, ranges_overlap};
pub use booking::{Booking, BookingStatus, GuestInfo, PaymentMethod, PaymentStatus, ServiceLine};
pub use catalog::{PricingMode, RoomRate, ServiceDefinition, service_key};
pub use engine::{BookingEngine, CreateBooking, PricePreview, UpdateStay};
pub use error::{EngineError, ErrorResponse};
pub use pricing::{PriceBreakdown, PriceLine, ServiceSelection, compute_total};
pub use query::{PaginatedResponse, PaginationMeta, QueryParams};
