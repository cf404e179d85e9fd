//! Typed error handling for the booking engine
//!
//! Every validation and guard failure is returned to the caller as a typed
//! error, never silently coerced. Each variant maps to a stable error code
//! and HTTP status so clients can handle failures programmatically.
//!
//! # Example
//!
//! ```rust,ignore
//! use innkeep::prelude::*;
//!
//! match engine.transition_status(id, BookingStatus::CheckedOut, version).await {
//!     Ok(booking) => println!("checked out: {}", booking.invoice_number),
//!     Err(EngineError::PaymentRequired { .. }) => {
//!         println!("collect payment first");
//!     }
//!     Err(e) => eprintln!("transition failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for booking engine operations
///
/// Guard violations (`InvalidTransition`, `PaymentRequired`,
/// `InvalidRefundState`) are distinct from the retryable `StaleVersion`
/// conflict: the former will fail again on retry, the latter may succeed
/// after re-reading the booking.
#[derive(Debug)]
pub enum EngineError {
    /// Check-out date is not strictly after check-in date
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// A per-guest service was requested with a zero quantity
    InvalidQuantity { service: String, quantity: u32 },

    /// Requested occupancy exceeds the room's capacity
    CapacityExceeded {
        adults: u32,
        children: u32,
        max_adults: u32,
        max_children: u32,
    },

    /// Another non-cancelled booking overlaps the requested date range
    RoomUnavailable {
        room_id: Uuid,
        conflicts: Vec<Uuid>,
    },

    /// The requested status or payment-status transition is not legal
    InvalidTransition { from: String, to: String },

    /// Check-out attempted while payment is still pending
    PaymentRequired { payment_status: String },

    /// Payment marked as paid without a payment method
    MissingPaymentMethod,

    /// Refund attempted on a booking that is not cancelled
    InvalidRefundState { status: String },

    /// Unknown booking, room, or other referenced record
    NotFound { kind: &'static str, id: String },

    /// Request payload failed field validation
    Validation {
        message: String,
        fields: Option<serde_json::Value>,
    },

    /// Concurrent mutation applied first; retry with a fresh read
    StaleVersion { expected: u64, actual: u64 },

    /// Internal engine errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidDateRange {
                check_in,
                check_out,
            } => {
                write!(
                    f,
                    "check-out ({}) must be strictly after check-in ({})",
                    check_out, check_in
                )
            }
            EngineError::InvalidQuantity { service, quantity } => {
                write!(
                    f,
                    "service '{}' requires a quantity of at least 1 (got {})",
                    service, quantity
                )
            }
            EngineError::CapacityExceeded {
                adults,
                children,
                max_adults,
                max_children,
            } => {
                write!(
                    f,
                    "occupancy {} adults / {} children exceeds room capacity of {} adults / {} children",
                    adults, children, max_adults, max_children
                )
            }
            EngineError::RoomUnavailable { room_id, conflicts } => {
                write!(
                    f,
                    "room {} is not available for the requested dates ({} conflicting booking(s))",
                    room_id,
                    conflicts.len()
                )
            }
            EngineError::InvalidTransition { from, to } => {
                write!(f, "cannot transition from '{}' to '{}'", from, to)
            }
            EngineError::PaymentRequired { payment_status } => {
                write!(f, "cannot check out: payment is '{}'", payment_status)
            }
            EngineError::MissingPaymentMethod => {
                write!(f, "a payment method is required to mark a booking as paid")
            }
            EngineError::InvalidRefundState { status } => {
                write!(
                    f,
                    "refund is only valid for a cancelled booking (status is '{}')",
                    status
                )
            }
            EngineError::NotFound { kind, id } => {
                write!(f, "{} with id '{}' not found", kind, id)
            }
            EngineError::Validation { message, .. } => write!(f, "{}", message),
            EngineError::StaleVersion { expected, actual } => {
                write!(
                    f,
                    "booking was modified concurrently (expected version {}, found {})",
                    expected, actual
                )
            }
            EngineError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl EngineError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidDateRange { .. }
            | EngineError::InvalidQuantity { .. }
            | EngineError::CapacityExceeded { .. }
            | EngineError::MissingPaymentMethod
            | EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::RoomUnavailable { .. } | EngineError::StaleVersion { .. } => {
                StatusCode::CONFLICT
            }
            EngineError::InvalidTransition { .. }
            | EngineError::PaymentRequired { .. }
            | EngineError::InvalidRefundState { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            EngineError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            EngineError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            EngineError::RoomUnavailable { .. } => "ROOM_UNAVAILABLE",
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EngineError::PaymentRequired { .. } => "PAYMENT_REQUIRED",
            EngineError::MissingPaymentMethod => "MISSING_PAYMENT_METHOD",
            EngineError::InvalidRefundState { .. } => "INVALID_REFUND_STATE",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::StaleVersion { .. } => "STALE_VERSION",
            EngineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same request may succeed without changes
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::StaleVersion { .. })
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            EngineError::RoomUnavailable { room_id, conflicts } => Some(serde_json::json!({
                "room_id": room_id.to_string(),
                "conflicting_booking_ids": conflicts.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
            })),
            EngineError::CapacityExceeded {
                max_adults,
                max_children,
                ..
            } => Some(serde_json::json!({
                "max_adults": max_adults,
                "max_children": max_children,
            })),
            EngineError::StaleVersion { expected, actual } => Some(serde_json::json!({
                "expected_version": expected,
                "actual_version": actual,
                "retryable": true,
            })),
            EngineError::Validation {
                fields: Some(fields),
                ..
            } => Some(serde_json::json!({ "fields": fields })),
            _ => None,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        EngineError::Validation {
            message: errors.to_string().replace('\n', "; "),
            fields: serde_json::to_value(&errors).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = EngineError::RoomUnavailable {
            room_id: Uuid::new_v4(),
            conflicts: vec![Uuid::new_v4()],
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "ROOM_UNAVAILABLE");
        assert!(!err.is_retryable());

        let err = EngineError::StaleVersion {
            expected: 1,
            actual: 2,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.is_retryable());

        let err = EngineError::PaymentRequired {
            payment_status: "pending".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_display_names_unmet_precondition() {
        let err = EngineError::PaymentRequired {
            payment_status: "pending".to_string(),
        };
        assert_eq!(err.to_string(), "cannot check out: payment is 'pending'");

        let err = EngineError::InvalidTransition {
            from: "cancelled".to_string(),
            to: "confirmed".to_string(),
        };
        assert!(err.to_string().contains("'cancelled'"));
        assert!(err.to_string().contains("'confirmed'"));
    }

    #[test]
    fn test_stale_version_is_marked_retryable_in_details() {
        let err = EngineError::StaleVersion {
            expected: 3,
            actual: 4,
        };
        let response = err.to_response();
        assert_eq!(response.code, "STALE_VERSION");
        let details = response.details.expect("details expected");
        assert_eq!(details["retryable"], serde_json::json!(true));
    }
}
