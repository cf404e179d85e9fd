//! HTTP handlers for the booking engine
//!
//! Thin translation layer: request DTOs are validated with `validator`,
//! mapped into engine operations, and every guard failure comes back as the
//! engine's structured error body.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::booking::{Booking, BookingStatus, GuestInfo, PaymentMethod, PaymentStatus};
use crate::core::catalog::ServiceDefinition;
use crate::core::engine::{BookingEngine, CreateBooking, PricePreview, UpdateStay};
use crate::core::error::EngineError;
use crate::core::pricing::{PriceBreakdown, ServiceSelection};
use crate::core::query::{PaginatedResponse, PaginationMeta, QueryParams};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
}

impl AppState {
    pub fn new(engine: Arc<BookingEngine>) -> Self {
        Self { engine }
    }
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// List the optional-service catalog
///
/// GET /services
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceDefinition>>, EngineError> {
    Ok(Json(state.engine.list_services().await?))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Booking to exempt from its own conflict check
    pub exclude: Option<Uuid>,
}

/// Minimal view of a conflicting booking; no guest data is exposed here
#[derive(Debug, Serialize)]
pub struct ConflictView {
    pub booking_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub available: bool,
    pub conflicts: Vec<ConflictView>,
}

/// Check room availability for a candidate date range
///
/// GET /rooms/{room_id}/availability?check_in=2025-06-10&check_out=2025-06-15
pub async fn get_availability(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, EngineError> {
    let conflicts = state
        .engine
        .availability(room_id, query.check_in, query.check_out, query.exclude)
        .await?;

    Ok(Json(AvailabilityResponse {
        room_id,
        check_in: query.check_in,
        check_out: query.check_out,
        available: conflicts.is_empty(),
        conflicts: conflicts
            .into_iter()
            .map(|b| ConflictView {
                booking_id: b.id,
                check_in: b.check_in,
                check_out: b.check_out,
                status: b.status,
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct GuestInfoRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 3, max = 32))]
    pub phone: String,
}

impl From<GuestInfoRequest> for GuestInfo {
    fn from(request: GuestInfoRequest) -> Self {
        GuestInfo {
            name: request.name,
            email: request.email,
            phone: request.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServiceSelectionRequest {
    pub service_key: String,

    #[serde(default = "default_service_quantity")]
    pub quantity: u32,
}

fn default_service_quantity() -> u32 {
    1
}

impl From<ServiceSelectionRequest> for ServiceSelection {
    fn from(request: ServiceSelectionRequest) -> Self {
        ServiceSelection {
            service_key: request.service_key,
            quantity: request.quantity,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,

    #[validate(range(min = 1))]
    pub adults: u32,

    #[serde(default)]
    pub children: u32,

    #[serde(default)]
    pub services: Vec<ServiceSelectionRequest>,

    #[validate(nested)]
    pub guest: GuestInfoRequest,
}

/// Create a booking
///
/// POST /bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Response, EngineError> {
    payload.validate()?;

    let booking = state
        .engine
        .create_booking(CreateBooking {
            room_id: payload.room_id,
            check_in: payload.check_in,
            check_out: payload.check_out,
            adults: payload.adults,
            children: payload.children,
            services: payload.services.into_iter().map(Into::into).collect(),
            guest: payload.guest.into(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(booking)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    /// Display currency for the converted totals
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PricePreviewRequest {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,

    #[serde(default)]
    pub services: Vec<ServiceSelectionRequest>,
}

/// Price a candidate stay without persisting anything
///
/// POST /bookings/price-preview?currency=EUR
///
/// Returns the same breakdown the creation flow stores, so the UI can show
/// live totals before committing.
pub async fn price_preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
    Json(payload): Json<PricePreviewRequest>,
) -> Result<Json<PriceBreakdown>, EngineError> {
    payload.validate()?;

    let breakdown = state
        .engine
        .price_preview(PricePreview {
            room_id: payload.room_id,
            check_in: payload.check_in,
            check_out: payload.check_out,
            services: payload.services.into_iter().map(Into::into).collect(),
            currency: query.currency,
        })
        .await?;

    Ok(Json(breakdown))
}

/// Get a booking by ID
///
/// GET /bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, EngineError> {
    Ok(Json(state.engine.get_booking(id).await?))
}

/// List bookings with pagination
///
/// GET /bookings?page=1&limit=20
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<PaginatedResponse<Booking>>, EngineError> {
    let all = state.engine.list_bookings().await?;

    let page = params.page();
    let limit = params.limit();
    let total = all.len();

    let data: Vec<Booking> = all
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Ok(Json(PaginatedResponse {
        data,
        pagination: PaginationMeta::new(page, limit, total),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStayRequest {
    pub room_id: Option<Uuid>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub services: Option<Vec<ServiceSelectionRequest>>,
    pub expected_version: u64,
}

/// Modify a pending booking's stay; the stored total is recomputed
///
/// PATCH /bookings/{id}
pub async fn update_stay(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStayRequest>,
) -> Result<Json<Booking>, EngineError> {
    let booking = state
        .engine
        .update_stay(
            id,
            UpdateStay {
                room_id: payload.room_id,
                check_in: payload.check_in,
                check_out: payload.check_out,
                adults: payload.adults,
                children: payload.children,
                services: payload
                    .services
                    .map(|s| s.into_iter().map(Into::into).collect()),
                expected_version: payload.expected_version,
            },
        )
        .await?;

    Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
pub struct StatusTransitionRequest {
    pub status: BookingStatus,
    pub expected_version: u64,
}

/// Apply a reservation-status transition
///
/// PATCH /bookings/{id}/status
pub async fn transition_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusTransitionRequest>,
) -> Result<Json<Booking>, EngineError> {
    let booking = state
        .engine
        .transition_status(id, payload.status, payload.expected_version)
        .await?;

    Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
pub struct PaymentTransitionRequest {
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub expected_version: u64,
}

/// Apply a payment-status transition
///
/// PATCH /bookings/{id}/payment
pub async fn transition_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentTransitionRequest>,
) -> Result<Json<Booking>, EngineError> {
    let booking = state
        .engine
        .transition_payment(
            id,
            payload.payment_status,
            payload.payment_method,
            payload.expected_version,
        )
        .await?;

    Ok(Json(booking))
}
