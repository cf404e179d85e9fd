//! Router assembly for the booking engine's HTTP surface

use axum::routing::{get, patch, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_booking, get_availability, get_booking, health, list_bookings,
    list_services, price_preview, transition_payment, transition_status, update_stay,
};

/// Build the booking engine routes
///
/// - GET   /health
/// - GET   /services
/// - GET   /rooms/{room_id}/availability - Overlap check for a date range
/// - GET   /bookings - Paginated listing
/// - POST  /bookings - Create a booking
/// - POST  /bookings/price-preview - Itemized total without persistence
/// - GET   /bookings/{id}
/// - PATCH /bookings/{id} - Modify a pending stay
/// - PATCH /bookings/{id}/status - Reservation-status transition
/// - PATCH /bookings/{id}/payment - Payment-status transition
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/services", get(list_services))
        .route("/rooms/{room_id}/availability", get(get_availability))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/price-preview", post(price_preview))
        .route("/bookings/{id}", get(get_booking).patch(update_stay))
        .route("/bookings/{id}/status", patch(transition_status))
        .route("/bookings/{id}/payment", patch(transition_payment))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
