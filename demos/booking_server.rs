//! Run the booking engine behind its HTTP surface
//!
//! ```bash
//! cargo run --example booking_server
//! curl localhost:3000/services
//! ```

use innkeep::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = EngineConfig::default_config();

    let catalog = InMemoryCatalog::new();
    let seaview = catalog.add_room("Seaview Double", 20_000, 2, 2);
    let garden = catalog.add_room("Garden Suite", 35_000, 3, 2);
    catalog.add_service("Breakfast", 1_500, PricingMode::PerGuest)?;
    catalog.add_service("Airport Shuttle", 6_000, PricingMode::FlatOnce)?;
    catalog.add_service("Spa Access", 2_500, PricingMode::PerGuest)?;

    tracing::info!(
        seaview = %seaview.room_id,
        garden = %garden.room_id,
        "seeded demo rooms"
    );

    let engine = BookingEngine::new(
        Arc::new(InMemoryBookingStore::new()),
        Arc::new(catalog),
        Arc::new(config.rate_cache()),
    )
    .with_base_currency(&config.base_currency);

    let state = AppState::new(Arc::new(engine));
    serve(&config.server.bind_addr, build_router(state)).await
}
