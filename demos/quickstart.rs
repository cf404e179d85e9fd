//! Walkthrough of the booking engine: catalog setup, price preview,
//! creation, and the full status/payment lifecycle

use innkeep::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Catalog: one room, two optional services
    let catalog = InMemoryCatalog::new();
    let room = catalog.add_room("Seaview Double", 20_000, 2, 2);
    catalog.add_service("Breakfast", 1_500, PricingMode::PerGuest)?;
    catalog.add_service("Airport Shuttle", 6_000, PricingMode::FlatOnce)?;

    let config = EngineConfig::default_config();
    let engine = BookingEngine::new(
        Arc::new(InMemoryBookingStore::new()),
        Arc::new(catalog),
        Arc::new(config.rate_cache()),
    )
    .with_base_currency(&config.base_currency);

    // Preview before committing: 3 nights + breakfast for 2 + shuttle
    let preview = engine
        .price_preview(PricePreview {
            room_id: room.room_id,
            check_in: "2025-06-01".parse()?,
            check_out: "2025-06-04".parse()?,
            services: vec![
                ServiceSelection {
                    service_key: "breakfast".to_string(),
                    quantity: 2,
                },
                ServiceSelection {
                    service_key: "airport-shuttle".to_string(),
                    quantity: 1,
                },
            ],
            currency: Some("EUR".to_string()),
        })
        .await?;
    println!(
        "Preview: {} nights, total {} minor units ({} {:.2})",
        preview.nights,
        preview.total_minor,
        preview.display.as_ref().map_or("USD", |d| d.currency.as_str()),
        preview.display.as_ref().map_or(0.0, |d| d.total),
    );

    // Create the booking
    let booking = engine
        .create_booking(CreateBooking {
            room_id: room.room_id,
            check_in: "2025-06-01".parse()?,
            check_out: "2025-06-04".parse()?,
            adults: 2,
            children: 0,
            services: vec![
                ServiceSelection {
                    service_key: "breakfast".to_string(),
                    quantity: 2,
                },
                ServiceSelection {
                    service_key: "airport-shuttle".to_string(),
                    quantity: 1,
                },
            ],
            guest: GuestInfo {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: "+44 20 7946 0000".to_string(),
            },
        })
        .await?;
    println!(
        "Created {} ({}), total {} minor units",
        booking.id, booking.invoice_number, booking.total_minor
    );

    // The room is now blocked for overlapping dates
    let conflicts = engine
        .availability(
            room.room_id,
            "2025-06-02".parse()?,
            "2025-06-03".parse()?,
            None,
        )
        .await?;
    println!("Overlapping bookings: {}", conflicts.len());

    // Walk the lifecycle: confirm, check in, pay, check out, complete
    let booking = engine
        .transition_status(booking.id, BookingStatus::Confirmed, booking.version)
        .await?;
    let booking = engine
        .transition_status(booking.id, BookingStatus::CheckedIn, booking.version)
        .await?;

    // Check-out before payment is rejected
    let denied = engine
        .transition_status(booking.id, BookingStatus::CheckedOut, booking.version)
        .await;
    println!("Check-out while unpaid: {}", denied.unwrap_err());

    let booking = engine
        .transition_payment(
            booking.id,
            PaymentStatus::Paid,
            Some(PaymentMethod::Card),
            booking.version,
        )
        .await?;
    let booking = engine
        .transition_status(booking.id, BookingStatus::CheckedOut, booking.version)
        .await?;
    let booking = engine
        .transition_status(booking.id, BookingStatus::Completed, booking.version)
        .await?;
    println!(
        "Final state: {} / {}",
        booking.status, booking.payment_status
    );

    Ok(())
}
