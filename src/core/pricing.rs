//! Pure pricing calculator
//!
//! Turns (room rate, date range, selected services, display currency) into an
//! itemized cost breakdown. No side effects; the same inputs always produce
//! the same breakdown. Authoritative figures are minor units of the base
//! currency; display conversion is presentation-only and never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::booking::ServiceLine;
use crate::core::catalog::{PricingMode, RoomRate, ServiceDefinition};
use crate::core::error::EngineError;

/// A service selected by the guest, referencing the catalog by stable key
///
/// For per-guest services the quantity is the guest count; for flat services
/// it is ignored and snapshotted as 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub service_key: String,

    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// One priced line of the breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLine {
    pub name: String,
    pub unit_price_minor: i64,
    pub quantity: u32,
    pub total_minor: i64,
}

/// Display-only conversion of the breakdown totals
///
/// Amounts are major units of the target currency, rounded to 2 decimal
/// places. Never persisted as a booking's total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayTotals {
    pub currency: String,
    pub rate: f64,
    pub room_subtotal: f64,
    pub services_subtotal: f64,
    pub total: f64,
}

/// Itemized cost breakdown for a stay
///
/// Used both for the confirmation UI (price preview) and for the persisted
/// invoice snapshot at booking creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub nights: i64,
    pub nightly_price_minor: i64,
    pub room_subtotal_minor: i64,
    pub service_lines: Vec<PriceLine>,
    pub services_subtotal_minor: i64,
    pub total_minor: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayTotals>,
}

impl PriceBreakdown {
    /// Service snapshots to persist on the booking
    pub fn service_snapshots(&self) -> Vec<ServiceLine> {
        self.service_lines
            .iter()
            .map(|line| ServiceLine {
                name: line.name.clone(),
                unit_price_minor: line.unit_price_minor,
                quantity: line.quantity,
            })
            .collect()
    }
}

/// Round a minor-unit amount converted at `rate` to 2 decimal places
fn to_display(minor: i64, rate: f64) -> f64 {
    ((minor as f64 / 100.0) * rate * 100.0).round() / 100.0
}

/// Compute the itemized total for a stay
///
/// - `nights` is the whole-day difference; `InvalidDateRange` if not positive
/// - unknown service keys are skipped with a warning (catalog and selection
///   may legitimately diverge over time), zero-price entries are skipped
/// - per-guest selections with a zero quantity are rejected with
///   `InvalidQuantity`
/// - `display` converts every figure at the given `(currency, rate)` for
///   presentation; the minor-unit figures remain authoritative
pub fn compute_total(
    rate: &RoomRate,
    check_in: NaiveDate,
    check_out: NaiveDate,
    selections: &[ServiceSelection],
    catalog: &[ServiceDefinition],
    display: Option<(&str, f64)>,
) -> Result<PriceBreakdown, EngineError> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(EngineError::InvalidDateRange {
            check_in,
            check_out,
        });
    }

    let room_subtotal_minor = rate.nightly_price_minor * nights;

    let mut service_lines = Vec::with_capacity(selections.len());
    for selection in selections {
        let Some(definition) = catalog
            .iter()
            .find(|def| def.service_key == selection.service_key)
        else {
            tracing::warn!(
                service_key = %selection.service_key,
                "unknown service key in selection, skipping"
            );
            continue;
        };

        if definition.price_minor == 0 {
            continue;
        }

        let (quantity, total_minor) = match definition.pricing_mode {
            PricingMode::FlatOnce => (1, definition.price_minor),
            PricingMode::PerGuest => {
                if selection.quantity == 0 {
                    return Err(EngineError::InvalidQuantity {
                        service: definition.name.clone(),
                        quantity: selection.quantity,
                    });
                }
                (
                    selection.quantity,
                    definition.price_minor * selection.quantity as i64,
                )
            }
        };

        service_lines.push(PriceLine {
            name: definition.name.clone(),
            unit_price_minor: definition.price_minor,
            quantity,
            total_minor,
        });
    }

    let services_subtotal_minor: i64 = service_lines.iter().map(|line| line.total_minor).sum();
    let total_minor = room_subtotal_minor + services_subtotal_minor;

    let display = display.map(|(currency, rate)| DisplayTotals {
        currency: currency.to_string(),
        rate,
        room_subtotal: to_display(room_subtotal_minor, rate),
        services_subtotal: to_display(services_subtotal_minor, rate),
        total: to_display(total_minor, rate),
    });

    Ok(PriceBreakdown {
        nights,
        nightly_price_minor: rate.nightly_price_minor,
        room_subtotal_minor,
        service_lines,
        services_subtotal_minor,
        total_minor,
        display,
    })
}
