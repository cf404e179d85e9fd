//! Transition guards for the booking state machine
//!
//! Pure functions over `(status, payment_status)`. The engine is the only
//! caller; no other component writes these fields. Rejected transitions name
//! the current state and the precondition that was not met.

use crate::core::booking::{BookingStatus, PaymentMethod, PaymentStatus};
use crate::core::error::EngineError;

/// Validate a reservation-status transition
///
/// Legal moves:
/// - pending → confirmed
/// - confirmed → checked-in
/// - checked-in → checked-out, only once payment is settled
/// - pending / confirmed / checked-in → cancelled
/// - checked-out → completed
///
/// Cancelled and completed are terminal.
pub fn check_status_transition(
    from: BookingStatus,
    to: BookingStatus,
    payment_status: PaymentStatus,
) -> Result<(), EngineError> {
    use BookingStatus::*;

    let allowed = match (from, to) {
        (Pending, Confirmed) => true,
        (Confirmed, CheckedIn) => true,
        (CheckedIn, CheckedOut) => {
            if payment_status != PaymentStatus::Paid {
                return Err(EngineError::PaymentRequired {
                    payment_status: payment_status.as_str().to_string(),
                });
            }
            true
        }
        (Pending | Confirmed | CheckedIn, Cancelled) => true,
        (CheckedOut, Completed) => true,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}

/// Validate a payment-status transition
///
/// - pending → paid requires a payment method
/// - paid → refunded requires the booking to be cancelled
/// - no reversals: paid → pending and refunded → anything are rejected
pub fn check_payment_transition(
    from: PaymentStatus,
    to: PaymentStatus,
    booking_status: BookingStatus,
    method: Option<PaymentMethod>,
) -> Result<(), EngineError> {
    use PaymentStatus::*;

    match (from, to) {
        (Pending, Paid) => {
            if method.is_none() {
                return Err(EngineError::MissingPaymentMethod);
            }
            Ok(())
        }
        (Paid, Refunded) => {
            if booking_status != BookingStatus::Cancelled {
                return Err(EngineError::InvalidRefundState {
                    status: booking_status.as_str().to_string(),
                });
            }
            Ok(())
        }
        _ => Err(EngineError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::BookingStatus::*;
    use super::PaymentStatus as Pay;

    #[test]
    fn test_happy_path_transitions() {
        assert!(check_status_transition(Pending, Confirmed, Pay::Pending).is_ok());
        assert!(check_status_transition(Confirmed, CheckedIn, Pay::Pending).is_ok());
        assert!(check_status_transition(CheckedIn, CheckedOut, Pay::Paid).is_ok());
        assert!(check_status_transition(CheckedOut, Completed, Pay::Paid).is_ok());
    }

    #[test]
    fn test_checkout_requires_payment() {
        let err = check_status_transition(CheckedIn, CheckedOut, Pay::Pending).unwrap_err();
        assert!(matches!(err, EngineError::PaymentRequired { .. }));

        assert!(check_status_transition(CheckedIn, CheckedOut, Pay::Paid).is_ok());
    }

    #[test]
    fn test_cancellation_allowed_before_checkout() {
        assert!(check_status_transition(Pending, Cancelled, Pay::Pending).is_ok());
        assert!(check_status_transition(Confirmed, Cancelled, Pay::Paid).is_ok());
        assert!(check_status_transition(CheckedIn, Cancelled, Pay::Pending).is_ok());

        let err = check_status_transition(CheckedOut, Cancelled, Pay::Paid).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_terminal_statuses_reject_everything() {
        for to in [Pending, Confirmed, CheckedIn, CheckedOut, Completed] {
            assert!(check_status_transition(Cancelled, to, Pay::Paid).is_err());
        }
        for to in [Pending, Confirmed, CheckedIn, CheckedOut, Cancelled] {
            assert!(check_status_transition(Completed, to, Pay::Paid).is_err());
        }
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(check_status_transition(Pending, CheckedIn, Pay::Pending).is_err());
        assert!(check_status_transition(Pending, CheckedOut, Pay::Paid).is_err());
        assert!(check_status_transition(Confirmed, CheckedOut, Pay::Paid).is_err());
        assert!(check_status_transition(Confirmed, Completed, Pay::Paid).is_err());
    }

    #[test]
    fn test_paid_requires_method() {
        let err =
            check_payment_transition(Pay::Pending, Pay::Paid, Confirmed, None).unwrap_err();
        assert!(matches!(err, EngineError::MissingPaymentMethod));

        assert!(
            check_payment_transition(Pay::Pending, Pay::Paid, Confirmed, Some(PaymentMethod::Card))
                .is_ok()
        );
    }

    #[test]
    fn test_refund_only_when_cancelled() {
        for status in [Pending, Confirmed, CheckedIn, CheckedOut, Completed] {
            let err =
                check_payment_transition(Pay::Paid, Pay::Refunded, status, None).unwrap_err();
            assert!(matches!(err, EngineError::InvalidRefundState { .. }));
        }

        assert!(check_payment_transition(Pay::Paid, Pay::Refunded, Cancelled, None).is_ok());
    }

    #[test]
    fn test_no_payment_reversals() {
        assert!(check_payment_transition(Pay::Paid, Pay::Pending, Cancelled, None).is_err());
        assert!(
            check_payment_transition(Pay::Refunded, Pay::Paid, Cancelled, Some(PaymentMethod::Card))
                .is_err()
        );
        assert!(check_payment_transition(Pay::Refunded, Pay::Pending, Cancelled, None).is_err());
        assert!(
            check_payment_transition(Pay::Pending, Pay::Refunded, Cancelled, None).is_err()
        );
    }
}
