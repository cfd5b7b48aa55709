//! Booking orchestration: validate, price, commit, notify.

use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::booking::{DEFAULT_PAYMENT_METHOD, MAX_TOTAL_PRICE};
use crate::models::{Booking, BookingDraft, EventId, UserId};
use crate::services::notifier::{BookingConfirmation, BookingNotifier};
use crate::store::{BookingLedger, EventCatalog, StoreError, UserStore};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Number of tickets must be a positive integer (got {0})")]
    InvalidTickets(i32),

    #[error("Event not found")]
    EventNotFound,

    #[error("Not enough seats available: requested {requested}, {available} left")]
    InsufficientSeats { requested: i32, available: i32 },

    #[error("Booking total exceeds the maximum amount")]
    TotalTooLarge,

    #[error("booking could not be recorded: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct BookingService {
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn EventCatalog>,
    ledger: Arc<dyn BookingLedger>,
    notifier: Arc<dyn BookingNotifier>,
}

impl BookingService {
    pub fn new(
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn EventCatalog>,
        ledger: Arc<dyn BookingLedger>,
        notifier: Arc<dyn BookingNotifier>,
    ) -> Self {
        Self {
            users,
            catalog,
            ledger,
            notifier,
        }
    }

    /// Book `tickets_requested` seats of `event_id` for `user_id`.
    ///
    /// The seat decrement, the booking row and its transaction row are
    /// committed together by the ledger; a concurrent booking that took the
    /// last seats in between surfaces as `InsufficientSeats`. The confirmation
    /// call runs in the background and cannot fail the booking.
    pub async fn create_booking(
        &self,
        user_id: UserId,
        event_id: EventId,
        tickets_requested: i32,
    ) -> Result<Booking, BookingError> {
        if tickets_requested <= 0 {
            return Err(BookingError::InvalidTickets(tickets_requested));
        }

        let event = self
            .catalog
            .get_event(event_id)
            .await?
            .ok_or(BookingError::EventNotFound)?;

        if tickets_requested > event.available_seats {
            info!(
                %event_id,
                requested = tickets_requested,
                available = event.available_seats,
                "Booking rejected: not enough seats"
            );
            return Err(BookingError::InsufficientSeats {
                requested: tickets_requested,
                available: event.available_seats,
            });
        }

        let total_price = event
            .price
            .checked_mul(Decimal::from(tickets_requested))
            .filter(|total| *total <= MAX_TOTAL_PRICE)
            .ok_or_else(|| {
                info!(%event_id, requested = tickets_requested, price = %event.price, "Booking rejected: total too large");
                BookingError::TotalTooLarge
            })?;

        let draft = BookingDraft {
            user_id,
            event_id,
            event_name: event.name.clone(),
            tickets: tickets_requested,
            total_price,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
        };

        let (booking, transaction) = match self.ledger.commit_booking(draft).await {
            Ok(committed) => committed,
            Err(StoreError::NotFound) => return Err(BookingError::EventNotFound),
            Err(StoreError::InsufficientSeats { available }) => {
                info!(%event_id, requested = tickets_requested, available, "Booking lost a race for the last seats");
                return Err(BookingError::InsufficientSeats {
                    requested: tickets_requested,
                    available,
                });
            }
            Err(e) => {
                tracing::error!(%event_id, %user_id, error = %e, "Failed to record booking");
                return Err(BookingError::Store(e));
            }
        };

        info!(
            booking_id = %booking.id,
            transaction_id = %transaction.id,
            %event_id,
            %user_id,
            tickets = booking.tickets,
            total_price = %booking.total_price,
            "Booking confirmed"
        );

        self.spawn_confirmation(booking.clone());
        Ok(booking)
    }

    fn spawn_confirmation(&self, booking: Booking) {
        let users = self.users.clone();
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let user_email = match users.find_user(booking.user_id).await {
                Ok(Some(user)) => user.email,
                Ok(None) => {
                    warn!(booking_id = %booking.id, "Booking user vanished before confirmation; skipping");
                    return;
                }
                Err(e) => {
                    warn!(booking_id = %booking.id, error = %e, "Could not load booking user for confirmation");
                    return;
                }
            };

            let confirmation = BookingConfirmation {
                booking_id: booking.id,
                user_email,
                event_name: booking.event_name,
                tickets: booking.tickets,
                total_price: booking.total_price,
            };

            match notifier.notify(&confirmation).await {
                Ok(()) => info!(booking_id = %confirmation.booking_id, "Booking confirmation sent"),
                Err(e) => warn!(booking_id = %confirmation.booking_id, error = %e, "Booking confirmation failed"),
            }
        });
    }
}
