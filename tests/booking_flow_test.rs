
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use bookit_api::models::Role;
use bookit_api::services::{BookingError, BookingNotifier, BookingService};
use bookit_api::store::{BookingLedger, EventCatalog, MemoryStore, Stores};
use bookit_api::models::booking::MAX_TOTAL_PRICE;
use bookit_api::models::event::MAX_PRICE;
use bookit_api::models::{BookingStatus, TransactionStatus};
use test_helpers::*;

fn service(store: &Arc<MemoryStore>, notifier: Arc<dyn BookingNotifier>) -> BookingService {
    let stores = Stores::from_backend(store.clone());
    BookingService::new(stores.users, stores.catalog, stores.ledger, notifier)
}

#[tokio::test]
async fn test_booking_decrements_seats_and_records_transaction() {
    let store = Arc::new(MemoryStore::new());
    let recorder = Arc::new(RecordingNotifier::default());
    let bookings = service(&store, recorder.clone());

    let user = create_user(&store, "fan@example.com", Role::Customer).await;
    let event = create_event(&store, Uuid::new_v4(), 50, Decimal::new(7500, 2)).await;

    let booking = bookings.create_booking(user.id, event.id, 2).await.unwrap();
    assert_eq!(booking.tickets, 2);
    assert_eq!(booking.total_price, Decimal::new(15000, 2));
    assert_eq!(booking.event_name, event.name);
    assert_eq!(booking.status, BookingStatus::Confirmed);

    let event = store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.available_seats, 48);

    let transactions = store.transactions_for_booking(booking.id).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, booking.total_price);
    assert_eq!(transactions[0].payment_method, "card");
    assert_eq!(transactions[0].status, TransactionStatus::Completed);

    assert!(recorder.wait_for_delivery().await, "confirmation was never sent");
    let sent = recorder.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].booking_id, booking.id);
    assert_eq!(sent[0].user_email, "fan@example.com");
    assert_eq!(sent[0].tickets, 2);
    assert_eq!(sent[0].total_price, Decimal::new(15000, 2));
}

#[tokio::test]
async fn test_overbooking_is_rejected_without_side_effects() {
    let store = Arc::new(MemoryStore::new());
    let bookings = service(&store, Arc::new(RecordingNotifier::default()));
    let user = create_user(&store, "fan@example.com", Role::Customer).await;
    let event = create_event(&store, Uuid::new_v4(), 3, Decimal::new(1000, 2)).await;

    let err = bookings.create_booking(user.id, event.id, 4).await.unwrap_err();
    assert!(matches!(err, BookingError::InsufficientSeats { requested: 4, available: 3 }));

    assert_eq!(store.get_event(event.id).await.unwrap().unwrap().available_seats, 3);
    assert!(store.bookings_for_user(user.id).await.unwrap().is_empty());
    assert_eq!(store.totals().await.unwrap().bookings, 0);
}

#[tokio::test]
async fn test_exact_remaining_seats_can_be_booked() {
    let store = Arc::new(MemoryStore::new());
    let bookings = service(&store, Arc::new(RecordingNotifier::default()));
    let user = create_user(&store, "fan@example.com", Role::Customer).await;
    let event = create_event(&store, Uuid::new_v4(), 3, Decimal::ZERO).await;

    bookings.create_booking(user.id, event.id, 3).await.unwrap();
    let event = store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.available_seats, 0);

    let err = bookings.create_booking(user.id, event.id, 1).await.unwrap_err();
    assert!(matches!(err, BookingError::InsufficientSeats { available: 0, .. }));
}

#[tokio::test]
async fn test_invalid_ticket_counts_and_unknown_events() {
    let store = Arc::new(MemoryStore::new());
    let bookings = service(&store, Arc::new(RecordingNotifier::default()));
    let user = create_user(&store, "fan@example.com", Role::Customer).await;
    let event = create_event(&store, Uuid::new_v4(), 10, Decimal::ONE).await;

    for tickets in [0, -2] {
        let err = bookings.create_booking(user.id, event.id, tickets).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidTickets(n) if n == tickets));
    }

    let err = bookings.create_booking(user.id, Uuid::new_v4(), 1).await.unwrap_err();
    assert!(matches!(err, BookingError::EventNotFound));
    assert_eq!(store.get_event(event.id).await.unwrap().unwrap().available_seats, 10);
}

#[tokio::test]
async fn test_unrepresentable_totals_are_rejected_without_panicking() {
    let store = Arc::new(MemoryStore::new());
    let bookings = service(&store, Arc::new(RecordingNotifier::default()));
    let user = create_user(&store, "fan@example.com", Role::Customer).await;

    // A price no form would accept, written straight to the catalog.
    let absurd = create_event(&store, Uuid::new_v4(), 10, Decimal::MAX).await;
    let attempt = {
        let bookings = bookings.clone();
        let (user_id, event_id) = (user.id, absurd.id);
        tokio::spawn(async move { bookings.create_booking(user_id, event_id, 2).await })
    };
    let err = attempt.await.expect("booking task must not panic").unwrap_err();
    assert!(matches!(err, BookingError::TotalTooLarge));
    assert_eq!(store.get_event(absurd.id).await.unwrap().unwrap().available_seats, 10);

    // Largest valid price times enough tickets exceeds what the ledger can store.
    let pricey = create_event(&store, Uuid::new_v4(), 200_000_000, MAX_PRICE).await;
    let err = bookings.create_booking(user.id, pricey.id, 150_000_000).await.unwrap_err();
    assert!(matches!(err, BookingError::TotalTooLarge));
    assert_eq!(
        store.get_event(pricey.id).await.unwrap().unwrap().available_seats,
        200_000_000
    );
    assert_eq!(store.totals().await.unwrap().bookings, 0);

    // A large total within range still books.
    let booking = bookings.create_booking(user.id, pricey.id, 100_000).await.unwrap();
    assert_eq!(booking.total_price, MAX_PRICE * Decimal::from(100_000));
    assert!(booking.total_price <= MAX_TOTAL_PRICE);
}

#[tokio::test]
async fn test_ledger_failure_surfaces_and_keeps_seats() {
    let store = Arc::new(MemoryStore::new());
    let recorder = Arc::new(RecordingNotifier::default());
    let bookings = service(&store, recorder.clone());
    let user = create_user(&store, "fan@example.com", Role::Customer).await;
    let event = create_event(&store, Uuid::new_v4(), 10, Decimal::ONE).await;

    store.reject_ledger_writes(true);
    let err = bookings.create_booking(user.id, event.id, 2).await.unwrap_err();
    assert!(matches!(err, BookingError::Store(_)));

    assert_eq!(store.get_event(event.id).await.unwrap().unwrap().available_seats, 10);
    assert!(store.bookings_for_user(user.id).await.unwrap().is_empty());
    assert!(!recorder.wait_for_delivery().await, "no confirmation for a failed booking");

    store.reject_ledger_writes(false);
    bookings.create_booking(user.id, event.id, 2).await.unwrap();
    assert_eq!(store.get_event(event.id).await.unwrap().unwrap().available_seats, 8);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_booking() {
    let store = Arc::new(MemoryStore::new());
    let failing = Arc::new(FailingNotifier::default());
    let bookings = service(&store, failing.clone());
    let user = create_user(&store, "fan@example.com", Role::Customer).await;
    let event = create_event(&store, Uuid::new_v4(), 10, Decimal::ONE).await;

    let booking = bookings.create_booking(user.id, event.id, 1).await.unwrap();
    assert!(failing.wait_for_attempt().await);

    let stored = store.bookings_for_user(user.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, booking.id);
    assert_eq!(store.get_event(event.id).await.unwrap().unwrap().available_seats, 9);
}

#[tokio::test]
async fn test_concurrent_bookings_never_oversell() {
    let store = Arc::new(MemoryStore::new());
    let bookings = service(&store, Arc::new(RecordingNotifier::default()));
    let user = create_user(&store, "fan@example.com", Role::Customer).await;
    let event = create_event(&store, Uuid::new_v4(), 10, Decimal::new(2000, 2)).await;

    // 8 attempts of 3 tickets against 10 seats: exactly 3 can succeed.
    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let bookings = bookings.clone();
            let (user_id, event_id) = (user.id, event.id);
            tokio::spawn(async move { bookings.create_booking(user_id, event_id, 3).await })
        })
        .collect();

    let mut accepted = 0;
    for attempt in futures::future::join_all(attempts).await {
        match attempt.unwrap() {
            Ok(_) => accepted += 1,
            Err(BookingError::InsufficientSeats { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 3);
    let event = store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(event.available_seats, 1);

    let totals = store.totals().await.unwrap();
    assert_eq!(totals.bookings, 3);
    assert_eq!(totals.tickets_sold, 9);
    assert_eq!(totals.revenue, Decimal::new(18000, 2));
}
