use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookingLedger, EventCatalog, LedgerTotals, StoreError, UserStore};
use crate::models::{
    Booking, BookingDraft, BookingId, BookingStatus, Event, EventId, NewEvent, NewUser, Role,
    Transaction, TransactionStatus, User, UserId,
};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    events: HashMap<EventId, Event>,
    bookings: Vec<Booking>,
    transactions: Vec<Transaction>,
}

/// In-process store. Every ledger commit runs under a single write lock, which
/// gives the same all-or-nothing behaviour as the database transaction.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    reject_ledger_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `commit_booking` fail before touching any state.
    pub fn reject_ledger_writes(&self, reject: bool) {
        self.reject_ledger_writes.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            display_name: user.display_name,
            role: user.role,
            created_at: Utc::now(),
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.role = role;
        Ok(())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.users.len() as i64)
    }
}

#[async_trait]
impl EventCatalog for MemoryStore {
    async fn create_event(&self, event: NewEvent) -> Result<Event, StoreError> {
        let created = Event {
            id: Uuid::new_v4(),
            name: event.name,
            description: event.description,
            date: event.date,
            time: event.time,
            venue: event.venue,
            price: event.price,
            total_seats: event.total_seats,
            available_seats: event.total_seats,
            category: event.category,
            image_url: event.image_url,
            created_by: event.created_by,
            created_at: Utc::now(),
        };
        self.inner.write().await.events.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self.inner.read().await.events.values().cloned().collect();
        events.sort_by(|a, b| (a.date, a.time, &a.name).cmp(&(b.date, b.time, &b.name)));
        Ok(events)
    }

    async fn count_events(&self) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.events.len() as i64)
    }
}

#[async_trait]
impl BookingLedger for MemoryStore {
    async fn commit_booking(&self, draft: BookingDraft) -> Result<(Booking, Transaction), StoreError> {
        if self.reject_ledger_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("ledger writes rejected".to_string()));
        }

        let mut inner = self.inner.write().await;
        let event = inner.events.get_mut(&draft.event_id).ok_or(StoreError::NotFound)?;
        if event.available_seats < draft.tickets {
            return Err(StoreError::InsufficientSeats {
                available: event.available_seats,
            });
        }
        event.available_seats -= draft.tickets;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            event_id: draft.event_id,
            event_name: draft.event_name,
            tickets: draft.tickets,
            total_price: draft.total_price,
            booking_date: now,
            status: BookingStatus::Confirmed,
        };
        let transaction = Transaction {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            amount: booking.total_price,
            payment_method: draft.payment_method,
            transaction_date: now,
            status: TransactionStatus::Completed,
        };
        inner.bookings.push(booking.clone());
        inner.transactions.push(transaction.clone());
        Ok((booking, transaction))
    }

    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.read().await;
        // Pushed in commit order, so reversing yields newest first.
        Ok(inner
            .bookings
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn transactions_for_booking(&self, booking_id: BookingId) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .transactions
            .iter()
            .filter(|t| t.booking_id == booking_id)
            .cloned()
            .collect())
    }

    async fn totals(&self) -> Result<LedgerTotals, StoreError> {
        let inner = self.inner.read().await;
        let revenue = inner
            .bookings
            .iter()
            .try_fold(Decimal::ZERO, |sum, b| sum.checked_add(b.total_price))
            .ok_or(StoreError::Overflow("revenue"))?;
        Ok(LedgerTotals {
            bookings: inner.bookings.len() as i64,
            tickets_sold: inner.bookings.iter().map(|b| i64::from(b.tickets)).sum(),
            revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn new_event(seats: i32) -> NewEvent {
        NewEvent {
            name: "Jazz Night".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            venue: "Blue Room".to_string(),
            price: Decimal::new(2500, 2),
            total_seats: seats,
            category: "Concert".to_string(),
            image_url: None,
            created_by: Uuid::new_v4(),
        }
    }

    fn draft(event: &Event, tickets: i32) -> BookingDraft {
        BookingDraft {
            user_id: Uuid::new_v4(),
            event_id: event.id,
            event_name: event.name.clone(),
            tickets,
            total_price: event.price * Decimal::from(tickets),
            payment_method: "card".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        let user = NewUser {
            email: "dup@example.com".to_string(),
            password_hash: "x".to_string(),
            display_name: "Dup".to_string(),
            role: Role::Customer,
        };
        store.create_user(user.clone()).await.unwrap();
        let err = store.create_user(user).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn commit_decrements_and_records_both_rows() {
        let store = MemoryStore::new();
        let event = store.create_event(new_event(5)).await.unwrap();
        assert_eq!(event.available_seats, 5);

        let (booking, transaction) = store.commit_booking(draft(&event, 2)).await.unwrap();
        assert_eq!(transaction.booking_id, booking.id);
        assert_eq!(transaction.amount, Decimal::new(5000, 2));
        assert_eq!(store.get_event(event.id).await.unwrap().unwrap().available_seats, 3);

        let totals = store.totals().await.unwrap();
        assert_eq!(totals.bookings, 1);
        assert_eq!(totals.tickets_sold, 2);
        assert_eq!(totals.revenue, Decimal::new(5000, 2));
    }

    #[tokio::test]
    async fn overbooking_leaves_state_untouched() {
        let store = MemoryStore::new();
        let event = store.create_event(new_event(1)).await.unwrap();

        let err = store.commit_booking(draft(&event, 2)).await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientSeats { available: 1 }));
        assert_eq!(store.get_event(event.id).await.unwrap().unwrap().available_seats, 1);
        assert_eq!(store.totals().await.unwrap().bookings, 0);
    }

    #[tokio::test]
    async fn rejected_writes_do_not_decrement() {
        let store = MemoryStore::new();
        let event = store.create_event(new_event(3)).await.unwrap();
        store.reject_ledger_writes(true);

        let err = store.commit_booking(draft(&event, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.get_event(event.id).await.unwrap().unwrap().available_seats, 3);
    }

    #[tokio::test]
    async fn revenue_overflow_is_an_error() {
        let store = MemoryStore::new();
        let event = store.create_event(new_event(4)).await.unwrap();
        for _ in 0..2 {
            let huge = BookingDraft {
                total_price: Decimal::MAX,
                ..draft(&event, 1)
            };
            store.commit_booking(huge).await.unwrap();
        }

        let err = store.totals().await.unwrap_err();
        assert!(matches!(err, StoreError::Overflow("revenue")));
    }

    #[tokio::test]
    async fn events_are_listed_chronologically() {
        let store = MemoryStore::new();
        let mut late = new_event(1);
        late.date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        late.name = "Late".to_string();
        let mut early = new_event(1);
        early.date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        early.name = "Early".to_string();
        store.create_event(late).await.unwrap();
        store.create_event(early).await.unwrap();

        let names: Vec<String> = store.list_events().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Early".to_string(), "Late".to_string()]);
    }
}
