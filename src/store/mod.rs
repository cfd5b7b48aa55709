//! Persistence seams for credentials, the event catalog and the booking ledger.
//!
//! All three live in one transactional store so that a booking, its
//! transaction and the seat decrement commit or roll back together.
//! `postgres::PgStore` is the production backend; `memory::MemoryStore`
//! provides the same guarantees in process for development and tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    Booking, BookingDraft, BookingId, Event, EventId, NewEvent, NewUser, Role, Transaction, User,
    UserId,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("only {available} seat(s) left")]
    InsufficientSeats { available: i32 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} total overflowed")]
    Overflow(&'static str),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LedgerTotals {
    pub bookings: i64,
    pub tickets_sold: i64,
    pub revenue: Decimal,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError>;
    async fn count_users(&self) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait EventCatalog: Send + Sync {
    async fn create_event(&self, event: NewEvent) -> Result<Event, StoreError>;
    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError>;
    /// Ordered by date, then start time.
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;
    async fn count_events(&self) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Decrement the event's available seats by `draft.tickets` and record the
    /// booking plus its transaction as one unit.
    ///
    /// The decrement only applies while `available_seats >= tickets`; when it
    /// does not, nothing is written and the error is `InsufficientSeats` (or
    /// `NotFound` if the event vanished).
    async fn commit_booking(&self, draft: BookingDraft) -> Result<(Booking, Transaction), StoreError>;
    /// Newest first.
    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>, StoreError>;
    async fn transactions_for_booking(&self, booking_id: BookingId) -> Result<Vec<Transaction>, StoreError>;
    async fn totals(&self) -> Result<LedgerTotals, StoreError>;
}

/// The three store handles the application works with. Both backends hand out
/// the same underlying instance for all three.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn EventCatalog>,
    pub ledger: Arc<dyn BookingLedger>,
}

impl Stores {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: UserStore + EventCatalog + BookingLedger + 'static,
    {
        Self {
            users: backend.clone(),
            catalog: backend.clone(),
            ledger: backend,
        }
    }
}
