use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{BookingLedger, EventCatalog, LedgerTotals, StoreError, UserStore};
use crate::database::DatabasePool;
use crate::models::{
    Booking, BookingDraft, BookingId, BookingStatus, Event, EventId, NewEvent, NewUser, Role,
    Transaction, TransactionStatus, User, UserId,
};

const EVENT_COLUMNS: &str = "id, name, description, event_date, event_time, venue, price, total_seats, \
     available_seats, category, image_url, created_by, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: DatabasePool,
}

impl PgStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what.to_string()),
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, display_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, display_name, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already registered"))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, display_name, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, display_name, role, created_at FROM users WHERE email = $1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(user)
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&*self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl EventCatalog for PgStore {
    async fn create_event(&self, event: NewEvent) -> Result<Event, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO events (id, name, description, event_date, event_time, venue, price,
                                total_seats, available_seats, category, image_url, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10, $11, $12)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Event>(&sql)
            .bind(Uuid::new_v4())
            .bind(&event.name)
            .bind(&event.description)
            .bind(event.date)
            .bind(event.time)
            .bind(&event.venue)
            .bind(event.price)
            .bind(event.total_seats)
            .bind(&event.category)
            .bind(&event.image_url)
            .bind(event.created_by)
            .bind(Utc::now())
            .fetch_one(&*self.pool)
            .await?;
        Ok(created)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date, event_time, name");
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&*self.pool)
            .await?;
        Ok(events)
    }

    async fn count_events(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&*self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl BookingLedger for PgStore {
    async fn commit_booking(&self, draft: BookingDraft) -> Result<(Booking, Transaction), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement: concurrent bookings serialise on the row lock
        // and the loser sees the already-reduced count.
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE events
            SET available_seats = available_seats - $1
            WHERE id = $2 AND available_seats >= $1
            RETURNING available_seats
            "#,
        )
        .bind(draft.tickets)
        .bind(draft.event_id)
        .fetch_optional(&mut *tx)
        .await?;

        if remaining.is_none() {
            let available: Option<i32> =
                sqlx::query_scalar("SELECT available_seats FROM events WHERE id = $1")
                    .bind(draft.event_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;
            return Err(match available {
                Some(available) => StoreError::InsufficientSeats { available },
                None => StoreError::NotFound,
            });
        }

        let now = Utc::now();
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, user_id, event_id, event_name, tickets, total_price, booking_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, event_id, event_name, tickets, total_price, booking_date, status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.user_id)
        .bind(draft.event_id)
        .bind(&draft.event_name)
        .bind(draft.tickets)
        .bind(draft.total_price)
        .bind(now)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, booking_id, amount, payment_method, transaction_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, booking_id, amount, payment_method, transaction_date, status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.id)
        .bind(booking.total_price)
        .bind(&draft.payment_method)
        .bind(now)
        .bind(TransactionStatus::Completed.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((booking, transaction))
    }

    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>, StoreError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, event_id, event_name, tickets, total_price, booking_date, status
            FROM bookings
            WHERE user_id = $1
            ORDER BY booking_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(bookings)
    }

    async fn transactions_for_booking(&self, booking_id: BookingId) -> Result<Vec<Transaction>, StoreError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, booking_id, amount, payment_method, transaction_date, status
            FROM transactions
            WHERE booking_id = $1
            ORDER BY transaction_date
            "#,
        )
        .bind(booking_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(transactions)
    }

    async fn totals(&self) -> Result<LedgerTotals, StoreError> {
        let (bookings, tickets_sold, revenue): (i64, i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(tickets), 0)::BIGINT,
                   COALESCE(SUM(total_price), 0)::NUMERIC
            FROM bookings
            "#,
        )
        .fetch_one(&*self.pool)
        .await?;
        Ok(LedgerTotals {
            bookings,
            tickets_sold,
            revenue,
        })
    }
}
