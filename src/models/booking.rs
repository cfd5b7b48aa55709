use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};

use super::ids::{BookingId, EventId, TransactionId, UserId};

pub const DEFAULT_PAYMENT_METHOD: &str = "card";

/// 9,999,999,999,999,999.99: the largest amount `NUMERIC(18, 2)` holds.
pub const MAX_TOTAL_PRICE: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(BookingStatus::Confirmed),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(TransactionStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub event_id: EventId,
    /// Event name at booking time.
    pub event_name: String,
    pub tickets: i32,
    pub total_price: Decimal,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
}

impl<'r> FromRow<'r, PgRow> for Booking {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            event_id: row.try_get("event_id")?,
            event_name: row.try_get("event_name")?,
            tickets: row.try_get("tickets")?,
            total_price: row.try_get("total_price")?,
            booking_date: row.try_get("booking_date")?,
            status: BookingStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: format!("unknown booking status: {status}").into(),
            })?,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub booking_id: BookingId,
    pub amount: Decimal,
    pub payment_method: String,
    pub transaction_date: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl<'r> FromRow<'r, PgRow> for Transaction {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            booking_id: row.try_get("booking_id")?,
            amount: row.try_get("amount")?,
            payment_method: row.try_get("payment_method")?,
            transaction_date: row.try_get("transaction_date")?,
            status: TransactionStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: format!("unknown transaction status: {status}").into(),
            })?,
        })
    }
}

/// Everything the ledger needs to record a booking. Prices are computed by the
/// caller from the event as read just before committing.
#[derive(Clone, Debug)]
pub struct BookingDraft {
    pub user_id: UserId,
    pub event_id: EventId,
    pub event_name: String,
    pub tickets: i32,
    pub total_price: Decimal,
    pub payment_method: String,
}
