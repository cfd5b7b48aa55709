use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};

use super::ids::{EventId, UserId};

/// 99,999,999.99: the largest ticket price `events.price NUMERIC(10, 2)` holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, 2);

#[derive(Clone, Debug, Serialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    #[serde(with = "crate::utils::date::hhmm")]
    pub time: NaiveTime,
    pub venue: String,
    pub price: Decimal,
    pub total_seats: i32,
    /// Always within `0..=total_seats`.
    pub available_seats: i32,
    pub category: String,
    pub image_url: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Event {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            date: row.try_get("event_date")?,
            time: row.try_get("event_time")?,
            venue: row.try_get("venue")?,
            price: row.try_get("price")?,
            total_seats: row.try_get("total_seats")?,
            available_seats: row.try_get("available_seats")?,
            category: row.try_get("category")?,
            image_url: row.try_get("image_url")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A validated event ready to be inserted; seats start fully available.
#[derive(Clone, Debug)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub venue: String,
    pub price: Decimal,
    pub total_seats: i32,
    pub category: String,
    pub image_url: Option<String>,
    pub created_by: UserId,
}
