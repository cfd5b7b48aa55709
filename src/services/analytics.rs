//! Fixed analytics snapshot served by `/functions/event-analytics`.
//!
//! The figures are placeholders and do not come from the ledger; live counts
//! are available from `/api/stats`.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_PERIOD_DAYS: u32 = 30;

#[derive(Debug, Serialize)]
pub struct CategoryBookings {
    pub category: &'static str,
    pub bookings: u32,
}

#[derive(Debug, Serialize)]
pub struct HourBookings {
    pub hour: u8,
    pub bookings: u32,
}

#[derive(Debug, Serialize)]
pub struct Metrics {
    pub total_bookings: u32,
    pub total_revenue: f64,
    pub average_booking_value: f64,
    pub popular_categories: Vec<CategoryBookings>,
    pub peak_booking_hours: Vec<HourBookings>,
    pub conversion_rate: f64,
    pub average_tickets_per_booking: f64,
}

#[derive(Debug, Serialize)]
pub struct EventSpecific {
    pub views: u32,
    pub bookings: u32,
    pub conversion_rate: f64,
    pub revenue: f64,
    pub avg_rating: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsReport {
    pub success: bool,
    pub period_days: u32,
    pub metrics: Metrics,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_specific: Option<EventSpecific>,
}

pub fn snapshot(period_days: u32, event_id: Option<String>) -> AnalyticsReport {
    let event_id = event_id.filter(|id| !id.trim().is_empty());
    let event_specific = event_id.as_ref().map(|_| EventSpecific {
        views: 234,
        bookings: 45,
        conversion_rate: 0.19,
        revenue: 3375.00,
        avg_rating: 4.5,
    });

    AnalyticsReport {
        success: true,
        period_days,
        metrics: Metrics {
            total_bookings: 45,
            total_revenue: 3375.00,
            average_booking_value: 75.00,
            popular_categories: vec![
                CategoryBookings { category: "Conference", bookings: 20 },
                CategoryBookings { category: "Concert", bookings: 15 },
                CategoryBookings { category: "Workshop", bookings: 10 },
            ],
            peak_booking_hours: vec![
                HourBookings { hour: 14, bookings: 12 },
                HourBookings { hour: 10, bookings: 10 },
                HourBookings { hour: 16, bookings: 8 },
            ],
            conversion_rate: 0.65,
            average_tickets_per_booking: 2.3,
        },
        generated_at: Utc::now(),
        event_id,
        event_specific,
    }
}
