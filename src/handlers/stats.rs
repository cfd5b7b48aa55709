use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Statistics {
    pub total_events: i64,
    pub total_users: i64,
    pub total_bookings: i64,
    pub total_tickets_sold: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub statistics: Statistics,
}

pub async fn api_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let totals = state.ledger.totals().await?;
    let statistics = Statistics {
        total_events: state.catalog.count_events().await?,
        total_users: state.users.count_users().await?,
        total_bookings: totals.bookings,
        total_tickets_sold: totals.tickets_sold,
        total_revenue: totals.revenue,
    };
    Ok(Json(StatsResponse {
        success: true,
        statistics,
    }))
}
