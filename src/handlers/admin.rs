use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{json_body, PageView};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::event::MAX_PRICE;
use crate::models::{NewEvent, UserId};
use crate::utils::date::{parse_date, parse_time};
use crate::utils::flash::{self, Flash};
use crate::AppState;

/// Event fields as submitted by the admin form or the JSON API. Everything
/// arrives as text; numbers sent as JSON numbers are accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct EventForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub total_seats: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct TextOrNumber;

    impl<'de> serde::de::Visitor<'de> for TextOrNumber {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(TextOrNumber)
}

pub fn validate_event(form: EventForm, created_by: UserId) -> Result<NewEvent, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Event name is required".to_string()));
    }
    let venue = form.venue.trim();
    if venue.is_empty() {
        return Err(AppError::Validation("Venue is required".to_string()));
    }
    let date = parse_date(&form.date).ok_or_else(|| AppError::Validation("Date must be YYYY-MM-DD".to_string()))?;
    let time = parse_time(&form.time).ok_or_else(|| AppError::Validation("Time must be HH:MM".to_string()))?;

    let price = Decimal::from_str(form.price.trim())
        .ok()
        .map(|p| p.round_dp(2))
        .filter(|p| !p.is_sign_negative() && *p <= MAX_PRICE)
        .ok_or_else(|| AppError::Validation(format!("Price must be a number between 0 and {MAX_PRICE}")))?;

    let total_seats = form
        .total_seats
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|s| *s >= 0)
        .ok_or_else(|| AppError::Validation("Total seats must be a non-negative integer".to_string()))?;

    Ok(NewEvent {
        name: name.to_string(),
        description: form.description.trim().to_string(),
        date,
        time,
        venue: venue.to_string(),
        price,
        total_seats,
        category: form.category.trim().to_string(),
        image_url: form.image_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
        created_by,
    })
}

#[derive(Serialize)]
pub struct DashboardStats {
    pub events_count: i64,
    pub users_count: i64,
    pub bookings_count: i64,
}

#[derive(Serialize)]
pub struct DashboardPage {
    pub statistics: DashboardStats,
}

#[derive(Serialize)]
pub struct CreateEventPage {}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let statistics = DashboardStats {
        events_count: state.catalog.count_events().await?,
        users_count: state.users.count_users().await?,
        bookings_count: state.ledger.totals().await?.bookings,
    };
    let (jar, flash) = flash::take(jar);
    Ok((jar, Json(PageView::new("admin_dashboard", DashboardPage { statistics }, flash, Some(&admin)))).into_response())
}

pub async fn create_event_page(Extension(admin): Extension<AuthUser>, jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    (jar, Json(PageView::new("create_event", CreateEventPage {}, flash, Some(&admin))))
}

pub async fn create_event_form(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    jar: CookieJar,
    Form(form): Form<EventForm>,
) -> Response {
    let new_event = match validate_event(form, admin.user_id) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(reason = %e, "Create event form rejected");
            return (flash::set(jar, Flash::InvalidInput), Redirect::to("/admin/create-event")).into_response();
        }
    };

    match state.catalog.create_event(new_event).await {
        Ok(event) => {
            tracing::info!(event_id = %event.id, admin_id = %admin.user_id, name = %event.name, "Event created");
            (flash::set(jar, Flash::EventCreated), Redirect::to("/admin/dashboard")).into_response()
        }
        Err(e) => AppError::Store(e).into_response(),
    }
}

pub async fn api_create_event(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    payload: Result<Json<EventForm>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let form = json_body(payload)?;
    let event = state.catalog.create_event(validate_event(form, admin.user_id)?).await?;
    tracing::info!(event_id = %event.id, admin_id = %admin.user_id, name = %event.name, "Event created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "event": event })),
    ))
}
