use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::{json_body, PageView};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::ids::parse_id;
use crate::models::Booking;
use crate::services::BookingError;
use crate::utils::flash::{self, Flash};
use crate::AppState;

const DEFAULT_TICKETS: i32 = 1;

#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    pub tickets: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub event_id: String,
    pub tickets: Option<i32>,
}

#[derive(Serialize)]
pub struct BookingsPage {
    pub bookings: Vec<Booking>,
}

/// `POST /book/:event_id`. Outcomes are reported through the flash cookie;
/// failures send the user back to the event page.
pub async fn book_form(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    Path(event_id): Path<String>,
    Form(form): Form<BookForm>,
) -> Response {
    let Some(id) = parse_id(&event_id) else {
        return (StatusCode::NOT_FOUND, "Event not found").into_response();
    };
    let back_to_event = Redirect::to(&format!("/event/{id}"));

    let tickets = match form.tickets.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        None => DEFAULT_TICKETS,
        Some(raw) => match raw.parse::<i32>() {
            Ok(n) => n,
            Err(_) => return (flash::set(jar, Flash::InvalidInput), back_to_event).into_response(),
        },
    };

    match state.bookings.create_booking(user.user_id, id, tickets).await {
        Ok(booking) => {
            let flash = Flash::Booked {
                tickets: booking.tickets.unsigned_abs(),
            };
            (flash::set(jar, flash), Redirect::to("/my-bookings")).into_response()
        }
        Err(BookingError::EventNotFound) => (StatusCode::NOT_FOUND, "Event not found").into_response(),
        Err(BookingError::InvalidTickets(_) | BookingError::TotalTooLarge) => {
            (flash::set(jar, Flash::InvalidInput), back_to_event).into_response()
        }
        Err(BookingError::InsufficientSeats { .. }) => {
            (flash::set(jar, Flash::SeatsUnavailable), back_to_event).into_response()
        }
        Err(BookingError::Store(e)) => {
            tracing::error!(event_id = %id, user_id = %user.user_id, error = %e, "Booking form failed");
            (flash::set(jar, Flash::BookingFailed), back_to_event).into_response()
        }
    }
}

pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let bookings = state.ledger.bookings_for_user(user.user_id).await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, Json(PageView::new("my_bookings", BookingsPage { bookings }, flash, Some(&user)))).into_response())
}

pub async fn api_list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let bookings = state.ledger.bookings_for_user(user.user_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": bookings.len(),
        "bookings": bookings,
    })))
}

pub async fn api_create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let req = json_body(payload)?;
    let event_id = parse_id(&req.event_id).ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    let tickets = req.tickets.unwrap_or(DEFAULT_TICKETS);

    let booking = state.bookings.create_booking(user.user_id, event_id, tickets).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "booking": booking })),
    ))
}
