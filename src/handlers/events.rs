use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use super::PageView;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::ids::parse_id;
use crate::models::{Event, User};
use crate::utils::flash;
use crate::AppState;

#[derive(Serialize)]
pub struct EventsPage {
    pub events: Vec<Event>,
}

#[derive(Serialize)]
pub struct HomePage {
    pub events: Vec<Event>,
    pub user: Option<User>,
}

#[derive(Serialize)]
pub struct EventPage {
    pub event: Event,
}

pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: Option<Extension<AuthUser>>,
) -> Result<Response, AppError> {
    let events = state.catalog.list_events().await?;
    let viewer = auth.as_ref().map(|Extension(u)| u);
    let user = match viewer {
        Some(u) => state.users.find_user(u.user_id).await?,
        None => None,
    };

    let (jar, flash) = flash::take(jar);
    Ok((jar, Json(PageView::new("index", HomePage { events, user }, flash, viewer))).into_response())
}

pub async fn events_page(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: Option<Extension<AuthUser>>,
) -> Result<Response, AppError> {
    let events = state.catalog.list_events().await?;
    let (jar, flash) = flash::take(jar);
    let viewer = auth.as_ref().map(|Extension(u)| u);
    Ok((jar, Json(PageView::new("events", EventsPage { events }, flash, viewer))).into_response())
}

pub async fn event_detail(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: Option<Extension<AuthUser>>,
    Path(event_id): Path<String>,
) -> Result<Response, AppError> {
    let event = match parse_id(&event_id) {
        Some(id) => state.catalog.get_event(id).await?,
        None => None,
    };
    let Some(event) = event else {
        return Ok((StatusCode::NOT_FOUND, "Event not found").into_response());
    };

    let (jar, flash) = flash::take(jar);
    let viewer = auth.as_ref().map(|Extension(u)| u);
    Ok((jar, Json(PageView::new("event_detail", EventPage { event }, flash, viewer))).into_response())
}

pub async fn api_list_events(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let events = state.catalog.list_events().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": events.len(),
        "events": events,
    })))
}

pub async fn api_get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&event_id).ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    let event = state
        .catalog
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    Ok(Json(serde_json::json!({ "success": true, "event": event })))
}
