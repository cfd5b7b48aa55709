use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{admin, auth, bookings, chat, events, functions, stats};
use crate::middleware::auth::{require_admin, require_api_admin, require_api_login, require_login, session_middleware};
use crate::middleware::rate_limit::chat_rate_limit_middleware;
use crate::middleware::security_headers::security_headers_middleware;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let public_pages = Router::new()
        .route("/", get(events::index))
        .route("/events", get(events::events_page))
        .route("/event/:id", get(events::event_detail))
        .route("/register", get(auth::register_page).post(auth::register_form))
        .route("/login", get(auth::login_page).post(auth::login_form))
        .route("/logout", get(auth::logout));

    let member_pages = Router::new()
        .route("/book/:event_id", post(bookings::book_form))
        .route("/my-bookings", get(bookings::my_bookings))
        .route_layer(from_fn(require_login));

    let admin_pages = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route(
            "/admin/create-event",
            get(admin::create_event_page).post(admin::create_event_form),
        )
        .route_layer(from_fn(require_admin));

    let public_api = Router::new()
        .route("/api/events", get(events::api_list_events))
        .route("/api/events/:id", get(events::api_get_event))
        .route("/api/stats", get(stats::api_stats))
        .route("/api/auth/register", post(auth::api_register))
        .route("/api/auth/login", post(auth::api_login));

    let member_api = Router::new()
        .route(
            "/api/bookings",
            get(bookings::api_list_bookings).post(bookings::api_create_booking),
        )
        .route_layer(from_fn(require_api_login));

    let admin_api = Router::new()
        .route("/api/admin/events", post(admin::api_create_event))
        .route_layer(from_fn(require_api_admin));

    let chat_api = Router::new()
        .route("/api/chat", post(chat::api_chat))
        .route_layer(from_fn_with_state(state.clone(), chat_rate_limit_middleware));

    let functions = Router::new()
        .route("/functions/booking-confirmation", post(functions::booking_confirmation))
        .route("/functions/event-analytics", get(functions::event_analytics));

    Router::new()
        .route("/health", get(health_check))
        .merge(public_pages)
        .merge(member_pages)
        .merge(admin_pages)
        .merge(public_api)
        .merge(member_api)
        .merge(admin_api)
        .merge(chat_api)
        .merge(functions)
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
