use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, User, UserId};
use crate::utils::flash::{self, Flash};
use crate::AppState;

pub const SESSION_COOKIE: &str = "bookit_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub exp: usize,
}

/// The signed-in user, attached to the request by `session_middleware`.
/// `role` comes from the credential store on every request.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

pub fn issue_session_token(user: &User, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let exp = Utc::now().timestamp().max(0) as usize + ttl.as_secs() as usize;
    let claims = Claims {
        user_id: user.id.to_string(),
        email: user.email.clone(),
        exp,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::Internal(format!("failed to sign session token: {e}")))
}

pub fn decode_session_token(token: &str, secret: &str) -> Option<Claims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .ok()
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

// Bearer header first, then the session cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

async fn resolve_session(state: &AppState, token: &str) -> Option<AuthUser> {
    let claims = decode_session_token(token, &state.config.session_secret)?;
    let user_id = Uuid::parse_str(&claims.user_id).ok()?;

    match state.users.find_user(user_id).await {
        Ok(Some(user)) => Some(AuthUser {
            user_id: user.id,
            email: user.email,
            role: user.role,
        }),
        Ok(None) => {
            tracing::debug!(%user_id, "Session refers to a user that no longer exists");
            None
        }
        Err(e) => {
            tracing::warn!(%user_id, error = %e, "Could not load session user");
            None
        }
    }
}

/// Attaches `AuthUser` when the request carries a valid session. Never
/// rejects; the guards below decide what an anonymous request may reach.
pub async fn session_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = session_token(req.headers()) {
        if let Some(user) = resolve_session(&state, &token).await {
            req.extensions_mut().insert(user);
        }
    }
    next.run(req).await
}

fn login_redirect() -> Response {
    let jar = flash::set(CookieJar::new(), Flash::LoginRequired);
    (jar, Redirect::to("/login")).into_response()
}

pub async fn require_login(req: Request, next: Next) -> Response {
    if req.extensions().get::<AuthUser>().is_none() {
        return login_redirect();
    }
    next.run(req).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<AuthUser>() {
        None => login_redirect(),
        Some(user) if !user.is_admin() => {
            tracing::info!(user_id = %user.user_id, path = %req.uri().path(), "Non-admin denied admin page");
            (StatusCode::FORBIDDEN, "Unauthorized").into_response()
        }
        Some(_) => next.run(req).await,
    }
}

pub async fn require_api_login(req: Request, next: Next) -> Response {
    if req.extensions().get::<AuthUser>().is_none() {
        return AppError::Unauthorized.into_response();
    }
    next.run(req).await
}

pub async fn require_api_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<AuthUser>() {
        None => AppError::Unauthorized.into_response(),
        Some(user) if !user.is_admin() => AppError::Forbidden.into_response(),
        Some(_) => next.run(req).await,
    }
}
