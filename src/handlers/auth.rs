use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};

use super::{json_body, PageView};
use crate::error::AppError;
use crate::middleware::auth::{clear_session, issue_session_token, session_cookie};
use crate::middleware::AuthUser;
use crate::models::{NewUser, Role, User};
use crate::store::StoreError;
use crate::utils::flash::{self, Flash};
use crate::AppState;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Registration fields. Any `role` sent along is ignored: accounts are
/// always created as customers.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain
/// with non-empty labels on both sides.
pub fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

fn validate_registration(req: &RegisterRequest) -> Result<(String, String), AppError> {
    let email = normalize_email(&req.email);
    if !looks_like_email(&email) {
        return Err(AppError::Validation("A valid email address is required".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok((email, name.to_string()))
}

pub async fn register_user(state: &AppState, req: RegisterRequest) -> Result<User, AppError> {
    let (email, display_name) = validate_registration(&req)?;

    if state.users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash(&req.password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("register: hash: {e}")))?;

    let user = state
        .users
        .create_user(NewUser {
            email,
            password_hash,
            display_name,
            role: Role::Customer,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration of the same address.
            StoreError::Conflict(_) => AppError::Conflict("Email already registered".to_string()),
            other => AppError::Store(other),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, "User registered");
    Ok(user)
}

pub async fn authenticate(state: &AppState, req: &LoginRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let Some(user) = state.users.find_user_by_email(&email).await? else {
        tracing::info!(%email, "Login failed: unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let valid = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("login: verify: {e}")))?;
    if !valid {
        tracing::info!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(user)
}

fn issue_token(state: &AppState, user: &User) -> Result<String, AppError> {
    issue_session_token(
        user,
        &state.config.session_secret,
        std::time::Duration::from_secs(state.config.session_ttl_secs),
    )
}

#[derive(Serialize)]
pub struct AuthPage {}

pub async fn register_page(jar: CookieJar, user: Option<Extension<AuthUser>>) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    let viewer = user.as_ref().map(|Extension(u)| u);
    (jar, Json(PageView::new("register", AuthPage {}, flash, viewer)))
}

pub async fn login_page(jar: CookieJar, user: Option<Extension<AuthUser>>) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    let viewer = user.as_ref().map(|Extension(u)| u);
    (jar, Json(PageView::new("login", AuthPage {}, flash, viewer)))
}

pub async fn register_form(State(state): State<AppState>, jar: CookieJar, Form(req): Form<RegisterRequest>) -> Response {
    match register_user(&state, req).await {
        Ok(_) => (flash::set(jar, Flash::Registered), Redirect::to("/login")).into_response(),
        Err(AppError::Conflict(_)) => (flash::set(jar, Flash::EmailTaken), Redirect::to("/register")).into_response(),
        Err(AppError::Validation(msg)) => {
            tracing::debug!(reason = %msg, "Registration form rejected");
            (flash::set(jar, Flash::InvalidInput), Redirect::to("/register")).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn login_form(State(state): State<AppState>, jar: CookieJar, Form(req): Form<LoginRequest>) -> Response {
    let user = match authenticate(&state, &req).await {
        Ok(user) => user,
        Err(AppError::InvalidCredentials) => {
            return (flash::set(jar, Flash::InvalidCredentials), Redirect::to("/login")).into_response();
        }
        Err(e) => return e.into_response(),
    };

    match issue_token(&state, &user) {
        Ok(token) => {
            let jar = flash::set(jar.add(session_cookie(token)), Flash::LoggedIn);
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn logout(jar: CookieJar, user: Option<Extension<AuthUser>>) -> Response {
    if let Some(Extension(user)) = user {
        tracing::info!(user_id = %user.user_id, "User logged out");
    }
    let jar = flash::set(clear_session(jar), Flash::LoggedOut);
    (jar, Redirect::to("/")).into_response()
}

pub async fn api_register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let req = json_body(payload)?;
    let user = register_user(&state, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "user": user })),
    ))
}

pub async fn api_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let req = json_body(payload)?;
    let user = authenticate(&state, &req).await?;
    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse {
        success: true,
        token,
        user,
    }))
}
