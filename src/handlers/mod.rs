pub mod admin;
pub mod auth;
pub mod bookings;
pub mod chat;
pub mod events;
pub mod functions;
pub mod stats;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::utils::flash::FlashView;

/// Unwrap a JSON body, turning extractor rejections into the usual
/// `{success: false, error}` shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Who is looking at a page.
#[derive(Debug, Serialize)]
pub struct Viewer {
    pub email: String,
    pub role: crate::models::Role,
}

impl From<&AuthUser> for Viewer {
    fn from(user: &AuthUser) -> Self {
        Self {
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Envelope for page routes: the page's data plus the consumed flash.
#[derive(Debug, Serialize)]
pub struct PageView<T: Serialize> {
    pub success: bool,
    pub page: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<FlashView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<Viewer>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> PageView<T> {
    pub fn new(page: &'static str, data: T, flash: Option<FlashView>, viewer: Option<&AuthUser>) -> Self {
        Self {
            success: true,
            page,
            flash,
            viewer: viewer.map(Viewer::from),
            data,
        }
    }
}
