use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Duration;
use thiserror::Error;

use crate::services::booking::BookingError;
use crate::services::chatbot::ChatError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Not enough seats available: requested {requested}, {available} left")]
    InsufficientSeats { requested: i32, available: i32 },

    #[error("Too many requests, please slow down")]
    RateLimited { retry_after: Duration },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::InsufficientSeats { .. } => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Store(_) => "A database error occurred".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidTickets(_) | BookingError::TotalTooLarge => AppError::Validation(err.to_string()),
            BookingError::EventNotFound => AppError::NotFound("Event not found".to_string()),
            BookingError::InsufficientSeats { requested, available } => {
                AppError::InsufficientSeats { requested, available }
            }
            BookingError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Store(e) => tracing::error!(error = ?e, "Store error"),
            AppError::Internal(msg) => tracing::error!(message = %msg, "Internal error"),
            _ => tracing::debug!(status = %status, error = %self, "Request rejected"),
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.public_message(),
        });
        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = &self {
            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
