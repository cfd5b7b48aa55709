//! Outbound booking confirmation call.
//!
//! The booking orchestrator calls this fire-and-forget: errors end up in the
//! logs and never in the booking response.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::BookingId;

/// Payload POSTed to the confirmation endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BookingConfirmation {
    pub booking_id: BookingId,
    pub user_email: String,
    pub event_name: String,
    pub tickets: i32,
    pub total_price: Decimal,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("confirmation service answered {0}")]
    Rejected(u16),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn notify(&self, confirmation: &BookingConfirmation) -> Result<(), NotifyError>;
}

pub struct HttpNotifier {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url, timeout })
    }
}

#[async_trait]
impl BookingNotifier for HttpNotifier {
    async fn notify(&self, confirmation: &BookingConfirmation) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(confirmation)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout(self.timeout)
                } else {
                    NotifyError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        tracing::debug!(booking_id = %confirmation.booking_id, status = %status, "Confirmation service accepted booking");
        Ok(())
    }
}

/// Used when no confirmation URL is configured.
pub struct LogNotifier;

#[async_trait]
impl BookingNotifier for LogNotifier {
    async fn notify(&self, confirmation: &BookingConfirmation) -> Result<(), NotifyError> {
        tracing::info!(
            booking_id = %confirmation.booking_id,
            user_email = %confirmation.user_email,
            event_name = %confirmation.event_name,
            tickets = confirmation.tickets,
            total_price = %confirmation.total_price,
            "No confirmation URL configured; booking confirmation logged only"
        );
        Ok(())
    }
}
