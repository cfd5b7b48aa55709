//! Booking confirmation emails, sent over SMTP with lettre or written to the
//! log when no relay is configured.

use chrono::Utc;
use lettre::address::AddressError;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("mail worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// How a confirmation left the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sent {
    Emailed,
    Logged,
}

/// The fields of a confirmation as received by the confirmation endpoint.
#[derive(Clone, Debug)]
pub struct ConfirmationEmail {
    pub booking_id: String,
    pub user_email: String,
    pub event_name: String,
    pub tickets: String,
    pub total_price: String,
}

impl ConfirmationEmail {
    pub fn subject(&self) -> String {
        format!("Booking Confirmation - {}", self.event_name)
    }

    pub fn html_body(&self) -> String {
        let confirmed_at = Utc::now().format("%Y-%m-%d %H:%M:%S");
        format!(
            r#"<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #ddd; border-radius: 10px;">
        <h2 style="color: #667eea;">Booking Confirmed!</h2>
        <p>Dear Customer,</p>
        <p>Your booking has been successfully confirmed!</p>
        <div style="background: #f8f9fa; padding: 15px; border-radius: 8px; margin: 20px 0;">
            <h3 style="color: #667eea; margin-top: 0;">Booking Details:</h3>
            <p><strong>Booking ID:</strong> {booking_id}</p>
            <p><strong>Event:</strong> {event_name}</p>
            <p><strong>Number of Tickets:</strong> {tickets}</p>
            <p><strong>Total Amount:</strong> ${total_price}</p>
            <p><strong>Confirmation Date:</strong> {confirmed_at}</p>
        </div>
        <p>Your e-tickets are now available in your BookIt account under "My Bookings".</p>
        <p style="margin-top: 30px;">Thank you for choosing BookIt!</p>
    </div>
</body>
</html>"#,
            booking_id = escape_html(&self.booking_id),
            event_name = escape_html(&self.event_name),
            tickets = escape_html(&self.tickets),
            total_price = escape_html(&self.total_price),
        )
    }
}

enum Delivery {
    Smtp { transport: SmtpTransport, from: String },
    Log,
}

pub struct ConfirmationMailer {
    delivery: Delivery,
}

impl ConfirmationMailer {
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, MailError> {
        let delivery = match smtp {
            Some(cfg) => {
                let mut builder = SmtpTransport::relay(&cfg.host)?.port(cfg.port);
                if !cfg.username.is_empty() {
                    builder = builder.credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()));
                }
                Delivery::Smtp {
                    transport: builder.build(),
                    from: cfg.from.clone(),
                }
            }
            None => Delivery::Log,
        };
        Ok(Self { delivery })
    }

    pub fn log_only() -> Self {
        Self { delivery: Delivery::Log }
    }

    pub fn is_smtp(&self) -> bool {
        matches!(self.delivery, Delivery::Smtp { .. })
    }

    pub async fn send(&self, email: &ConfirmationEmail) -> Result<Sent, MailError> {
        match &self.delivery {
            Delivery::Log => {
                tracing::info!(
                    to = %email.user_email,
                    subject = %email.subject(),
                    booking_id = %email.booking_id,
                    "SMTP not configured; confirmation email logged only"
                );
                Ok(Sent::Logged)
            }
            Delivery::Smtp { transport, from } => {
                let from: Mailbox = from.parse()?;
                let to: Mailbox = email.user_email.parse()?;
                let message = Message::builder()
                    .from(from)
                    .to(to)
                    .subject(email.subject())
                    .header(ContentType::TEXT_HTML)
                    .body(email.html_body())?;

                // SmtpTransport is blocking.
                let transport = transport.clone();
                let response = tokio::task::spawn_blocking(move || transport.send(&message)).await??;

                tracing::info!(to = %email.user_email, code = %response.code(), "Confirmation email sent");
                Ok(Sent::Emailed)
            }
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
