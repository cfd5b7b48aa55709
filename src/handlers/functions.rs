//! Endpoints that stand in for the deployed serverless functions: the
//! booking confirmation mailer and the analytics snapshot.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::AppError;
use crate::services::analytics::{self, AnalyticsReport, DEFAULT_PERIOD_DAYS};
use crate::services::mailer::{ConfirmationEmail, Sent};
use crate::AppState;

const REQUIRED_FIELDS: [&str; 5] = ["booking_id", "user_email", "event_name", "tickets", "total_price"];

// Missing, null, "", 0, false and empty containers all count as absent.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_confirmation(body: &[u8]) -> Result<(Map<String, Value>, ConfirmationEmail), AppError> {
    let fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) if !fields.is_empty() => fields,
        _ => return Err(AppError::Validation("No data provided".to_string())),
    };

    if !REQUIRED_FIELDS.iter().all(|f| is_present(fields.get(*f))) {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let text = |key: &str| fields.get(key).map(as_text).unwrap_or_default();
    let email = ConfirmationEmail {
        booking_id: text("booking_id"),
        user_email: text("user_email"),
        event_name: text("event_name"),
        tickets: text("tickets"),
        total_price: text("total_price"),
    };
    Ok((fields, email))
}

fn success_message(sent: Sent) -> &'static str {
    match sent {
        Sent::Emailed => "Booking confirmation email sent successfully",
        Sent::Logged => "Booking confirmation processed successfully",
    }
}

pub async fn booking_confirmation(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let (fields, email) = parse_confirmation(&body)?;

    let sent = match state.mailer.send(&email).await {
        Ok(sent) => sent,
        Err(e) => {
            tracing::error!(booking_id = %email.booking_id, to = %email.user_email, error = %e, "Failed to send confirmation email");
            let body = json!({
                "success": false,
                "error": "Failed to send email",
                "details": e.to_string(),
            });
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response());
        }
    };

    tracing::info!(booking_id = %email.booking_id, to = %email.user_email, ?sent, "Booking confirmation processed");
    let body = json!({
        "success": true,
        "message": success_message(sent),
        "booking_id": fields.get("booking_id").cloned().unwrap_or(Value::Null),
        "email_sent_to": email.user_email,
        "timestamp": Utc::now().to_rfc3339(),
    });
    Ok(Json(body).into_response())
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub event_id: Option<String>,
    pub days: Option<String>,
}

pub async fn event_analytics(Query(query): Query<AnalyticsQuery>) -> Result<Json<AnalyticsReport>, AppError> {
    let days = match query.days.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_PERIOD_DAYS,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| AppError::Validation(format!("Invalid days parameter: {raw}")))?,
    };

    tracing::info!(period_days = days, event_id = ?query.event_id, "Analytics generated");
    Ok(Json(analytics::snapshot(days, query.event_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(body: &str) -> String {
        match parse_confirmation(body.as_bytes()) {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other.map(|(_, e)| e)),
        }
    }

    #[test]
    fn missing_or_non_object_body_is_no_data() {
        assert_eq!(err(""), "No data provided");
        assert_eq!(err("not json"), "No data provided");
        assert_eq!(err("[1,2]"), "No data provided");
        assert_eq!(err("{}"), "No data provided");
    }

    #[test]
    fn falsy_fields_count_as_missing() {
        let base = json!({
            "booking_id": "b1", "user_email": "a@b.io", "event_name": "Gig",
            "tickets": 2, "total_price": 40.0
        });
        for (field, value) in [
            ("tickets", json!(0)),
            ("total_price", json!(null)),
            ("event_name", json!("")),
            ("booking_id", json!(false)),
        ] {
            let mut body = base.clone();
            body[field] = value;
            assert_eq!(err(&body.to_string()), "Missing required fields");
        }
    }

    #[test]
    fn emailed_confirmations_report_the_email() {
        assert_eq!(success_message(Sent::Emailed), "Booking confirmation email sent successfully");
        assert_eq!(success_message(Sent::Logged), "Booking confirmation processed successfully");
    }

    #[test]
    fn numbers_are_rendered_as_text() {
        let body = json!({
            "booking_id": 17, "user_email": "a@b.io", "event_name": "Gig",
            "tickets": 2, "total_price": 40.5
        });
        let (_, email) = parse_confirmation(body.to_string().as_bytes()).unwrap();
        assert_eq!(email.booking_id, "17");
        assert_eq!(email.tickets, "2");
        assert_eq!(email.total_price, "40.5");
    }
}
