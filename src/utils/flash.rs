//! One-shot page messages carried in the `bookit_flash` cookie.
//!
//! The cookie holds a machine key (`level:key[:n]`), never user-supplied
//! text, so the value needs no escaping and cannot be used to inject markup.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::fmt;

pub const FLASH_COOKIE: &str = "bookit_flash";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flash {
    Registered,
    LoggedIn,
    LoggedOut,
    LoginRequired,
    InvalidCredentials,
    EmailTaken,
    InvalidInput,
    Booked { tickets: u32 },
    SeatsUnavailable,
    BookingFailed,
    EventCreated,
}

impl Flash {
    pub fn level(self) -> Level {
        match self {
            Flash::Registered | Flash::LoggedIn | Flash::LoggedOut | Flash::Booked { .. } | Flash::EventCreated => {
                Level::Success
            }
            Flash::LoginRequired => Level::Info,
            Flash::InvalidCredentials
            | Flash::EmailTaken
            | Flash::InvalidInput
            | Flash::SeatsUnavailable
            | Flash::BookingFailed => Level::Error,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Flash::Registered => "registered",
            Flash::LoggedIn => "logged_in",
            Flash::LoggedOut => "logged_out",
            Flash::LoginRequired => "login_required",
            Flash::InvalidCredentials => "invalid_credentials",
            Flash::EmailTaken => "email_taken",
            Flash::InvalidInput => "invalid_input",
            Flash::Booked { .. } => "booked",
            Flash::SeatsUnavailable => "seats_unavailable",
            Flash::BookingFailed => "booking_failed",
            Flash::EventCreated => "event_created",
        }
    }

    pub fn message(self) -> String {
        match self {
            Flash::Registered => "Registration successful! Please login.".to_string(),
            Flash::LoggedIn => "Login successful!".to_string(),
            Flash::LoggedOut => "Logged out successfully".to_string(),
            Flash::LoginRequired => "Please log in to continue".to_string(),
            Flash::InvalidCredentials => "Invalid credentials".to_string(),
            Flash::EmailTaken => "Email already registered".to_string(),
            Flash::InvalidInput => "Please check the form and try again".to_string(),
            Flash::Booked { tickets } => format!("Successfully booked {tickets} ticket(s)!"),
            Flash::SeatsUnavailable => "Not enough seats available".to_string(),
            Flash::BookingFailed => "Booking failed, please try again".to_string(),
            Flash::EventCreated => "Event created successfully!".to_string(),
        }
    }

    pub fn encode(self) -> String {
        match self {
            Flash::Booked { tickets } => format!("{}:{}:{tickets}", self.level().as_str(), self.key()),
            _ => format!("{}:{}", self.level().as_str(), self.key()),
        }
    }

    /// Parse a cookie value; unknown or tampered values yield `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        let mut parts = raw.split(':');
        let level = parts.next()?;
        let key = parts.next()?;
        let count = parts.next();
        if parts.next().is_some() {
            return None;
        }

        let flash = match (key, count) {
            ("booked", Some(n)) => Flash::Booked { tickets: n.parse().ok()? },
            (_, Some(_)) => return None,
            ("registered", None) => Flash::Registered,
            ("logged_in", None) => Flash::LoggedIn,
            ("logged_out", None) => Flash::LoggedOut,
            ("login_required", None) => Flash::LoginRequired,
            ("invalid_credentials", None) => Flash::InvalidCredentials,
            ("email_taken", None) => Flash::EmailTaken,
            ("invalid_input", None) => Flash::InvalidInput,
            ("seats_unavailable", None) => Flash::SeatsUnavailable,
            ("booking_failed", None) => Flash::BookingFailed,
            ("event_created", None) => Flash::EventCreated,
            _ => return None,
        };

        (flash.level().as_str() == level).then_some(flash)
    }
}

impl fmt::Display for Flash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// What a page view model exposes of a consumed flash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlashView {
    pub level: Level,
    pub message: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        Self {
            level: flash.level(),
            message: flash.message(),
        }
    }
}

pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, flash.encode()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Read and clear the pending flash, if any.
pub fn take(jar: CookieJar) -> (CookieJar, Option<FlashView>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, Flash::decode(&raw).map(FlashView::from))
}
