use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub session_secret: String,
    pub session_ttl_secs: u64,
    pub chat_rate_limit: u32,
    pub chat_rate_window_secs: u64,
    /// Key the chat limiter on `X-Forwarded-For`/`X-Real-IP`. Only safe behind a proxy that sets them.
    pub trust_proxy_headers: bool,
    pub notification_url: Option<String>,
    pub notification_timeout_secs: u64,
    pub smtp: Option<SmtpConfig>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub json_logs: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let smtp = match env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()) {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_or("SMTP_PORT", 587),
                username: env::var("SMTP_USERNAME").unwrap_or_default(),
                password: env::var("SMTP_PASSWORD").unwrap_or_default(),
                from: env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "BookIt <no-reply@bookit.local>".to_string()),
            }),
            None => None,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            port: parse_or("PORT", 8080),
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "dev-secret-key-change-in-production".to_string()),
            session_ttl_secs: parse_or("SESSION_TTL_SECS", 86_400),
            chat_rate_limit: parse_or("CHAT_RATE_LIMIT", 10),
            chat_rate_window_secs: parse_or("CHAT_RATE_WINDOW_SECS", 60),
            trust_proxy_headers: parse_or("TRUST_PROXY_HEADERS", false),
            notification_url: non_empty("BOOKING_CONFIRMATION_URL"),
            notification_timeout_secs: parse_or("NOTIFICATION_TIMEOUT_SECS", 5),
            smtp,
            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn chat_rate_window(&self) -> Duration {
        Duration::from_secs(self.chat_rate_window_secs)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }
}

impl Default for Config {
    /// Development defaults, equivalent to `from_env` with an empty environment.
    fn default() -> Self {
        Self {
            database_url: None,
            port: 8080,
            session_secret: "dev-secret-key-change-in-production".to_string(),
            session_ttl_secs: 86_400,
            chat_rate_limit: 10,
            chat_rate_window_secs: 60,
            trust_proxy_headers: false,
            notification_url: None,
            notification_timeout_secs: 5,
            smtp: None,
            admin_email: None,
            admin_password: None,
            json_logs: false,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
