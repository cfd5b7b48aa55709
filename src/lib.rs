// Library root - exports for the binaries and integration tests

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::AppError;
pub use routes::build_router;

use std::sync::Arc;

use middleware::RateLimiter;
use services::{BookingNotifier, BookingService, ConfirmationMailer, Responder};
use store::{BookingLedger, EventCatalog, Stores, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn EventCatalog>,
    pub ledger: Arc<dyn BookingLedger>,
    pub bookings: BookingService,
    pub responder: Arc<Responder>,
    pub chat_limiter: RateLimiter,
    pub mailer: Arc<ConfirmationMailer>,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        notifier: Arc<dyn BookingNotifier>,
        mailer: ConfirmationMailer,
    ) -> Self {
        let bookings = BookingService::new(
            stores.users.clone(),
            stores.catalog.clone(),
            stores.ledger.clone(),
            notifier,
        );
        let chat_limiter = RateLimiter::new(config.chat_rate_limit, config.chat_rate_window());

        Self {
            config: Arc::new(config),
            users: stores.users,
            catalog: stores.catalog,
            ledger: stores.ledger,
            bookings,
            responder: Arc::new(Responder::default()),
            chat_limiter,
            mailer: Arc::new(mailer),
        }
    }
}
