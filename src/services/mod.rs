pub mod analytics;
pub mod booking;
pub mod chatbot;
pub mod mailer;
pub mod notifier;
pub mod seed_data;

pub use booking::{BookingError, BookingService};
pub use chatbot::Responder;
pub use mailer::ConfirmationMailer;
pub use notifier::{BookingNotifier, HttpNotifier, LogNotifier};
