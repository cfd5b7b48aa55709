//! Domain records: users, events, bookings and their transactions.

pub mod booking;
pub mod event;
pub mod ids;
pub mod user;

pub use booking::{Booking, BookingDraft, BookingStatus, Transaction, TransactionStatus};
pub use event::{Event, NewEvent};
pub use ids::{BookingId, EventId, TransactionId, UserId};
pub use user::{NewUser, Role, User};
