//! Keyword-matching assistant behind `/api/chat`.
//!
//! Rules are scanned in order and the first whose trigger words intersect the
//! message wins, so earlier rules take precedence when trigger words overlap.

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

pub const MAX_MESSAGE_CHARS: usize = 500;

pub const FALLBACK_REPLY: &str = "I'm sorry, I didn't quite understand that. You can ask me about \
upcoming events, booking tickets, prices, payments, your account or cancellations.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Message must be at most 500 characters")]
    TooLong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Greeting,
    Cancellation,
    Booking,
    Events,
    Pricing,
    Payment,
    Account,
    Support,
    Thanks,
    Goodbye,
    Fallback,
}

#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub topic: Topic,
    pub triggers: &'static [&'static str],
    pub reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        topic: Topic::Greeting,
        triggers: &["hello", "hi", "hey", "greetings", "hiya"],
        reply: "Hello! I'm the BookIt assistant. I can help you find events, book tickets \
                and manage your bookings. What would you like to know?",
    },
    Rule {
        topic: Topic::Cancellation,
        triggers: &["cancel", "cancellation", "cancelling", "refund", "refunds"],
        reply: "To cancel a booking, go to My Bookings and contact our support team with your \
                booking ID. Refunds go back to the original payment method within 5-7 business days.",
    },
    Rule {
        topic: Topic::Booking,
        triggers: &["book", "booking", "reserve", "reservation", "ticket", "tickets"],
        reply: "To book tickets, open the Events page, pick an event, choose how many tickets \
                you want and confirm. You need to be logged in to book.",
    },
    Rule {
        topic: Topic::Events,
        triggers: &[
            "event", "events", "concert", "concerts", "conference", "workshop", "show", "shows",
            "upcoming",
        ],
        reply: "All upcoming events are listed on the Events page with their date, venue, \
                price and the number of seats still available.",
    },
    Rule {
        topic: Topic::Pricing,
        triggers: &["price", "prices", "cost", "costs", "fee", "fees", "expensive", "cheap"],
        reply: "Each event has its own ticket price, shown on the event page. Your total is \
                the ticket price multiplied by the number of tickets.",
    },
    Rule {
        topic: Topic::Payment,
        triggers: &["pay", "paying", "payment", "card", "checkout"],
        reply: "We accept card payments. Your payment is recorded as soon as your booking is \
                confirmed and a confirmation email is sent to you.",
    },
    Rule {
        topic: Topic::Account,
        triggers: &["account", "login", "register", "signup", "password", "sign"],
        reply: "Create an account on the Register page, then log in with your email and \
                password to book events and see your bookings.",
    },
    Rule {
        topic: Topic::Support,
        triggers: &["help", "support", "contact", "problem", "issue"],
        reply: "I can answer questions about events, bookings, prices and payments. For \
                anything else, please contact our support team.",
    },
    Rule {
        topic: Topic::Thanks,
        triggers: &["thanks", "thank", "thx"],
        reply: "You're welcome! Enjoy your event.",
    },
    Rule {
        topic: Topic::Goodbye,
        triggers: &["bye", "goodbye"],
        reply: "Goodbye! Come back any time to discover new events.",
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Reply<'a> {
    pub topic: Topic,
    pub text: &'a str,
}

#[derive(Clone, Debug)]
pub struct Responder {
    rules: Vec<Rule>,
    fallback: &'static str,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(RULES.to_vec(), FALLBACK_REPLY)
    }
}

impl Responder {
    pub fn new(rules: Vec<Rule>, fallback: &'static str) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn respond(&self, message: &str) -> Result<Reply<'_>, ChatError> {
        let normalized = message.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if normalized.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ChatError::TooLong);
        }

        let tokens = tokenize(&normalized);
        let reply = self
            .rules
            .iter()
            .find(|rule| rule.triggers.iter().any(|t| tokens.contains(t)))
            .map(|rule| Reply {
                topic: rule.topic,
                text: rule.reply,
            })
            .unwrap_or(Reply {
                topic: Topic::Fallback,
                text: self.fallback,
            });
        Ok(reply)
    }
}

fn tokenize(text: &str) -> HashSet<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(message: &str) -> Topic {
        Responder::default().respond(message).unwrap().topic
    }

    #[test]
    fn empty_and_blank_messages_are_rejected() {
        let responder = Responder::default();
        assert_eq!(responder.respond(""), Err(ChatError::EmptyMessage));
        assert_eq!(responder.respond("   \n\t"), Err(ChatError::EmptyMessage));
    }

    #[test]
    fn oversized_messages_are_rejected() {
        let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(Responder::default().respond(&long), Err(ChatError::TooLong));
    }

    #[test]
    fn greeting_rule_matches() {
        assert_eq!(topic("hello there"), Topic::Greeting);
        assert_eq!(topic("Hey!"), Topic::Greeting);
    }

    #[test]
    fn cancellation_rule_matches() {
        assert_eq!(topic("how do I cancel"), Topic::Cancellation);
        assert_eq!(topic("Can I get a REFUND?"), Topic::Cancellation);
    }

    #[test]
    fn unknown_text_falls_back() {
        let responder = Responder::default();
        let reply = responder.respond("asdkjasd").unwrap();
        assert_eq!(reply.topic, Topic::Fallback);
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert_eq!(topic("!!!"), Topic::Fallback);
    }

    #[test]
    fn earlier_rules_win_on_overlap() {
        // Both greeting and cancellation trigger; greeting comes first.
        assert_eq!(topic("hi, I want to cancel"), Topic::Greeting);
        // Cancellation precedes booking.
        assert_eq!(topic("cancel my tickets"), Topic::Cancellation);
        // Booking precedes events.
        assert_eq!(topic("tickets for the concert"), Topic::Booking);
    }

    #[test]
    fn matching_is_by_whole_word() {
        // "this" contains "hi" but is not the token "hi".
        assert_eq!(topic("this"), Topic::Fallback);
        assert_eq!(topic("what does it cost?"), Topic::Pricing);
    }

    #[test]
    fn rule_order_is_stable() {
        let order: Vec<Topic> = Responder::default().rules().iter().map(|r| r.topic).collect();
        assert_eq!(
            order,
            vec![
                Topic::Greeting,
                Topic::Cancellation,
                Topic::Booking,
                Topic::Events,
                Topic::Pricing,
                Topic::Payment,
                Topic::Account,
                Topic::Support,
                Topic::Thanks,
                Topic::Goodbye,
            ]
        );
    }
}
