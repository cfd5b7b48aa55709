//! Type aliases for entity IDs. All are UUIDs; validation happens at parse boundaries.

use uuid::Uuid;

pub type UserId = Uuid;
pub type EventId = Uuid;
pub type BookingId = Uuid;
pub type TransactionId = Uuid;

/// Parse a path segment into an ID. Malformed IDs are reported as "not found"
/// by callers since no record can carry them.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_uuid_and_rejects_garbage() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Some(id));
        assert_eq!(parse_id(&format!(" {id} ")), Some(id));
        assert_eq!(parse_id("nonexistent123"), None);
    }
}
