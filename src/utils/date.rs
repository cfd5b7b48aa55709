//! Parsing and serde helpers for event dates and start times.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Parse "YYYY-MM-DD".
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse "HH:MM", also accepting the "HH:MM:SS" that browsers send for time inputs with seconds.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Serialize NaiveTime as "HH:MM". Used with #[serde(with = "crate::utils::date::hhmm")].
pub mod hhmm {
    use super::*;

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time.format(TIME_FORMAT).to_string().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_time(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid time: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_and_times() {
        assert_eq!(parse_date("2025-06-01"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(parse_date("01/06/2025"), None);
        assert_eq!(parse_time("19:30"), NaiveTime::from_hms_opt(19, 30, 0));
        assert_eq!(parse_time("19:30:00"), NaiveTime::from_hms_opt(19, 30, 0));
        assert_eq!(parse_time("7pm"), None);
    }

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "hhmm")]
        at: NaiveTime,
    }

    #[test]
    fn hhmm_serializes_without_seconds() {
        let slot = Slot { at: NaiveTime::from_hms_opt(9, 5, 0).unwrap() };
        assert_eq!(serde_json::to_string(&slot).unwrap(), r#"{"at":"09:05"}"#);
        let back: Slot = serde_json::from_str(r#"{"at":"21:45"}"#).unwrap();
        assert_eq!(back.at, NaiveTime::from_hms_opt(21, 45, 0).unwrap());
    }
}
