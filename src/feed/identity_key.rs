//! Stable keys addressing a feed item across pages.
//!
//! A bare post is keyed by its id alone. A reshare is keyed by who shared it,
//! what was shared and when, so the same user sharing the same post twice
//! produces two distinct entries.

use chrono::{DateTime, Utc};

/// A share timestamp as it may reach the feed: already typed, or still in its
/// serialized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharedAt {
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl SharedAt {
    /// Normalizes to epoch milliseconds.
    ///
    /// Text is read as RFC 3339, RFC 2822, the Postgres `timestamptz` text
    /// form, or a bare integer of milliseconds. Anything else maps to `0`.
    pub fn epoch_millis(&self) -> i64 {
        match self {
            SharedAt::Timestamp(ts) => ts.timestamp_millis(),
            SharedAt::Text(raw) => parse_text_millis(raw.trim()).unwrap_or_else(|| {
                tracing::warn!("Unrecognized share timestamp {:?}, keying it as 0", raw);
                0
            }),
        }
    }
}

/// Postgres renders `timestamptz` as e.g. `2024-01-01 00:00:00.123+00`.
const PG_TIMESTAMPTZ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

fn parse_text_millis(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .or_else(|_| DateTime::parse_from_str(raw, PG_TIMESTAMPTZ_FORMAT))
        .map(|ts| ts.timestamp_millis())
        .ok()
        .or_else(|| raw.parse::<i64>().ok())
}

impl From<DateTime<Utc>> for SharedAt {
    fn from(ts: DateTime<Utc>) -> Self {
        SharedAt::Timestamp(ts)
    }
}

impl From<&str> for SharedAt {
    fn from(raw: &str) -> Self {
        SharedAt::Text(raw.to_string())
    }
}

impl From<String> for SharedAt {
    fn from(raw: String) -> Self {
        SharedAt::Text(raw)
    }
}

/// The parts of a share that take part in its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareKey {
    pub sharer_id: i64,
    pub shared_at: SharedAt,
}

impl ShareKey {
    pub fn new(sharer_id: i64, shared_at: impl Into<SharedAt>) -> Self {
        Self {
            sharer_id,
            shared_at: shared_at.into(),
        }
    }
}

/// Builds the `uniqueKey` of a feed item.
pub fn generate_key(post_id: i64, share: Option<&ShareKey>) -> String {
    match share {
        None => format!("post:{}", post_id),
        Some(share) => format!(
            "shared:{}:{}:{}",
            share.sharer_id,
            post_id,
            share.shared_at.epoch_millis()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bare_post_key() {
        assert_eq!(generate_key(50, None), "post:50");
    }

    #[test]
    fn share_key_matches_across_representations() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let typed = ShareKey::new(9, ts);
        let text = ShareKey::new(9, "2024-01-01T00:00:00.000Z");

        assert_eq!(generate_key(50, Some(&typed)), "shared:9:50:1704067200000");
        assert_eq!(generate_key(50, Some(&typed)), generate_key(50, Some(&text)));
    }

    #[test]
    fn share_key_is_deterministic() {
        let share = ShareKey::new(3, "2024-05-05T10:00:00+02:00");
        assert_eq!(generate_key(1, Some(&share)), generate_key(1, Some(&share)));
        assert_ne!(generate_key(1, Some(&share)), generate_key(1, None));
    }

    #[test]
    fn distinct_timestamps_give_distinct_keys() {
        let first = ShareKey::new(9, Utc.timestamp_millis_opt(1_000).unwrap());
        let second = ShareKey::new(9, Utc.timestamp_millis_opt(1_001).unwrap());
        assert_ne!(generate_key(50, Some(&first)), generate_key(50, Some(&second)));
    }

    #[test]
    fn postgres_text_form_matches_typed_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for raw in ["2024-01-01 00:00:00+00", "2024-01-01 00:00:00.000+00:00", "2024-01-01 02:00:00+02"] {
            assert_eq!(
                generate_key(50, Some(&ShareKey::new(9, raw))),
                generate_key(50, Some(&ShareKey::new(9, ts))),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn rfc2822_text_keeps_timestamps_apart() {
        let first = ShareKey::new(9, "Mon, 01 Jan 2024 00:00:00 GMT");
        let second = ShareKey::new(9, "Tue, 02 Jan 2024 00:00:00 GMT");

        assert_eq!(generate_key(50, Some(&first)), "shared:9:50:1704067200000");
        assert_eq!(generate_key(50, Some(&second)), "shared:9:50:1704153600000");
    }

    #[test]
    fn numeric_and_garbage_text() {
        assert_eq!(SharedAt::from("1704067200000").epoch_millis(), 1_704_067_200_000);
        assert_eq!(SharedAt::from("not a date").epoch_millis(), 0);
    }
}
