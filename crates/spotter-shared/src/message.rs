//! Chat messages and the versioned wire timestamp.
//!
//! The backend has shipped two timestamp encodings for the same field: an
//! ISO-8601 string and a decomposed `{year, month, ...}` record. Both must
//! parse; the canonical in-memory form is [`DateTime<Utc>`] and the
//! conversion happens here, at the wire boundary, never in rendering or
//! coordinator logic. Serialization always emits RFC 3339.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single chat message.
///
/// Messages carry no server-assigned id; identity for de-duplication is
/// ordering plus content equality, which the transport's at-most-once
/// delivery makes workable but does not guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender_email: String,
    pub receiver_email: String,
    pub content: String,
    #[serde(with = "wire_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Whether this message belongs to the conversation between the
    /// unordered pair `{email_a, email_b}`.
    pub fn is_between(&self, email_a: &str, email_b: &str) -> bool {
        (self.sender_email == email_a && self.receiver_email == email_b)
            || (self.sender_email == email_b && self.receiver_email == email_a)
    }
}

/// Versioned wire encoding of a message timestamp.
mod wire_timestamp {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireTimestamp {
        Iso(String),
        Parts {
            year: i32,
            month: u32,
            day: u32,
            hour: u32,
            minute: u32,
            second: u32,
            #[serde(default)]
            nanosecond: u32,
        },
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        match WireTimestamp::deserialize(de)? {
            WireTimestamp::Iso(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom),
            WireTimestamp::Parts {
                year,
                month,
                day,
                hour,
                minute,
                second,
                nanosecond,
            } => Utc
                .with_ymd_and_hms(year, month, day, hour, minute, second)
                .single()
                .and_then(|dt| dt.with_nanosecond(nanosecond))
                .ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "invalid calendar timestamp {year}-{month}-{day} {hour}:{minute}:{second}"
                    ))
                }),
        }
    }
}
