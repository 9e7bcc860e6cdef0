use chrono::{DateTime, SecondsFormat, Utc};

pub type DateTimeUtc = DateTime<Utc>;

/// ISO-8601 representation used in API responses and notification payloads,
/// like "2024-05-01T10:15:30.123456Z".
pub fn iso8601(dt: &DateTimeUtc) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
