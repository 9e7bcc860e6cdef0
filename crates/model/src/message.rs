use serde::Serialize;

use crate::{
    location::Location,
    time::{iso8601, DateTimeUtc},
};

pub const BODY_MAX_CHARS: usize = 100;

/// Push notification built from a persisted alert.
#[derive(Clone, PartialEq, Debug)]
pub struct AlertNotification {
    pub title: String,
    pub body: String,
    pub data: AlertData,
}

/// Payload delivered alongside the notification. Every value is a string
/// because push providers only accept string maps here.
#[derive(Clone, PartialEq, Serialize, Debug)]
pub struct AlertData {
    pub disaster_type: String,
    pub full_message: String,
    pub latitude: String,
    pub longitude: String,
    pub alert_id: String,
    pub timestamp: String,
}

impl AlertNotification {
    pub fn compose(
        disaster_type: &str,
        full_message: &str,
        location: Option<Location>,
        alert_id: i32,
        timestamp: DateTimeUtc,
    ) -> Self {
        let title = format!("{} ALERT", disaster_type.to_uppercase());

        let mut body = truncate(full_message, BODY_MAX_CHARS);
        if let Some(location) = location {
            body.push_str(&format!("\nSafe Location: {location}"));
        }

        let (latitude, longitude) = match location {
            Some(l) => (l.latitude.to_string(), l.longitude.to_string()),
            None => (String::new(), String::new()),
        };

        AlertNotification {
            title,
            body,
            data: AlertData {
                disaster_type: disaster_type.to_string(),
                full_message: full_message.to_string(),
                latitude,
                longitude,
                alert_id: alert_id.to_string(),
                timestamp: iso8601(&timestamp),
            },
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
