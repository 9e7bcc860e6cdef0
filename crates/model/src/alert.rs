use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
    error::ValidationError,
    location::{CoordinateInput, Location},
    time::DateTimeUtc,
};

/// Delivery state of an alert.
///
/// Every alert starts as `Sent`; once the push attempt resolves it becomes
/// either `SentSuccessfully` or `FirebaseError`. If no notification gateway
/// is available the alert stays `Sent` forever.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Sent,
    SentSuccessfully,
    FirebaseError,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Sent => "sent",
            AlertStatus::SentSuccessfully => "sent_successfully",
            AlertStatus::FirebaseError => "firebase_error",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown alert status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for AlertStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(AlertStatus::Sent),
            "sent_successfully" => Ok(AlertStatus::SentSuccessfully),
            "firebase_error" => Ok(AlertStatus::FirebaseError),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Alert {
    pub id: i32,
    pub disaster_type: String,
    pub message: String,
    pub location: Option<Location>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTimeUtc,
    pub status: AlertStatus,
}

/// A validated alert submission, not yet persisted.
#[derive(Clone, PartialEq, Debug)]
pub struct NewAlert {
    pub disaster_type: String,
    pub message: String,
    pub location: Option<Location>,
}

impl NewAlert {
    pub fn from_submission(
        disaster_type: Option<String>,
        message: Option<String>,
        latitude: Option<CoordinateInput>,
        longitude: Option<CoordinateInput>,
    ) -> Result<Self, ValidationError> {
        let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

        let (disaster_type, message) = match (non_blank(disaster_type), non_blank(message)) {
            (Some(disaster_type), Some(message)) => (disaster_type.trim().to_string(), message),
            _ => return Err(ValidationError::MissingAlertFields),
        };

        let location = Location::from_optional_input(latitude, longitude)?;

        Ok(NewAlert {
            disaster_type,
            message,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AlertStatus, NewAlert, UnknownStatus};
    use crate::{
        error::ValidationError,
        location::{CoordinateInput, Location},
    };

    #[test]
    fn status_round_trip_through_text() {
        for status in [
            AlertStatus::Sent,
            AlertStatus::SentSuccessfully,
            AlertStatus::FirebaseError,
        ] {
            assert_eq!(status.as_str().parse::<AlertStatus>(), Ok(status));
        }
        assert_eq!(
            "delivered".parse::<AlertStatus>(),
            Err(UnknownStatus("delivered".to_string()))
        );
        assert_eq!(AlertStatus::default(), AlertStatus::Sent);
    }

    #[test]
    fn submission_requires_type_and_message() {
        let cases = [
            (None, Some("evacuate")),
            (Some("flood"), None),
            (Some(""), Some("evacuate")),
            (Some("flood"), Some("   ")),
        ];
        for (disaster_type, message) in cases {
            let res = NewAlert::from_submission(
                disaster_type.map(str::to_string),
                message.map(str::to_string),
                None,
                None,
            );
            assert_eq!(res, Err(ValidationError::MissingAlertFields));
        }
    }

    #[test]
    fn submission_checks_coordinates() {
        let res = NewAlert::from_submission(
            Some("fire".to_string()),
            Some("leave the valley".to_string()),
            Some(CoordinateInput::Text("forty".to_string())),
            Some(CoordinateInput::Number(1.0)),
        );
        assert_eq!(res, Err(ValidationError::InvalidCoordinates));

        let alert = NewAlert::from_submission(
            Some(" flood ".to_string()),
            Some("evacuate now".to_string()),
            Some(CoordinateInput::Number(40.71)),
            Some(CoordinateInput::Text("-74.00".to_string())),
        )
        .unwrap();
        assert_eq!(alert.disaster_type, "flood");
        assert_eq!(alert.message, "evacuate now");
        assert_eq!(alert.location, Some(Location::new(40.71, -74.0)));
    }
}
