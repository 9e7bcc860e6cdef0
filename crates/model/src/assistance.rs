//! Emergency assistance requests submitted by affected people

use serde::Serialize;

use crate::{
    error::ValidationError,
    location::{CoordinateInput, Location},
    time::DateTimeUtc,
};

pub const ANONYMOUS_TOKEN: &str = "anonymous";
pub const UNKNOWN_USER: &str = "Unknown User";
pub const DEFAULT_MESSAGE: &str = "Emergency assistance needed";

// Status and priority are only ever set to these defaults; transitions are
// left to manual administration of the database.
pub const DEFAULT_STATUS: &str = "pending";
pub const DEFAULT_PRIORITY: &str = "high";

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct AssistanceRequest {
    pub id: i32,
    pub user_token: String,
    pub user_name: String,
    pub location: Location,
    pub message: String,
    pub device_info: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTimeUtc,
    pub status: String,
    pub priority: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct NewAssistanceRequest {
    pub user_token: String,
    pub user_name: String,
    pub location: Location,
    pub message: String,
    pub device_info: String,
}

/// Raw fields of an assistance submission.
#[derive(Default)]
pub struct AssistanceSubmission {
    pub token: Option<String>,
    pub user_name: Option<String>,
    pub latitude: Option<CoordinateInput>,
    pub longitude: Option<CoordinateInput>,
    pub message: Option<String>,
    pub device_info: Option<String>,
}

impl NewAssistanceRequest {
    pub fn from_submission(submission: AssistanceSubmission) -> Result<Self, ValidationError> {
        let location = Location::from_required_input(submission.latitude, submission.longitude)?;

        let or_default = |value: Option<String>, default: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(NewAssistanceRequest {
            user_token: or_default(submission.token, ANONYMOUS_TOKEN),
            user_name: or_default(submission.user_name, UNKNOWN_USER),
            location,
            message: or_default(submission.message, DEFAULT_MESSAGE),
            device_info: submission.device_info.unwrap_or_default(),
        })
    }
}
