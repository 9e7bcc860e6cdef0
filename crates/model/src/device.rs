use serde::Serialize;

use crate::{error::ValidationError, time::DateTimeUtc};

pub type FcmToken = String;

/// A registered push endpoint as stored.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct DeviceToken {
    pub token: FcmToken,
    pub device_info: String,
    pub registered_at: DateTimeUtc,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TokenRegistration {
    pub token: FcmToken,
    pub device_info: String,
}

impl DeviceToken {
    /// The row left behind by registering `registration` at `at`, whether the
    /// token was new or already known.
    pub fn registered(registration: &TokenRegistration, at: DateTimeUtc) -> Self {
        DeviceToken {
            token: registration.token.clone(),
            device_info: registration.device_info.clone(),
            registered_at: at,
        }
    }
}

impl TokenRegistration {
    pub fn new(token: Option<String>, device_info: Option<String>) -> Result<Self, ValidationError> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ValidationError::MissingToken)?;

        Ok(TokenRegistration {
            token,
            device_info: device_info.unwrap_or_default(),
        })
    }
}
