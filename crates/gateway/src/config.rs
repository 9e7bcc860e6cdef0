//! Push notifications gateway config

use std::{fmt, fs, path::PathBuf};

use serde::Deserialize;

use crate::error::Error;

#[derive(Deserialize, Clone)]
pub struct Config {
    /// Server key given inline
    pub api_key: Option<String>,
    /// Path to a file holding the server key, used when `api_key` is unset
    pub api_key_file: Option<PathBuf>,
    #[serde(default = "default_topic")]
    pub topic: String,
    pub click_action: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_topic() -> String {
    "disaster_alerts".to_string()
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        Ok(envy::prefixed("FCM_").from_env::<Config>()?)
    }

    pub fn api_key(&self) -> Result<String, Error> {
        if let Some(key) = self.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        let path = self.api_key_file.as_ref().ok_or(Error::MissingCredentials)?;
        let key = fs::read_to_string(path)
            .map_err(|e| Error::CredentialsFile(path.display().to_string(), e))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(key.to_string())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally avoid printing FCM API Key for security reasons
        f.debug_struct("Fcm")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_key_file", &self.api_key_file)
            .field("topic", &self.topic)
            .field("click_action", &self.click_action)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
