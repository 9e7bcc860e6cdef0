//! One-shot messages carried to the next dashboard render in a signed cookie

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

pub const COOKIE_NAME: &str = "flash";

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Flash {
            level: Level::Error,
            message: message.into(),
        }
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies flash cookies with HMAC-SHA256.
#[derive(Clone)]
pub struct FlashKey(HmacSha256);

impl FlashKey {
    pub fn new(secret: &str) -> Self {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take a key of any size so this cannot fail");
        FlashKey(mac)
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.0.clone();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Cookie value: `<base64url json>.<hex hmac>`
    pub fn seal(&self, flash: &Flash) -> String {
        let json = serde_json::json!({
            "level": flash.level.as_str(),
            "message": flash.message,
        });
        let payload = base64::encode_config(json.to_string(), base64::URL_SAFE_NO_PAD);
        let signature = hex::encode(self.sign(&payload));
        format!("{payload}.{signature}")
    }

    /// Returns `None` for tampered, foreign or malformed cookies.
    pub fn open(&self, value: &str) -> Option<Flash> {
        let (payload, signature) = value.split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.0.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = base64::decode_config(payload, base64::URL_SAFE_NO_PAD).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

pub fn set_cookie_header(value: &str) -> String {
    format!("{COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_cookie_header() -> String {
    format!("{COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
