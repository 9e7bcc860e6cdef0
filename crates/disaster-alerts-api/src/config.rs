//! Disaster alerts API config

use std::fmt;

use serde::Deserialize;

// Only acceptable for local development, a warning is logged at startup.
const DEV_SECRET_KEY: &str = "dev-secret-key";

fn default_port() -> u16 {
    5000
}

fn default_metrics_port() -> u16 {
    9090
}

#[derive(Deserialize)]
struct ConfigFlat {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_metrics_port")]
    metrics_port: u16,
    secret_key: Option<String>,
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub metrics_port: u16,
    /// Signs flash message cookies
    pub secret_key: String,
    pub secret_key_is_default: bool,
}

impl Config {
    pub fn load() -> Result<Config, envy::Error> {
        let config_flat = envy::from_env::<ConfigFlat>()?;
        Ok(config_flat.into())
    }
}

impl From<ConfigFlat> for Config {
    fn from(conf: ConfigFlat) -> Self {
        let secret_key = conf.secret_key.filter(|k| !k.is_empty());
        Config {
            port: conf.port,
            metrics_port: conf.metrics_port,
            secret_key_is_default: secret_key.is_none(),
            secret_key: secret_key.unwrap_or_else(|| DEV_SECRET_KEY.to_string()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally avoid printing the secret key for security reasons
        write!(
            f,
            "Api(port={}; metrics_port={}; secret_key=***)",
            self.port, self.metrics_port
        )
    }
}
