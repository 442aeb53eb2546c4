//! Credentials and transport configuration.
//!
//! Loaded from a TOML file (default `./twitter.toml`):
//!
//! ```toml
//! consumer_key = "..."
//! consumer_secret = "..."
//! access_token = "..."
//! access_token_secret = "..."
//!
//! [proxy]
//! host = "proxy.example.org"
//! port = 8080
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, FetchResult};

/// Configuration for the Twitter lookup client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// OAuth 1.0a Consumer Key (API Key)
    pub consumer_key: String,

    /// OAuth 1.0a Consumer Secret (API Secret)
    pub consumer_secret: String,

    /// OAuth 1.0a Access Token
    pub access_token: String,

    /// OAuth 1.0a Access Token Secret
    pub access_token_secret: String,

    /// Base URL for the Twitter API (default: https://api.twitter.com)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// Optional HTTP proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

/// HTTP proxy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_api_url() -> String {
    "https://api.twitter.com".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            access_token: String::new(),
            access_token_secret: String::new(),
            api_url: default_api_url(),
            timeout: default_timeout(),
            proxy: None,
        }
    }
}

impl FetchConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> FetchResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FetchError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| {
            FetchError::Config(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the required credential fields are present.
    pub fn validate(&self) -> FetchResult<()> {
        for (name, value) in [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("access_token", &self.access_token),
            ("access_token_secret", &self.access_token_secret),
        ] {
            if value.is_empty() {
                return Err(FetchError::Config(format!("{name} is required")));
            }
        }
        Ok(())
    }
}
