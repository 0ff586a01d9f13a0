use log::debug;
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::client::*;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;
pub const DEFAULT_SUPPORT_EMAIL: &str = "support@publicprize.com";

/// The settings of the client, as read from a JSON file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    /// The first path segment of the contest pages, e.g. `esprit-venture-challenge`.
    #[serde(rename = "contestPath", default)]
    pub contest_path: String,
    #[serde(rename = "sessionCookie")]
    pub session_cookie: Option<String>,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
    #[serde(rename = "pollIntervalSeconds")]
    pub poll_interval_seconds: Option<u64>,
    #[serde(rename = "supportEmail")]
    pub support_email: Option<String>,
    #[serde(rename = "touchDevice")]
    pub touch_device: Option<bool>,
}

impl ClientConfig {
    pub fn new(base_url: &str, contest_path: &str) -> ClientConfig {
        ClientConfig {
            base_url: base_url.to_string(),
            contest_path: contest_path.to_string(),
            session_cookie: None,
            timeout_seconds: None,
            poll_interval_seconds: None,
            support_email: None,
            touch_device: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_seconds
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
        )
    }

    pub fn support_email(&self) -> String {
        self.support_email
            .clone()
            .unwrap_or_else(|| DEFAULT_SUPPORT_EMAIL.to_string())
    }

    pub fn is_touch_device(&self) -> bool {
        self.touch_device.unwrap_or(false)
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.base_url.is_empty() {
            whatever!("baseUrl is empty");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            whatever!("baseUrl must start with http:// or https://: {}", self.base_url);
        }
        if self.poll_interval_seconds == Some(0) {
            whatever!("pollIntervalSeconds must be positive");
        }
        Ok(())
    }
}

pub fn read_config(path: &str) -> ClientResult<ClientConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> ClientResult<ClientConfig> {
    let config: ClientConfig = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config() {
        let c = parse_config(r#"{"baseUrl": "https://www.publicprize.com"}"#).unwrap();
        assert_eq!(c.contest_path, "");
        assert_eq!(c.timeout(), Duration::from_secs(30));
        assert_eq!(c.poll_interval(), Duration::from_secs(10));
        assert_eq!(c.support_email(), "support@publicprize.com");
        assert!(!c.is_touch_device());
    }

    #[test]
    fn full_config() {
        let c = parse_config(
            r#"{
                "baseUrl": "http://localhost:8000",
                "contestPath": "esprit-venture-challenge",
                "sessionCookie": "session=abc",
                "timeoutSeconds": 5,
                "pollIntervalSeconds": 2,
                "supportEmail": "help@example.com",
                "touchDevice": true
            }"#,
        )
        .unwrap();
        assert_eq!(c.contest_path, "esprit-venture-challenge");
        assert_eq!(c.session_cookie.as_deref(), Some("session=abc"));
        assert_eq!(c.timeout(), Duration::from_secs(5));
        assert_eq!(c.poll_interval(), Duration::from_secs(2));
        assert_eq!(c.support_email(), "help@example.com");
        assert!(c.is_touch_device());
    }

    #[test]
    fn invalid_configs() {
        assert!(matches!(
            parse_config("{"),
            Err(ClientError::ParsingJson { .. })
        ));
        assert!(matches!(
            parse_config(r#"{"baseUrl": "ftp://x"}"#),
            Err(ClientError::Whatever { .. })
        ));
        assert!(parse_config(r#"{"baseUrl": "http://x", "pollIntervalSeconds": 0}"#).is_err());
        assert!(matches!(
            read_config("/nonexistent/contest.json"),
            Err(ClientError::OpeningJson { .. })
        ));
    }
}
