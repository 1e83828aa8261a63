//! Runtime configuration, read once from the environment at startup.

use rust_decimal::Decimal;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PRODUCT_URL: &str = "https://www.amazon.co.uk/dp/B0D33HYLMD";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const DEFAULT_HISTORY_FILE: &str = "price_history.csv";
const DEFAULT_TARGET_PRICE: &str = "600.00";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHECK_INTERVAL_HOURS: u64 = 24;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the tracker needs, immutable for the lifetime of the process
#[derive(Clone)]
pub struct Config {
    pub product_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub history_path: PathBuf,
    pub target_price: Decimal,
    pub email: String,
    pub email_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub request_timeout: Duration,
    pub check_interval: Duration,
    pub poll_interval: Duration,
    pub show_chart: bool,
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let target_raw = get("TARGET_PRICE").unwrap_or_else(|| DEFAULT_TARGET_PRICE.to_string());
        let target_price = Decimal::from_str(&target_raw).map_err(|e| ConfigError::Invalid {
            key: "TARGET_PRICE",
            value: target_raw.clone(),
            reason: e.to_string(),
        })?;
        if target_price.is_sign_negative() {
            return Err(ConfigError::Invalid {
                key: "TARGET_PRICE",
                value: target_raw,
                reason: "must not be negative".to_string(),
            });
        }

        let smtp_port = parse_number(&get, "SMTP_PORT", DEFAULT_SMTP_PORT)?;
        let request_timeout = parse_positive(&get, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let check_hours = parse_positive(&get, "CHECK_INTERVAL_HOURS", DEFAULT_CHECK_INTERVAL_HOURS)?;
        let poll_secs = parse_positive(&get, "POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;

        let show_chart = match get("SHOW_CHART") {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                key: "SHOW_CHART",
                value: raw,
                reason: "expected true/false".to_string(),
            })?,
        };

        Ok(Config {
            product_url: get("PRODUCT_URL").unwrap_or_else(|| DEFAULT_PRODUCT_URL.to_string()),
            user_agent: get("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            accept_language: get("ACCEPT_LANGUAGE").unwrap_or_else(|| DEFAULT_ACCEPT_LANGUAGE.to_string()),
            history_path: PathBuf::from(get("PRICE_HISTORY_FILE").unwrap_or_else(|| DEFAULT_HISTORY_FILE.to_string())),
            target_price,
            email: required("ALERT_EMAIL")?,
            email_password: required("ALERT_EMAIL_PASSWORD")?,
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
            request_timeout: Duration::from_secs(request_timeout),
            check_interval: Duration::from_secs(check_hours * 3600),
            poll_interval: Duration::from_secs(poll_secs),
            show_chart,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("product_url", &self.product_url)
            .field("user_agent", &self.user_agent)
            .field("accept_language", &self.accept_language)
            .field("history_path", &self.history_path)
            .field("target_price", &self.target_price)
            .field("email", &self.email)
            .field("email_password", &"<redacted>")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("request_timeout", &self.request_timeout)
            .field("check_interval", &self.check_interval)
            .field("poll_interval", &self.poll_interval)
            .field("show_chart", &self.show_chart)
            .finish()
    }
}

fn parse_number<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_positive<G>(get: &G, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let value = parse_number(get, key, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "ALERT_EMAIL" => Some("owner@example.com".to_string()),
        "ALERT_EMAIL_PASSWORD" => Some("app-password".to_string()),
        _ => None,
    })
    .expect("test config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply() {
        let config = test_config();
        assert_eq!(config.product_url, DEFAULT_PRODUCT_URL);
        assert_eq!(config.target_price, Decimal::from_str("600.00").unwrap());
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.check_interval, Duration::from_secs(24 * 3600));
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert!(config.show_chart);
    }

    #[test]
    fn test_missing_credentials() {
        let err = Config::from_lookup(lookup(&[("ALERT_EMAIL", "a@b.com")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ALERT_EMAIL_PASSWORD"));

        let err = Config::from_lookup(lookup(&[("ALERT_EMAIL_PASSWORD", "x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ALERT_EMAIL"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ALERT_EMAIL", "a@b.com"),
            ("ALERT_EMAIL_PASSWORD", "secret"),
            ("TARGET_PRICE", "549.99"),
            ("CHECK_INTERVAL_HOURS", "6"),
            ("SHOW_CHART", "no"),
            ("PRICE_HISTORY_FILE", "/tmp/prices.csv"),
        ]))
        .unwrap();
        assert_eq!(config.target_price, Decimal::from_str("549.99").unwrap());
        assert_eq!(config.check_interval, Duration::from_secs(6 * 3600));
        assert!(!config.show_chart);
        assert_eq!(config.history_path, PathBuf::from("/tmp/prices.csv"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = [("ALERT_EMAIL", "a@b.com"), ("ALERT_EMAIL_PASSWORD", "secret")];

        let mut pairs = base.to_vec();
        pairs.push(("TARGET_PRICE", "cheap"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "TARGET_PRICE", .. })
        ));

        let mut pairs = base.to_vec();
        pairs.push(("TARGET_PRICE", "-1"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "TARGET_PRICE", .. })
        ));

        let mut pairs = base.to_vec();
        pairs.push(("POLL_INTERVAL_SECS", "0"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "POLL_INTERVAL_SECS", .. })
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("app-password"));
        assert!(rendered.contains("<redacted>"));
    }
}
