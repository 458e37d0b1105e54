use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::Url;

pub const API_URL_VAR: &str = "BAYROU_API_URL";
pub const POLL_INTERVAL_VAR: &str = "BAYROU_POLL_INTERVAL_MS";
pub const REQUEST_TIMEOUT_VAR: &str = "BAYROU_REQUEST_TIMEOUT_MS";

pub const DEFAULT_API_URL: &str = "http://localhost:7071/api";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys take their default.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let api_url = read(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let parsed = Url::parse(&api_url).with_context(|| format!("{} is not a valid URL: {}", API_URL_VAR, api_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("{} must use http or https; got {}", API_URL_VAR, parsed.scheme()));
        }

        let poll_interval = match read(POLL_INTERVAL_VAR) {
            None => DEFAULT_POLL_INTERVAL_MS,
            Some(v) => parse_millis(POLL_INTERVAL_VAR, &v)?,
        };

        let request_timeout = match read(REQUEST_TIMEOUT_VAR) {
            None => DEFAULT_REQUEST_TIMEOUT_MS,
            Some(v) => parse_millis(REQUEST_TIMEOUT_VAR, &v)?,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_owned(),
            poll_interval: Duration::from_millis(poll_interval),
            request_timeout: Duration::from_millis(request_timeout),
        })
    }
}

fn parse_millis(key: &str, value: &str) -> anyhow::Result<u64> {
    let millis = value
        .parse::<u64>()
        .with_context(|| format!("{} must be a number of milliseconds; got {}", key, value))?;

    if millis == 0 {
        return Err(anyhow!("{} must be greater than 0", key));
    }

    Ok(millis)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[rstest]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval, Duration::from_millis(5000));
    }

    #[rstest]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            (API_URL_VAR, "https://bayrou.example.net/api/"),
            (POLL_INTERVAL_VAR, "750"),
            (REQUEST_TIMEOUT_VAR, " 2000 "),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://bayrou.example.net/api");
        assert_eq!(config.poll_interval, Duration::from_millis(750));
        assert_eq!(config.request_timeout, Duration::from_millis(2000));
    }

    #[rstest]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[(API_URL_VAR, "   ")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[rstest]
    #[case(API_URL_VAR, "not a url")]
    #[case(API_URL_VAR, "ftp://example.net/api")]
    #[case(POLL_INTERVAL_VAR, "soon")]
    #[case(POLL_INTERVAL_VAR, "0")]
    #[case(REQUEST_TIMEOUT_VAR, "-5")]
    fn rejects_invalid_values(#[case] key: &str, #[case] value: &str) {
        let err = Config::from_lookup(lookup(&[(key, value)])).unwrap_err();
        assert!(err.to_string().contains(key), "error should name {}: {}", key, err);
    }
}
