use std::env;
use std::time::Duration;

use crate::app::feed_token::MAX_MIN_LENGTH;
use crate::error::ConfigError;

const DEFAULT_SALT: &str = "SuperSecretSalt";
const DEFAULT_MIN_LENGTH: usize = 8;
const DEFAULT_INTERVAL_MINUTES: u64 = 5;
const DEFAULT_PER_PAGE: u32 = 100;
/// GitHub rejects larger page sizes
const MAX_PER_PAGE: u32 = 100;

#[derive(Clone)]
pub struct Config {
    pub github_token: String,
    pub github_api_url: String,
    /// Secret mixed into every feed token
    pub feed_salt: String,
    pub feed_min_length: usize,
    pub scan_interval: Duration,
    /// Whether closed issues keep producing comment entries
    pub include_closed: bool,
    pub per_page: u32,
    pub default_owner: String,
    pub default_repo: String,
    pub default_labels: Vec<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let default_labels = parse_labels(&required("RSS_FEED_DEFAULT_LABEL")?);
        if default_labels.is_empty() {
            return Err(ConfigError::Missing("RSS_FEED_DEFAULT_LABEL"));
        }

        let per_page = parse_or(&lookup, "RSS_FEED_PER_PAGE", DEFAULT_PER_PAGE)?;
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(ConfigError::Invalid {
                name: "RSS_FEED_PER_PAGE",
                value: per_page.to_string(),
            });
        }

        let feed_min_length = parse_or(&lookup, "RSS_FEED_MIN_LENGTH", DEFAULT_MIN_LENGTH)?;
        if feed_min_length > MAX_MIN_LENGTH {
            return Err(ConfigError::Invalid {
                name: "RSS_FEED_MIN_LENGTH",
                value: feed_min_length.to_string(),
            });
        }

        let interval_minutes =
            parse_or(&lookup, "RSS_FEED_INTERVAL_MINUTES", DEFAULT_INTERVAL_MINUTES)?;
        if interval_minutes == 0 {
            return Err(ConfigError::Invalid {
                name: "RSS_FEED_INTERVAL_MINUTES",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            github_token: required("RSS_FEED_GITHUB_TOKEN")?,
            github_api_url: lookup("GITHUB_API_URL")
                .unwrap_or_else(|| "https://api.github.com".to_string()),
            feed_salt: lookup("RSS_FEED_SALT")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SALT.to_string()),
            feed_min_length,
            scan_interval: Duration::from_secs(interval_minutes * 60),
            include_closed: parse_or(&lookup, "RSS_FEED_INCLUDE_CLOSED", false)?,
            per_page,
            default_owner: required("RSS_FEED_DEFAULT_ORG")?,
            default_repo: required("RSS_FEED_DEFAULT_REPO")?,
            default_labels,
            port: parse_or(&lookup, "PORT", 8080)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value: raw })
        }
        _ => Ok(default),
    }
}

/// Split a comma-separated label list, dropping blanks
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
