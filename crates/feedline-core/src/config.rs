use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8084/api/v1/bff";

/// Client settings, read from `config.toml`. Every field is optional in the
/// file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the BFF, including the `/api/v1/bff` prefix.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Upper bound on concurrent like-state fetches during a feed load.
    pub like_state_concurrency: usize,
    /// Access tokens expiring within this window count as expired.
    pub access_token_margin_secs: i64,
    /// Where `tokens.json` lives. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            like_state_concurrency: 8,
            access_token_margin_secs: crate::session::token::ACCESS_TOKEN_MARGIN_SECS,
            data_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
api_base_url = "https://feed.example.com/api/v1/bff"
like_state_concurrency = 2
"#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://feed.example.com/api/v1/bff");
        assert_eq!(config.like_state_concurrency, 2);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.access_token_margin_secs, 600);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }
}
