use crate::error::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use url::Url;

/// Fallback base address of the image processing service.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Url,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let raw = env::var("CROPLAB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::with_url(&raw)
    }

    /// Builds a config from an explicit base URL, e.g. a CLI override.
    pub fn with_url(raw: &str) -> Result<Self> {
        let api_url = Url::parse(raw)
            .map_err(|e| AppError::config(format!("Invalid API base URL '{raw}': {e}")))?;
        Ok(Self { api_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_base_url() {
        let config = Config::with_url("http://localhost:8000").unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn rejects_garbage_base_url() {
        assert!(matches!(
            Config::with_url("not a url"),
            Err(AppError::Config(_))
        ));
    }
}
