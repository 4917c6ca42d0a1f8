use std::env;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for one SAP system.
#[derive(Clone)]
pub struct AdtConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// `sap-client` sent with every request, if set.
    pub client: Option<String>,
    /// `sap-language` sent with every request, if set.
    pub language: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for AdtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdtConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("client", &self.client)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AdtConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            client: None,
            language: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from the environment.
    ///
    /// - `SAP_URL`, `SAP_USERNAME`, `SAP_PASSWORD`: required
    /// - `SAP_CLIENT`, `SAP_LANGUAGE`: optional
    /// - `SAP_TIMEOUT_SECS`: optional, defaults to 30
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let base_url = required("SAP_URL")?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "SAP_URL",
                reason: format!("expected an http(s) URL, got '{base_url}'"),
            });
        }

        let mut config = Self::new(base_url, required("SAP_USERNAME")?, required("SAP_PASSWORD")?);

        if let Some(client) = get("SAP_CLIENT") {
            config = config.with_client(client);
        }
        if let Some(language) = get("SAP_LANGUAGE") {
            config = config.with_language(language);
        }
        if let Some(raw) = get("SAP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                name: "SAP_TIMEOUT_SECS",
                reason: format!("{e}"),
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
