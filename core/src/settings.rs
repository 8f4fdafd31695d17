//! Configuration provider for the Personas API.
//!
//! Settings are layered the same way in every binary: built-in defaults, then an optional TOML
//! file, then `PERSONAS_API__*` environment variables. The resulting [`ApiConfig`] is built once
//! at start-up and handed (behind an `Arc`) to the components that talk to the API.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ::config::{Config, Environment, File, FileFormat};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{PersonaError, PersonaResult};

/// Per-attempt timeout applied by the request pipeline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Additional attempts after the first failed one.
pub const DEFAULT_RETRIES: u32 = 2;

const DEVELOPMENT_BASE_URL: &str = "https://localhost:7163/api";

const CORS_HEADERS: &[(&str, &str)] = &[
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("access-control-allow-headers", "Content-Type, Authorization"),
];

/// Deployment profile selecting the default API location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    /// Production has no built-in base URL; it must come from the file or environment.
    Production,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Production => "production",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Profile::Development => DEVELOPMENT_BASE_URL,
            Profile::Production => "",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            other => Err(format!("unknown profile '{}'", other)),
        }
    }
}

/// Raw, serializable form of the `[api]` settings section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub profile: Profile,
    pub base_url: Option<String>,
    pub token: String,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
}

impl ApiSettings {
    /// Layer defaults, the optional file at `path`, and `PERSONAS_API__*` variables.
    ///
    /// An explicit `profile` wins over whatever the file or environment selected.
    pub fn load(path: Option<&Path>, profile: Option<Profile>) -> PersonaResult<Self> {
        let mut builder = Config::builder()
            .set_default("api.profile", Profile::default().as_str())?
            .set_default("api.token", "")?;

        if let Some(path) = path {
            debug!("Reading API settings from {}", path.display());
            builder = builder
                .add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("PERSONAS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(profile) = profile {
            builder = builder.set_override("api.profile", profile.as_str())?;
        }

        let settings: ApiSettings = builder.build()?.get("api")?;
        Ok(settings)
    }
}

/// Resolved API configuration shared by the pipeline and the auth interceptor.
#[derive(Debug)]
pub struct ApiConfig {
    base_url: String,
    token: SecretString,
    timeout: Duration,
    retries: u32,
    profile: Profile,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: SecretString::new(token.into()),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            profile: Profile::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Resolve raw settings, falling back to the profile's default base URL.
    pub fn from_settings(settings: ApiSettings) -> PersonaResult<Self> {
        let base_url = settings
            .base_url
            .unwrap_or_else(|| settings.profile.default_base_url().to_string());

        if !base_url.is_empty() {
            Url::parse(&base_url).map_err(|e| {
                PersonaError::Configuration(format!("invalid base URL '{}': {}", base_url, e))
            })?;
        }

        if HeaderValue::from_str(&format!("Bearer {}", settings.token)).is_err() {
            return Err(PersonaError::Configuration(
                "API token contains characters not allowed in an HTTP header".to_string(),
            ));
        }

        let mut config = Self::new(base_url, settings.token)
            .with_timeout(
                settings
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_TIMEOUT),
            )
            .with_retries(settings.retries.unwrap_or(DEFAULT_RETRIES));
        config.profile = settings.profile;
        Ok(config)
    }

    /// Convenience wrapper around [`ApiSettings::load`] + [`ApiConfig::from_settings`].
    pub fn load(path: Option<&Path>, profile: Option<Profile>) -> PersonaResult<Self> {
        Self::from_settings(ApiSettings::load(path, profile)?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }

    /// Full URL for a resource path relative to the base URL.
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Parsed base URL, used to decide which requests receive credentials.
    pub fn base(&self) -> Option<Url> {
        Url::parse(&self.base_url).ok()
    }

    /// `Authorization: Bearer <token>`.
    pub fn authorization_value(&self) -> Option<HeaderValue> {
        match HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret())) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(_) => {
                warn!("API token cannot be sent as a header; omitting Authorization");
                None
            }
        }
    }

    /// Fixed header set sent with every API request.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in CORS_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        if let Some(value) = self.authorization_value() {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// Log a warning for every missing piece. Returns `true` when something is missing.
    pub fn warn_if_incomplete(&self) -> bool {
        let mut incomplete = false;
        if self.base_url.is_empty() {
            warn!(profile = %self.profile, "API base URL is not configured");
            incomplete = true;
        }
        if !self.has_token() {
            warn!(profile = %self.profile, "API bearer token is not configured");
            incomplete = true;
        }
        incomplete
    }
}
