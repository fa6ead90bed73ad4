use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const PROJECT_ID: &str = "agenticlearn-project";
const LOCAL_BASE: &str = "http://localhost:8080/api/v1";
const RAILWAY_BASE: &str = "https://agenticlearn-backend-production.up.railway.app/api/v1";

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Timeout cannot be 0")]
    InvalidTimeout,

    #[error("Cache TTL cannot be 0")]
    InvalidCacheTtl,

    #[error("Empty service name in {0} endpoints")]
    EmptyServiceName(&'static str),

    #[error("At least one token key is required")]
    NoTokenKeys,

    #[error("Invalid diagnostic header: {0}")]
    InvalidHeader(String),
}

/// Deployment environment the client runs in.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Local hosts are development, everything else is production.
    pub fn detect(host: &str) -> Self {
        let host = host.trim().trim_start_matches('[').trim_end_matches(']');
        if host.contains("localhost") || host == "127.0.0.1" || host == "::1" {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Per-service switches selecting the primary deployment in production.
/// A service without an entry is treated as disabled.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FeatureFlags(HashMap<String, bool>);

impl FeatureFlags {
    pub fn is_enabled(&self, service: &str) -> bool {
        self.0.get(service).copied().unwrap_or(false)
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for FeatureFlags {
    fn from_iter<T: IntoIterator<Item = (K, bool)>>(iter: T) -> Self {
        FeatureFlags(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Service name to base URL tables.
///
/// Note: service names are plain strings rather than an enum so deployments
/// can add services without code changes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    /// Local backend, used whenever the environment is development
    pub development: IndexMap<String, Url>,
    /// Primary production deployment, used when the service's flag is on
    pub production: IndexMap<String, Url>,
    /// Legacy production deployment, used when the flag is off
    pub fallback: IndexMap<String, Url>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CredentialKeys {
    /// Keys holding the bearer token, tried in order
    pub token_keys: Vec<String>,
    pub user_id_key: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

/// Client configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Host the application is served from, used to detect the environment
    pub host: String,
    /// Overrides environment detection when set
    pub environment: Option<Environment>,
    /// Deadline for a complete request/response exchange
    pub timeout_secs: u64,
    pub feature_flags: FeatureFlags,
    pub endpoints: Endpoints,
    pub credentials: CredentialKeys,
    /// Extra headers identifying this client on every request
    pub diagnostic_headers: IndexMap<String, String>,
    pub cache: CacheConfig,
    /// Number of raw samples kept for diagnostics
    pub recent_samples: usize,
}

impl Config {
    pub fn environment(&self) -> Environment {
        self.environment
            .unwrap_or_else(|| Environment::detect(&self.host))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates the client configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.cache.ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTtl);
        }

        let tables = [
            ("development", &self.endpoints.development),
            ("production", &self.endpoints.production),
            ("fallback", &self.endpoints.fallback),
        ];
        for (name, table) in tables {
            if table.keys().any(|service| service.trim().is_empty()) {
                return Err(ValidationError::EmptyServiceName(name));
            }
        }

        if self.credentials.token_keys.is_empty() {
            return Err(ValidationError::NoTokenKeys);
        }

        self.diagnostic_header_map()?;

        Ok(())
    }

    /// Diagnostic headers as sent on the wire.
    pub fn diagnostic_header_map(&self) -> Result<HeaderMap, ValidationError> {
        let mut headers = HeaderMap::with_capacity(self.diagnostic_headers.len());
        for (name, value) in &self.diagnostic_headers {
            let invalid = || ValidationError::InvalidHeader(name.clone());
            let header_name = HeaderName::try_from(name.as_str()).map_err(|_| invalid())?;
            let header_value = HeaderValue::try_from(value.as_str()).map_err(|_| invalid())?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "localhost".into(),
            environment: None,
            timeout_secs: 30,
            feature_flags: FeatureFlags::from_iter([
                ("auth", true),
                ("content", true),
                ("assessment", false),
                ("personalization", false),
                ("admin", false),
            ]),
            endpoints: Endpoints::default(),
            credentials: CredentialKeys::default(),
            diagnostic_headers: IndexMap::from([
                ("X-AgenticLearn".to_string(), "v1.0".to_string()),
                ("X-Carbon-Efficient".to_string(), "true".to_string()),
            ]),
            cache: CacheConfig::default(),
            recent_samples: 100,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        let cloud_functions = format!("https://asia-southeast1-{PROJECT_ID}.cloudfunctions.net");

        Endpoints {
            development: table(LOCAL_BASE),
            production: [
                "auth",
                "content",
                "assessment",
                "personalization",
                "admin",
            ]
            .into_iter()
            .filter_map(|service| {
                let url = Url::parse(&format!("{cloud_functions}/agenticlearn-{service}")).ok()?;
                Some((service.to_string(), url))
            })
            .collect(),
            fallback: table(RAILWAY_BASE),
        }
    }
}

impl Default for CredentialKeys {
    fn default() -> Self {
        CredentialKeys {
            token_keys: vec!["access_token".into(), "login".into()],
            user_id_key: "user_id".into(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 300,
            max_capacity: 50,
        }
    }
}

// Both the local and the legacy backend expose every service under one API root.
fn table(base: &str) -> IndexMap<String, Url> {
    [
        ("auth", "auth"),
        ("content", "learning"),
        ("assessment", "learning/assessment"),
        ("personalization", "personalization"),
        ("admin", "admin"),
    ]
    .into_iter()
    .filter_map(|(service, path)| {
        let url = Url::parse(&format!("{base}/{path}")).ok()?;
        Some((service.to_string(), url))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.environment(), Environment::Development);
        assert_eq!(config.endpoints.development.len(), 5);
        assert_eq!(config.endpoints.production.len(), 5);
        assert_eq!(
            config.endpoints.fallback["assessment"].as_str(),
            "https://agenticlearn-backend-production.up.railway.app/api/v1/learning/assessment"
        );
        assert_eq!(
            config.endpoints.production["auth"].as_str(),
            "https://asia-southeast1-agenticlearn-project.cloudfunctions.net/agenticlearn-auth"
        );
    }

    #[test]
    fn detect_environment() {
        assert_eq!(Environment::detect("localhost"), Environment::Development);
        assert_eq!(Environment::detect("localhost:5500"), Environment::Development);
        assert_eq!(Environment::detect("127.0.0.1"), Environment::Development);
        assert_eq!(Environment::detect("[::1]"), Environment::Development);
        assert_eq!(
            Environment::detect("agenticlearn.example.org"),
            Environment::Production
        );
    }

    #[test]
    fn explicit_environment_wins() {
        let config = Config {
            environment: Some(Environment::Production),
            ..Default::default()
        };
        assert_eq!(config.environment(), Environment::Production);
    }

    #[test]
    fn parse_yaml() {
        let yaml = r#"
            host: app.agenticlearn.id
            timeout_secs: 5
            feature_flags:
                auth: true
                assessment: true
            endpoints:
                production:
                    auth: https://auth.example.com/v1
                fallback:
                    auth: https://legacy.example.com/api/v1/auth
            credentials:
                token_keys: [login]
            cache:
                ttl_secs: 60
            "#;
        let config: Config = serde_yaml::from_str(yaml).expect("parse config");
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.environment(), Environment::Production);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.feature_flags.is_enabled("assessment"));
        assert!(!config.feature_flags.is_enabled("content"));
        assert_eq!(config.endpoints.production.len(), 1);
        // Unset tables keep their defaults
        assert_eq!(config.endpoints.development.len(), 5);
        assert_eq!(config.credentials.token_keys, vec!["login".to_string()]);
        assert_eq!(config.credentials.user_id_key, "user_id");
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_capacity, 50);
    }

    #[test]
    fn invalid_url_is_rejected() {
        let yaml = r#"
            endpoints:
                production:
                    auth: not a url
            "#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn validation_errors() {
        let config = Config {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));

        let config = Config {
            credentials: CredentialKeys {
                token_keys: vec![],
                user_id_key: "user_id".into(),
            },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::NoTokenKeys));

        let mut config = Config::default();
        config.endpoints.fallback.insert(
            " ".into(),
            Url::parse("http://localhost").expect("valid url"),
        );
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptyServiceName("fallback"))
        );

        let mut config = Config::default();
        config
            .diagnostic_headers
            .insert("bad header".into(), "x".into());
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidHeader("bad header".into()))
        );
        assert_eq!(
            config.diagnostic_header_map(),
            Err(ValidationError::InvalidHeader("bad header".into()))
        );

        let mut config = Config::default();
        config
            .diagnostic_headers
            .insert("x-trace".into(), "line\nbreak".into());
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidHeader("x-trace".into()))
        );
    }

    #[test]
    fn diagnostic_headers_on_the_wire() {
        let headers = Config::default().diagnostic_header_map().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["x-agenticlearn"], "v1.0");
        assert_eq!(headers["x-carbon-efficient"], "true");
    }
}
