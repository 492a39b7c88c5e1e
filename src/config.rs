//! Configuration types.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::session::InMemorySessions;

/// Photo URL attached to every echoed user record.
pub const DEFAULT_PHOTO_URL: &str = "https://www.test.com/some.jpg";

/// Base URL the wizard fetches the catalog from.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Catalog server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Optional JSON catalog file; the built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Photo URL reported in echoed user records.
    pub photo_url: String,
    /// Session tokens accepted by the server.
    pub sessions: InMemorySessions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            catalog_path: None,
            photo_url: DEFAULT_PHOTO_URL.to_string(),
            sessions: InMemorySessions::new(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from `ONBOARDING_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = var("ONBOARDING_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let sessions = match var("ONBOARDING_SESSIONS") {
            Some(spec) => InMemorySessions::parse(&spec)?,
            None => defaults.sessions,
        };

        Ok(Self {
            bind: var("ONBOARDING_BIND").unwrap_or(defaults.bind),
            port,
            catalog_path: var("ONBOARDING_CATALOG_PATH")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            photo_url: var("ONBOARDING_PHOTO_URL").unwrap_or(defaults.photo_url),
            sessions,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "ONBOARDING_BIND".into(),
                message: e.to_string(),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Wizard client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, without a trailing slash.
    pub api_url: String,
    /// Session token sent as a bearer credential.
    pub session_token: Option<SecretString>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_token: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = var("ONBOARDING_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            api_url,
            session_token: var("ONBOARDING_SESSION_TOKEN")
                .filter(|s| !s.is_empty())
                .map(SecretString::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn server_defaults() {
        let config = ServerConfig::from_vars(lookup(&[])).unwrap();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.photo_url, DEFAULT_PHOTO_URL);
        assert!(config.sessions.is_empty());
    }

    #[test]
    fn server_overrides() {
        let config = ServerConfig::from_vars(lookup(&[
            ("ONBOARDING_BIND", "127.0.0.1"),
            ("ONBOARDING_PORT", "9000"),
            ("ONBOARDING_CATALOG_PATH", "/etc/onboarding.json"),
            ("ONBOARDING_PHOTO_URL", "https://cdn.example.com/p.jpg"),
            ("ONBOARDING_SESSIONS", "tok=1:ada:ada@example.com"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/onboarding.json"))
        );
        assert_eq!(config.photo_url, "https://cdn.example.com/p.jpg");
        assert_eq!(config.sessions.len(), 1);
    }

    #[test]
    fn ipv6_bind() {
        let config = ServerConfig::from_vars(lookup(&[
            ("ONBOARDING_BIND", "::"),
            ("ONBOARDING_PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::]:9000");

        let config = ServerConfig::from_vars(lookup(&[("ONBOARDING_BIND", "::1")])).unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::1]:8080");
    }

    #[test]
    fn invalid_bind_rejected() {
        let config =
            ServerConfig::from_vars(lookup(&[("ONBOARDING_BIND", "localhost:80")])).unwrap();
        assert!(matches!(
            config.socket_addr(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "ONBOARDING_BIND"
        ));
    }

    #[test]
    fn invalid_port_falls_back() {
        let config = ServerConfig::from_vars(lookup(&[("ONBOARDING_PORT", "nope")])).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn malformed_sessions_rejected() {
        let err = ServerConfig::from_vars(lookup(&[("ONBOARDING_SESSIONS", "garbage")]));
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn client_config() {
        let config = ClientConfig::from_vars(lookup(&[
            ("ONBOARDING_API_URL", "http://example.com:81/"),
            ("ONBOARDING_SESSION_TOKEN", "tok"),
        ]));
        assert_eq!(config.api_url, "http://example.com:81");
        assert_eq!(config.session_token.unwrap().expose_secret(), "tok");

        let config = ClientConfig::from_vars(lookup(&[]));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.session_token.is_none());
    }
}
