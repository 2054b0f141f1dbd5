//! Configuration resolution for sims-di
//!
//! Provides two-tier configuration resolution with ENV → TOML priority,
//! falling back to compiled defaults where a default is safe. The bearer
//! token has no safe default and must be configured.

use sims_common::config::TomlConfig;
use sims_common::{Error, Result};
use tracing::{info, warn};

/// Default document service endpoint for local development
const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8460";

/// Default listen port for the document import module
pub const DEFAULT_LISTEN_PORT: u16 = 5731;

/// Resolve the document service base URL
///
/// **Priority:** ENV (`SIMS_DI_SERVICE_URL`) → TOML → compiled default
pub fn resolve_service_url(toml_config: &TomlConfig) -> String {
    let env_url = std::env::var("SIMS_DI_SERVICE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let toml_url = toml_config
        .service_url
        .as_ref()
        .filter(|v| !v.trim().is_empty());

    if env_url.is_some() && toml_url.is_some() {
        warn!(
            "Document service URL found in environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some(url) = env_url {
        info!("Document service URL loaded from environment variable");
        return url;
    }
    if let Some(url) = toml_url {
        info!("Document service URL loaded from TOML config");
        return url.clone();
    }

    info!(url = DEFAULT_SERVICE_URL, "Document service URL not configured, using default");
    DEFAULT_SERVICE_URL.to_string()
}

/// Resolve the bearer token for the document service
///
/// **Priority:** ENV (`SIMS_DI_API_TOKEN`) → TOML
///
/// Token acquisition belongs to the authentication module; this only picks
/// up an already-issued token. No valid token anywhere is a configuration
/// error.
pub fn resolve_api_token(toml_config: &TomlConfig) -> Result<String> {
    let env_token = std::env::var("SIMS_DI_API_TOKEN").ok();
    let toml_token = toml_config.api_token.as_ref();

    let mut sources = Vec::new();
    if env_token.as_deref().is_some_and(is_valid_token) {
        sources.push("environment");
    }
    if toml_token.map(String::as_str).is_some_and(is_valid_token) {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "Document service API token found in multiple sources: {}. Using environment (highest priority).",
            sources.join(", ")
        );
    }

    if let Some(token) = env_token {
        if is_valid_token(&token) {
            info!("Document service API token loaded from environment variable");
            return Ok(token);
        }
    }

    if let Some(token) = toml_token {
        if is_valid_token(token) {
            info!("Document service API token loaded from TOML config");
            return Ok(token.clone());
        }
    }

    Err(Error::Config(
        "Document service API token not configured. Please configure using one of:\n\
         1. Environment: SIMS_DI_API_TOKEN=your-token-here\n\
         2. TOML config: ~/.config/sims/sims-di.toml (api_token = \"your-token\")"
            .to_string(),
    ))
}

/// Validate token (non-empty, non-whitespace)
pub fn is_valid_token(token: &str) -> bool {
    !token.trim().is_empty()
}

/// Resolve the listen port
///
/// **Priority:** ENV (`SIMS_DI_PORT`) → TOML → compiled default. A value
/// that does not parse as a port is ignored with a warning rather than
/// aborting startup.
pub fn resolve_listen_port(toml_config: &TomlConfig) -> u16 {
    if let Ok(raw) = std::env::var("SIMS_DI_PORT") {
        match raw.parse::<u16>() {
            Ok(port) => {
                info!(port = port, "Listen port loaded from environment variable");
                return port;
            }
            Err(_) => {
                warn!(value = %raw, "Ignoring unparseable SIMS_DI_PORT");
            }
        }
    }

    if let Some(port) = toml_config.listen_port {
        info!(port = port, "Listen port loaded from TOML config");
        return port;
    }

    DEFAULT_LISTEN_PORT
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("SIMS_DI_SERVICE_URL");
        std::env::remove_var("SIMS_DI_API_TOKEN");
        std::env::remove_var("SIMS_DI_PORT");
    }

    #[test]
    fn token_validation_rejects_whitespace() {
        assert!(is_valid_token("abc123"));
        assert!(!is_valid_token(""));
        assert!(!is_valid_token("   "));
    }

    #[test]
    #[serial]
    fn env_overrides_toml_for_service_url() {
        clear_env();
        std::env::set_var("SIMS_DI_SERVICE_URL", "http://env.example:9000");

        let config = TomlConfig {
            service_url: Some("http://toml.example:9000".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_service_url(&config), "http://env.example:9000");

        clear_env();
    }

    #[test]
    #[serial]
    fn service_url_falls_back_toml_then_default() {
        clear_env();

        let config = TomlConfig {
            service_url: Some("http://toml.example:9000".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_service_url(&config), "http://toml.example:9000");

        assert_eq!(
            resolve_service_url(&TomlConfig::default()),
            DEFAULT_SERVICE_URL
        );
    }

    #[test]
    #[serial]
    fn missing_token_is_a_config_error() {
        clear_env();

        let err = resolve_api_token(&TomlConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    #[serial]
    fn blank_env_token_falls_through_to_toml() {
        clear_env();
        std::env::set_var("SIMS_DI_API_TOKEN", "   ");

        let config = TomlConfig {
            api_token: Some("toml-token".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_api_token(&config).unwrap(), "toml-token");

        clear_env();
    }

    #[test]
    #[serial]
    fn unparseable_port_env_is_ignored() {
        clear_env();
        std::env::set_var("SIMS_DI_PORT", "not-a-port");

        let config = TomlConfig {
            listen_port: Some(6100),
            ..Default::default()
        };
        assert_eq!(resolve_listen_port(&config), 6100);

        clear_env();
        assert_eq!(
            resolve_listen_port(&TomlConfig::default()),
            DEFAULT_LISTEN_PORT
        );
    }
}
