//! Environment variable handling for the Preloved backend.
//!
//! Configuration values use `PRELOVED__SECTION__KEY`, secrets use
//! `PRELOVED_SECRET_SECTION_KEY` with a fallback to the bare
//! `SECTION_KEY` name the mobile backend historically used
//! (e.g. `FIREBASE_SERVER_KEY`).

use crate::models::{AppConfig, AuthConfig, DatabaseConfig, FirebaseConfig};
use std::env;
use tracing::debug;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "PRELOVED";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "PRELOVED_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `server.host` becomes `PRELOVED__SERVER__HOST`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `firebase.server_key` becomes `PRELOVED_SECRET_FIREBASE_SERVER_KEY`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to its legacy environment variable name
///
/// `firebase.server_key` becomes `FIREBASE_SERVER_KEY`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() < 2 {
        return path.to_uppercase();
    }

    let service = parts[0];
    let key = parts[1..].join(SECRET_SEPARATOR);
    format!("{}_{}", service, key).to_uppercase()
}

/// Get an environment variable for a secret path
///
/// Tries the prefixed name first, then the legacy name. Empty values count as unset.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    let env_var = secret_path_to_env_var(path);
    if let Some(value) = env::var(&env_var).ok().filter(|v| !v.is_empty()) {
        return Some(value);
    }

    let legacy_env_var = legacy_secret_path_to_env_var(path);
    env::var(&legacy_env_var).ok().filter(|v| !v.is_empty())
}

/// Apply secrets from the environment on top of a loaded configuration.
///
/// A secret for a section that is missing from the config files creates the
/// section with defaults, so a bare `FIREBASE_SERVER_KEY` is enough to enable
/// the legacy push protocol.
pub fn apply_secret_overrides(mut config: AppConfig) -> AppConfig {
    if let Some(server_key) = get_secret_env_var("firebase.server_key") {
        debug!("Firebase server key loaded from environment");
        config
            .firebase
            .get_or_insert_with(FirebaseConfig::default)
            .server_key = Some(server_key);
    }

    if let Some(key_path) = get_secret_env_var("firebase.key_path") {
        debug!("Firebase service account path loaded from environment");
        config
            .firebase
            .get_or_insert_with(FirebaseConfig::default)
            .key_path = Some(key_path);
    }

    if let Some(secret) = get_secret_env_var("auth.gateway_secret") {
        config
            .auth
            .get_or_insert_with(AuthConfig::default)
            .gateway_secret = Some(secret);
    }

    if let Some(url) = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()) {
        config.database = Some(DatabaseConfig { url });
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(
            config_path_to_env_var("server.host"),
            "PRELOVED__SERVER__HOST"
        );
        assert_eq!(
            config_path_to_env_var("firebase.timeout_secs"),
            "PRELOVED__FIREBASE__TIMEOUT_SECS"
        );
    }

    #[test]
    fn test_secret_path_to_env_var() {
        assert_eq!(
            secret_path_to_env_var("firebase.server_key"),
            "PRELOVED_SECRET_FIREBASE_SERVER_KEY"
        );
        assert_eq!(
            secret_path_to_env_var("auth.gateway_secret"),
            "PRELOVED_SECRET_AUTH_GATEWAY_SECRET"
        );
    }

    #[test]
    fn test_legacy_secret_path_to_env_var() {
        assert_eq!(
            legacy_secret_path_to_env_var("firebase.server_key"),
            "FIREBASE_SERVER_KEY"
        );
        assert_eq!(
            legacy_secret_path_to_env_var("firebase.key_path"),
            "FIREBASE_KEY_PATH"
        );
        assert_eq!(legacy_secret_path_to_env_var("standalone"), "STANDALONE");
    }
}
