// --- File: crates/preloved_config/src/models.rs ---

use serde::{Deserialize, Serialize};

pub const DEFAULT_FCM_V1_BASE_URL: &str = "https://fcm.googleapis.com";
pub const DEFAULT_FCM_LEGACY_URL: &str = "https://fcm.googleapis.com/fcm/send";
pub const DEFAULT_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
pub const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 5;

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/preloved.db, overridden by DATABASE_URL
}

// --- Firebase Cloud Messaging Config ---
// Either protocol may be absent. The service account key enables the v1 API,
// the server key enables the legacy API. Both secrets can come from env vars:
// PRELOVED_SECRET_FIREBASE_KEY_PATH / FIREBASE_KEY_PATH
// PRELOVED_SECRET_FIREBASE_SERVER_KEY / FIREBASE_SERVER_KEY
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FirebaseConfig {
    pub project_id: Option<String>,
    pub key_path: Option<String>,
    #[serde(default, skip_serializing)]
    pub server_key: Option<String>,
    #[serde(default = "default_v1_base_url")]
    pub v1_base_url: String,
    #[serde(default = "default_legacy_url")]
    pub legacy_url: String,
    #[serde(default = "default_click_action")]
    pub click_action: String,
    #[serde(default = "default_push_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            key_path: None,
            server_key: None,
            v1_base_url: default_v1_base_url(),
            legacy_url: default_legacy_url(),
            click_action: default_click_action(),
            timeout_secs: default_push_timeout_secs(),
        }
    }
}

fn default_v1_base_url() -> String {
    DEFAULT_FCM_V1_BASE_URL.to_string()
}

fn default_legacy_url() -> String {
    DEFAULT_FCM_LEGACY_URL.to_string()
}

fn default_click_action() -> String {
    DEFAULT_CLICK_ACTION.to_string()
}

fn default_push_timeout_secs() -> u64 {
    DEFAULT_PUSH_TIMEOUT_SECS
}

// --- Public storage (product images) ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Base URL that `storage/<path>` is appended to when building image links.
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

// --- Gateway auth ---
// The session provider sits in front of this service and forwards the user id.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default, skip_serializing)]
    pub gateway_secret: Option<String>, // PRELOVED_SECRET_AUTH_GATEWAY_SECRET / AUTH_GATEWAY_SECRET
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags ---
    #[serde(default)]
    pub use_firebase: bool,

    // --- Optional Sections ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}
