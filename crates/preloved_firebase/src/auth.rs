//! Access tokens for the FCM HTTP v1 API
//!
//! The service account key is read once at startup and turned into a
//! yup-oauth2 authenticator, which caches and refreshes tokens itself.

use preloved_common::push::PushError;
use preloved_common::services::BoxFuture;
use std::path::Path;
use std::sync::Arc;
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator, ServiceAccountKey};

/// OAuth2 scope required by `messages:send`.
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Supplies bearer tokens for the v1 API.
pub trait AccessTokenProvider: Send + Sync {
    fn access_token(&self) -> BoxFuture<'_, String, PushError>;
}

type TokenFetch = Box<dyn Fn() -> BoxFuture<'static, String, PushError> + Send + Sync>;

/// Token provider backed by a Google service account.
pub struct ServiceAccountTokenProvider {
    project_id: Option<String>,
    fetch: TokenFetch,
}

impl ServiceAccountTokenProvider {
    /// Reads the service account JSON at `path` and builds the authenticator.
    ///
    /// # Errors
    ///
    /// * The key file cannot be read or parsed
    /// * The authenticator cannot be built
    pub async fn from_key_file(path: &Path) -> Result<Self, PushError> {
        let key = read_service_account_key(path).await.map_err(|e| {
            PushError::Auth(format!(
                "failed to read service account key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_key(key).await
    }

    pub async fn from_key(key: ServiceAccountKey) -> Result<Self, PushError> {
        let project_id = key.project_id.clone();
        let authenticator = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| PushError::Auth(format!("failed to build authenticator: {}", e)))?;
        let authenticator = Arc::new(authenticator);

        let fetch: TokenFetch = Box::new(move || {
            let authenticator = Arc::clone(&authenticator);
            Box::pin(async move {
                let token = authenticator
                    .token(&[FCM_SCOPE])
                    .await
                    .map_err(|e| PushError::Auth(e.to_string()))?;
                token
                    .token()
                    .map(str::to_string)
                    .ok_or_else(|| PushError::Auth("No token available".to_string()))
            })
        });

        Ok(Self { project_id, fetch })
    }

    /// The project id embedded in the key file, if present.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

impl AccessTokenProvider for ServiceAccountTokenProvider {
    fn access_token(&self) -> BoxFuture<'_, String, PushError> {
        (self.fetch)()
    }
}

/// Hands out a fixed token. For tests and local emulators.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl AccessTokenProvider for StaticTokenProvider {
    fn access_token(&self) -> BoxFuture<'_, String, PushError> {
        let token = self.token.clone();
        Box::pin(async move { Ok(token) })
    }
}
