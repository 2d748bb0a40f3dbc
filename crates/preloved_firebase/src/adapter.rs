//! Push delivery with protocol fallback.
//!
//! One v1 attempt when a service account is configured, then at most one
//! legacy attempt when v1 is absent or failed. Everything the adapter needs
//! is passed in through [`PushConfig`]; it never reads files or env vars.

use crate::auth::AccessTokenProvider;
use crate::client::{FcmMessage, FirebaseClient};
use crate::legacy::{LegacyClient, LegacyMessage, MIN_SERVER_KEY_LEN};
use preloved_common::push::{PushError, PushMessage, PushProtocol, PushReceipt};
use preloved_common::services::{BoxFuture, PushSender, UserDirectory};
use preloved_common::{config_error, create_client, PrelovedError};
use preloved_config::{
    DEFAULT_CLICK_ACTION, DEFAULT_FCM_LEGACY_URL, DEFAULT_FCM_V1_BASE_URL,
    DEFAULT_PUSH_TIMEOUT_SECS,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Service account credentials for the v1 API.
#[derive(Clone)]
pub struct PrimaryCredential {
    pub project_id: String,
    pub token_provider: Arc<dyn AccessTokenProvider>,
}

#[derive(Debug, Clone)]
pub struct FcmEndpoints {
    pub v1_base_url: String,
    pub legacy_url: String,
}

impl Default for FcmEndpoints {
    fn default() -> Self {
        Self {
            v1_base_url: DEFAULT_FCM_V1_BASE_URL.to_string(),
            legacy_url: DEFAULT_FCM_LEGACY_URL.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct PushConfig {
    pub primary: Option<PrimaryCredential>,
    pub legacy_key: Option<String>,
    pub endpoints: FcmEndpoints,
    pub click_action: String,
    /// Bounds the token fetch and each HTTP request.
    pub timeout: Duration,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            primary: None,
            legacy_key: None,
            endpoints: FcmEndpoints::default(),
            click_action: DEFAULT_CLICK_ACTION.to_string(),
            timeout: Duration::from_secs(DEFAULT_PUSH_TIMEOUT_SECS),
        }
    }
}

/// Builds the `data` payload: `title`, `body`, `message` (body again, for
/// older app builds), `click_action`, then the caller's keys, which win.
pub fn build_data(
    title: &str,
    body: &str,
    click_action: &str,
    extra: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut data = HashMap::with_capacity(extra.len() + 4);
    data.insert("title".to_string(), title.to_string());
    data.insert("body".to_string(), body.to_string());
    data.insert("message".to_string(), body.to_string());
    data.insert("click_action".to_string(), click_action.to_string());
    data.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    data
}

pub struct PushDeliveryAdapter {
    v1: Option<FirebaseClient>,
    legacy: Option<LegacyClient>,
    click_action: String,
    directory: Arc<dyn UserDirectory>,
}

impl PushDeliveryAdapter {
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(config: PushConfig, directory: Arc<dyn UserDirectory>) -> Result<Self, PrelovedError> {
        let http = create_client(config.timeout, false)
            .map_err(|e| config_error(format!("failed to build push HTTP client: {}", e)))?;

        let v1 = config.primary.map(|primary| {
            info!(project_id = %primary.project_id, "FCM v1 delivery enabled");
            FirebaseClient::new(
                http.clone(),
                &config.endpoints.v1_base_url,
                &primary.project_id,
                primary.token_provider,
                config.timeout,
            )
        });

        let legacy = match config.legacy_key {
            Some(key) if key.len() >= MIN_SERVER_KEY_LEN => {
                info!("FCM legacy delivery enabled");
                Some(LegacyClient::new(http, &config.endpoints.legacy_url, &key))
            }
            Some(key) => {
                warn!(
                    "FCM server key is {} characters, expected at least {}; legacy delivery disabled",
                    key.len(),
                    MIN_SERVER_KEY_LEN
                );
                None
            }
            None => None,
        };

        if v1.is_none() && legacy.is_none() {
            warn!("No FCM protocol configured; pushes will be skipped");
        }

        Ok(Self {
            v1,
            legacy,
            click_action: config.click_action,
            directory,
        })
    }

    pub fn has_primary(&self) -> bool {
        self.v1.is_some()
    }

    pub fn has_legacy(&self) -> bool {
        self.legacy.is_some()
    }

    async fn send(&self, message: PushMessage) -> Result<PushReceipt, PushError> {
        if self.v1.is_none() && self.legacy.is_none() {
            return Err(PushError::NotConfigured);
        }

        let recipient_id = message.recipient_id;
        let user = self
            .directory
            .find_user(recipient_id)
            .await
            .map_err(|e| PushError::Directory(e.to_string()))?;
        let token = user
            .and_then(|u| u.push_token)
            .ok_or(PushError::NoDeviceToken {
                user_id: recipient_id,
            })?;

        let data = build_data(&message.title, &message.body, &self.click_action, &message.data);

        let mut primary_error = None;
        if let Some(v1) = &self.v1 {
            let request = FcmMessage::high_priority(
                &token,
                &message.title,
                &message.body,
                data.clone(),
                &self.click_action,
            );
            match v1.send_message(&request).await {
                Ok(name) => {
                    debug!(recipient_id, protocol = %PushProtocol::V1, message_id = %name, "Push accepted");
                    return Ok(PushReceipt {
                        protocol: PushProtocol::V1,
                        message_id: Some(name),
                    });
                }
                Err(e) => {
                    warn!(recipient_id, protocol = %PushProtocol::V1, error = %e, "FCM v1 send failed");
                    primary_error = Some(e);
                }
            }
        }

        match (&self.legacy, primary_error) {
            (Some(legacy), _) => {
                let request = LegacyMessage::new(&token, &message.title, &message.body, data);
                legacy.send_message(&request).await?;
                debug!(recipient_id, protocol = %PushProtocol::Legacy, "Push accepted");
                Ok(PushReceipt {
                    protocol: PushProtocol::Legacy,
                    message_id: None,
                })
            }
            (None, Some(primary_error)) => Err(primary_error),
            (None, None) => Err(PushError::NotConfigured),
        }
    }

    /// Best-effort delivery collapsed to a flag. Failures are logged, never raised.
    pub async fn deliver(&self, message: PushMessage) -> bool {
        let recipient_id = message.recipient_id;
        match self.send(message).await {
            Ok(receipt) => {
                info!(recipient_id, protocol = %receipt.protocol, "Push delivered");
                true
            }
            Err(e @ PushError::NoDeviceToken { .. }) => {
                debug!(recipient_id, "Push skipped: {}", e);
                false
            }
            Err(e) => {
                warn!(recipient_id, error = %e, "Push delivery failed");
                false
            }
        }
    }
}

impl PushSender for PushDeliveryAdapter {
    fn push(&self, message: PushMessage) -> BoxFuture<'_, PushReceipt, PushError> {
        Box::pin(self.send(message))
    }
}
