//! FCM HTTP v1 client
//!
//! `POST {base}/v1/projects/{project_id}/messages:send` with an OAuth2 bearer
//! token. Success returns the message name
//! (`projects/{project_id}/messages/{message_id}`).

use crate::auth::AccessTokenProvider;
use preloved_common::push::{PushError, PushProtocol};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const PROTOCOL: PushProtocol = PushProtocol::V1;

/// Top-level v1 request body.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FcmMessage {
    pub message: Message,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Message {
    /// Registration token of the target device
    pub token: String,
    pub notification: Notification,
    pub data: HashMap<String, String>,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AndroidConfig {
    pub priority: String,
    pub notification: AndroidNotification,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AndroidNotification {
    pub click_action: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApnsConfig {
    pub headers: ApnsHeaders,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApnsHeaders {
    #[serde(rename = "apns-priority")]
    pub apns_priority: String,
}

impl FcmMessage {
    /// High priority on both platforms so the app wakes for the tap handler.
    pub fn high_priority(
        token: &str,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
        click_action: &str,
    ) -> Self {
        Self {
            message: Message {
                token: token.to_string(),
                notification: Notification {
                    title: title.to_string(),
                    body: body.to_string(),
                },
                data,
                android: AndroidConfig {
                    priority: "high".to_string(),
                    notification: AndroidNotification {
                        click_action: click_action.to_string(),
                    },
                },
                apns: ApnsConfig {
                    headers: ApnsHeaders {
                        apns_priority: "10".to_string(),
                    },
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FcmResponse {
    pub name: String,
}

/// Client for the FCM HTTP v1 API.
pub struct FirebaseClient {
    client: Client,
    send_url: String,
    token_provider: Arc<dyn AccessTokenProvider>,
    timeout: Duration,
}

impl FirebaseClient {
    pub fn new(
        client: Client,
        base_url: &str,
        project_id: &str,
        token_provider: Arc<dyn AccessTokenProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            send_url: format!(
                "{}/v1/projects/{}/messages:send",
                base_url.trim_end_matches('/'),
                project_id
            ),
            token_provider,
            timeout,
        }
    }

    /// Sends one message and returns its name.
    ///
    /// The token fetch and the request are each bounded by the client timeout.
    pub async fn send_message(&self, message: &FcmMessage) -> Result<String, PushError> {
        let token = tokio::time::timeout(self.timeout, self.token_provider.access_token())
            .await
            .map_err(|_| PushError::Auth("timed out fetching access token".to_string()))??;

        debug!("Sending FCM v1 message to {}", self.send_url);

        let response = self
            .client
            .post(&self.send_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(message)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PushError::Api {
                protocol: PROTOCOL,
                status: status.as_u16(),
                message,
            });
        }

        let fcm_response: FcmResponse =
            response
                .json()
                .await
                .map_err(|e| PushError::MalformedResponse {
                    protocol: PROTOCOL,
                    message: e.to_string(),
                })?;
        Ok(fcm_response.name)
    }
}

fn transport_error(err: reqwest::Error) -> PushError {
    if err.is_timeout() {
        PushError::Timeout { protocol: PROTOCOL }
    } else {
        PushError::Transport {
            protocol: PROTOCOL,
            message: err.to_string(),
        }
    }
}
