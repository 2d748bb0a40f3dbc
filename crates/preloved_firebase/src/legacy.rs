//! FCM legacy HTTP client (`/fcm/send`, `Authorization: key=...`).
//!
//! Google has retired this API for most projects; it stays as the fallback
//! for deployments that only have a server key.

use preloved_common::push::{PushError, PushProtocol};
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error};

const PROTOCOL: PushProtocol = PushProtocol::Legacy;

/// Server keys shorter than this are rejected as misconfigured.
pub const MIN_SERVER_KEY_LEN: usize = 50;

#[derive(Debug, Serialize)]
pub struct LegacyMessage {
    pub to: String,
    pub notification: LegacyNotification,
    pub data: HashMap<String, String>,
    pub priority: String,
    pub content_available: bool,
}

#[derive(Debug, Serialize)]
pub struct LegacyNotification {
    pub title: String,
    pub body: String,
    pub sound: String,
}

impl LegacyMessage {
    pub fn new(token: &str, title: &str, body: &str, data: HashMap<String, String>) -> Self {
        Self {
            to: token.to_string(),
            notification: LegacyNotification {
                title: title.to_string(),
                body: body.to_string(),
                sound: "default".to_string(),
            },
            data,
            priority: "high".to_string(),
            content_available: true,
        }
    }
}

pub struct LegacyClient {
    client: Client,
    url: String,
    server_key: String,
}

impl LegacyClient {
    pub fn new(client: Client, url: &str, server_key: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            server_key: server_key.to_string(),
        }
    }

    /// Any 2xx counts as delivered.
    pub async fn send_message(&self, message: &LegacyMessage) -> Result<(), PushError> {
        debug!("Sending FCM legacy message to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header(header::AUTHORIZATION, format!("key={}", self.server_key))
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PushError::Timeout { protocol: PROTOCOL }
                } else {
                    PushError::Transport {
                        protocol: PROTOCOL,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => {
                error!("FCM legacy rejected the server key (invalid or expired)")
            }
            StatusCode::NOT_FOUND => {
                error!("FCM legacy endpoint not found; the legacy API may be retired for this project")
            }
            _ => error!("FCM legacy returned HTTP {}", status.as_u16()),
        }

        Err(PushError::Api {
            protocol: PROTOCOL,
            status: status.as_u16(),
            message: body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_body_shape() {
        let message = LegacyMessage::new("device-token", "Hi", "There", HashMap::new());
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "to": "device-token",
                "notification": { "title": "Hi", "body": "There", "sound": "default" },
                "data": {},
                "priority": "high",
                "content_available": true
            })
        );
    }
}
