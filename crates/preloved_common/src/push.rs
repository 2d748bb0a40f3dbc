//! Types exchanged with a push sender.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The FCM wire protocol a message went out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum PushProtocol {
    /// HTTP v1 API, OAuth2 bearer token from a service account.
    V1,
    /// Legacy HTTP API, static server key.
    Legacy,
}

impl fmt::Display for PushProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushProtocol::V1 => f.write_str("fcm_v1"),
            PushProtocol::Legacy => f.write_str("fcm_legacy"),
        }
    }
}

/// A push addressed to a user rather than a device.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub recipient_id: i64,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl PushMessage {
    pub fn new(recipient_id: i64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipient_id,
            title: title.into(),
            body: body.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Proof of a provider-accepted push.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PushReceipt {
    pub protocol: PushProtocol,
    /// `projects/.../messages/...` on v1; the legacy API returns no name.
    pub message_id: Option<String>,
}

/// Why a push did not reach the provider, or was refused by it.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("user {user_id} has no registered device token")]
    NoDeviceToken { user_id: i64 },

    #[error("no push protocol is configured")]
    NotConfigured,

    #[error("recipient lookup failed: {0}")]
    Directory(String),

    #[error("access token error: {0}")]
    Auth(String),

    #[error("{protocol} request failed: {message}")]
    Transport {
        protocol: PushProtocol,
        message: String,
    },

    #[error("{protocol} request timed out")]
    Timeout { protocol: PushProtocol },

    #[error("{protocol} returned HTTP {status}: {message}")]
    Api {
        protocol: PushProtocol,
        status: u16,
        message: String,
    },

    #[error("{protocol} returned an unexpected body: {message}")]
    MalformedResponse {
        protocol: PushProtocol,
        message: String,
    },
}

impl PushError {
    /// The protocol the failure happened on, when there was an attempt.
    pub fn protocol(&self) -> Option<PushProtocol> {
        match self {
            PushError::Auth(_) => Some(PushProtocol::V1),
            PushError::Transport { protocol, .. }
            | PushError::Timeout { protocol }
            | PushError::Api { protocol, .. }
            | PushError::MalformedResponse { protocol, .. } => Some(*protocol),
            _ => None,
        }
    }
}
