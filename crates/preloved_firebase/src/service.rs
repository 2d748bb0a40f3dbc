//! Startup wiring: turns the `firebase` config section into a [`PushConfig`].
//!
//! This is the only place that touches the service account key file.

use crate::adapter::{FcmEndpoints, PrimaryCredential, PushConfig, PushDeliveryAdapter};
use crate::auth::ServiceAccountTokenProvider;
use preloved_common::services::UserDirectory;
use preloved_common::{is_firebase_enabled, PrelovedError};
use preloved_config::{AppConfig, FirebaseConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Builds the push configuration, reading the service account key if one is set.
///
/// A key that cannot be loaded disables the v1 protocol but not the legacy one.
pub async fn push_config_from(config: &FirebaseConfig) -> PushConfig {
    let primary = match config.key_path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => match ServiceAccountTokenProvider::from_key_file(Path::new(path)).await {
            Ok(provider) => {
                let project_id = config
                    .project_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .or_else(|| provider.project_id().map(str::to_string));
                match project_id {
                    Some(project_id) => Some(PrimaryCredential {
                        project_id,
                        token_provider: Arc::new(provider),
                    }),
                    None => {
                        warn!("Service account key has no project_id and none is configured; FCM v1 disabled");
                        None
                    }
                }
            }
            Err(e) => {
                error!("FCM v1 disabled: {}", e);
                None
            }
        },
        None => None,
    };

    PushConfig {
        primary,
        legacy_key: config.server_key.clone().filter(|k| !k.is_empty()),
        endpoints: FcmEndpoints {
            v1_base_url: config.v1_base_url.clone(),
            legacy_url: config.legacy_url.clone(),
        },
        click_action: config.click_action.clone(),
        timeout: Duration::from_secs(config.timeout_secs),
    }
}

/// Returns the push sender for this deployment, or `None` when push is disabled.
///
/// # Errors
///
/// Fails only if the HTTP client cannot be built.
pub async fn build_push_adapter(
    config: &Arc<AppConfig>,
    directory: Arc<dyn UserDirectory>,
) -> Result<Option<Arc<PushDeliveryAdapter>>, PrelovedError> {
    if !is_firebase_enabled(config) {
        info!("Push delivery disabled (use_firebase is off or no firebase section)");
        return Ok(None);
    }
    let Some(firebase) = config.firebase.as_ref() else {
        return Ok(None);
    };

    let push_config = push_config_from(firebase).await;
    let adapter = PushDeliveryAdapter::new(push_config, directory)?;
    Ok(Some(Arc::new(adapter)))
}
