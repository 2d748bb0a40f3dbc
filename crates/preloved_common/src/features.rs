//! Runtime feature checks.
//!
//! Compile-time features (`openapi`) are handled with `#[cfg]`. Runtime
//! features need both their `use_*` flag and their config section.

use preloved_config::AppConfig;
use std::sync::Arc;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Push delivery is on when `use_firebase` is set and a `firebase` section exists.
pub fn is_firebase_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_firebase, config.firebase.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use preloved_config::FirebaseConfig;

    #[test]
    fn firebase_needs_flag_and_section() {
        let mut config = AppConfig::default();
        assert!(!is_firebase_enabled(&Arc::new(config.clone())));

        config.firebase = Some(FirebaseConfig::default());
        assert!(!is_firebase_enabled(&Arc::new(config.clone())));

        config.use_firebase = true;
        assert!(is_firebase_enabled(&Arc::new(config)));
    }
}
