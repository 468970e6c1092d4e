// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as bind addresses, non-empty paths, and sane windows.

use crate::diagnostic::ConfigError;
use crate::model::CourierConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &CourierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.media.content_root.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "media.content_root must not be empty".to_string(),
        });
    }

    if config.presence.liveness_window_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "presence.liveness_window_secs must be positive".to_string(),
        });
    }

    // A liveness window shorter than the heartbeat cadence would mark every
    // agent offline between heartbeats.
    if config.presence.liveness_window_secs < config.presence.heartbeat_interval_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "presence.liveness_window_secs ({}) must be at least presence.heartbeat_interval_secs ({})",
                config.presence.liveness_window_secs, config.presence.heartbeat_interval_secs
            ),
        });
    }

    if config.context.history_window <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "context.history_window must be positive, got {}",
                config.context.history_window
            ),
        });
    }

    if config.context.line_max_chars == 0 {
        errors.push(ConfigError::Validation {
            message: "context.line_max_chars must be positive".to_string(),
        });
    }

    if config.media.url_ttl_days == 0 {
        errors.push(ConfigError::Validation {
            message: "media.url_ttl_days must be positive".to_string(),
        });
    }

    if config.fallback.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "fallback.max_tokens must be positive".to_string(),
        });
    }

    if config.dispatch.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.poll_interval_secs must be positive".to_string(),
        });
    }

    // Partial carrier credentials are a misconfiguration we catch early
    // rather than at first send.
    let sid = config.carrier.account_sid.as_deref().unwrap_or("");
    let token = config.carrier.auth_token.as_deref().unwrap_or("");
    if sid.is_empty() != token.is_empty() {
        errors.push(ConfigError::Validation {
            message:
                "carrier.account_sid and carrier.auth_token must be set together or not at all"
                    .to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CourierConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_host_is_rejected() {
        let mut config = CourierConfig::default();
        config.gateway.host = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("gateway.host")));
    }

    #[test]
    fn window_shorter_than_cadence_is_rejected() {
        let mut config = CourierConfig::default();
        config.presence.liveness_window_secs = 60;
        config.presence.heartbeat_interval_secs = 120;
        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.to_string().contains("liveness_window_secs"))
        );
    }

    #[test]
    fn partial_carrier_credentials_are_rejected() {
        let mut config = CourierConfig::default();
        config.carrier.account_sid = Some("AC123".to_string());
        config.carrier.auth_token = None;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("account_sid")));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = CourierConfig::default();
        config.storage.database_path = "".to_string();
        config.media.url_ttl_days = 0;
        config.fallback.max_tokens = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3, "expected all errors collected, got {errors:?}");
    }
}
