// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: a usable reply set,
//! a positive attachment cap and a recognized log level.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.session.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "session.log_level `{}` is not one of {}",
                config.session.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.session.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "session.name must not be empty".to_string(),
        });
    }

    if config.delivery.replies_enabled && config.counterpart.replies.is_empty() {
        errors.push(ConfigError::Validation {
            message: "counterpart.replies must not be empty when delivery.replies_enabled is set"
                .to_string(),
        });
    }

    for (i, reply) in config.counterpart.replies.iter().enumerate() {
        if reply.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("counterpart.replies[{i}] must not be blank"),
            });
        }
    }

    if config.attachment.max_attachments == 0 {
        errors.push(ConfigError::Validation {
            message: "attachment.max_attachments must be at least 1".to_string(),
        });
    }

    if config.attachment.max_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "attachment.max_bytes must be greater than 0".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
