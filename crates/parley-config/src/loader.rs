// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./parley.toml` > `~/.config/parley/parley.toml` > `/etc/parley/parley.toml`
//! with environment variable overrides via `PARLEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ParleyConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/parley/parley.toml` (system-wide)
/// 3. `~/.config/parley/parley.toml` (user XDG config)
/// 4. `./parley.toml` (local directory)
/// 5. `PARLEY_*` environment variables
pub fn load_config() -> Result<ParleyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join(USER_CONFIG_SUFFIX))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Render a configuration as TOML, in the layout `parley.toml` expects.
pub fn to_toml_string(config: &ParleyConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/parley/parley.toml";
pub(crate) const USER_CONFIG_SUFFIX: &str = "parley/parley.toml";
pub(crate) const LOCAL_CONFIG_FILE: &str = "parley.toml";

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `PARLEY_DELIVERY_REPLY_DELAY_MS` must map to
/// `delivery.reply_delay_ms`, not `delivery.reply.delay.ms`.
///
/// The mapper sees the stripped key in its original case, so it is
/// lowercased before the section prefixes are matched.
fn env_provider() -> Env {
    Env::prefixed("PARLEY_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("session_", "session.", 1)
            .replacen("delivery_", "delivery.", 1)
            .replacen("counterpart_", "counterpart.", 1)
            .replacen("attachment_", "attachment.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.delivery.delivery_delay_ms, 1_000);
        assert_eq!(config.delivery.reply_delay_ms, 2_000);
        assert_eq!(config.attachment.max_attachments, 4);
        assert_eq!(config.counterpart.replies.len(), 4);
    }

    #[test]
    fn rendered_config_loads_back() {
        let mut config = ParleyConfig::default();
        config.delivery.reply_delay_ms = 750;
        config.counterpart.replies = vec!["Be right there".into()];

        let rendered = to_toml_string(&config).unwrap();
        assert!(rendered.contains("[delivery]"));
        let reloaded = load_config_from_str(&rendered).unwrap();
        assert_eq!(reloaded.delivery.reply_delay_ms, 750);
        assert_eq!(reloaded.counterpart.replies, vec!["Be right there"]);
    }

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PARLEY_DELIVERY_REPLY_DELAY_MS", "250");
            jail.set_env("PARLEY_ATTACHMENT_MAX_ATTACHMENTS", "2");
            jail.create_file("custom.toml", "[session]\nname = \"buyer\"\n")?;

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.delivery.reply_delay_ms, 250);
            assert_eq!(config.attachment.max_attachments, 2);
            assert_eq!(config.session.name, "buyer");
            Ok(())
        });
    }

    #[test]
    fn env_alone_sets_every_section() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PARLEY_SESSION_NAME", "buyer");
            jail.set_env("PARLEY_DELIVERY_DELIVERY_DELAY_MS", "40");
            jail.set_env("PARLEY_COUNTERPART_NAME", "farmer");
            jail.set_env("PARLEY_ATTACHMENT_MAX_ATTACHMENTS", "1");

            let config: ParleyConfig = Figment::new()
                .merge(Serialized::defaults(ParleyConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.session.name, "buyer");
            assert_eq!(config.delivery.delivery_delay_ms, 40);
            assert_eq!(config.counterpart.name, "farmer");
            assert_eq!(config.attachment.max_attachments, 1);
            Ok(())
        });
    }
}
