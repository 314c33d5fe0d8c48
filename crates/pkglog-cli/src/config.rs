//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pkglog_core::{DEFAULT_GAP_MINUTES, DEFAULT_NET_GRACE_DAYS, ParserKind};
use serde::{Deserialize, Deserializer, Serialize};

/// Persistent defaults for command-line options.
///
/// Command-line values override these; boolean flags are combined with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each bool presets an independent command-line flag"
)]
pub struct Config {
    /// Maximum minutes between changes shown in one group.
    pub timegap: f64,
    /// Default for `--days`.
    #[serde(deserialize_with = "string_or_number")]
    pub days: Option<String>,
    /// Default for `--installed-net-days`.
    pub installed_net_days: f64,
    /// Log parser to use instead of detecting one.
    pub parser: Option<ParserKind>,
    /// Log path(s) to read instead of the parser's default.
    pub path: Option<String>,
    pub updated_only: bool,
    pub installed: bool,
    pub installed_only: bool,
    pub installed_net: bool,
    pub alldays: bool,
    pub boot: bool,
    pub glob: bool,
    pub regex: bool,
    pub no_color: bool,
    pub nojustify: bool,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timegap: f64::from(DEFAULT_GAP_MINUTES),
            days: None,
            installed_net_days: f64::from(DEFAULT_NET_GRACE_DAYS),
            parser: None,
            path: None,
            updated_only: false,
            installed: false,
            installed_only: false,
            installed_net: false,
            alldays: false,
            boot: false,
            glob: false,
            regex: false,
            no_color: false,
            nojustify: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PKGLOG_*)
        figment = figment.merge(Env::prefixed("PKGLOG_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for pkglog.
///
/// On Linux: `~/.config/pkglog`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pkglog"))
}

/// Accepts `days = 7` as well as `days = "2024-01-01"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Integer(i64),
        Text(String),
    }

    Ok(Option::<Value>::deserialize(deserializer)?.map(|v| match v {
        Value::Integer(n) => n.to_string(),
        Value::Text(s) => s,
    }))
}
