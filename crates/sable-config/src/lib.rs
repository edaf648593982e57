//! Workspace configuration (`sable.toml`) and tracing setup.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! json = false
//! file = "/tmp/sable.log"
//!
//! [refactor]
//! create_custom_delegate = true
//!
//! [diagnostics]
//! immutable_array_creation = "warning"
//!
//! [quick_info]
//! sum_types = true
//! ```

mod diagnostics;
mod logging;
mod schema;

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use diagnostics::ConfigDiagnostics;
pub use logging::{init_tracing, LoggingConfig};
pub use schema::json_schema;

/// Environment variable overriding config discovery. Relative paths resolve against the
/// workspace root.
pub const SABLE_CONFIG_ENV_VAR: &str = "SABLE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct SableConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub refactor: RefactorConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub quick_info: QuickInfoConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct RefactorConfig {
    /// Offer "Create Custom Delegate" on `Action<...>` / `Func<...>` parameters.
    #[serde(default = "default_true")]
    pub create_custom_delegate: bool,
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            create_custom_delegate: true,
        }
    }
}

/// Reporting level of one analyzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    #[default]
    Error,
    Warning,
    Off,
}

impl DiagnosticLevel {
    pub fn is_enabled(self) -> bool {
        self != DiagnosticLevel::Off
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// `ImmutableArray<T>.Empty.Add(x)` analyzer.
    #[serde(default)]
    pub immutable_array_creation: DiagnosticLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct QuickInfoConfig {
    /// List the cases of closed class hierarchies on hover.
    #[serde(default = "default_true")]
    pub sum_types: bool,
}

impl Default for QuickInfoConfig {
    fn default() -> Self {
        Self { sum_types: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` quotes the offending source line.
        ConfigError::Toml(err.message().to_string())
    }
}

impl SableConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse `text`, collecting unknown keys instead of rejecting them.
    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<SableConfig>(text)?;
        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        diagnostics.warnings.extend(config.logging.validate());
        Ok((config, diagnostics))
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_from_str(&read(path.as_ref())?)
    }

    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        Self::load_from_str_with_diagnostics(&read(path.as_ref())?)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Locate the config file for `workspace_root`.
///
/// Search order:
/// 1) `$SABLE_CONFIG`
/// 2) `sable.toml` in `workspace_root`
/// 3) `.sable/config.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(SABLE_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        return Some(if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        });
    }
    ["sable.toml", ".sable/config.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
}

/// Load the configuration for `workspace_root`; defaults when no file exists.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(SableConfig, Option<PathBuf>, ConfigDiagnostics), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((SableConfig::default(), None, ConfigDiagnostics::default()));
    };
    let (config, diagnostics) = SableConfig::load_from_path_with_diagnostics(&path)?;
    if !diagnostics.unknown_keys.is_empty() {
        tracing::warn!(
            target: "sable.config",
            path = %path.display(),
            keys = ?diagnostics.unknown_keys,
            "unknown config keys"
        );
    }
    Ok((config, Some(path), diagnostics))
}
