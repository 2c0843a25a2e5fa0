//! Shared types

use serde::{Deserialize, Serialize};

/// A configuration value together with where it came from.
///
/// ```rust
/// use gitrun_utils::types::{ConfigSource, ConfigValue};
/// use serde_json::json;
///
/// let value = ConfigValue {
///     value: json!("wsl"),
///     source: ConfigSource::Config,
/// };
/// assert_eq!(value.source.to_string(), "config");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigValue {
    pub value: serde_json::Value,
    pub source: ConfigSource,
}

/// Source of a configuration value.
///
/// Precedence: CLI arguments > config file > programmatic overrides > defaults.
/// Serializes to lowercase strings: `"cli"`, `"config"`, `"programmatic"`, `"default"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from the configuration file.
    Config,
    /// Value provided through `ConfigBuilder`.
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

impl ConfigSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Config => "config",
            Self::Programmatic => "programmatic",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_serializes_lowercase() {
        let json = serde_json::to_string(&ConfigSource::Programmatic).unwrap();
        assert_eq!(json, r#""programmatic""#);
        let back: ConfigSource = serde_json::from_str(r#""cli""#).unwrap();
        assert_eq!(back, ConfigSource::Cli);
    }

    #[test]
    fn test_display_matches_serde() {
        for source in [
            ConfigSource::Cli,
            ConfigSource::Config,
            ConfigSource::Programmatic,
            ConfigSource::Default,
        ] {
            assert_eq!(
                serde_json::to_string(&source).unwrap(),
                format!("\"{source}\"")
            );
        }
    }
}
