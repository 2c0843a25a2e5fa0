//! Types used by the runner module

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How git gets launched for a working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerMode {
    /// Route through WSL when the working directory is a `\\wsl$\` path, else native
    #[default]
    Auto,
    /// Spawn git directly
    Native,
    /// Always go through `wsl.exe` (the working directory must be a `\\wsl$\` path)
    Wsl,
}

impl RunnerMode {
    /// Convert runner mode to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Native => "native",
            Self::Wsl => "wsl",
        }
    }
}

impl fmt::Display for RunnerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "native" => Ok(Self::Native),
            "wsl" => Ok(Self::Wsl),
            other => Err(format!("Unknown runner mode: {other}")),
        }
    }
}
