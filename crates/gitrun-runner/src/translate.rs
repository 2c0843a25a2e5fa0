//! Host ↔ WSL path translation
//!
//! Windows exposes WSL distros under `\\wsl$\<distro>\...`. A working directory
//! of that form identifies both the distro and the Linux-side directory:
//!
//! ```text
//! \\wsl$\Ubuntu\home\user\repo  →  distro "Ubuntu", "/home/user/repo"
//! ```

use crate::error::TranslationError;
use crate::quoting::{LongOptionNormalizer, standardize_quotes};

/// Marker that starts every host path pointing into a WSL distro.
pub const EXPLORER_PREFIX: &str = r"\\wsl$\";

/// Per-distro state needed to rewrite paths and argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationContext {
    distro: String,
    distro_prefix: String,
    working_dir: String,
    host_working_dir: String,
}

impl TranslationContext {
    /// Build a context from a host-side working directory.
    ///
    /// # Errors
    ///
    /// * [`TranslationError::NotNestedPath`] - the directory does not start with
    ///   [`EXPLORER_PREFIX`] (compared case-insensitively)
    /// * [`TranslationError::MissingIdentifier`] - no separator follows the distro
    ///   name, or the name is shorter than two characters
    pub fn try_new(host_working_dir: &str) -> Result<Self, TranslationError> {
        let distro = extract_identifier(host_working_dir)?;
        let distro_prefix = format!("{EXPLORER_PREFIX}{distro}\\");

        // extract_identifier guarantees the prefix matches, case aside
        let remainder = strip_prefix_ignore_case(host_working_dir, &distro_prefix)
            .ok_or_else(|| TranslationError::MissingIdentifier {
                path: host_working_dir.to_string(),
            })?;

        Ok(Self {
            working_dir: format!("/{}", remainder.replace('\\', "/")),
            distro,
            distro_prefix,
            host_working_dir: host_working_dir.to_string(),
        })
    }

    /// The distro name, e.g. `Ubuntu-22.04`.
    #[must_use]
    pub fn distro(&self) -> &str {
        &self.distro
    }

    /// `\\wsl$\<distro>\`
    #[must_use]
    pub fn distro_prefix(&self) -> &str {
        &self.distro_prefix
    }

    /// Working directory as seen from inside the distro.
    #[must_use]
    pub fn working_dir(&self) -> &str {
        &self.working_dir
    }

    #[must_use]
    pub fn host_working_dir(&self) -> &str {
        &self.host_working_dir
    }

    /// Translate a host path under this distro into its Linux form.
    ///
    /// Returns `None` for paths outside the distro.
    #[must_use]
    pub fn translate_path(&self, host_path: &str) -> Option<String> {
        strip_prefix_ignore_case(host_path, &self.distro_prefix)
            .map(|rest| format!("/{}", rest.replace('\\', "/")))
    }

    /// Translate one argument token.
    ///
    /// Tokens starting with `"` are re-quoted first. A token that then names a
    /// path in this distro (optionally behind an opening `'`) is rewritten to
    /// its Linux form with the quote kept; anything else goes through the
    /// long-option normalizer.
    #[must_use]
    pub fn translate_token(&self, token: &str, normalizer: &LongOptionNormalizer) -> String {
        let requoted;
        let mut token = token;
        if token.starts_with('"') {
            requoted = standardize_quotes(token);
            token = &requoted;
        }

        let quote = if token.starts_with('\'') { "'" } else { "" };
        match strip_prefix_ignore_case(&token[quote.len()..], &self.distro_prefix) {
            Some(rest) => format!("{quote}/{}", rest.replace('\\', "/")),
            None => normalizer.normalize(token),
        }
    }
}

/// Whether `path` starts with the WSL marker.
#[must_use]
pub fn is_nested_path(path: &str) -> bool {
    strip_prefix_ignore_case(path, EXPLORER_PREFIX).is_some()
}

/// Extract the distro name from a `\\wsl$\<distro>\...` path.
///
/// # Errors
///
/// Same conditions as [`TranslationContext::try_new`].
pub fn extract_identifier(host_path: &str) -> Result<String, TranslationError> {
    let after_marker = strip_prefix_ignore_case(host_path, EXPLORER_PREFIX).ok_or_else(|| {
        TranslationError::NotNestedPath {
            path: host_path.to_string(),
        }
    })?;

    match after_marker.find('\\') {
        Some(end) if after_marker[..end].chars().count() >= 2 => {
            Ok(after_marker[..end].to_string())
        }
        _ => Err(TranslationError::MissingIdentifier {
            path: host_path.to_string(),
        }),
    }
}

/// Strip `prefix` from `s`, comparing characters case-insensitively.
pub(crate) fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = s.chars();
    for expected in prefix.chars() {
        let actual = rest.next()?;
        if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(rest.as_str())
}
