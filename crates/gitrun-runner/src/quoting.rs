//! Value quoting for arguments forwarded through `wsl.exe`
//!
//! `wsl.exe -- git ...` hands the command line to the distro's shell, so option
//! values are re-quoted with single quotes. Values the caller wrapped in double
//! quotes are unwrapped first; escaped double quotes inside them are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

/// `--<key>=` prefix of a long option; the key is `[a-zA-Z0-9_-]+`.
pub const LONG_ARGUMENT_PATTERN: &str = r"^--(?:[a-zA-Z0-9_-]+)=";

static LONG_ARGUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(LONG_ARGUMENT_PATTERN).expect("LONG_ARGUMENT_PATTERN is a valid regex")
});

/// Re-quotes the value part of `--key=value` arguments.
///
/// The pattern is compiled once per process and shared by every normalizer.
#[derive(Debug, Clone)]
pub struct LongOptionNormalizer {
    pattern: Regex,
}

impl Default for LongOptionNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LongOptionNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pattern: LONG_ARGUMENT.clone(),
        }
    }

    /// Normalize one token.
    ///
    /// Tokens that are not `--key=value` come back unchanged. For long options
    /// the `--key=` part is kept verbatim and only the value is re-quoted:
    ///
    /// ```rust
    /// use gitrun_runner::LongOptionNormalizer;
    ///
    /// let normalizer = LongOptionNormalizer::new();
    /// assert_eq!(
    ///     normalizer.normalize(r#"--message="hello \"world\"""#),
    ///     "--message='hello world'"
    /// );
    /// assert_eq!(normalizer.normalize("--depth=1"), "--depth='1'");
    /// assert_eq!(normalizer.normalize("-v"), "-v");
    /// ```
    #[must_use]
    pub fn normalize(&self, token: &str) -> String {
        match self.pattern.find(token) {
            Some(key) => {
                let value = &token[key.end()..];
                format!("{}{}", key.as_str(), standardize_quotes(value))
            }
            None => token.to_string(),
        }
    }

    /// Whether `token` has the `--key=value` shape.
    #[must_use]
    pub fn is_long_option(&self, token: &str) -> bool {
        self.pattern.is_match(token)
    }
}

/// Wrap a value in single quotes for the distro shell.
///
/// A value fully wrapped in double quotes loses them along with every `\"`
/// inside. Internal single quotes are escaped and stray double quotes removed.
/// A value already in that shape is returned as is.
#[must_use]
pub fn standardize_quotes(value: &str) -> String {
    if is_single_quoted(value) {
        return value.to_string();
    }

    let unwrapped;
    let mut value = value;
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        unwrapped = value[1..value.len() - 1].replace("\\\"", "");
        value = &unwrapped;
    }

    format!("'{}'", value.replace('\'', "\\'").replace('"', ""))
}

/// True for `'...'` where the body has no `"` and every `'` is escaped.
fn is_single_quoted(value: &str) -> bool {
    if value.len() < 2 || !value.starts_with('\'') || !value.ends_with('\'') {
        return false;
    }

    let body = &value[1..value.len() - 1];
    let mut previous = None;
    for c in body.chars() {
        match c {
            '"' => return false,
            '\'' if previous != Some('\\') => return false,
            _ => {}
        }
        previous = Some(c);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_escaped_quotes_and_requotes() {
        let n = LongOptionNormalizer::new();
        assert_eq!(
            n.normalize(r#"--message="hello \"world\"""#),
            "--message='hello world'"
        );
    }

    #[test]
    fn test_normalize_plain_value_gets_single_quotes() {
        let n = LongOptionNormalizer::new();
        assert_eq!(n.normalize("--format=%H"), "--format='%H'");
        assert_eq!(n.normalize("--author=O'Brien"), r"--author='O\'Brien'");
    }

    #[test]
    fn test_normalize_empty_value() {
        let n = LongOptionNormalizer::new();
        assert_eq!(n.normalize("--message="), "--message=''");
    }

    #[test]
    fn test_normalize_leaves_non_long_options_alone() {
        let n = LongOptionNormalizer::new();
        for token in ["status", "-C", "--", "--no-edit", "-m=x", "--bad key=x", "=--a=b"] {
            assert_eq!(n.normalize(token), token);
        }
    }

    #[test]
    fn test_normalize_is_idempotent_on_normalized_values() {
        let n = LongOptionNormalizer::new();
        for token in [
            "--message='hello world'",
            r"--author='O\'Brien'",
            "--message=''",
        ] {
            assert_eq!(n.normalize(token), token);
        }
    }

    #[test]
    fn test_standardize_quotes_single_double_quote_is_not_a_wrapper() {
        assert_eq!(standardize_quotes("\""), "''");
    }

    #[test]
    fn test_standardize_quotes_removes_stray_double_quotes() {
        assert_eq!(standardize_quotes(r#"a"b"#), "'ab'");
    }

    #[test]
    fn test_is_single_quoted_rejects_unescaped_inner_quote() {
        assert!(is_single_quoted("'abc'"));
        assert!(is_single_quoted(r"'a\'b'"));
        assert!(!is_single_quoted("'a'b'"));
        assert!(!is_single_quoted(r#"'a"b'"#));
        assert!(!is_single_quoted("'"));
    }

    #[test]
    fn test_is_long_option() {
        let n = LongOptionNormalizer::default();
        assert!(n.is_long_option("--a_b-c9=1"));
        assert!(!n.is_long_option("--=1"));
    }
}
