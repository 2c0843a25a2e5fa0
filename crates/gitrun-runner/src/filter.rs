//! Argument filters
//!
//! A filter turns the raw argument string a caller asked for into the string
//! actually handed to the launched program. Native git runs use the identity
//! filter; WSL runs use [`WslArgumentFilter`], which prepends the `wsl.exe`
//! preamble and rewrites paths and option values for the distro shell.

use crate::error::TranslationError;
use crate::quoting::LongOptionNormalizer;
use crate::translate::TranslationContext;

/// Default tool invoked inside the distro.
pub const DEFAULT_WSL_TOOL: &str = "git";

/// Flag whose value token is passed through untranslated.
const DIRECTORY_FLAG: &str = "-C";

/// Rewrites a raw argument string before launch.
pub trait ArgumentFilter: Send + Sync {
    /// Produce the effective argument string. `None` means no arguments.
    fn filter(&self, arguments: Option<&str>) -> String;
}

impl<F> ArgumentFilter for F
where
    F: Fn(Option<&str>) -> String + Send + Sync,
{
    fn filter(&self, arguments: Option<&str>) -> String {
        self(arguments)
    }
}

/// Passes arguments through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl ArgumentFilter for IdentityFilter {
    fn filter(&self, arguments: Option<&str>) -> String {
        arguments.unwrap_or_default().to_string()
    }
}

/// Join argv elements into a raw argument line for [`WslArgumentFilter`].
///
/// Elements with whitespace or double quotes are wrapped in double quotes,
/// inner double quotes escaped with a backslash; empty elements become `""`.
/// The filter tokenises on spaces, so this only keeps simple values intact.
#[must_use]
pub fn join_wsl_arguments<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| {
            let arg: &str = arg.as_ref();
            if arg.is_empty() {
                "\"\"".to_string()
            } else if arg.contains(char::is_whitespace) || arg.contains('"') {
                format!("\"{}\"", arg.replace('"', "\\\""))
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filter for git running inside a WSL distro.
///
/// Output shape: `-d <distro> -- <tool> -C '<linux-working-dir>' <tokens...>`
///
/// Tokens are split on single spaces with no quote awareness. Each token is
/// translated on its own (see [`TranslationContext::translate_token`]), except
/// the token right after a `-C`, which is emitted verbatim. Order is kept.
#[derive(Debug, Clone)]
pub struct WslArgumentFilter {
    context: TranslationContext,
    tool: String,
    normalizer: LongOptionNormalizer,
}

impl WslArgumentFilter {
    #[must_use]
    pub fn new(context: TranslationContext) -> Self {
        Self {
            context,
            tool: DEFAULT_WSL_TOOL.to_string(),
            normalizer: LongOptionNormalizer::new(),
        }
    }

    /// Build directly from a host working directory.
    pub fn for_working_dir(host_working_dir: &str) -> Result<Self, TranslationError> {
        TranslationContext::try_new(host_working_dir).map(Self::new)
    }

    /// Use a different program inside the distro (default `git`).
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    #[must_use]
    pub fn context(&self) -> &TranslationContext {
        &self.context
    }

    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    fn preamble(&self) -> [String; 6] {
        [
            "-d".to_string(),
            self.context.distro().to_string(),
            "--".to_string(),
            self.tool.clone(),
            DIRECTORY_FLAG.to_string(),
            format!("'{}'", self.context.working_dir()),
        ]
    }
}

impl ArgumentFilter for WslArgumentFilter {
    fn filter(&self, arguments: Option<&str>) -> String {
        let mut tokens: Vec<String> = self.preamble().into();

        let mut verbatim_next = false;
        for token in arguments.unwrap_or_default().split(' ') {
            if token.is_empty() {
                continue;
            }

            if verbatim_next {
                verbatim_next = false;
                tokens.push(token.to_string());
                continue;
            }

            verbatim_next = token == DIRECTORY_FLAG;
            tokens.push(self.context.translate_token(token, &self.normalizer));
        }

        tokens.join(" ")
    }
}
