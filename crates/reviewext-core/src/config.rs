//! Settings
//!
//! Loaded from `reviewext.toml` next to the document being processed.
//! Every section is optional.
//!
//! ```toml
//! [listing]
//! wrap_width = 72
//! wrap_policy = "strict"
//!
//! [latex]
//! prewrap_boolean = true
//!
//! [lint]
//! deprecated_list = "error"
//! ```

use std::path::{Path, PathBuf};

use reviewext_ast::{DEFAULT_FOLD_MARK, DEFAULT_PRINT_INDENT, DEFAULT_WRAP_WIDTH};
use serde::{Deserialize, Serialize};

use crate::diagnostics::Severity;
use crate::error::ConfigError;
use crate::wrap::WrapPolicy;

/// Name of the settings file looked up next to an input document
pub const SETTINGS_FILE: &str = "reviewext.toml";

/// Default fold mark for pre-wrapped print listings
pub const LATEX_FOLD_MARK: &str = "\\";

/// Rule severity levels for lint rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    #[default]
    Warning,
    Info,
    /// Rule is disabled
    Ignore,
}

impl RuleSeverity {
    /// Convert to a diagnostic severity, `None` if the rule is disabled
    pub fn to_severity(self) -> Option<Severity> {
        match self {
            RuleSeverity::Error => Some(Severity::Error),
            RuleSeverity::Warning => Some(Severity::Warning),
            RuleSeverity::Info => Some(Severity::Info),
            RuleSeverity::Ignore => None,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != RuleSeverity::Ignore
    }
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub listing: ListingSettings,
    pub latex: LatexSettings,
    pub html: HtmlSettings,
    pub mapfile: MapfileSettings,
    pub lint: LintSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read settings from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Settings for a document: `reviewext.toml` in its directory, or defaults
    pub fn discover(document: &Path) -> Result<Self, ConfigError> {
        match settings_path_for(document) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// The settings file that applies to `document`, if one exists
pub fn settings_path_for(document: &Path) -> Option<PathBuf> {
    let dir = document.parent().unwrap_or_else(|| Path::new("."));
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let candidate = dir.join(SETTINGS_FILE);
    candidate.is_file().then_some(candidate)
}

/// Settings shared by every backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSettings {
    /// Width used when `wrap` is enabled without a number
    pub wrap_width: usize,
    /// Fold mark used when a block does not set `foldmark`
    pub fold_mark: String,
    /// Cut policy for upstream wrapping
    pub wrap_policy: WrapPolicy,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            fold_mark: DEFAULT_FOLD_MARK.to_string(),
            wrap_policy: WrapPolicy::Word,
        }
    }
}

/// Print backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatexSettings {
    /// Decorate listings with `\lstset` blocks; off delegates undecorated
    pub listings: bool,
    /// Default `breakindent` in points
    pub break_indent: i64,
    /// Also pre-wrap boolean `wrap` at `listing.wrap_width`
    pub prewrap_boolean: bool,
    /// Fold mark written into pre-wrapped listing bodies
    pub fold_mark: String,
}

impl Default for LatexSettings {
    fn default() -> Self {
        Self {
            listings: true,
            break_indent: DEFAULT_PRINT_INDENT,
            prewrap_boolean: false,
            fold_mark: LATEX_FOLD_MARK.to_string(),
        }
    }
}

/// Web backend settings
///
/// Browsers fold lines themselves, so there is no continuation indent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlSettings {
    /// Inject the shared stylesheet before the first block
    pub inject_styles: bool,
}

impl Default for HtmlSettings {
    fn default() -> Self {
        Self {
            inject_styles: true,
        }
    }
}

/// External file inclusion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapfileSettings {
    /// Largest file that may be included, in bytes
    pub max_file_size: u64,
    /// Extensions (with the leading dot) that may be included
    pub allowed_extensions: Vec<String>,
}

impl Default for MapfileSettings {
    fn default() -> Self {
        Self {
            max_file_size: 200 * 1024,
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_allowed_extensions() -> Vec<String> {
    [
        ".rb", ".py", ".c", ".cpp", ".cc", ".cxx", ".h", ".hpp", ".java", ".js", ".ts", ".jsx",
        ".tsx", ".cs", ".go", ".rs", ".swift", ".kt", ".scala", ".php", ".pl", ".sh", ".bash",
        ".zsh", ".fish", ".ps1", ".bat", ".sql", ".html", ".css", ".scss", ".sass", ".less",
        ".xml", ".json", ".yaml", ".yml", ".toml", ".ini", ".md", ".txt", ".re", ".tex", ".sty",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Lint rule settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LintSettings {
    /// Severity for deprecated listing directives (LIST001-LIST004)
    pub deprecated_list: RuleSeverity,
}
