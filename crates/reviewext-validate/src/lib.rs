//! reviewext-validate - Listing lint engine
//!
//! A pluggable validation engine for Re:VIEW sources. Individual rules
//! implement [`Validator`]; the [`ValidationEngine`] runs every
//! registered rule and collects the diagnostics.
//!
//! # Example
//!
//! ```
//! use reviewext_core::parser;
//! use reviewext_validate::ValidationEngine;
//!
//! let doc = parser::parse("//emlist[Sample][ruby]{\nputs 1\n//}\n").unwrap();
//! let diagnostics = ValidationEngine::with_defaults().validate(&doc);
//! assert_eq!(diagnostics[0].code.as_deref(), Some("LIST001"));
//! ```

pub mod deprecated;

use reviewext_ast::Document;
use reviewext_core::config::LintSettings;
use reviewext_core::diagnostics::Diagnostic;
use tracing::debug;

pub use deprecated::DeprecatedListValidator;

/// Trait for document validators
///
/// Each validator has a unique code prefix for its diagnostics.
pub trait Validator: Send + Sync {
    /// The validator's code prefix, e.g. `LIST`
    fn code(&self) -> &'static str;

    /// Human-readable rule name
    fn name(&self) -> &'static str {
        "unnamed"
    }

    /// Validate the document and return any diagnostics
    fn validate(&self, doc: &Document) -> Vec<Diagnostic>;
}

/// Runs registered validators against documents
pub struct ValidationEngine {
    validators: Vec<Box<dyn Validator>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Create an engine with the default rules at default severity
    pub fn with_defaults() -> Self {
        Self::with_settings(&LintSettings::default())
    }

    /// Create an engine with the default rules, configured by `settings`
    ///
    /// Rules whose severity is `ignore` are not registered.
    pub fn with_settings(settings: &LintSettings) -> Self {
        let mut engine = Self::new();
        if let Some(severity) = settings.deprecated_list.to_severity() {
            engine.add_validator(Box::new(DeprecatedListValidator::new(severity)));
        }
        engine
    }

    pub fn add_validator(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run every registered validator, in registration order
    pub fn validate(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for validator in &self.validators {
            let found = validator.validate(doc);
            debug!(rule = validator.name(), count = found.len(), "validator finished");
            diagnostics.extend(found);
        }

        diagnostics
    }

    pub fn has_errors(&self, doc: &Document) -> bool {
        self.validate(doc).iter().any(|d| d.is_error())
    }

    pub fn has_issues(&self, doc: &Document) -> bool {
        !self.validate(doc).is_empty()
    }
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
