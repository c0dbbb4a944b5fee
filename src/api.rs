use crate::error::TruthError;
use crate::extractor::{extract, find_config, read_config};
use crate::options::Options;
use crate::resolver::resolve_with_builtin;
use crate::truth::{ExtractedTruth, ResolvedTruth};
use crate::validator::{ValidationResult, Validator};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The result of analyzing a configuration file.
/// Holds both the tokens as declared and the final token set, and can
/// validate markup against the latter.
#[derive(Debug, Clone, Serialize)]
pub struct TruthAnalysis {
    /// The configuration file that was read, when it came from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    pub extracted: ExtractedTruth,
    pub resolved: ResolvedTruth,
    #[serde(skip)]
    options: Options,
}

impl TruthAnalysis {
    /// Serializes the extracted and resolved tokens into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the extracted and resolved tokens into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }

    /// A validator over the resolved tokens, using the options this analysis
    /// was made with.
    #[must_use]
    pub fn validator(&self) -> Validator<'_> {
        Validator::with_options(&self.resolved, &self.options)
    }

    #[must_use]
    pub fn validate_classes(&self, classes: &str) -> ValidationResult {
        self.validator().validate_classes(classes)
    }

    #[must_use]
    pub fn validate_source(&self, source: &str) -> ValidationResult {
        self.validator().validate_source(source)
    }
}

/// Analyzes configuration source text with the default options.
///
/// # Errors
/// Returns a `TruthError` if the source cannot be parsed or walked.
pub fn analyze_config(source: &str, file_name: &str) -> Result<TruthAnalysis, TruthError> {
    analyze_config_with(source, file_name, &Options::default())
}

/// Analyzes configuration source text.
///
/// # Errors
/// Returns a `TruthError` if the source cannot be parsed or walked.
pub fn analyze_config_with(source: &str, file_name: &str, options: &Options) -> Result<TruthAnalysis, TruthError> {
    let extracted = extract(source, file_name, options)?;
    let resolved = resolve_with_builtin(&extracted);
    Ok(TruthAnalysis {
        config_path: None,
        extracted,
        resolved,
        options: options.clone(),
    })
}

/// Finds, reads and analyzes the configuration of the project at `root`
/// with the default options.
///
/// # Errors
/// Returns a `TruthError` if no configuration exists or it cannot be read,
/// parsed or walked.
pub fn load_truth(root: &Path) -> Result<TruthAnalysis, TruthError> {
    load_truth_with(root, &Options::default())
}

/// Finds, reads and analyzes the configuration of the project at `root`.
///
/// # Errors
/// Returns a `TruthError` if no configuration exists or it cannot be read,
/// parsed or walked.
pub fn load_truth_with(root: &Path, options: &Options) -> Result<TruthAnalysis, TruthError> {
    let path = find_config(root, options)?;
    let source = read_config(&path)?;
    let mut analysis = analyze_config_with(&source, &path.to_string_lossy(), options)?;
    analysis.config_path = Some(path);
    Ok(analysis)
}

/// Validates a class string against `truth` with the default options.
#[must_use]
pub fn validate_classes(classes: &str, truth: &ResolvedTruth) -> ValidationResult {
    Validator::new(truth).validate_classes(classes)
}

/// Validates every class attribute in `source` against `truth` with the
/// default options.
#[must_use]
pub fn validate_source(source: &str, truth: &ResolvedTruth) -> ValidationResult {
    Validator::new(truth).validate_source(source)
}
