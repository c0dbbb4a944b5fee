pub mod ast;
pub mod defaults;
pub mod error;
pub mod extractor;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod prefix;
pub mod resolver;
pub mod suggest;
pub mod tokenizer;
pub mod tree;
pub mod truth;
pub mod utils;
pub mod validator;
pub mod api;

pub use api::{analyze_config, analyze_config_with, load_truth, load_truth_with, validate_classes, validate_source, TruthAnalysis};
pub use defaults::DefaultTheme;
pub use error::{TruthError, TruthErrorKind};
pub use options::Options;
pub use truth::{ExtractedTruth, ResolvedTruth};
pub use validator::{Rejection, RejectionReason, ValidationResult, Validator};
