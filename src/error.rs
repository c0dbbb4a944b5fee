use miette::{Diagnostic, NamedSource, SourceSpan};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Whether a [`TruthError`] means the configuration could not be reached at
/// all or that it was reached but could not be understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruthErrorKind {
    Unavailable,
    Malformed,
}

/// The single error type for establishing the token truth of a project.
/// Validation of class names never produces one of these.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum TruthError {
    #[error("No Tailwind configuration found in {}", root.display())]
    #[diagnostic(
        code(truth::config_not_found),
        help("Looked for: {candidates}. Create one of these files at the project root.")
    )]
    ConfigNotFound { root: PathBuf, candidates: String },

    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(truth::read_failure))]
    Read {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Traversal(#[from] TraversalError),
}

impl TruthError {
    pub fn kind(&self) -> TruthErrorKind {
        match self {
            TruthError::ConfigNotFound { .. } | TruthError::Read { .. } => {
                TruthErrorKind::Unavailable
            }
            TruthError::Parser(_) | TruthError::Traversal(_) => TruthErrorKind::Malformed,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Unterminated {what}")]
    #[diagnostic(
        code(parser::unterminated_literal),
        help("The file ended before this {what} was closed.")
    )]
    UnterminatedLiteral {
        #[source_code]
        src: NamedSource<String>,
        #[label("This {what} is never closed")]
        span: SourceSpan,
        what: &'static str,
    },

    #[error("Mismatched closing delimiter")]
    #[diagnostic(
        code(parser::mismatched_delimiter),
        help("Every '{{', '[' and '(' must be closed by its matching delimiter.")
    )]
    MismatchedDelimiter {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected} here")]
        span: SourceSpan,
        expected: String,
    },

    #[error("Unclosed delimiter")]
    #[diagnostic(
        code(parser::unclosed_delimiter),
        help("The file ended while this delimiter was still open.")
    )]
    UnclosedDelimiter {
        #[source_code]
        src: NamedSource<String>,
        #[label("Opened here")]
        span: SourceSpan,
    },

    #[error("Object literals nested too deeply")]
    #[diagnostic(
        code(parser::nesting_too_deep),
        help("Object nesting is limited to {limit} levels.")
    )]
    NestingTooDeep {
        #[source_code]
        src: NamedSource<String>,
        #[label("Nesting limit reached here")]
        span: SourceSpan,
        limit: usize,
    },
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum TraversalError {
    #[error("Token group under '{path}' is nested deeper than {limit} levels")]
    #[diagnostic(
        code(traversal::depth_exceeded),
        help("Flatten the token definitions or raise `max_depth` in the options.")
    )]
    DepthExceeded {
        path: String,
        limit: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("This object exceeds the depth limit")]
        span: SourceSpan,
    },
}
