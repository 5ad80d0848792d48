use thiserror::Error;

/// Failures raised by a form host while reading or writing a control.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomError {
    #[error("node {0} is not an element")]
    NotAnElement(usize),

    #[error("node {node} <{tag}> does not support `{property}`")]
    UnsupportedProperty {
        node: usize,
        tag: String,
        property: &'static str,
    },

    #[error("option index {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },

    /// The host refused the write (framework guard, detached node, ...).
    #[error("host rejected write: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unsupported selector syntax `{found}` in `{selector}`")]
    Unsupported { selector: String, found: char },

    #[error("unterminated attribute selector in `{0}`")]
    UnterminatedAttribute(String),
}

/// A regex payload that cannot be used for value synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is {len} chars, limit is {limit}")]
    TooLong { len: usize, limit: usize },

    #[error("nested quantifier at offset {offset}")]
    NestedQuantifier { offset: usize },

    #[error("repeated optional group at offset {offset}")]
    RepeatedOptional { offset: usize },

    #[error("quantified alternation with overlapping branches at offset {offset}")]
    OverlappingAlternation { offset: usize },

    #[error("backreferences are not supported")]
    Backreference,

    #[error("invalid pattern: {0}")]
    Syntax(String),
}

impl PatternError {
    /// True for the catastrophic-backtracking shapes, false for plain syntax problems.
    pub fn is_unsafe(&self) -> bool {
        !matches!(self, PatternError::Syntax(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("regex synthesis produced no matching value for `{0}`")]
    Unsatisfiable(String),

    #[error("unknown generator `{0}`")]
    UnknownGenerator(String),

    #[error("list payload is empty")]
    EmptyList,

    #[error("file generation is disabled")]
    FileDisabled,
}

/// A value that still violates a hard control constraint after clamping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintViolation {
    #[error("value shorter than minlength {min_length}")]
    TooShort { min_length: usize },

    #[error("value does not match pattern `{pattern}`")]
    PatternMismatch { pattern: String },

    #[error("control pattern `{pattern}` is not a valid regex")]
    InvalidPattern { pattern: String },

    #[error("no value in [{min}, {max}] satisfies step {step}")]
    NoStepValue { min: f64, max: f64, step: f64 },

    #[error("written value `{value}` is off step {step}")]
    StepMismatch { value: String, step: f64 },

    #[error("value `{0}` is not numeric")]
    NotNumeric(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read snapshot {path}: {source}")]
    SnapshotRead {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    SnapshotParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        source: serde_json::Error,
    },

    #[error("logging setup failed: {0}")]
    Logging(String),
}
