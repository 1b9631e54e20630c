use std::fmt;

use serde::Serialize;

/// One segment of the path to an offending field.
///
/// Object keys and array indices are kept apart so hosting layers can
/// render paths the way their clients expect (`user.tags[2]`, `/user/tags/2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A key inside an object
    Key(String),
    /// A position inside an array
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Machine-readable classification of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required field is absent
    Required,
    /// A field is present but has the wrong type
    InvalidType,
    /// An object carries keys the schema does not declare
    UnrecognizedKeys,
    /// A field has the right type but violates a constraint
    InvalidValue,
    /// A schema-specific failure with no standard classification
    Custom,
}

impl IssueCode {
    /// Returns the stable snake_case name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::Required => "required",
            IssueCode::InvalidType => "invalid_type",
            IssueCode::UnrecognizedKeys => "unrecognized_keys",
            IssueCode::InvalidValue => "invalid_value",
            IssueCode::Custom => "custom",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Location of the offending field, outermost segment first
    pub path: Vec<PathSegment>,
    /// What kind of problem was found
    pub code: IssueCode,
    /// Human-readable explanation
    pub message: String,
}

impl ValidationIssue {
    /// Creates a new issue.
    pub fn new(path: Vec<PathSegment>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
        }
    }

    /// Renders the path as dotted segments (`headers.accept`).
    ///
    /// The root path renders as an empty string.
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "{} at '{}': {}", self.code, self.dotted_path(), self.message)
        }
    }
}

/// A schema's rejection of its input.
///
/// Always carries at least one [`ValidationIssue`]. The validator hands this
/// value back exactly as the schema produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    /// Creates a failure holding a single issue.
    pub fn new(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    /// Creates a failure from a list of issues.
    ///
    /// Returns `None` when `issues` is empty: a failure with nothing wrong
    /// is not a failure.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Self { issues })
        }
    }

    /// Appends another issue.
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns the issues in the order the schema reported them.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Consumes the failure, returning its issues.
    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = &self.issues[0];
        match self.issues.len() {
            1 => write!(f, "validation failed: {}", first),
            n => write!(f, "validation failed with {} issues: {}", n, first),
        }
    }
}

impl std::error::Error for ValidationFailure {}
