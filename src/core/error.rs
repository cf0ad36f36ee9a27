use std::fmt;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What went wrong, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The document kind discriminator is not one we convert.
    UnsupportedKind,
    /// The input does not match the expected schema.
    Malformed,
    /// A built document or the converter options were invalid.
    Invalid,
    /// An amount could not be represented in the target scale.
    Arithmetic,
    /// The calculation engine rejected the document.
    Downstream,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnsupportedKind => "unsupported document kind",
            Self::Malformed => "malformed input",
            Self::Invalid => "invalid input",
            Self::Arithmetic => "arithmetic error",
            Self::Downstream => "calculation failed",
        })
    }
}

/// Error raised while converting a source document.
///
/// Carries the source object id and offending field when known, so callers
/// can correlate failures with the platform object.
#[derive(Debug, Error)]
#[error("{kind}: {message}{}", context(.object_id, .field))]
pub struct ConvertError {
    kind: ErrorKind,
    message: String,
    object_id: Option<String>,
    field: Option<String>,
    fields: Vec<FieldError>,
    source: Option<BoxError>,
}

fn context(object_id: &Option<String>, field: &Option<String>) -> String {
    match (object_id, field) {
        (Some(id), Some(field)) => format!(" (object {id}, field {field})"),
        (Some(id), None) => format!(" (object {id})"),
        (None, Some(field)) => format!(" (field {field})"),
        (None, None) => String::new(),
    }
}

impl ConvertError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            object_id: None,
            field: None,
            fields: Vec::new(),
            source: None,
        }
    }

    pub fn unsupported_kind(kind: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedKind,
            format!("cannot convert objects of kind '{kind}'"),
        )
        .field("object")
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, message)
    }

    /// Structural problems with a built document. The first problem names
    /// the offending field; all of them are kept as field errors.
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        let message = match errors.as_slice() {
            [] => "document is invalid".to_string(),
            [only] => only.message.clone(),
            [first, rest @ ..] => format!("{} (and {} more problems)", first.message, rest.len()),
        };
        let field = errors.first().map(|e| e.field.clone());
        let err = errors
            .into_iter()
            .fold(Self::new(ErrorKind::Invalid, message), Self::with_field_error);
        match field {
            Some(field) => err.field(field),
            None => err,
        }
    }

    /// Wrap a failure from the calculation engine without altering it.
    pub fn downstream(err: impl Into<BoxError>) -> Self {
        let err = err.into();
        Self::new(ErrorKind::Downstream, err.to_string()).with_source(err)
    }

    pub fn object(mut self, id: impl Into<String>) -> Self {
        self.object_id = Some(id.into());
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_field_error(mut self, error: FieldError) -> Self {
        self.fields.push(error);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    pub fn offending_field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Structured per-field problems, if any were collected.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.fields
    }

    /// Place the offending field under `prefix`, e.g. `lines[0]`.
    pub(crate) fn nested(mut self, prefix: &str) -> Self {
        self.field = Some(match self.field.take() {
            Some(field) => format!("{prefix}.{field}"),
            None => prefix.to_string(),
        });
        self
    }

    /// Fill in the object id unless one is already set.
    pub(crate) fn or_object(mut self, id: &str) -> Self {
        if self.object_id.is_none() && !id.is_empty() {
            self.object_id = Some(id.to_string());
        }
        self
    }
}

/// A single structural problem with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dot-separated path to the invalid field (e.g. "addresses[0].country_code").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Stable code for programmatic handling.
    pub code: Option<String>,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{}] {}: {}", code, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: Some(code.into()),
        }
    }
}
