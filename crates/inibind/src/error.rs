//! Error types for parsing and serialization.

use std::fmt;
use std::io;
use std::ops::Range;
use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use inibind_parse::{ScanErrorKind, Span};

/// Failure reported by a [`TextDecode`](crate::TextDecode) implementation.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid value for field type {kind}: {value}")]
    Invalid { kind: &'static str, value: String },

    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl DecodeError {
    pub fn invalid(kind: &'static str, value: &str) -> Self {
        DecodeError::Invalid {
            kind,
            value: value.to_string(),
        }
    }

    /// Wrap any error or message; it is shown to the user unchanged.
    pub fn custom(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        DecodeError::Custom(error.into())
    }
}

/// Failure converting raw text into a field.
#[derive(Debug, thiserror::Error)]
pub enum CoerceError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unsupported field type: {type_name}")]
    Unsupported { type_name: &'static str },
}

impl CoerceError {
    pub fn unsupported(type_name: &'static str) -> Self {
        CoerceError::Unsupported { type_name }
    }
}

/// A record type whose declaration cannot be bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate key '{key}' in record {record}")]
    DuplicateKey { record: &'static str, key: String },

    #[error("flattened field '{field}' in record {record} cannot have an explicit key")]
    TaggedFlatten {
        record: &'static str,
        field: &'static str,
    },

    #[error("flattened field '{field}' in record {record} is not a record")]
    FlattenNotRecord {
        record: &'static str,
        field: &'static str,
    },
}

/// What went wrong, without location.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("delimiter must not be empty")]
    InvalidDelimiter,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Scan(#[from] ScanErrorKind),

    #[error("no matching field found for key '{key}'")]
    UnknownKey { key: String },

    #[error("no matching field found for section '{section}'")]
    UnknownSection { section: String },

    #[error("field for section '{section}' is not a section")]
    NotASection { section: String },

    #[error(transparent)]
    Coerce(#[from] CoerceError),

    #[error("invalid default for field '{field}' of {record}: {source}")]
    InvalidDefault {
        record: &'static str,
        field: String,
        source: CoerceError,
    },

    #[error("failed to open '{}': {source}", .path.display())]
    IncludeOpen { path: PathBuf, source: io::Error },

    #[error("circular include detected: {}", .path.display())]
    CircularInclude { path: PathBuf },

    #[error("include depth exceeds {max} at {}", .path.display())]
    IncludeDepth { path: PathBuf, max: usize },

    #[error("cannot resolve relative include '{}' without a base directory", .path.display())]
    IncludeWithoutBase { path: PathBuf },
}

impl ErrorKind {
    /// Fatal errors abort a parse before the record is touched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::InvalidDelimiter | ErrorKind::Schema(_))
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            ErrorKind::Scan(ScanErrorKind::MalformedLine(_)) => {
                Some("expected `key = value`, a `[section]` header or a comment")
            }
            ErrorKind::Scan(ScanErrorKind::InvalidKey(_) | ScanErrorKind::InvalidSection(_)) => {
                Some("names may only contain letters, digits and '_'")
            }
            ErrorKind::Scan(ScanErrorKind::OrphanContinuation) => {
                Some("indented lines continue the value of the key above them")
            }
            ErrorKind::IncludeWithoutBase { .. } => {
                Some("use an absolute path or parse from a file")
            }
            _ => None,
        }
    }
}

/// A single error with its location.
#[derive(Debug)]
pub struct ParseError {
    pub kind: ErrorKind,
    /// 1-based line number in the file that produced the error.
    pub line: Option<u32>,
    pub span: Option<Span>,
    /// The included file the error came from, if not the root input.
    pub origin: Option<PathBuf>,
}

impl ParseError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            line: None,
            span: None,
            origin: None,
        }
    }

    pub fn at(kind: ErrorKind, line: u32, span: Span) -> Self {
        Self {
            kind,
            line: Some(line),
            span: Some(span),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Option<PathBuf>) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Render this error with ariadne.
    ///
    /// `source` must be the text of the file the error came from.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the error report to a writer.
    pub fn write_report<W: io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, Range<usize>)> {
        let range = self.span.map(Range::<usize>::from).unwrap_or(0..0);
        let mut report =
            Report::build(ReportKind::Error, (filename, range.clone())).with_message(&self.kind);

        if self.span.is_some() {
            report = report.with_label(
                Label::new((filename, range))
                    .with_message(label(&self.kind))
                    .with_color(Color::Red),
            );
        }
        if let Some(help) = self.kind.help() {
            report = report.with_help(help);
        }
        report
    }
}

fn label(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Scan(ScanErrorKind::InvalidKey(_)) => "invalid key",
        ErrorKind::Scan(ScanErrorKind::InvalidSection(_)) => "invalid section",
        ErrorKind::Scan(ScanErrorKind::InvalidEncoding) => "not UTF-8",
        ErrorKind::Scan(_) => "cannot parse this line",
        ErrorKind::UnknownKey { .. } => "unknown key",
        ErrorKind::UnknownSection { .. } | ErrorKind::NotASection { .. } => "in this section",
        ErrorKind::Coerce(_) => "value assigned here",
        ErrorKind::IncludeOpen { .. }
        | ErrorKind::CircularInclude { .. }
        | ErrorKind::IncludeDepth { .. }
        | ErrorKind::IncludeWithoutBase { .. } => "included here",
        _ => "here",
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{}: ", origin.display())?;
        }
        if let Some(line) = self.line {
            write!(f, "error at line {line}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {}

/// Every error from one parse, in the order they were found. Never empty.
#[derive(Debug)]
pub struct ParseErrors(Vec<ParseError>);

impl ParseErrors {
    pub(crate) fn new(errors: Vec<ParseError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub(crate) fn fatal(error: ParseError) -> Self {
        Self(vec![error])
    }

    pub fn first(&self) -> &ParseError {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ParseError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.0
    }

    /// True if this is a single fatal error.
    pub fn is_fatal(&self) -> bool {
        matches!(self.0.as_slice(), [error] if error.is_fatal())
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Failure writing a record.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("delimiter must not be empty")]
    InvalidDelimiter,

    #[error("unsupported field type for '{key}': {type_name}")]
    Unsupported { key: String, type_name: &'static str },

    #[error("field '{key}' of type {kind} has no text encoding")]
    Unencodable { key: String, kind: &'static str },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(error: &ParseError, source: &str) -> String {
        let rendered = error.render("app.ini", source);
        String::from_utf8(strip_ansi_escapes::strip(rendered.as_bytes())).unwrap()
    }

    #[test]
    fn test_display_with_line_and_origin() {
        let error = ParseError::at(
            ErrorKind::UnknownKey { key: "bogus".into() },
            3,
            Span::new(10, 19),
        );
        assert_eq!(
            error.to_string(),
            "error at line 3: no matching field found for key 'bogus'"
        );

        let error = error.with_origin(Some(PathBuf::from("extra.ini")));
        assert_eq!(
            error.to_string(),
            "extra.ini: error at line 3: no matching field found for key 'bogus'"
        );
    }

    #[test]
    fn test_coerce_message_names_kind_and_value() {
        let error = ParseError::at(
            CoerceError::from(DecodeError::invalid("u16", "abc")).into(),
            2,
            Span::new(0, 10),
        );
        assert_eq!(
            error.to_string(),
            "error at line 2: invalid value for field type u16: abc"
        );
    }

    #[test]
    fn test_custom_decode_error_is_verbatim() {
        let error = CoerceError::from(DecodeError::custom("level must be low or high"));
        assert_eq!(error.to_string(), "level must be low or high");
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(ErrorKind::InvalidDelimiter.is_fatal());
        assert!(
            ErrorKind::Schema(SchemaError::DuplicateKey {
                record: "Config",
                key: "name".into(),
            })
            .is_fatal()
        );
        assert!(!ErrorKind::UnknownKey { key: "x".into() }.is_fatal());
    }

    #[test]
    fn test_only_a_lone_fatal_error_is_fatal() {
        let fatal = || ParseError::new(ErrorKind::InvalidDelimiter);
        let unknown = || ParseError::new(ErrorKind::UnknownKey { key: "x".into() });

        assert!(ParseErrors::fatal(fatal()).is_fatal());
        assert!(!ParseErrors::fatal(unknown()).is_fatal());

        let mixed = ParseErrors::new(vec![fatal(), unknown()]).expect("non-empty");
        assert!(!mixed.is_fatal());
    }

    #[test]
    fn test_render_points_at_line() {
        let source = "name = demo\nport = abc\n";
        let error = ParseError::at(
            CoerceError::from(DecodeError::invalid("u16", "abc")).into(),
            2,
            Span::new(12, 22),
        );
        let rendered = render(&error, source);
        assert!(rendered.contains("invalid value for field type u16: abc"), "{rendered}");
        assert!(rendered.contains("port = abc"), "{rendered}");
        assert!(rendered.contains("value assigned here"), "{rendered}");
    }

    #[test]
    fn test_render_help() {
        let source = "just some words\n";
        let error = ParseError::at(
            ScanErrorKind::MalformedLine("just some words".into()).into(),
            1,
            Span::new(0, 15),
        );
        let rendered = render(&error, source);
        assert!(rendered.contains("invalid line format"), "{rendered}");
        assert!(rendered.contains("expected `key = value`"), "{rendered}");
    }
}
