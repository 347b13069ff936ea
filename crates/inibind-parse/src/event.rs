//! Events emitted by the dialect parser.

use std::borrow::Cow;

use crate::Span;

/// Events emitted by [`Parser`](crate::Parser).
///
/// Every event carries the 1-based line it starts on and its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'src> {
    /// A valid `[section.path]` header; `path` is lower-cased.
    Section {
        line: u32,
        span: Span,
        path: String,
    },
    /// An `!include` directive with a non-empty path.
    Include {
        line: u32,
        span: Span,
        path: &'src str,
    },
    /// A committed assignment.
    ///
    /// For a multi-line value, `value` holds the trimmed lines joined with
    /// `\n` and `span` covers the key line and all continuation lines.
    Assign {
        line: u32,
        span: Span,
        /// Lower-cased key.
        key: String,
        value: Cow<'src, str>,
        /// Whether continuation lines contributed to `value`.
        multiline: bool,
    },
    /// A line-level problem. Parsing continues after it.
    Error {
        line: u32,
        span: Span,
        kind: ScanErrorKind,
    },
}

impl Event<'_> {
    /// Line the event starts on.
    pub fn line(&self) -> u32 {
        match self {
            Event::Section { line, .. }
            | Event::Include { line, .. }
            | Event::Assign { line, .. }
            | Event::Error { line, .. } => *line,
        }
    }

    /// Byte span of the event.
    pub fn span(&self) -> Span {
        match self {
            Event::Section { span, .. }
            | Event::Include { span, .. }
            | Event::Assign { span, .. }
            | Event::Error { span, .. } => *span,
        }
    }
}

/// Line-level errors detected while scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanErrorKind {
    /// Neither a section header nor a line containing the delimiter.
    #[error("invalid line format: {0}")]
    MalformedLine(String),
    /// Key is empty or contains characters other than letters, digits and `_`.
    #[error("invalid key '{0}'")]
    InvalidKey(String),
    /// Section path is empty or has an invalid segment.
    #[error("invalid section '{0}'")]
    InvalidSection(String),
    /// The line is not valid UTF-8.
    #[error("invalid UTF-8 encoding")]
    InvalidEncoding,
    /// Indented line with no assignment before it.
    #[error("continuation line without a preceding key")]
    OrphanContinuation,
    /// `!include` with nothing after it.
    #[error("include directive without a path")]
    MissingIncludePath,
}
