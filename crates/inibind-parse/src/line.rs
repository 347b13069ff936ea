//! Physical line classification.

use tracing::trace;

use crate::{DEFAULT_DELIMITER, Span};

/// Prefix of an include directive.
const INCLUDE_DIRECTIVE: &str = "!include";

/// What a single physical line contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'src> {
    /// Empty or whitespace-only line.
    Blank,
    /// `;` or `#` comment (text includes the marker).
    Comment(&'src str),
    /// `[path]` header; the trimmed text between the brackets.
    Section(&'src str),
    /// `!include path`; the trimmed path, possibly empty.
    Include(&'src str),
    /// Indented line extending the previous value; trimmed text.
    Continuation(&'src str),
    /// `key <delimiter> value`, both sides trimmed.
    Assignment {
        /// Text before the first delimiter.
        key: &'src str,
        /// Text after the first delimiter.
        value: &'src str,
    },
    /// Neither a header nor a line containing the delimiter.
    Malformed(&'src str),
    /// The line is not valid UTF-8.
    InvalidEncoding,
}

/// A classified physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'src> {
    /// 1-based line number.
    pub number: u32,
    /// Byte range of the line, without its terminator.
    pub span: Span,
    /// Classification.
    pub kind: LineKind<'src>,
}

/// Splits source bytes into lines and classifies each one.
///
/// Accepts `\n` and `\r\n` terminators. A trailing terminator does not
/// produce an extra empty line.
#[derive(Clone)]
pub struct Scanner<'src> {
    source: &'src [u8],
    pos: usize,
    line: u32,
    delimiter: &'src str,
}

impl<'src> Scanner<'src> {
    /// Create a scanner using the default `=` delimiter.
    pub fn new(source: &'src [u8]) -> Self {
        Self::with_delimiter(source, DEFAULT_DELIMITER)
    }

    /// Create a scanner splitting assignments on `delimiter`.
    pub fn with_delimiter(source: &'src [u8], delimiter: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 0,
            delimiter,
        }
    }

    /// Classify one line of text.
    fn classify(&self, raw: &'src str) -> LineKind<'src> {
        if raw.starts_with([' ', '\t']) {
            let text = raw.trim();
            if text.is_empty() {
                return LineKind::Blank;
            }
            return LineKind::Continuation(text);
        }

        if let Some(rest) = raw.strip_prefix(INCLUDE_DIRECTIVE)
            && (rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            return LineKind::Include(rest.trim());
        }

        let line = raw.trim();
        if line.is_empty() {
            return LineKind::Blank;
        }
        if line.starts_with([';', '#']) {
            return LineKind::Comment(line);
        }
        if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            return LineKind::Section(line[1..line.len() - 1].trim());
        }

        match line.split_once(self.delimiter) {
            Some((key, value)) => LineKind::Assignment {
                key: key.trim(),
                value: value.trim(),
            },
            None => LineKind::Malformed(line),
        }
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Line<'src>;

    fn next(&mut self) -> Option<Line<'src>> {
        if self.pos >= self.source.len() {
            return None;
        }

        let start = self.pos;
        let rest = &self.source[start..];
        let (mut end, next) = match rest.iter().position(|&b| b == b'\n') {
            Some(offset) => (start + offset, start + offset + 1),
            None => (self.source.len(), self.source.len()),
        };
        if end > start && self.source[end - 1] == b'\r' {
            end -= 1;
        }
        self.pos = next;
        self.line += 1;

        let span = Span::new(start as u32, end as u32);
        let kind = match std::str::from_utf8(&self.source[start..end]) {
            Ok(text) => self.classify(text),
            Err(_) => LineKind::InvalidEncoding,
        };
        trace!("line {} at {:?}: {:?}", self.line, span, kind);

        Some(Line {
            number: self.line,
            span,
            kind,
        })
    }
}
