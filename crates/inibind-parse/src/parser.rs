//! Pull-based event parser.

use std::borrow::Cow;

use tracing::trace;

use crate::{Event, Line, LineKind, ScanErrorKind, Scanner, Span, is_valid_key, is_valid_section};

/// An assignment waiting for possible continuation lines.
#[derive(Debug)]
struct Pending<'src> {
    line: u32,
    span: Span,
    key: String,
    value: Cow<'src, str>,
    multiline: bool,
}

impl<'src> Pending<'src> {
    fn extend(&mut self, text: &str, span: Span) {
        let value = self.value.to_mut();
        value.push('\n');
        value.push_str(text);
        self.span = self.span.cover(span);
        self.multiline = true;
    }

    fn into_event(self) -> Event<'src> {
        trace!("commit {} at line {}: {:?}", self.key, self.line, self.value);
        Event::Assign {
            line: self.line,
            span: self.span,
            key: self.key,
            value: self.value,
            multiline: self.multiline,
        }
    }
}

/// Pull-based parser turning classified lines into [`Event`]s.
///
/// An assignment is only emitted once the next non-continuation line (or
/// the end of input) is reached, so a multi-line value arrives as one
/// event, ahead of whatever the terminating line produces.
///
/// A rejected section header is reported as an error and the assignments
/// after it are still emitted; the consumer decides what to do with them.
pub struct Parser<'src> {
    scanner: Scanner<'src>,
    pending: Option<Pending<'src>>,
    /// Event produced by the line that flushed `pending`.
    stashed: Option<Event<'src>>,
    /// Swallow continuation lines of a rejected assignment.
    absorbing: bool,
}

impl<'src> Parser<'src> {
    /// Create a parser using the default `=` delimiter.
    pub fn new(source: &'src [u8]) -> Self {
        Self::from_scanner(Scanner::new(source))
    }

    /// Create a parser splitting assignments on `delimiter`.
    pub fn with_delimiter(source: &'src [u8], delimiter: &'src str) -> Self {
        Self::from_scanner(Scanner::with_delimiter(source, delimiter))
    }

    fn from_scanner(scanner: Scanner<'src>) -> Self {
        Self {
            scanner,
            pending: None,
            stashed: None,
            absorbing: false,
        }
    }

    /// Get the next event from the parser.
    pub fn next_event(&mut self) -> Option<Event<'src>> {
        if let Some(event) = self.stashed.take() {
            return Some(event);
        }

        loop {
            let Some(line) = self.scanner.next() else {
                return self.pending.take().map(Pending::into_event);
            };

            match line.kind {
                LineKind::Continuation(text) => {
                    if let Some(pending) = &mut self.pending {
                        pending.extend(text, line.span);
                    } else if !self.absorbing {
                        return Some(error(&line, ScanErrorKind::OrphanContinuation));
                    }
                    continue;
                }
                // A garbled line may have been meant as a continuation, so it
                // leaves the pending value alone.
                LineKind::InvalidEncoding => {
                    return Some(error(&line, ScanErrorKind::InvalidEncoding));
                }
                _ => {}
            }

            let flushed = self.pending.take();
            self.absorbing = false;
            let event = self.line_event(line);

            if let Some(flushed) = flushed {
                self.stashed = event;
                return Some(flushed.into_event());
            }
            if event.is_some() {
                return event;
            }
        }
    }

    /// Parse all events into a vector.
    pub fn parse_to_vec(mut self) -> Vec<Event<'src>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event() {
            events.push(event);
        }
        events
    }

    /// Handle a non-continuation line. Assignments become pending instead
    /// of producing an event.
    fn line_event(&mut self, line: Line<'src>) -> Option<Event<'src>> {
        match line.kind {
            LineKind::Blank | LineKind::Comment(_) => None,
            LineKind::Section(path) => {
                if !is_valid_section(path) {
                    return Some(error(
                        &line,
                        ScanErrorKind::InvalidSection(path.to_string()),
                    ));
                }
                Some(Event::Section {
                    line: line.number,
                    span: line.span,
                    path: path.to_lowercase(),
                })
            }
            LineKind::Include(path) if path.is_empty() => {
                Some(error(&line, ScanErrorKind::MissingIncludePath))
            }
            LineKind::Include(path) => Some(Event::Include {
                line: line.number,
                span: line.span,
                path,
            }),
            LineKind::Assignment { key, value } => {
                if !is_valid_key(key) {
                    self.absorbing = true;
                    return Some(error(&line, ScanErrorKind::InvalidKey(key.to_string())));
                }
                self.pending = Some(Pending {
                    line: line.number,
                    span: line.span,
                    key: key.to_lowercase(),
                    value: Cow::Borrowed(value),
                    multiline: false,
                });
                None
            }
            LineKind::Malformed(text) => Some(error(
                &line,
                ScanErrorKind::MalformedLine(text.to_string()),
            )),
            LineKind::Continuation(_) | LineKind::InvalidEncoding => None,
        }
    }
}

impl<'src> Iterator for Parser<'src> {
    type Item = Event<'src>;

    fn next(&mut self) -> Option<Event<'src>> {
        self.next_event()
    }
}

fn error<'src>(line: &Line<'_>, kind: ScanErrorKind) -> Event<'src> {
    Event::Error {
        line: line.number,
        span: line.span,
        kind,
    }
}
