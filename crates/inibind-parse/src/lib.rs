//! Line scanner and event parser for the inibind configuration dialect.
//!
//! The dialect is line oriented:
//!
//! ```text
//! ; comment
//! # comment
//! app_name = demo
//! !include common.ini
//!
//! [server.logging]
//! level = debug
//! targets = stdout
//!     /var/log/app.log
//! ```
//!
//! [`Scanner`] classifies physical lines. [`Parser`] folds continuation
//! lines into the assignment that introduced them, validates names and
//! lower-cases keys and section paths, and yields [`Event`]s.

mod span;
pub use span::Span;

mod line;
pub use line::{Line, LineKind, Scanner};

mod event;
pub use event::{Event, ScanErrorKind};

mod parser;
pub use parser::Parser;

/// Delimiter used between a key and its value unless the caller picks another.
pub const DEFAULT_DELIMITER: &str = "=";

/// Whether `key` is a valid dialect key: non-empty, letters, digits and `_`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Whether `section` is a valid dotted section path.
///
/// Every `.`-separated segment must itself be a valid key.
pub fn is_valid_section(section: &str) -> bool {
    !section.is_empty() && section.split('.').all(is_valid_key)
}
