//! Parsing and serialization options.

use inibind_parse::DEFAULT_DELIMITER;

/// Maximum nesting of `!include` directives.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

/// Options for parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Separator between key and value (default: "=")
    pub delimiter: String,

    /// How deeply includes may nest (default: 10)
    pub max_include_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split assignments at `delimiter` instead of `=`.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set the include nesting limit.
    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

/// Options for serialization.
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Separator written between key and value (default: "=")
    pub delimiter: String,

    /// Prefix of continuation lines (default: "    " - 4 spaces)
    pub indent: &'static str,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            indent: "    ",
        }
    }
}

impl SerializeOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set a custom continuation indent. It must start with a space or tab
    /// for the output to parse back.
    pub fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }
}
