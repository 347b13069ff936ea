//! Per-file state threaded through nested includes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use inibind_parse::Span;

use crate::error::{ErrorKind, ParseError};

/// Where the input currently being parsed came from.
pub(crate) struct Context<'v> {
    /// File being parsed; `None` for in-memory input.
    pub origin: Option<PathBuf>,
    /// Directory relative includes resolve against.
    pub base_dir: Option<PathBuf>,
    /// 0 for the root input.
    pub depth: usize,
    /// Identities of every file entered so far in this parse.
    pub visited: &'v mut HashSet<PathBuf>,
}

impl<'v> Context<'v> {
    /// Context for the root input. A file-backed root is marked visited.
    pub fn root(file: Option<PathBuf>, visited: &'v mut HashSet<PathBuf>) -> Self {
        if let Some(file) = &file {
            visited.insert(file.clone());
        }
        Self {
            base_dir: file.as_deref().and_then(Path::parent).map(Path::to_path_buf),
            origin: file,
            depth: 0,
            visited,
        }
    }

    /// Context for an included file, one level deeper.
    pub fn child(&mut self, file: PathBuf) -> Context<'_> {
        Context {
            base_dir: file.parent().map(Path::to_path_buf),
            origin: Some(file),
            depth: self.depth + 1,
            visited: &mut *self.visited,
        }
    }

    /// Resolve an include target against the including file.
    pub fn resolve(&self, target: &Path) -> Result<PathBuf, ErrorKind> {
        if target.is_absolute() {
            return Ok(target.to_path_buf());
        }
        match &self.base_dir {
            Some(base) => Ok(base.join(target)),
            None => Err(ErrorKind::IncludeWithoutBase {
                path: target.to_path_buf(),
            }),
        }
    }

    pub fn error(&self, kind: ErrorKind, line: u32, span: Span) -> ParseError {
        ParseError::at(kind, line, span).with_origin(self.origin.clone())
    }
}
