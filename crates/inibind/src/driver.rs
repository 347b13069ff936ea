//! The parse driver: events in, fields out.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use inibind_parse::{Event, ScanErrorKind, Span};
use tracing::{debug, trace};

use crate::coerce::set_value;
use crate::defaults::apply_defaults;
use crate::env::{Environment, ProcessEnv, expand};
use crate::error::{ErrorKind, ParseError, ParseErrors};
use crate::include::Context;
use crate::loader::{FsLoader, Loader};
use crate::options::ParseOptions;
use crate::record::{Record, Section};
use crate::registry::Registry;
use crate::resolve::{resolve_key, resolve_section};

/// Configurable parser.
///
/// ```
/// use inibind::{MapEnv, ParseOptions, Parser, Record};
///
/// #[derive(Debug, Default, Record)]
/// struct Config {
///     data_dir: String,
/// }
///
/// let parser = Parser::new()
///     .options(ParseOptions::new().delimiter(":"))
///     .env(MapEnv::new().with("HOME", "/home/app"));
///
/// let mut config = Config::default();
/// parser.parse("data_dir: $HOME/data", &mut config).unwrap();
/// assert_eq!(config.data_dir, "/home/app/data");
/// ```
pub struct Parser {
    options: ParseOptions,
    registry: Arc<Registry>,
    loader: Box<dyn Loader>,
    env: Box<dyn Environment>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Default options, the filesystem, the process environment and the
    /// shared registry.
    pub fn new() -> Self {
        Self {
            options: ParseOptions::default(),
            registry: Registry::shared(),
            loader: Box::new(FsLoader),
            env: Box::new(ProcessEnv),
        }
    }

    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.options.delimiter = delimiter.into();
        self
    }

    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn env(mut self, env: impl Environment + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Parse in-memory input into `record`.
    ///
    /// Relative includes are rejected since there is no directory to
    /// resolve them against.
    pub fn parse<R: Record>(
        &self,
        source: impl AsRef<[u8]>,
        record: &mut R,
    ) -> Result<(), ParseErrors> {
        self.parse_root(source.as_ref(), record, None)
    }

    /// Parse the file at `path` into `record`.
    pub fn parse_file<R: Record>(
        &self,
        path: impl AsRef<Path>,
        record: &mut R,
    ) -> Result<(), ParseErrors> {
        let path = path.as_ref();
        let opened = self
            .loader
            .identify(path)
            .and_then(|file| self.loader.load(&file).map(|bytes| (file, bytes)));

        match opened {
            Ok((file, bytes)) => self.parse_root(&bytes, record, Some(file)),
            Err(source) => Err(ParseErrors::fatal(ParseError::new(ErrorKind::IncludeOpen {
                path: path.to_path_buf(),
                source,
            }))),
        }
    }

    /// Parse into a value built from its `Default`.
    pub fn parse_new<R: Record>(&self, source: impl AsRef<[u8]>) -> Result<R, ParseErrors> {
        let mut record = R::default();
        self.parse(source, &mut record)?;
        Ok(record)
    }

    fn parse_root(
        &self,
        source: &[u8],
        record: &mut dyn Section,
        file: Option<PathBuf>,
    ) -> Result<(), ParseErrors> {
        if self.options.delimiter.is_empty() {
            return Err(ParseErrors::fatal(ParseError::new(
                ErrorKind::InvalidDelimiter,
            )));
        }

        let fatal = |err| ParseErrors::fatal(ParseError::new(ErrorKind::Schema(err)));
        self.registry.validate(record.record_type()).map_err(fatal)?;

        let mut errors = Vec::new();
        apply_defaults(&self.registry, record, &mut errors).map_err(fatal)?;

        let mut visited = HashSet::new();
        let mut ctx = Context::root(file, &mut visited);
        self.run(source, record, &mut ctx, &mut errors)
            .map_err(ParseErrors::fatal)?;

        match ParseErrors::new(errors) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    /// Feed one input through the event parser. Returns early only on a
    /// fatal error; everything else is pushed to `errors`.
    fn run(
        &self,
        source: &[u8],
        record: &mut dyn Section,
        ctx: &mut Context<'_>,
        errors: &mut Vec<ParseError>,
    ) -> Result<(), ParseError> {
        let mut parser = inibind_parse::Parser::with_delimiter(source, &self.options.delimiter);
        let mut section = String::new();
        // Header that failed validation; its assignments are reported, not applied.
        let mut rejected: Option<String> = None;

        while let Some(event) = parser.next_event() {
            let (line, span) = (event.line(), event.span());
            match event {
                Event::Section { path, .. } => {
                    trace!(section = %path, "entering section");
                    section = path;
                    rejected = None;
                }
                Event::Include { path, .. } => {
                    self.include(Path::new(path), line, span, record, ctx, errors)?;
                }
                Event::Assign { key, value, .. } => {
                    if let Some(path) = &rejected {
                        let kind = ErrorKind::UnknownSection {
                            section: path.clone(),
                        };
                        push_error(errors, ctx.error(kind, line, span));
                        continue;
                    }
                    let value = expand(&value, &*self.env);
                    trace!(line, section = %section, key = %key, value = %value, "assign");
                    if let Err(kind) = self.assign(record, &section, &key, &value) {
                        let error = ctx.error(kind, line, span);
                        if error.is_fatal() {
                            return Err(error);
                        }
                        push_error(errors, error);
                    }
                }
                Event::Error { kind, .. } => {
                    if let ScanErrorKind::InvalidSection(path) = &kind {
                        rejected = Some(path.clone());
                    }
                    push_error(errors, ctx.error(kind.into(), line, span));
                }
            }
        }
        Ok(())
    }

    fn assign(
        &self,
        record: &mut dyn Section,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ErrorKind> {
        let target = resolve_section(&self.registry, record, section)?;
        let field = resolve_key(&self.registry, target, key)?;
        set_value(field, value)?;
        Ok(())
    }

    fn include(
        &self,
        target: &Path,
        line: u32,
        span: Span,
        record: &mut dyn Section,
        ctx: &mut Context<'_>,
        errors: &mut Vec<ParseError>,
    ) -> Result<(), ParseError> {
        let resolved = match ctx.resolve(target) {
            Ok(resolved) => resolved,
            Err(kind) => {
                push_error(errors, ctx.error(kind, line, span));
                return Ok(());
            }
        };

        if ctx.depth >= self.options.max_include_depth {
            let kind = ErrorKind::IncludeDepth {
                path: resolved,
                max: self.options.max_include_depth,
            };
            push_error(errors, ctx.error(kind, line, span));
            return Ok(());
        }

        let file = match self.loader.identify(&resolved) {
            Ok(file) => file,
            Err(source) => {
                let kind = ErrorKind::IncludeOpen {
                    path: resolved,
                    source,
                };
                push_error(errors, ctx.error(kind, line, span));
                return Ok(());
            }
        };

        if !ctx.visited.insert(file.clone()) {
            push_error(
                errors,
                ctx.error(ErrorKind::CircularInclude { path: file }, line, span),
            );
            return Ok(());
        }

        let bytes = match self.loader.load(&file) {
            Ok(bytes) => bytes,
            Err(source) => {
                let kind = ErrorKind::IncludeOpen { path: file, source };
                push_error(errors, ctx.error(kind, line, span));
                return Ok(());
            }
        };

        debug!(path = %file.display(), depth = ctx.depth + 1, "entering include");
        let mut child = ctx.child(file);
        let result = self.run(&bytes, record, &mut child, errors);
        debug!(depth = ctx.depth + 1, "leaving include");
        result
    }
}

fn push_error(errors: &mut Vec<ParseError>, error: ParseError) {
    debug!(%error, "collected parse error");
    errors.push(error);
}
