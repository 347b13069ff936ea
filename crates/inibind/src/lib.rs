#![doc = include_str!("../README.md")]
//!
//! # Example
//!
//! ```
//! use inibind::Record;
//!
//! #[derive(Debug, Default, Record)]
//! struct Config {
//!     name: String,
//!     #[ini(default = 8080)]
//!     port: u16,
//!     tags: Vec<String>,
//!     db: Database,
//!     cache: Option<Cache>,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! struct Database {
//!     url: String,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! struct Cache {
//!     size: u32,
//! }
//!
//! let config: Config = inibind::from_str(
//!     "name = demo\n\
//!      tags = a\n    b\n\
//!      [db]\n\
//!      url = postgres://localhost\n",
//! )
//! .unwrap();
//!
//! assert_eq!(config.name, "demo");
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.tags, ["a", "b"]);
//! assert_eq!(config.db.url, "postgres://localhost");
//! assert!(config.cache.is_none());
//! ```

// Lets `#[derive(Record)]` refer to `::inibind` from inside this crate.
extern crate self as inibind;

use std::io;
use std::path::Path;

mod case;
mod coerce;
mod decode;
mod defaults;
mod driver;
mod env;
mod error;
mod include;
mod loader;
mod options;
mod record;
mod registry;
mod resolve;
mod ser;
mod value;

pub use driver::Parser;
pub use env::{Environment, MapEnv, ProcessEnv, expand};
pub use error::{
    CoerceError, DecodeError, ErrorKind, ParseError, ParseErrors, SchemaError, SerializeError,
};
pub use inibind_derive::Record;
pub use inibind_parse::{DEFAULT_DELIMITER, ScanErrorKind, Span};
pub use loader::{FsLoader, Loader, MemoryLoader};
pub use options::{DEFAULT_MAX_INCLUDE_DEPTH, ParseOptions, SerializeOptions};
pub use record::{FieldDef, Record, RecordType, Section, Shape};
pub use registry::{FieldEntry, FieldMap, Registry};
pub use ser::IniSerializer;
pub use value::{Field, FieldMut, FieldRef, OptionalSlot, ScalarSlot, SequenceSlot, TextDecode};

/// Parse `source` into `record`, reading includes from the filesystem and
/// variables from the process environment.
///
/// Every recoverable problem is collected; fields that could be set are
/// set even when errors are returned.
pub fn parse<R: Record>(source: impl AsRef<[u8]>, record: &mut R) -> Result<(), ParseErrors> {
    Parser::new().parse(source, record)
}

/// Like [`parse`], splitting assignments on `delimiter`.
pub fn parse_with_delimiter<R: Record>(
    source: impl AsRef<[u8]>,
    record: &mut R,
    delimiter: &str,
) -> Result<(), ParseErrors> {
    Parser::new().delimiter(delimiter).parse(source, record)
}

/// Parse the file at `path` into `record`. Relative includes resolve
/// against the including file's directory.
pub fn parse_file<R: Record>(path: impl AsRef<Path>, record: &mut R) -> Result<(), ParseErrors> {
    Parser::new().parse_file(path, record)
}

/// Parse `source` into a new `R` built from its `Default`.
pub fn from_str<R: Record>(source: &str) -> Result<R, ParseErrors> {
    Parser::new().parse_new(source)
}

/// Serialize a record to a string.
pub fn to_string<R: Record>(record: &R) -> Result<String, SerializeError> {
    to_string_with_options(record, &SerializeOptions::default())
}

/// Serialize a record to a string with custom options.
pub fn to_string_with_options<R: Record>(
    record: &R,
    options: &SerializeOptions,
) -> Result<String, SerializeError> {
    let mut serializer = IniSerializer::with_options(options.clone());
    serializer.serialize(record)?;
    Ok(serializer.finish())
}

/// Serialize a record into `writer`. Nothing is written if serialization fails.
pub fn to_writer<W: io::Write, R: Record>(mut writer: W, record: &R) -> Result<(), SerializeError> {
    let text = to_string(record)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}
