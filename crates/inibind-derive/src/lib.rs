//! `#[derive(Record)]` for inibind.
//!
//! The derive describes a struct to the binding engine: field names,
//! explicit keys, default literals and which fields are flattened. It
//! generates the `Record`, `Section` and `Field` impls so no runtime
//! reflection is needed.
//!
//! ```rust,ignore
//! #[derive(Debug, Default, inibind::Record)]
//! struct Server {
//!     #[ini(default = "localhost")]
//!     host: String,
//!     #[ini(key = "listen_port", default = 8080)]
//!     port: u16,
//!     #[ini(flatten)]
//!     common: Common,
//!     logging: Option<Logging>,
//! }
//! ```

use proc_macro::TokenStream;

mod expand;
mod grammar;
mod literal;
mod parse;

/// Derive `inibind::Record` (plus `Section` and `Field`) for a struct with named fields.
///
/// Field attributes, all under `#[ini(...)]`:
///
/// - `key = "name"`: dialect key for the field instead of its snake_case name
/// - `default = "literal"`: value coerced into the field before parsing starts
/// - `flatten`: splice the fields of a nested record into this one
#[proc_macro_derive(Record, attributes(ini))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let source = match parse::parse_record(proc_macro2::TokenStream::from(input)) {
        Ok(record) => expand::expand(&record),
        Err(message) => expand::compile_error(&message),
    };

    match source.parse() {
        Ok(tokens) => tokens,
        Err(_) => expand::compile_error("inibind: generated code failed to tokenize")
            .parse()
            .unwrap_or_default(),
    }
}
