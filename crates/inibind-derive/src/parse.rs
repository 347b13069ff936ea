//! Turns the derive input into a [`RecordDef`].

use unsynn::{
    Comma, Cons, DelimitedVec, EndOfStream, Parse, ToTokens, TokenIter, TokenStream, TokenTree,
};

use crate::grammar::{Body, FieldInput, Header, IniArg, IniAttribute};
use crate::literal::{parse_string_literal, value_text};

const NAMED_FIELDS_ONLY: &str = "`Record` can only be derived for structs with named fields";
const NO_GENERICS: &str = "`Record` cannot be derived for generic structs";

/// A struct accepted by the derive.
#[derive(Debug)]
pub(crate) struct RecordDef {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

/// One named field and its `#[ini(...)]` settings.
#[derive(Debug, Default)]
pub(crate) struct FieldDecl {
    /// Identifier as written, including any `r#` prefix.
    pub ident: String,
    pub ty: String,
    pub key: Option<String>,
    pub default: Option<String>,
    pub flatten: bool,
}

impl FieldDecl {
    /// Declared name without the raw identifier prefix.
    pub fn name(&self) -> &str {
        self.ident.strip_prefix("r#").unwrap_or(&self.ident)
    }
}

pub(crate) fn parse_record(input: TokenStream) -> Result<RecordDef, String> {
    let mut tokens = TokenIter::new(input);

    let header: Header = Parse::parse(&mut tokens).map_err(|_| NAMED_FIELDS_ONLY.to_string())?;
    if header.kind != "struct" {
        return Err(NAMED_FIELDS_ONLY.to_string());
    }

    let body: Body = Parse::parse(&mut tokens).map_err(|e| e.to_string())?;
    let content = match body {
        Body::Named(group) => group.content,
        Body::Generic(_) | Body::Where(_) => return Err(NO_GENERICS.to_string()),
        Body::Other(_) => return Err(NAMED_FIELDS_ONLY.to_string()),
    };

    let fields: DelimitedVec<FieldInput, Comma> = parse_exact(content.into_iter().collect())
        .map_err(|e| format!("unsupported field syntax: {e}"))?;
    let fields = fields
        .iter()
        .map(|field| field_decl(&field.value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordDef {
        name: header.name.to_string(),
        fields,
    })
}

/// Parse `T` and require that nothing follows it.
fn parse_exact<T: Parse>(tokens: TokenStream) -> unsynn::Result<T> {
    let mut iter = TokenIter::new(tokens);
    let parsed: Cons<T, EndOfStream> = Parse::parse(&mut iter)?;
    Ok(parsed.first)
}

fn field_decl(field: &FieldInput) -> Result<FieldDecl, String> {
    let mut decl = FieldDecl {
        ident: field.name.to_string(),
        ty: field.ty.to_token_stream().to_string(),
        ..FieldDecl::default()
    };
    if decl.ty.is_empty() {
        return Err(format!("field `{}` has no type", decl.name()));
    }

    // Attributes other than `ini` are ignored.
    for attr in &field.attrs {
        let body = &attr.body.content;
        if !matches!(body.first(), Some(TokenTree::Ident(ident)) if ident == "ini") {
            continue;
        }
        let ini: IniAttribute = parse_exact(body.iter().cloned().collect())
            .map_err(|_| "expected `#[ini(...)]`".to_string())?;
        for arg in ini.args.content.iter() {
            apply_arg(&arg.value, &mut decl)?;
        }
    }

    Ok(decl)
}

fn apply_arg(arg: &IniArg, decl: &mut FieldDecl) -> Result<(), String> {
    let name = arg.name.to_string();
    let value: Vec<TokenTree> = arg
        .value
        .as_ref()
        .map(|assign| assign.second.to_token_stream().into_iter().collect())
        .unwrap_or_default();

    match name.as_str() {
        "flatten" => {
            if arg.value.is_some() {
                return Err("`flatten` takes no value".to_string());
            }
            decl.flatten = true;
        }
        "key" => {
            let key = match value.as_slice() {
                [TokenTree::Literal(lit)] => parse_string_literal(lit),
                _ => None,
            };
            decl.key = Some(key.ok_or("`key` expects a string literal")?);
        }
        "default" => {
            decl.default = Some(value_text(&value).ok_or("`default` expects a value")?);
        }
        other => {
            return Err(format!(
                "unknown `ini` attribute `{other}`; expected `key`, `default` or `flatten`"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<RecordDef, String> {
        parse_record(source.parse().expect("valid tokens"))
    }

    #[test]
    fn test_plain_struct() {
        let def = parse(
            r#"
            /// Docs are skipped.
            #[derive(Default)]
            pub struct Config {
                pub name: String,
                pub(crate) ports: Vec<u16>,
                lookup: std::collections::HashMap<String, u32>,
            }
            "#,
        )
        .unwrap();

        assert_eq!(def.name, "Config");
        let names: Vec<_> = def.fields.iter().map(FieldDecl::name).collect();
        assert_eq!(names, ["name", "ports", "lookup"]);
        assert_eq!(def.fields[1].ty.replace(' ', ""), "Vec<u16>");
        assert_eq!(
            def.fields[2].ty.replace(' ', ""),
            "std::collections::HashMap<String,u32>"
        );
    }

    #[test]
    fn test_ini_attributes() {
        let def = parse(
            r#"
            struct Server {
                #[ini(key = "listen_port", default = 8080)]
                port: u16,
                #[serde(rename = "x")]
                #[ini(default = "localhost")]
                host: String,
                #[ini(flatten)]
                common: Common,
            }
            "#,
        )
        .unwrap();

        let port = &def.fields[0];
        assert_eq!(port.key.as_deref(), Some("listen_port"));
        assert_eq!(port.default.as_deref(), Some("8080"));
        assert!(!port.flatten);

        assert_eq!(def.fields[1].default.as_deref(), Some("localhost"));
        assert!(def.fields[2].flatten);
    }

    #[test]
    fn test_raw_identifier() {
        let def = parse("struct Opts { r#type: String }").unwrap();
        assert_eq!(def.fields[0].ident, "r#type");
        assert_eq!(def.fields[0].name(), "type");
    }

    #[test]
    fn test_fn_pointer_type_does_not_split() {
        let def = parse("struct Hooks { on_load: fn(u8, u8) -> u8, other: u8 }").unwrap();
        assert_eq!(def.fields.len(), 2);
    }

    #[test]
    fn test_nested_generics_keep_their_commas() {
        let def = parse(
            "struct Types { a: Vec<Vec<u8>>, b: HashMap<String, Vec<(u8, u8)>>, c: Box<dyn Fn(u8) -> u8>, d: u8 }",
        )
        .unwrap();
        let names: Vec<_> = def.fields.iter().map(FieldDecl::name).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        assert_eq!(def.fields[1].ty.replace(' ', ""), "HashMap<String,Vec<(u8,u8)>>");
        assert_eq!(def.fields[2].ty.replace(' ', ""), "Box<dynFn(u8)->u8>");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse("enum Mode { A, B }").unwrap_err(), NAMED_FIELDS_ONLY);
        assert_eq!(parse("struct Pair(u8, u8);").unwrap_err(), NAMED_FIELDS_ONLY);
        assert_eq!(parse("struct Wrap<T> { inner: T }").unwrap_err(), NO_GENERICS);

        let err = parse(r#"struct S { #[ini(rename = "x")] a: u8 }"#).unwrap_err();
        assert!(err.contains("unknown `ini` attribute `rename`"), "{err}");

        let err = parse("struct S { #[ini(key = 5)] a: u8 }").unwrap_err();
        assert!(err.contains("string literal"), "{err}");

        let err = parse("struct S { #[ini(flatten = true)] a: Inner }").unwrap_err();
        assert_eq!(err, "`flatten` takes no value");

        let err = parse(r#"struct S { #[ini = "x"] a: u8 }"#).unwrap_err();
        assert_eq!(err, "expected `#[ini(...)]`");

        assert_eq!(parse("struct Marker;").unwrap_err(), NAMED_FIELDS_ONLY);
        assert_eq!(parse("struct W where Self: Sized { a: u8 }").unwrap_err(), NO_GENERICS);
    }
}
