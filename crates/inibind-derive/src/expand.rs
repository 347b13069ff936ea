//! Code generation for `#[derive(Record)]`.

use std::fmt::Write;

use crate::parse::{FieldDecl, RecordDef};

pub(crate) fn compile_error(message: &str) -> String {
    format!("::core::compile_error!({message:?});")
}

fn option_str(value: Option<&str>) -> String {
    match value {
        Some(text) => format!("::core::option::Option::Some({text:?})"),
        None => "::core::option::Option::None".to_string(),
    }
}

fn field_def(field: &FieldDecl) -> String {
    format!(
        "::inibind::FieldDef {{ name: {name:?}, key: {key}, default: {default}, flatten: {flatten}, shape: <{ty} as ::inibind::Field>::shape }},",
        name = field.name(),
        key = option_str(field.key.as_deref()),
        default = option_str(field.default.as_deref()),
        flatten = field.flatten,
        ty = field.ty,
    )
}

pub(crate) fn expand(record: &RecordDef) -> String {
    let name = &record.name;
    let mut defs = String::new();
    let mut mut_arms = String::new();
    let mut ref_arms = String::new();

    for (index, field) in record.fields.iter().enumerate() {
        let ident = &field.ident;
        defs.push_str(&field_def(field));
        let _ = write!(
            mut_arms,
            "{index}usize => ::core::option::Option::Some(::inibind::Field::as_field_mut(&mut self.{ident})),"
        );
        let _ = write!(
            ref_arms,
            "{index}usize => ::core::option::Option::Some(::inibind::Field::as_field_ref(&self.{ident})),"
        );
    }

    format!(
        r#"
#[automatically_derived]
impl ::inibind::Record for {name} {{
    const NAME: &'static str = {name:?};
    const FIELDS: &'static [::inibind::FieldDef] = &[{defs}];
}}

#[automatically_derived]
impl ::inibind::Section for {name} {{
    fn record_type(&self) -> ::inibind::RecordType {{
        ::inibind::RecordType::of::<Self>()
    }}

    #[allow(clippy::match_single_binding)]
    fn field_mut(&mut self, index: usize) -> ::core::option::Option<::inibind::FieldMut<'_>> {{
        match index {{
            {mut_arms}
            _ => ::core::option::Option::None,
        }}
    }}

    #[allow(clippy::match_single_binding)]
    fn field_ref(&self, index: usize) -> ::core::option::Option<::inibind::FieldRef<'_>> {{
        match index {{
            {ref_arms}
            _ => ::core::option::Option::None,
        }}
    }}
}}

#[automatically_derived]
impl ::inibind::Field for {name} {{
    fn shape() -> ::inibind::Shape {{
        ::inibind::Shape::Record(::inibind::RecordType::of::<Self>)
    }}

    fn as_field_mut(&mut self) -> ::inibind::FieldMut<'_> {{
        ::inibind::FieldMut::Record(self)
    }}

    fn as_field_ref(&self) -> ::inibind::FieldRef<'_> {{
        ::inibind::FieldRef::Record(self)
    }}

    fn decode(_raw: &str) -> ::core::result::Result<Self, ::inibind::CoerceError> {{
        ::core::result::Result::Err(::inibind::CoerceError::unsupported({name:?}))
    }}

    fn vacant() -> ::core::option::Option<Self> {{
        ::core::option::Option::Some(<Self as ::core::default::Default>::default())
    }}
}}
"#
    )
}
