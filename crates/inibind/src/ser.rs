//! Writing records back out as dialect text.

use std::sync::Arc;

use tracing::trace;

use crate::error::SerializeError;
use crate::options::SerializeOptions;
use crate::record::{Record, RecordType, Section, field_ref_at};
use crate::registry::Registry;
use crate::value::FieldRef;

/// Serializer with configurable options.
///
/// Plain fields come first, in declaration order, followed by one
/// `[section]` block per nested record. Absent optional records are
/// written as a commented-out template so the output documents every key.
pub struct IniSerializer {
    out: String,
    options: SerializeOptions,
    registry: Arc<Registry>,
}

impl Default for IniSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl IniSerializer {
    pub fn new() -> Self {
        Self::with_options(SerializeOptions::default())
    }

    pub fn with_options(options: SerializeOptions) -> Self {
        Self {
            out: String::new(),
            options,
            registry: Registry::shared(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Append `record` to the output.
    pub fn serialize<R: Record>(&mut self, record: &R) -> Result<(), SerializeError> {
        if self.options.delimiter.is_empty() {
            return Err(SerializeError::InvalidDelimiter);
        }
        self.registry.validate(RecordType::of::<R>())?;
        self.write_record(record, "")
    }

    /// Consume the serializer and return the output.
    pub fn finish(self) -> String {
        self.out
    }

    fn write_record(&mut self, record: &dyn Section, section: &str) -> Result<(), SerializeError> {
        let map = self.registry.field_map(record.record_type())?;

        for entry in map.entries() {
            let Some(field) = field_ref_at(record, &entry.path) else {
                continue;
            };
            if is_section(&field) {
                continue;
            }
            let lines = value_lines(field, &entry.declared)?;
            self.write_entry(&entry.declared, &lines);
        }

        for entry in map.entries() {
            let path = join(section, &entry.declared);
            match field_ref_at(record, &entry.path) {
                Some(FieldRef::Record(inner)) => {
                    self.write_header(&path, "");
                    self.write_record(inner, &path)?;
                }
                Some(FieldRef::Optional(slot)) => {
                    let Some(nested) = slot.inner_shape().nested_record() else {
                        continue;
                    };
                    match slot.present() {
                        Some(FieldRef::Record(inner)) => {
                            self.write_header(&path, "");
                            self.write_record(inner, &path)?;
                        }
                        _ => {
                            trace!(section = %path, "absent section written as comment");
                            self.write_header(&path, "; ");
                            self.write_template(nested, &path)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Commented-out keys of a record that has no instance.
    fn write_template(&mut self, record: RecordType, section: &str) -> Result<(), SerializeError> {
        let map = self.registry.field_map(record)?;

        for entry in map.entries() {
            let shape = (entry.def.shape)();
            if shape.nested_record().is_some() {
                continue;
            }
            if let Some(type_name) = unsupported(shape) {
                return Err(SerializeError::Unsupported {
                    key: entry.declared.clone(),
                    type_name,
                });
            }
            self.out.push_str(&format!(
                "; {} {}\n",
                entry.declared, self.options.delimiter
            ));
        }

        for entry in map.entries() {
            if let Some(nested) = (entry.def.shape)().nested_record() {
                let path = join(section, &entry.declared);
                self.write_header(&path, "; ");
                self.write_template(nested, &path)?;
            }
        }
        Ok(())
    }

    fn write_header(&mut self, path: &str, prefix: &str) {
        self.out.push_str(&format!("\n{prefix}[{path}]\n"));
    }

    fn write_entry(&mut self, key: &str, lines: &[String]) {
        let delimiter = &self.options.delimiter;
        let Some((first, rest)) = lines.split_first() else {
            self.out.push_str(&format!("{key} {delimiter}\n"));
            return;
        };

        if first.is_empty() {
            self.out.push_str(&format!("{key} {delimiter}\n"));
        } else {
            self.out.push_str(&format!("{key} {delimiter} {first}\n"));
        }
        for line in rest {
            self.out.push_str(self.options.indent);
            self.out.push_str(line);
            self.out.push('\n');
        }
    }
}

fn join(section: &str, key: &str) -> String {
    if section.is_empty() {
        key.to_string()
    } else {
        format!("{section}.{key}")
    }
}

fn is_section(field: &FieldRef<'_>) -> bool {
    match field {
        FieldRef::Record(_) => true,
        FieldRef::Optional(slot) => slot.inner_shape().nested_record().is_some(),
        _ => false,
    }
}

fn unsupported(shape: crate::Shape) -> Option<&'static str> {
    match shape {
        crate::Shape::Unsupported { type_name } => Some(type_name),
        crate::Shape::Optional(inner) => unsupported(inner()),
        _ => None,
    }
}

/// Lines of a field's text form. An absent optional has none.
fn value_lines(field: FieldRef<'_>, key: &str) -> Result<Vec<String>, SerializeError> {
    match field {
        FieldRef::Scalar(slot) => {
            let text = slot.encode().ok_or_else(|| SerializeError::Unencodable {
                key: key.to_string(),
                kind: slot.kind(),
            })?;
            Ok(text.split('\n').map(str::to_string).collect())
        }
        FieldRef::Sequence(slot) => slot.encode().ok_or_else(|| SerializeError::Unencodable {
            key: key.to_string(),
            kind: slot.element_kind(),
        }),
        FieldRef::Optional(slot) => match slot.present() {
            Some(inner) => value_lines(inner, key),
            None => Ok(Vec::new()),
        },
        FieldRef::Record(section) => Err(SerializeError::Unsupported {
            key: key.to_string(),
            type_name: section.record_type().name,
        }),
        FieldRef::Unsupported { type_name } => Err(SerializeError::Unsupported {
            key: key.to_string(),
            type_name,
        }),
    }
}
