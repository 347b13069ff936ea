//! Applying `#[ini(default = ...)]` literals before parsing.

use tracing::trace;

use crate::coerce::set_value;
use crate::error::{ErrorKind, ParseError, SchemaError};
use crate::record::{Section, field_at};
use crate::registry::Registry;
use crate::value::FieldMut;

/// Write every default literal reachable from `record`.
///
/// Nested records held by value are always visited. An absent optional
/// record is populated only when something inside it has a default.
/// Defaults that fail to coerce are pushed to `errors`.
pub(crate) fn apply_defaults(
    registry: &Registry,
    record: &mut dyn Section,
    errors: &mut Vec<ParseError>,
) -> Result<(), SchemaError> {
    let map = registry.field_map(record.record_type())?;

    for entry in map.entries() {
        if let Some(default) = entry.def.default
            && let Some(field) = field_at(record, &entry.path)
        {
            trace!(record = map.record_name(), key = %entry.key, default, "applying default");
            if let Err(source) = set_value(field, default) {
                errors.push(ParseError::new(ErrorKind::InvalidDefault {
                    record: map.record_name(),
                    field: entry.key.clone(),
                    source,
                }));
            }
        }

        if let Some(field) = field_at(record, &entry.path) {
            descend(registry, field, errors)?;
        }
    }
    Ok(())
}

fn descend(
    registry: &Registry,
    field: FieldMut<'_>,
    errors: &mut Vec<ParseError>,
) -> Result<(), SchemaError> {
    match field {
        FieldMut::Record(inner) => apply_defaults(registry, inner, errors),
        FieldMut::Optional(slot) => {
            if let Some(inner) = slot.present_mut() {
                return descend(registry, inner, errors);
            }
            let Some(nested) = slot.inner_shape().nested_record() else {
                return Ok(());
            };
            if !registry.has_defaults(nested)? {
                return Ok(());
            }
            match slot.ensure_present() {
                Some(inner) => descend(registry, inner, errors),
                None => Ok(()),
            }
        }
        _ => Ok(()),
    }
}
