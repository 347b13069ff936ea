//! Locating the destination field of an assignment.

use tracing::trace;

use crate::error::ErrorKind;
use crate::record::{Section, field_at};
use crate::registry::Registry;
use crate::value::FieldMut;

/// Walk a dotted, lower-cased section path from `root`.
///
/// Optional records along the way are populated with their default value.
/// The empty path is the root itself.
pub(crate) fn resolve_section<'a>(
    registry: &Registry,
    root: &'a mut dyn Section,
    path: &str,
) -> Result<&'a mut dyn Section, ErrorKind> {
    if path.is_empty() {
        return Ok(root);
    }

    let mut current = root;
    for segment in path.split('.') {
        let map = registry.field_map(current.record_type())?;
        let Some(entry) = map.get(segment) else {
            return Err(ErrorKind::UnknownSection {
                section: path.to_string(),
            });
        };
        let not_a_section = || ErrorKind::NotASection {
            section: path.to_string(),
        };

        current = match field_at(current, &entry.path) {
            Some(FieldMut::Record(inner)) => inner,
            Some(FieldMut::Optional(slot)) => {
                let allocating = !slot.is_present();
                match slot.ensure_present() {
                    Some(FieldMut::Record(inner)) => {
                        if allocating {
                            trace!(section = path, segment, "populated optional section");
                        }
                        inner
                    }
                    _ => return Err(not_a_section()),
                }
            }
            _ => return Err(not_a_section()),
        };
    }
    Ok(current)
}

/// Find the field bound to `key` in `section`.
pub(crate) fn resolve_key<'a>(
    registry: &Registry,
    section: &'a mut dyn Section,
    key: &str,
) -> Result<FieldMut<'a>, ErrorKind> {
    let unknown = || ErrorKind::UnknownKey {
        key: key.to_string(),
    };
    let map = registry.field_map(section.record_type())?;
    let entry = map.get(key).ok_or_else(unknown)?;
    field_at(section, &entry.path).ok_or_else(unknown)
}
