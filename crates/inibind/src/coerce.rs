//! Writing raw text into a field.

use crate::error::CoerceError;
use crate::value::FieldMut;

/// Coerce `raw` into `field`.
///
/// An absent optional stays absent when `raw` is empty; otherwise it is
/// populated with a freshly decoded value. A present optional is written
/// through.
pub(crate) fn set_value(field: FieldMut<'_>, raw: &str) -> Result<(), CoerceError> {
    match field {
        FieldMut::Scalar(slot) => slot.assign(raw),
        FieldMut::Sequence(slot) => slot.assign(raw),
        FieldMut::Optional(slot) => {
            if let Some(inner) = slot.present_mut() {
                return set_value(inner, raw);
            }
            if raw.is_empty() {
                return Ok(());
            }
            slot.assign(raw)
        }
        FieldMut::Record(section) => Err(CoerceError::unsupported(section.record_type().name)),
        FieldMut::Unsupported { type_name } => Err(CoerceError::unsupported(type_name)),
    }
}
