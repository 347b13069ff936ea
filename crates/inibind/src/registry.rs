//! Field maps: which key binds to which field, cached per record type.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::debug;

use crate::case::{default_key, fold_key};
use crate::error::SchemaError;
use crate::record::{FieldDef, RecordType, Shape};

/// A bindable key of a record, possibly reached through flattened records.
#[derive(Debug)]
pub struct FieldEntry {
    /// Effective key, lower-cased.
    pub key: String,
    /// Effective key as declared, used when writing.
    pub declared: String,
    /// Field indices from the record down through flattened records.
    pub path: Vec<usize>,
    pub def: &'static FieldDef,
}

/// Immutable key map for one record type, in declaration order.
#[derive(Debug)]
pub struct FieldMap {
    record: &'static str,
    entries: Vec<FieldEntry>,
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

impl FieldMap {
    fn new(record: &'static str) -> Self {
        Self {
            record,
            entries: Vec::new(),
            exact: HashMap::new(),
            folded: HashMap::new(),
        }
    }

    fn insert(
        &mut self,
        declared: String,
        path: Vec<usize>,
        def: &'static FieldDef,
    ) -> Result<(), SchemaError> {
        let key = declared.to_lowercase();
        if self.exact.contains_key(&key) {
            return Err(SchemaError::DuplicateKey {
                record: self.record,
                key,
            });
        }
        let index = self.entries.len();
        self.exact.insert(key.clone(), index);
        self.folded.entry(fold_key(&key)).or_insert(index);
        self.entries.push(FieldEntry {
            key,
            declared,
            path,
            def,
        });
        Ok(())
    }

    pub fn record_name(&self) -> &'static str {
        self.record
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Exact match on the lower-cased key first, then case-folded.
    pub fn get(&self, key: &str) -> Option<&FieldEntry> {
        let index = match self.exact.get(key) {
            Some(&index) => index,
            None => *self.folded.get(&fold_key(key))?,
        };
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache of field maps keyed by record type.
///
/// Maps are built outside the lock and published insert-if-absent, so
/// concurrent first use of a type settles on one immutable map.
#[derive(Debug, Default)]
pub struct Registry {
    maps: RwLock<HashMap<TypeId, Arc<FieldMap>>>,
}

static SHARED: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by the free functions.
    pub fn shared() -> Arc<Registry> {
        Arc::clone(&SHARED)
    }

    /// Number of record types resolved so far.
    pub fn len(&self) -> usize {
        self.maps.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field_map(&self, record: RecordType) -> Result<Arc<FieldMap>, SchemaError> {
        if let Some(map) = self
            .maps
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&record.id)
        {
            return Ok(Arc::clone(map));
        }

        let built = Arc::new(self.build(record)?);
        debug!(record = record.name, keys = built.len(), "built field map");

        let mut maps = self.maps.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(maps.entry(record.id).or_insert(built)))
    }

    fn build(&self, record: RecordType) -> Result<FieldMap, SchemaError> {
        let mut map = FieldMap::new(record.name);

        for (index, def) in record.fields.iter().enumerate() {
            if !def.flatten {
                map.insert(default_key_for(def), vec![index], def)?;
                continue;
            }

            if def.key.is_some() {
                return Err(SchemaError::TaggedFlatten {
                    record: record.name,
                    field: def.name,
                });
            }
            let Shape::Record(inner) = (def.shape)() else {
                return Err(SchemaError::FlattenNotRecord {
                    record: record.name,
                    field: def.name,
                });
            };

            let inner = self.field_map(inner())?;
            for entry in inner.entries() {
                let mut path = Vec::with_capacity(entry.path.len() + 1);
                path.push(index);
                path.extend_from_slice(&entry.path);
                map.insert(entry.declared.clone(), path, entry.def)?;
            }
        }

        Ok(map)
    }

    /// Resolve `record` and every record type reachable from it, so that
    /// schema errors surface before anything is written.
    pub fn validate(&self, record: RecordType) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        self.validate_from(record, &mut seen)
    }

    fn validate_from(
        &self,
        record: RecordType,
        seen: &mut HashSet<TypeId>,
    ) -> Result<(), SchemaError> {
        if !seen.insert(record.id) {
            return Ok(());
        }
        let map = self.field_map(record)?;
        for entry in map.entries() {
            if let Some(nested) = (entry.def.shape)().nested_record() {
                self.validate_from(nested, seen)?;
            }
        }
        Ok(())
    }

    /// Whether any field of `record`, or of a record nested in it, has a default.
    pub fn has_defaults(&self, record: RecordType) -> Result<bool, SchemaError> {
        let map = self.field_map(record)?;
        for entry in map.entries() {
            if entry.def.default.is_some() {
                return Ok(true);
            }
            if let Some(nested) = (entry.def.shape)().nested_record()
                && self.has_defaults(nested)?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn default_key_for(def: &FieldDef) -> String {
    match def.key {
        Some(key) => key.to_string(),
        None => default_key(def.name),
    }
}
