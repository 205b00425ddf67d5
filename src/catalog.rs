//! Discovery of bindable fields.
//!
//! Walks a configuration's [`Meta`] table alongside a serialized instance and
//! produces one [`FieldEntry`] per annotated field, keyed by flag name. The
//! instance is only used to check that each annotated field is actually
//! serialized, since a field serde skips can never be written back. Records
//! the instance does not hold are checked against the defaults instead.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FlagfigError;
use crate::meta::{Field, FieldKind, Flags, Meta, Pointee, SemanticType};

/// Role of a catalog entry during binding and reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A leaf value, bound by the parser for its semantic type.
    Value,
    /// An optional field; its bare flag activates it.
    Activation,
    /// A plain nested record. Only a flag when a parser is registered for
    /// the record's tag.
    Section,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub name: String,
    pub semantic: SemanticType,
    pub short: Option<char>,
    pub description: &'static str,
    pub long: Option<&'static str>,
    pub optional: bool,
    pub kind: EntryKind,
}

/// Flag name to entry, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, FieldEntry>,
}

impl Catalog {
    pub fn build(meta: &Meta, instance: &Value) -> Result<Self, FlagfigError> {
        Self::build_with_defaults(meta, instance, &Value::Null)
    }

    /// Like [`build`](Self::build), also checking optional records absent
    /// from `instance` against the same records in `defaults`.
    pub fn build_with_defaults(
        meta: &Meta,
        instance: &Value,
        defaults: &Value,
    ) -> Result<Self, FlagfigError> {
        let mut catalog = Catalog::default();
        catalog.record(meta, instance.as_object(), defaults.as_object(), "")?;
        debug!(record = meta.name, flags = catalog.len(), "built flag catalog");
        Ok(catalog)
    }

    fn record(
        &mut self,
        meta: &Meta,
        instance: Option<&Map<String, Value>>,
        defaults: Option<&Map<String, Value>>,
        prefix: &str,
    ) -> Result<(), FlagfigError> {
        for field in meta.fields {
            if let FieldKind::Embedded(inner) = field.kind {
                self.record(inner, instance, defaults, prefix)?;
                continue;
            }
            let Some(description) = field.description else {
                continue;
            };
            if let Some(record) = instance.or(defaults) {
                if !record.contains_key(field.name) {
                    return Err(FlagfigError::UnexportedField {
                        field: field.name,
                        record: meta.name,
                    });
                }
            }

            let name = field.flag_name(prefix);
            let (semantic, kind) = entry_role(field);
            self.insert(FieldEntry {
                name: name.clone(),
                semantic,
                short: field.short,
                description,
                long: field.long,
                optional: field.is_optional(),
                kind,
            })?;

            match field.kind {
                FieldKind::Nested(inner) | FieldKind::Optional(Pointee::Nested(inner)) => {
                    let (child, fallback) = (
                        child_record(instance, field.name),
                        child_record(defaults, field.name),
                    );
                    self.record(inner, child, fallback, &name)?;
                }
                FieldKind::Leaf(_)
                | FieldKind::Optional(Pointee::Leaf(_))
                | FieldKind::Embedded(_) => {}
            }
        }
        Ok(())
    }

    fn insert(&mut self, entry: FieldEntry) -> Result<(), FlagfigError> {
        check_name(&entry)?;
        if self.entries.contains_key(&entry.name) {
            return Err(FlagfigError::DuplicateFlagName(entry.name));
        }
        if let Some(short) = entry.short {
            let lowered = short.to_ascii_lowercase();
            if let Some(first) = self
                .entries
                .values()
                .find(|e| e.short.map(|s| s.to_ascii_lowercase()) == Some(lowered))
            {
                return Err(FlagfigError::DuplicateShortFlag {
                    short: lowered,
                    first: first.name.clone(),
                    second: entry.name,
                });
            }
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn child_record<'v>(
    record: Option<&'v Map<String, Value>>,
    name: &str,
) -> Option<&'v Map<String, Value>> {
    record.and_then(|r| r.get(name)).and_then(Value::as_object)
}

/// Reject names and shorts clap cannot register as an argument.
fn check_name(entry: &FieldEntry) -> Result<(), FlagfigError> {
    let invalid = |reason: String| FlagfigError::InvalidFlag {
        flag: entry.name.clone(),
        reason,
    };
    if entry.name.split('.').any(str::is_empty) {
        return Err(invalid("flag name has an empty segment".into()));
    }
    if entry.name.starts_with('-') {
        return Err(invalid("flag name starts with '-'".into()));
    }
    if let Some(c) = entry.name.chars().find(|c| *c == '=' || c.is_whitespace()) {
        return Err(invalid(format!("flag name contains {c:?}")));
    }
    if let Some(short) = entry.short.filter(|c| !c.is_ascii_alphanumeric()) {
        return Err(invalid(format!("short flag {short:?} is not a letter or digit")));
    }
    Ok(())
}

fn entry_role(field: &Field) -> (SemanticType, EntryKind) {
    match field.kind {
        FieldKind::Leaf(semantic) => (semantic, EntryKind::Value),
        FieldKind::Optional(_) => (SemanticType::Bool, EntryKind::Activation),
        FieldKind::Nested(inner) | FieldKind::Embedded(inner) => {
            (SemanticType::Custom(inner.name), EntryKind::Section)
        }
    }
}

/// Sorted flag names a configuration exposes.
pub fn flag_names<C: Flags + Serialize>(config: &C) -> Result<Vec<String>, FlagfigError> {
    let instance = serde_json::to_value(config)?;
    let catalog = Catalog::build(&C::META, &instance)?;
    Ok(catalog.names().map(str::to_string).collect())
}
