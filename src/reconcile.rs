//! Writes parsed and default values back into a configuration tree.
//!
//! The walk follows the schema over the live serialized target. Plain fields
//! take the parsed value, else the default. Optional fields are the subtle
//! part: each one is either left absent, materialized from the defaults
//! view, or recursed into as it stands, depending on its [`Activation`].
//!
//! Precedence, highest first: parsed value, value already present in an
//! optional record, default.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::defaults::DefaultsView;
use crate::error::FlagfigError;
use crate::meta::{FieldKind, Meta, Pointee};

/// Why an optional field is, or is not, materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Its own flag was given, with this value.
    Explicit(bool),
    /// A flag below it was given, and its own flag was not.
    Descendant,
    /// It already holds a value.
    Existing,
    Inactive,
}

impl Activation {
    pub fn of(name: &str, present: bool, parsed: &BTreeMap<String, Value>) -> Self {
        if present {
            return Activation::Existing;
        }
        if let Some(value) = parsed.get(name) {
            return Activation::Explicit(value.as_bool().unwrap_or(false));
        }
        let prefix = format!("{name}.");
        if parsed.keys().any(|key| key.starts_with(&prefix)) {
            Activation::Descendant
        } else {
            Activation::Inactive
        }
    }

    pub fn is_active(self) -> bool {
        matches!(
            self,
            Activation::Explicit(true) | Activation::Descendant | Activation::Existing
        )
    }
}

/// Whether fields missing from the parsed map fall back to their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    Defaults,
    /// Inside an optional record the caller already filled in.
    Preserve,
}

/// Reconcile `target`, the serialized configuration, in place.
pub fn reconcile(
    meta: &Meta,
    target: &mut Value,
    defaults: &DefaultsView,
    parsed: &BTreeMap<String, Value>,
) -> Result<(), FlagfigError> {
    let root = target
        .as_object_mut()
        .ok_or_else(|| FlagfigError::NotSettable {
            flag: String::new(),
            type_name: meta.name.to_string(),
            reason: "configuration does not serialize to a record".into(),
        })?;
    Reconciler { defaults, parsed }.record(meta, root, "", Fill::Defaults)
}

/// Deserialize a reconciled tree back into the configuration type.
pub fn write_back<C: DeserializeOwned>(tree: Value) -> Result<C, FlagfigError> {
    serde_json::from_value(tree).map_err(|err| FlagfigError::NotSettable {
        flag: String::new(),
        type_name: std::any::type_name::<C>().to_string(),
        reason: err.to_string(),
    })
}

struct Reconciler<'a> {
    defaults: &'a DefaultsView,
    parsed: &'a BTreeMap<String, Value>,
}

impl Reconciler<'_> {
    fn record(
        &self,
        meta: &Meta,
        record: &mut Map<String, Value>,
        prefix: &str,
        fill: Fill,
    ) -> Result<(), FlagfigError> {
        for field in meta.fields {
            if let FieldKind::Embedded(inner) = field.kind {
                self.record(inner, record, prefix, fill)?;
                continue;
            }
            if field.description.is_none() {
                continue;
            }
            let name = field.flag_name(prefix);
            let slot = record
                .get_mut(field.name)
                .ok_or_else(|| FlagfigError::NotSettable {
                    flag: name.clone(),
                    type_name: meta.name.to_string(),
                    reason: format!("field '{}' is not serialized", field.name),
                })?;

            match field.kind {
                FieldKind::Leaf(_) => self.assign(slot, &name, fill),
                FieldKind::Nested(inner) => {
                    // Only a section parser writes the record as a whole.
                    let fill = match self.parsed.get(&name) {
                        Some(value) => {
                            trace!(flag = %name, "assigning parsed section");
                            *slot = value.clone();
                            Fill::Preserve
                        }
                        None => fill,
                    };
                    let child = as_record(slot, &name, inner)?;
                    self.record(inner, child, &name, fill)?;
                }
                FieldKind::Optional(pointee) => self.optional(pointee, slot, &name)?,
                FieldKind::Embedded(_) => {}
            }
        }
        Ok(())
    }

    fn assign(&self, slot: &mut Value, name: &str, fill: Fill) {
        if let Some(value) = self.parsed.get(name) {
            trace!(flag = name, %value, "assigning parsed value");
            *slot = value.clone();
        } else if fill == Fill::Defaults {
            if let Some(value) = self.defaults.get(name) {
                trace!(flag = name, %value, "assigning default value");
                *slot = value.clone();
            }
        }
    }

    fn optional(&self, pointee: Pointee, slot: &mut Value, name: &str) -> Result<(), FlagfigError> {
        let activation = Activation::of(name, !slot.is_null(), self.parsed);
        debug!(flag = name, ?activation, "optional field");
        if !activation.is_active() {
            return Ok(());
        }

        let fill = if activation == Activation::Existing {
            Fill::Preserve
        } else {
            let default = self
                .defaults
                .get(name)
                .ok_or_else(|| FlagfigError::MissingDefaultValue(name.to_string()))?;
            *slot = default.clone();
            Fill::Defaults
        };

        if let Pointee::Nested(inner) = pointee {
            let child = as_record(slot, name, inner)?;
            self.record(inner, child, name, fill)?;
        }
        Ok(())
    }
}

fn as_record<'v>(
    slot: &'v mut Value,
    name: &str,
    meta: &Meta,
) -> Result<&'v mut Map<String, Value>, FlagfigError> {
    slot.as_object_mut().ok_or_else(|| FlagfigError::NotSettable {
        flag: name.to_string(),
        type_name: meta.name.to_string(),
        reason: "expected a record".into(),
    })
}
