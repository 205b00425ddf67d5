//! Flattened view of a defaults instance, keyed by flag name.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::meta::{FieldKind, Meta, Pointee};

/// Default value for every annotated field the defaults instance holds.
///
/// An optional field maps to its *nil-pointers clone*: the default sub-value
/// with its own optional children cleared. That is what a bare activation
/// flag materializes. Descendants of an optional field are still listed with
/// their full default values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultsView {
    values: BTreeMap<String, Value>,
}

impl DefaultsView {
    pub fn build(meta: &Meta, defaults: &Value) -> Self {
        let mut view = DefaultsView::default();
        view.record(meta, defaults.as_object(), "");
        view
    }

    fn record(&mut self, meta: &Meta, record: Option<&Map<String, Value>>, prefix: &str) {
        for field in meta.fields {
            if let FieldKind::Embedded(inner) = field.kind {
                self.record(inner, record, prefix);
                continue;
            }
            if field.description.is_none() {
                continue;
            }
            let name = field.flag_name(prefix);
            let value = record.and_then(|r| r.get(field.name));

            match field.kind {
                FieldKind::Leaf(_) => {
                    if let Some(value) = value {
                        self.values.insert(name, value.clone());
                    }
                }
                FieldKind::Nested(inner) => {
                    if let Some(value) = value {
                        self.values.insert(name.clone(), value.clone());
                    }
                    self.record(inner, value.and_then(Value::as_object), &name);
                }
                FieldKind::Optional(pointee) => {
                    let Some(value) = value.filter(|v| !v.is_null()) else {
                        continue;
                    };
                    self.values.insert(name.clone(), nil_pointers(pointee, value));
                    if let Pointee::Nested(inner) = pointee {
                        self.record(inner, value.as_object(), &name);
                    }
                }
                FieldKind::Embedded(_) => {}
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Clone `value` with every optional field of the record set absent.
fn nil_pointers(pointee: Pointee, value: &Value) -> Value {
    let mut cloned = value.clone();
    if let (Pointee::Nested(meta), Some(record)) = (pointee, cloned.as_object_mut()) {
        clear_optionals(meta, record);
    }
    cloned
}

fn clear_optionals(meta: &Meta, record: &mut Map<String, Value>) {
    for field in meta.fields {
        match field.kind {
            FieldKind::Embedded(inner) => clear_optionals(inner, record),
            FieldKind::Optional(_) => {
                if let Some(slot) = record.get_mut(field.name) {
                    *slot = Value::Null;
                }
            }
            FieldKind::Leaf(_) | FieldKind::Nested(_) => {}
        }
    }
}
