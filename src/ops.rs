//! Inspection of a loaded configuration: single flag lookup and full listing.
//!
//! Values are rendered by the same parsers that read them, so every printed
//! value can be passed back on the command line as is.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::catalog::{Catalog, EntryKind, FieldEntry};
use crate::defaults::DefaultsView;
use crate::error::FlagfigError;
use crate::meta::Flags;
use crate::parsers::ParserRegistry;

/// Result of an inspection. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// One flag's value and its description.
    FlagValue {
        flag: String,
        value: String,
        description: String,
    },
    /// Every flag with a value, sorted by name.
    Listing { entries: Vec<(String, String)> },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::FlagValue {
                flag,
                value,
                description,
            } => {
                writeln!(f, "# {description}")?;
                write!(f, "--{flag}={value}")
            }
            ConfigResult::Listing { entries } => {
                for (i, (flag, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "--{flag}={value}")?;
                }
                Ok(())
            }
        }
    }
}

/// The formatted value of every flag `config` holds a value for.
///
/// Flags under an absent optional record, and flags whose type has no parser
/// in `registry`, are left out.
pub fn list_values<C: Flags + Serialize>(
    config: &C,
    registry: &ParserRegistry,
) -> Result<ConfigResult, FlagfigError> {
    let (catalog, values) = inspect(config)?;
    let entries = catalog
        .iter()
        .filter_map(|entry| {
            render(entry, &values, registry)
                .map(|value| value.map(|value| (entry.name.clone(), value)))
        })
        .collect::<Result<_, FlagfigError>>()?;
    Ok(ConfigResult::Listing { entries })
}

/// The formatted value of one flag.
pub fn get_value<C: Flags + Serialize>(
    config: &C,
    flag: &str,
    registry: &ParserRegistry,
) -> Result<ConfigResult, FlagfigError> {
    let flag = flag.to_lowercase();
    let (catalog, values) = inspect(config)?;
    let entry = catalog
        .get(&flag)
        .ok_or_else(|| FlagfigError::UnknownFlag(flag.clone()))?;
    let value = render(entry, &values, registry)
        .transpose()?
        .unwrap_or_default();
    Ok(ConfigResult::FlagValue {
        flag,
        value,
        description: entry.description.to_string(),
    })
}

fn inspect<C: Flags + Serialize>(config: &C) -> Result<(Catalog, DefaultsView), FlagfigError> {
    let tree = serde_json::to_value(config)?;
    let catalog = Catalog::build(&C::META, &tree)?;
    let values = DefaultsView::build(&C::META, &tree);
    Ok((catalog, values))
}

fn render(
    entry: &FieldEntry,
    values: &DefaultsView,
    registry: &ParserRegistry,
) -> Option<Result<String, FlagfigError>> {
    if entry.kind == EntryKind::Activation {
        let present = values.get(&entry.name).is_some_and(|v| !v.is_null());
        return Some(Ok(present.to_string()));
    }
    let value = values.get(&entry.name)?;
    let mut parser = registry.create(&entry.semantic)?;
    Some(
        parser
            .set_value(value.clone())
            .map(|()| parser.format())
            .map_err(|err| FlagfigError::InvalidValue {
                flag: entry.name.clone(),
                value: value_text(value),
                reason: err.to_string(),
            }),
    )
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
