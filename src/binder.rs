//! Turns argument tokens into typed values keyed by flag name.
//!
//! Every catalog entry with a parser becomes a clap argument. Clap does the
//! tokenizing; the parsers do the typing. Only flags that actually appear on
//! the command line end up in [`Parsed::values`].

use std::collections::{BTreeMap, BTreeSet};

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, value_parser};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::args;
use crate::catalog::{Catalog, EntryKind, FieldEntry};
use crate::defaults::DefaultsView;
use crate::error::FlagfigError;
use crate::help::{self, HelpInfo};
use crate::parsers::{ParserRegistry, ValueParser};

/// Output of one parse.
#[derive(Debug, Default)]
pub struct Parsed {
    /// Typed values for the flags present on the command line.
    pub values: BTreeMap<String, Value>,
    /// Soft errors: flags left unbound because their type has no parser.
    pub diagnostics: Vec<FlagfigError>,
}

impl Parsed {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

pub struct Binder<'a> {
    catalog: &'a Catalog,
    registry: &'a ParserRegistry,
    help: Option<&'a HelpInfo>,
    defaults: Option<&'a DefaultsView>,
}

impl<'a> Binder<'a> {
    pub fn new(catalog: &'a Catalog, registry: &'a ParserRegistry) -> Self {
        Self {
            catalog,
            registry,
            help: None,
            defaults: None,
        }
    }

    /// Program text for `--help`.
    pub fn help(mut self, help: &'a HelpInfo) -> Self {
        self.help = Some(help);
        self
    }

    /// Defaults shown next to each flag in `--help`.
    pub fn defaults(mut self, defaults: &'a DefaultsView) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn parse<I, S>(&self, tokens: I) -> Result<Parsed, FlagfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Parsed::default();
        let mut parsers: Vec<(&FieldEntry, Box<dyn ValueParser>)> = Vec::new();

        for entry in self.catalog.iter() {
            match self.registry.create(&entry.semantic) {
                Some(parser) => parsers.push((entry, parser)),
                None if entry.kind == EntryKind::Section => {
                    trace!(flag = %entry.name, "section has no parser, not a flag");
                }
                None => {
                    warn!(flag = %entry.name, semantic = %entry.semantic, "no parser for flag type");
                    parsed.diagnostics.push(FlagfigError::MissingParser {
                        flag: entry.name.clone(),
                        semantic: entry.semantic,
                    });
                }
            }
        }

        let default_info;
        let info = match self.help {
            Some(info) => info,
            None => {
                default_info = HelpInfo::default();
                &default_info
            }
        };
        let mut command = help::base_command(info);
        for (entry, parser) in &parsers {
            command = command.arg(self.arg(entry, parser.as_ref()));
        }
        if let Some(arg) = help::help_arg(self.catalog) {
            command = command.arg(arg);
        }
        debug!(flags = parsers.len(), "registered flags");

        let takes_value: BTreeSet<String> = parsers
            .iter()
            .filter(|(_, parser)| !parser.is_bool_flag())
            .flat_map(|(entry, _)| {
                let short = entry.short.map(|c| format!("-{}", c.to_ascii_lowercase()));
                std::iter::once(format!("--{}", entry.name)).chain(short)
            })
            .collect();
        let tokens = args::normalize(tokens, &takes_value);
        let matches = command.try_get_matches_from(tokens).map_err(|err| {
            if err.kind() == ErrorKind::DisplayHelp {
                FlagfigError::HelpRequested(err.render().to_string())
            } else {
                FlagfigError::ArgumentParse(err)
            }
        })?;

        for (entry, mut parser) in parsers {
            let name = entry.name.as_str();
            if matches.value_source(name) != Some(ValueSource::CommandLine) {
                continue;
            }
            let texts = matches
                .try_get_many::<String>(name)
                .map_err(|err| FlagfigError::InvalidValue {
                    flag: name.to_string(),
                    value: String::new(),
                    reason: err.to_string(),
                })?
                .into_iter()
                .flatten();
            let mut last = String::new();
            for text in texts {
                parser
                    .parse_text(text)
                    .map_err(|err| FlagfigError::InvalidValue {
                        flag: name.to_string(),
                        value: text.clone(),
                        reason: err.to_string(),
                    })?;
                last.clone_from(text);
            }
            let value = parser
                .current_value()
                .map_err(|err| FlagfigError::InvalidValue {
                    flag: name.to_string(),
                    value: last,
                    reason: err.to_string(),
                })?;
            trace!(flag = name, %value, "parsed flag");
            parsed.values.insert(entry.name.clone(), value);
        }
        debug!(visited = ?parsed.values.keys().collect::<Vec<_>>(), "visited flags");
        Ok(parsed)
    }

    fn arg(&self, entry: &FieldEntry, parser: &dyn ValueParser) -> Arg {
        let mut arg = Arg::new(entry.name.clone())
            .long(entry.name.clone())
            .help(help::describe(entry, self.registry, self.defaults))
            .action(ArgAction::Append)
            .value_parser(value_parser!(String));
        if let Some(short) = entry.short {
            arg = arg.short(short.to_ascii_lowercase());
        }
        if parser.is_bool_flag() {
            arg.num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
        } else {
            arg.num_args(1)
                .allow_hyphen_values(true)
                .value_name(entry.semantic.to_string())
        }
    }
}
