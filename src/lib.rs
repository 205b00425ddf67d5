//! Bind dotted command-line flags onto nested configuration structs.
//!
//! Describe which fields of a struct are flags, hand over a defaults
//! instance, and flagfig turns `--db.ip=10.0.0.1` into a filled-in
//! configuration.
//!
//! ```ignore
//! let mut config = Configuration::initial();
//! flagfig::load(&mut config, &Configuration::defaults(), std::env::args().skip(1), &ParserRegistry::new())?;
//! ```
//!
//! # Describing a configuration
//!
//! A configuration is any `Serialize + DeserializeOwned` struct that
//! implements [`Flags`]. The trait carries a static [`Meta`] table with one
//! [`Field`] per serialized field. A field becomes a flag once it has a
//! description:
//!
//! ```ignore
//! impl Flags for Configuration {
//!     const META: Meta = Meta {
//!         name: "Configuration",
//!         fields: &[
//!             Field::new("log_level", FieldKind::Leaf(SemanticType::String))
//!                 .describe("Log level")
//!                 .long("loglevel")
//!                 .short('l'),
//!             Field::new("timeout", FieldKind::Leaf(SemanticType::Duration))
//!                 .describe("Timeout duration"),
//!             Field::new("db", FieldKind::Optional(Pointee::Nested(&DatabaseInfo::META)))
//!                 .describe("Enable database"),
//!         ],
//!     };
//! }
//! ```
//!
//! Flag names are the lowercased field name (or its `long` override), joined
//! with dots below the root: `loglevel`, `timeout`, `db`, `db.ip`. A
//! `#[serde(flatten)]` field is declared with [`Field::embedded`] and adds no
//! segment of its own. Names are matched case-insensitively on the command
//! line; values are never touched.
//!
//! # Precedence
//!
//! ```text
//! Defaults instance      the value passed as `defaults`
//!        ↑ overridden by
//! Existing optionals     Option fields the target already holds
//!        ↑ overridden by
//! Command line           flags present in args
//! ```
//!
//! Plain fields take the parsed value when their flag is present and the
//! default otherwise.
//!
//! # Optional records
//!
//! An `Option<T>` field is a flag too, a boolean one. It is *activated* when
//!
//! - its own flag is given (`--db` or `--db=true`),
//! - any flag below it is given and its own flag is not (`--db.ip=10.0.0.1`),
//! - or the target already holds a value for it.
//!
//! An activated field that is absent in the target is filled from the
//! defaults instance, with the default's own optional children left absent;
//! a default is then required (see [`FlagfigError::MissingDefaultValue`]).
//! A field the target already holds is never replaced, only updated by the
//! flags below it. `--db=false` leaves an absent `db` absent.
//!
//! # Parsers
//!
//! Each [`SemanticType`] is read by a [`ValueParser`]. The built-ins cover
//! booleans, 32/64-bit integers, `f64`, strings, durations (`9ms`, `1h30m`,
//! or bare seconds), RFC 3339 timestamps and comma separated string lists.
//! Any other type, or a replacement for a built-in, is registered under a
//! [`SemanticType::Custom`] tag in a [`ParserRegistry`]. Flags whose type has
//! no parser are left unbound and reported, without failing the load.
//!
//! # Commands
//!
//! [`Flagfig`] puts several configurations behind one argument list: the
//! first argument, when it is not a flag, names the [`Command`] to load and
//! run.
//!
//! # Help
//!
//! `--help` and `-h` end the load with [`FlagfigError::HelpRequested`],
//! carrying help text that lists every flag with its description and default.
//! Printing it and choosing an exit code is left to the caller.

mod args;
mod binder;
mod builder;
mod catalog;
mod command;
mod defaults;
pub mod error;
mod help;
pub mod meta;
pub mod ops;
pub mod parsers;
mod reconcile;

#[cfg(test)]
mod fixtures;

pub use binder::{Binder, Parsed};
pub use builder::{Loader, Report, load};
pub use catalog::{Catalog, EntryKind, FieldEntry, flag_names};
pub use command::{Command, Flagfig};
pub use defaults::DefaultsView;
pub use error::{BoxError, FlagfigError};
pub use help::HelpInfo;
pub use meta::{Field, FieldKind, Flags, Meta, Pointee, SemanticType};
pub use ops::ConfigResult;
pub use parsers::{
    OverridePolicy, ParseValueError, ParserFactory, ParserRegistry, Scalar, StringList,
    TextValue, ValueParser, load_parsers,
};
pub use reconcile::{Activation, reconcile};
