//! Static schema describing which fields of a configuration type are flags.
//!
//! A configuration type implements [`Flags`] by providing a `const META` table.
//! The table mirrors the struct: one [`Field`] per serialized field, in
//! declaration order. Nested and optional records point at the `META` of their
//! own type, so the whole shape is reachable from the root table.
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
//!             Field::new("db", FieldKind::Optional(Pointee::Nested(&DatabaseInfo::META)))
//!                 .describe("Enable database"),
//!         ],
//!     };
//! }
//! ```

use std::fmt;

/// A configuration type whose fields can be bound from the command line.
pub trait Flags {
    const META: Meta;
}

/// Schema of one record type.
#[derive(Debug, Clone, Copy)]
pub struct Meta {
    /// Type name, used in error messages and as the tag of section parsers.
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// Schema of one record field.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Serialized name of the field (the key serde writes).
    pub name: &'static str,
    /// Help text. A field without a description is not a flag.
    pub description: Option<&'static str>,
    /// Replaces `name` when deriving the flag name.
    pub long: Option<&'static str>,
    pub short: Option<char>,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A value read by a single parser.
    Leaf(SemanticType),
    /// A sub-record that is always present.
    Nested(&'static Meta),
    /// A `#[serde(flatten)]` sub-record. Its fields join the parent's
    /// namespace and live in the parent's serialized record.
    Embedded(&'static Meta),
    /// An `Option<T>` field. Its own flag activates it.
    Optional(Pointee),
}

/// What an optional field holds when present.
#[derive(Debug, Clone, Copy)]
pub enum Pointee {
    Leaf(SemanticType),
    Nested(&'static Meta),
}

/// Logical type of a flag value, used to pick a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemanticType {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F64,
    String,
    Duration,
    Timestamp,
    StringList,
    /// A caller-defined type, identified by tag.
    Custom(&'static str),
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Bool => write!(f, "bool"),
            SemanticType::I32 => write!(f, "i32"),
            SemanticType::I64 => write!(f, "i64"),
            SemanticType::U32 => write!(f, "u32"),
            SemanticType::U64 => write!(f, "u64"),
            SemanticType::F64 => write!(f, "f64"),
            SemanticType::String => write!(f, "string"),
            SemanticType::Duration => write!(f, "duration"),
            SemanticType::Timestamp => write!(f, "timestamp"),
            SemanticType::StringList => write!(f, "string list"),
            SemanticType::Custom(tag) => write!(f, "{tag}"),
        }
    }
}

impl Field {
    /// A field with no annotation. Chain [`describe`](Self::describe) to make
    /// it a flag.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description: None,
            long: None,
            short: None,
            kind,
        }
    }

    /// A `#[serde(flatten)]` record whose flags join the parent namespace.
    pub const fn embedded(name: &'static str, meta: &'static Meta) -> Self {
        Self::new(name, FieldKind::Embedded(meta))
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub const fn long(mut self, long: &'static str) -> Self {
        self.long = Some(long);
        self
    }

    pub const fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Derive this field's flag name under `prefix` (empty at the root).
    ///
    /// Catalog building, the defaults view and the reconciler all name fields
    /// through this function, so the three always agree.
    pub fn flag_name(&self, prefix: &str) -> String {
        let base = self.long.unwrap_or(self.name).to_lowercase();
        if prefix.is_empty() {
            base
        } else {
            format!("{prefix}.{base}")
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self.kind, FieldKind::Optional(_))
    }
}
