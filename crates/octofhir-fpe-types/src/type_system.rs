//! Editor Type System
//!
//! This module defines the closed set of type shapes:
//! - `PrimitiveKind` for system and FHIR primitive kinds
//! - `FpType` for everything that can flow between tokens
//! - type descriptions used for display and error messages

use crate::TypeError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Ordered list of names addressing a record type in the schema registry
///
/// `["Patient"]` is a resource, `["Patient", "contact"]` a nested backbone element.
pub type SchemaPath = SmallVec<[String; 2]>;

/// Primitive value kinds
///
/// The first seven are the FHIRPath system kinds. The rest are FHIR primitive
/// specializations, each a subtype of exactly one parent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Decimal,
    String,
    Date,
    DateTime,
    Time,
    // FHIR specializations
    Code,
    Id,
    Markdown,
    Uri,
    Url,
    Canonical,
    Oid,
    Uuid,
    Base64Binary,
    Xhtml,
    PositiveInt,
    UnsignedInt,
    Instant,
}

impl PrimitiveKind {
    /// System kinds offered as type literals
    pub const SYSTEM: [PrimitiveKind; 7] = [
        Self::Boolean,
        Self::Integer,
        Self::Decimal,
        Self::String,
        Self::Date,
        Self::DateTime,
        Self::Time,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Decimal => "Decimal",
            Self::String => "String",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Time => "Time",
            Self::Code => "Code",
            Self::Id => "Id",
            Self::Markdown => "Markdown",
            Self::Uri => "Uri",
            Self::Url => "Url",
            Self::Canonical => "Canonical",
            Self::Oid => "Oid",
            Self::Uuid => "Uuid",
            Self::Base64Binary => "Base64Binary",
            Self::Xhtml => "Xhtml",
            Self::PositiveInt => "PositiveInt",
            Self::UnsignedInt => "UnsignedInt",
            Self::Instant => "Instant",
        }
    }

    /// Name of the kind as it appears in FHIR schemas (`boolean`, `positiveInt`, ...)
    pub fn fhir_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Time => "time",
            Self::Code => "code",
            Self::Id => "id",
            Self::Markdown => "markdown",
            Self::Uri => "uri",
            Self::Url => "url",
            Self::Canonical => "canonical",
            Self::Oid => "oid",
            Self::Uuid => "uuid",
            Self::Base64Binary => "base64Binary",
            Self::Xhtml => "xhtml",
            Self::PositiveInt => "positiveInt",
            Self::UnsignedInt => "unsignedInt",
            Self::Instant => "instant",
        }
    }

    /// Look up a kind by its FHIR schema name
    pub fn from_fhir_name(name: &str) -> Option<Self> {
        let kind = match name {
            "boolean" => Self::Boolean,
            "integer" | "integer64" => Self::Integer,
            "decimal" => Self::Decimal,
            "string" => Self::String,
            "date" => Self::Date,
            "dateTime" => Self::DateTime,
            "time" => Self::Time,
            "code" => Self::Code,
            "id" => Self::Id,
            "markdown" => Self::Markdown,
            "uri" => Self::Uri,
            "url" => Self::Url,
            "canonical" => Self::Canonical,
            "oid" => Self::Oid,
            "uuid" => Self::Uuid,
            "base64Binary" => Self::Base64Binary,
            "xhtml" => Self::Xhtml,
            "positiveInt" => Self::PositiveInt,
            "unsignedInt" => Self::UnsignedInt,
            "instant" => Self::Instant,
            _ => return None,
        };
        Some(kind)
    }

    /// Look up a system kind by its display name (`Integer`, `DateTime`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::SYSTEM
            .into_iter()
            .chain([
                Self::Code,
                Self::Id,
                Self::Markdown,
                Self::Uri,
                Self::Url,
                Self::Canonical,
                Self::Oid,
                Self::Uuid,
                Self::Base64Binary,
                Self::Xhtml,
                Self::PositiveInt,
                Self::UnsignedInt,
                Self::Instant,
            ])
            .find(|kind| kind.name() == name)
    }

    /// Direct parent in the primitive hierarchy
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Code | Self::Id | Self::Markdown | Self::Uri | Self::Base64Binary | Self::Xhtml => {
                Some(Self::String)
            }
            Self::Url | Self::Canonical | Self::Oid | Self::Uuid => Some(Self::Uri),
            Self::PositiveInt | Self::UnsignedInt => Some(Self::Integer),
            Self::Instant => Some(Self::DateTime),
            _ => None,
        }
    }

    /// The system kind at the root of this kind's hierarchy
    pub fn system_kind(&self) -> Self {
        let mut kind = *self;
        while let Some(parent) = kind.parent() {
            kind = parent;
        }
        kind
    }

    /// Check if this kind is `other` or one of its specializations
    pub fn is_subtype_of(&self, other: PrimitiveKind) -> bool {
        let mut kind = Some(*self);
        while let Some(current) = kind {
            if current == other {
                return true;
            }
            kind = current.parent();
        }
        false
    }

    /// Check if this is a numeric kind
    pub fn is_numeric(&self) -> bool {
        matches!(self.system_kind(), Self::Integer | Self::Decimal)
    }

    /// Check if this is a temporal kind
    pub fn is_temporal(&self) -> bool {
        matches!(self.system_kind(), Self::Date | Self::DateTime | Self::Time)
    }

    /// Check if this is a string-like kind
    pub fn is_string(&self) -> bool {
        self.system_kind() == Self::String
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The complete editor type representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "of")]
pub enum FpType {
    /// Primitive value kind
    Primitive(PrimitiveKind),
    /// Numeric value with a unit
    Quantity,
    /// Structured record addressed by schema path
    Record(SchemaPath),
    /// Exactly one value of the inner type
    Single(Box<FpType>),
    /// Union of alternatives
    Choice(Vec<FpType>),
    /// Type variable bound while resolving a signature
    Generic(String),
    /// Function argument evaluated per element of the context type
    Lambda {
        context: Box<FpType>,
        returns: Box<FpType>,
    },
    /// The type denoted by a type-literal token
    TypeLiteral(Box<FpType>),
    /// Empty collection, also an omitted optional argument
    Null,
    /// Any value
    Any,
    /// Absorbing error type
    Invalid(Option<Box<TypeError>>),
}

impl FpType {
    // === Constructors ===

    /// Create a primitive type
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::Primitive(PrimitiveKind::Integer)
    }

    pub fn decimal() -> Self {
        Self::Primitive(PrimitiveKind::Decimal)
    }

    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    pub fn date() -> Self {
        Self::Primitive(PrimitiveKind::Date)
    }

    pub fn datetime() -> Self {
        Self::Primitive(PrimitiveKind::DateTime)
    }

    pub fn time() -> Self {
        Self::Primitive(PrimitiveKind::Time)
    }

    /// Create a record type from a schema path
    pub fn record<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Record(path.into_iter().map(Into::into).collect())
    }

    /// Create a single-valued type
    pub fn single(inner: FpType) -> Self {
        Self::Single(Box::new(inner))
    }

    /// Create a choice type without normalizing it
    pub fn choice(options: Vec<FpType>) -> Self {
        Self::Choice(options)
    }

    /// Create a generic type variable
    pub fn generic(name: impl Into<String>) -> Self {
        Self::Generic(name.into())
    }

    /// Create a lambda type
    pub fn lambda(context: FpType, returns: FpType) -> Self {
        Self::Lambda {
            context: Box::new(context),
            returns: Box::new(returns),
        }
    }

    /// Create a type-literal type
    pub fn type_literal(denoted: FpType) -> Self {
        Self::TypeLiteral(Box::new(denoted))
    }

    /// Create an invalid type carrying an error
    pub fn invalid(error: TypeError) -> Self {
        Self::Invalid(Some(Box::new(error)))
    }

    // === Type Properties ===

    /// Check if this is the invalid type
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Check if this type is single-valued
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Check if this is a lambda type
    pub fn is_lambda(&self) -> bool {
        matches!(self, Self::Lambda { .. })
    }

    /// The error carried by an invalid type
    pub fn error(&self) -> Option<&TypeError> {
        match self {
            Self::Invalid(Some(err)) => Some(err),
            _ => None,
        }
    }

    /// The type with one `Single` layer removed
    pub fn unwrapped(&self) -> &FpType {
        match self {
            Self::Single(inner) => inner,
            other => other,
        }
    }

    /// The schema path of a record type, seen through `Single`
    pub fn schema_path(&self) -> Option<&SchemaPath> {
        match self.unwrapped() {
            Self::Record(path) => Some(path),
            _ => None,
        }
    }

    /// The primitive kind, seen through `Single`
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.unwrapped() {
            Self::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Check if any generic variable occurs in this type
    pub fn contains_generics(&self) -> bool {
        match self {
            Self::Generic(_) => true,
            Self::Single(inner) | Self::TypeLiteral(inner) => inner.contains_generics(),
            Self::Choice(options) => options.iter().any(Self::contains_generics),
            Self::Lambda { context, returns } => {
                context.contains_generics() || returns.contains_generics()
            }
            _ => false,
        }
    }

    // === Display ===

    /// Human-readable description
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.name().to_string(),
            Self::Quantity => "Quantity".to_string(),
            Self::Record(path) => path.join("."),
            Self::Single(inner) => format!("Single<{}>", inner.describe()),
            Self::Choice(options) => options
                .iter()
                .map(Self::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            Self::Generic(name) => name.clone(),
            Self::Lambda { context, returns } => {
                format!("Lambda<{} => {}>", context.describe(), returns.describe())
            }
            Self::TypeLiteral(inner) => format!("Type<{}>", inner.describe()),
            Self::Null => "Null".to_string(),
            Self::Any => "Any".to_string(),
            Self::Invalid(None) => "Invalid".to_string(),
            Self::Invalid(Some(err)) => format!("Invalid ({err})"),
        }
    }
}

impl fmt::Display for FpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<PrimitiveKind> for FpType {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<TypeError> for FpType {
    fn from(err: TypeError) -> Self {
        Self::invalid(err)
    }
}
