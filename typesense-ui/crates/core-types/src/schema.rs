use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a collection field as reported by the server.
///
/// Serialized as the server's literal tag (`"string[]"`, `"int32"`, ...).
/// Unknown tags survive a round trip through [`FieldType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    StringArray,
    Int32,
    Int32Array,
    Int64,
    Int64Array,
    Float,
    FloatArray,
    Bool,
    BoolArray,
    Geopoint,
    GeopointArray,
    Object,
    ObjectArray,
    StringStar,
    Auto,
    Image,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::StringArray => "string[]",
            Self::Int32 => "int32",
            Self::Int32Array => "int32[]",
            Self::Int64 => "int64",
            Self::Int64Array => "int64[]",
            Self::Float => "float",
            Self::FloatArray => "float[]",
            Self::Bool => "bool",
            Self::BoolArray => "bool[]",
            Self::Geopoint => "geopoint",
            Self::GeopointArray => "geopoint[]",
            Self::Object => "object",
            Self::ObjectArray => "object[]",
            Self::StringStar => "string*",
            Self::Auto => "auto",
            Self::Image => "image",
            Self::Other(tag) => tag,
        }
    }

    /// `string` and `string[]` only; these are searched and filtered by exact match.
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::String | Self::StringArray)
    }

    /// Integer and float tags, scalar or array, plus unknown tags mentioning
    /// `int` or `float`. `geopoint` is not numeric.
    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Int32
            | Self::Int32Array
            | Self::Int64
            | Self::Int64Array
            | Self::Float
            | Self::FloatArray => true,
            Self::Other(tag) => tag.contains("int") || tag.contains("float"),
            _ => false,
        }
    }

    /// Scalar `bool` only. `bool[]` gets no filter clause.
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "string" => Self::String,
            "string[]" => Self::StringArray,
            "int32" => Self::Int32,
            "int32[]" => Self::Int32Array,
            "int64" => Self::Int64,
            "int64[]" => Self::Int64Array,
            "float" => Self::Float,
            "float[]" => Self::FloatArray,
            "bool" => Self::Bool,
            "bool[]" => Self::BoolArray,
            "geopoint" => Self::Geopoint,
            "geopoint[]" => Self::GeopointArray,
            "object" => Self::Object,
            "object[]" => Self::ObjectArray,
            "string*" => Self::StringStar,
            "auto" => Self::Auto,
            "image" => Self::Image,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        match ty {
            FieldType::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed attribute of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub facet: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default = "default_true")]
    pub index: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infix: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            facet: false,
            optional: false,
            index: true,
            sort: None,
            infix: None,
            locale: None,
        }
    }

    #[must_use]
    pub fn with_facet(mut self, facet: bool) -> Self {
        self.facet = facet;
        self
    }

    /// Fields that get a filter input: facets, numbers, and booleans.
    pub fn is_filterable(&self) -> bool {
        self.facet || self.field_type.is_numeric() || self.field_type.is_bool()
    }
}

/// Snapshot of a collection's metadata. Replaced wholesale on reselection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    #[serde(default)]
    pub num_documents: u64,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sorting_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            num_documents: 0,
            fields,
            default_sorting_field: None,
            created_at: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Declared default sort field; the server reports an absent one as `""`.
    pub fn default_sort(&self) -> Option<&str> {
        self.default_sorting_field
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    pub fn filterable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_filterable())
    }
}
