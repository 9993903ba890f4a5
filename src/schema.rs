//! Schema types and structures
//!
//! A schema is an ordered mapping of table name to table spec, and a table
//! spec is an ordered mapping of field name to field spec. Order is
//! significant: the field at position `i` describes column `i` of every row,
//! and field names are never matched against row headers.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use tracing::debug;

use crate::checksum::Checksum;
use crate::error::{Result, SchemaError};

/// Expected type of a field's raw cell value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Int,
    Float,
    String,
    /// Any tag other than `int`, `float` or `string`. Never checked.
    Unrecognized(String),
}

impl FieldType {
    /// Get the schema tag for this type
    pub fn tag(&self) -> &str {
        match self {
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::String => "string",
            FieldType::Unrecognized(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, FieldType::Unrecognized(_))
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "int" => FieldType::Int,
            "float" => FieldType::Float,
            "string" => FieldType::String,
            _ => FieldType::Unrecognized(tag),
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        FieldType::from(tag.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.tag().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Constraints for a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Empty values are reported when set
    pub required: bool,
    /// Expected type of the raw value
    pub field_type: FieldType,
    /// Maximum character count, string fields only
    pub max_length: Option<usize>,
}

impl FieldSpec {
    /// Create an optional field of the given type
    pub fn new(field_type: impl Into<FieldType>) -> Self {
        Self {
            required: false,
            field_type: field_type.into(),
            max_length: None,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Cap the character length of the field
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// Ordered field specs of one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSpec {
    fields: IndexMap<String, FieldSpec>,
}

impl TableSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field at the next column position
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Field names in column order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Field at a column position
    pub fn field_at(&self, position: usize) -> Option<(&str, &FieldSpec)> {
        self.fields
            .get_index(position)
            .map(|(name, spec)| (name.as_str(), spec))
    }

    /// Field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A complete schema: tables in definition order
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: IndexMap<String, TableSpec>,
    checksum: Option<Checksum>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a table after the existing ones
    pub fn with_table(mut self, name: impl Into<String>, table: TableSpec) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Load a schema file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading schema");
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Read a schema from any reader
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_json_str(&content)
    }

    /// Parse a schema from JSON text, keeping key order
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: IndexMap<String, IndexMap<String, RawFieldSpec>> =
            serde_json::from_str(content).map_err(|e| match e.classify() {
                Category::Data => SchemaError::InvalidFormat(e.to_string()),
                _ => SchemaError::Json(e),
            })?;

        let mut tables = IndexMap::with_capacity(raw.len());
        for (table_name, raw_fields) in raw {
            let mut table = TableSpec::new();
            for (field_name, raw_spec) in raw_fields {
                let spec = raw_spec.into_spec(&table_name, &field_name)?;
                table.fields.insert(field_name, spec);
            }
            debug!(table = %table_name, fields = table.len(), "loaded table spec");
            tables.insert(table_name, table);
        }

        Ok(Self {
            tables,
            checksum: Some(Checksum::of_text(content)),
        })
    }

    /// Tables in definition order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableSpec)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Table by name
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.get(name)
    }

    /// Fingerprint of the source text, if the schema was parsed from one
    pub fn checksum(&self) -> Option<&Checksum> {
        self.checksum.as_ref()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// `required` as written in schema files: a boolean or "yes"/"no"
#[derive(Deserialize)]
#[serde(untagged)]
enum RequiredFlag {
    Bool(bool),
    Text(String),
}

#[derive(Deserialize)]
struct RawFieldSpec {
    #[serde(default)]
    required: Option<RequiredFlag>,
    #[serde(default, rename = "type")]
    field_type: Option<String>,
    #[serde(default, alias = "length")]
    max_length: Option<usize>,
}

impl RawFieldSpec {
    fn into_spec(self, table: &str, field: &str) -> Result<FieldSpec> {
        let required = match self.required {
            None => false,
            Some(RequiredFlag::Bool(flag)) => flag,
            Some(RequiredFlag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" => true,
                "no" | "n" | "false" | "" => false,
                other => {
                    return Err(SchemaError::InvalidField {
                        table: table.to_string(),
                        field: field.to_string(),
                        reason: format!("required must be yes/no or a boolean, got '{}'", other),
                    })
                }
            },
        };

        Ok(FieldSpec {
            required,
            field_type: self
                .field_type
                .map(FieldType::from)
                .unwrap_or_else(|| FieldType::Unrecognized(String::new())),
            max_length: self.max_length,
        })
    }
}
