//! Endpoint schema types.
//!
//! Every Tastypie endpoint publishes a schema at `{list_endpoint}schema/`
//! describing its fields and the HTTP methods it allows. The client uses
//! the field types to decide how each payload value is presented; see
//! [`Field`](crate::rest::Field).
//!
//! # Example
//!
//! ```rust
//! use tastypie_client::rest::{FieldType, Schema};
//!
//! let schema: Schema = serde_json::from_value(serde_json::json!({
//!     "allowed_detail_http_methods": ["get", "patch"],
//!     "allowed_list_http_methods": ["get", "post"],
//!     "default_format": "application/json",
//!     "default_limit": 20,
//!     "fields": {
//!         "subject": {"type": "string", "nullable": false, "readonly": false,
//!                     "unique": false, "default": "", "blank": false,
//!                     "help_text": "Unicode string data."},
//!         "owner": {"type": "related", "related_type": "to_one"}
//!     }
//! })).unwrap();
//!
//! assert_eq!(schema.field("owner").unwrap().field_type, FieldType::Related);
//! assert!(!schema.allows_detail_method("delete"));
//! ```

use std::collections::HashMap;

use serde::Deserialize;

/// The declared type of a schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Unicode string.
    String,
    /// Integer.
    Integer,
    /// Floating point number.
    Float,
    /// Fixed-point decimal, sent as a string.
    Decimal,
    /// Boolean.
    Boolean,
    /// Calendar date.
    Date,
    /// Date and time.
    Datetime,
    /// Time of day.
    Time,
    /// Link to one or many other resources.
    Related,
    /// List of values (or of resource URIs).
    List,
    /// Free-form mapping.
    #[serde(alias = "dict")]
    Object,
    /// Any type this client does not know.
    #[serde(other)]
    Unknown,
}

/// Cardinality of a related field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedType {
    /// A single related resource.
    ToOne,
    /// A collection of related resources.
    ToMany,
    /// Any cardinality this client does not know.
    #[serde(other)]
    Unknown,
}

/// Metadata for one field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FieldDescriptor {
    /// The declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field accepts `null`.
    #[serde(default)]
    pub nullable: bool,
    /// Whether the field is read-only.
    #[serde(default)]
    pub readonly: bool,
    /// Whether values must be unique.
    #[serde(default)]
    pub unique: bool,
    /// Default value; Tastypie sends the string `"No default provided."` when unset.
    #[serde(default)]
    pub default: serde_json::Value,
    /// Whether the field may be left blank.
    #[serde(default)]
    pub blank: bool,
    /// Free-text description.
    #[serde(default)]
    pub help_text: Option<String>,
    /// Cardinality for related fields.
    #[serde(default)]
    pub related_type: Option<RelatedType>,
    /// Schema URL of the related endpoint.
    #[serde(default)]
    pub related_schema: Option<String>,
}

impl FieldDescriptor {
    /// Returns `true` for `related` and `list` fields, whose values may be links.
    #[must_use]
    pub const fn is_relational(&self) -> bool {
        matches!(self.field_type, FieldType::Related | FieldType::List)
    }
}

/// An endpoint's schema.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Schema {
    /// Methods allowed on detail URLs (lower-case).
    #[serde(default)]
    pub allowed_detail_http_methods: Vec<String>,
    /// Methods allowed on the list URL (lower-case).
    #[serde(default)]
    pub allowed_list_http_methods: Vec<String>,
    /// Default response format.
    #[serde(default)]
    pub default_format: Option<String>,
    /// Default page size.
    #[serde(default)]
    pub default_limit: Option<u64>,
    /// Field name to descriptor.
    #[serde(default)]
    pub fields: HashMap<String, FieldDescriptor>,
    /// Field name to the filter lookups it allows.
    #[serde(default)]
    pub filtering: HashMap<String, serde_json::Value>,
    /// Fields usable with `order_by`.
    #[serde(default)]
    pub ordering: Vec<String>,
}

impl Schema {
    /// Returns the descriptor for `name`, if the schema declares it.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Returns `true` if detail URLs accept `method` (case-insensitive).
    #[must_use]
    pub fn allows_detail_method(&self, method: &str) -> bool {
        contains_method(&self.allowed_detail_http_methods, method)
    }

    /// Returns `true` if the list URL accepts `method` (case-insensitive).
    #[must_use]
    pub fn allows_list_method(&self, method: &str) -> bool {
        contains_method(&self.allowed_list_http_methods, method)
    }
}

fn contains_method(methods: &[String], method: &str) -> bool {
    methods.iter().any(|m| m.eq_ignore_ascii_case(method))
}
