//! Consumed schema-definition data model.
//!
//! These types are the interface boundary with the external document parser:
//! it hands over a tree of resolved schema nodes plus per-operation
//! method/path/parameter/response metadata, and this crate only reads them.
//! Cyclic type graphs cannot exist in a finite JSON tree, so self- and
//! mutually-referential definitions arrive as *named references* resolved
//! against the [`ApiDefinition::definitions`] table during template
//! construction.
//!
//! All maps are `BTreeMap` so iteration order is deterministic across runs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One node of a parsed schema: type, format, and constraint fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaDefinition {
    /// Base type: string, integer, number, boolean, array, object.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    pub format: Option<String>,
    /// Closed value set; takes precedence over type-based generation.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    // Numeric constraints
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<bool>,
    pub exclusive_maximum: Option<bool>,
    pub multiple_of: Option<f64>,

    // String constraints
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,

    // Array constraints
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
    pub items: Option<Box<SchemaDefinition>>,

    // Object shape
    pub properties: BTreeMap<String, SchemaDefinition>,
    pub required: Vec<String>,
    pub additional_properties: Option<AdditionalProperties>,

    /// Named reference into the definitions table, e.g.
    /// `#/definitions/Node`. The only way a cycle can reach this crate.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
}

impl SchemaDefinition {
    /// The reference name with any `#/definitions/` or
    /// `#/components/schemas/` prefix stripped.
    pub fn reference_name(&self) -> Option<&str> {
        self.reference.as_deref().map(|r| {
            r.strip_prefix("#/definitions/")
                .or_else(|| r.strip_prefix("#/components/schemas/"))
                .unwrap_or(r)
        })
    }
}

/// `additionalProperties` is either a boolean switch or a schema every
/// extra value must conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaDefinition>),
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    FormData,
    Body,
}

/// One parameter of an operation, as supplied by the parser.
///
/// Body parameters carry their shape in the nested `schema` field; all
/// other locations declare constraint fields inline on the parameter
/// itself (Swagger v2 style). [`ParameterDefinition::effective_schema`]
/// hides the distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Option<SchemaDefinition>,
    #[serde(flatten)]
    pub inline: SchemaDefinition,
}

impl ParameterDefinition {
    /// The schema describing this parameter's value.
    pub fn effective_schema(&self) -> &SchemaDefinition {
        self.schema.as_ref().unwrap_or(&self.inline)
    }
}

/// HTTP methods an operation may be declared under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation's metadata: parameters plus declared responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    #[serde(default, rename = "operationId")]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    /// Response entries keyed by status code or the literal `default`.
    #[serde(default)]
    pub responses: BTreeMap<String, serde_json::Value>,
}

/// Operations declared on one path, keyed by method.
pub type PathItem = BTreeMap<Method, OperationDefinition>;

/// A fully parsed schema document: every path with its operations, plus
/// the named definitions table used to resolve references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDefinition {
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub definitions: BTreeMap<String, SchemaDefinition>,
}
