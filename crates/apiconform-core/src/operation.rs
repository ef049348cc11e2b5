//! Parameter and operation templates.
//!
//! An operation template owns one parameter template per declared
//! parameter and composes them into a single generator producing a
//! complete, internally consistent parameter set per draw. Templates are
//! durable; draws are ephemeral and independent.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde_json::Value;
use tracing::warn;

use crate::error::TemplateError;
use crate::factory::{Resolution, ValueFactory};
use crate::generate::Generator;
use crate::limits::Limits;
use crate::schema::{
    Method, OperationDefinition, ParameterDefinition, ParameterLocation, SchemaDefinition,
};
use crate::values::ValueTemplate;

/// Fixed key a generated body payload is stored under, so callers can
/// locate it without inspecting schema metadata.
pub const BODY_PARAMETER: &str = "body";

/// One draw's worth of parameters: name → generated value.
pub type ParameterSet = BTreeMap<String, Value>;

/// One operation parameter with its value template resolved.
///
/// Resolution happens exactly once, at construction — the factory's state
/// at that moment is what the template generates with forever after.
#[derive(Debug)]
pub struct ParameterTemplate {
    name: String,
    location: ParameterLocation,
    required: bool,
    template: Box<dyn ValueTemplate>,
}

impl ParameterTemplate {
    pub fn new(
        definition: &ParameterDefinition,
        factory: &ValueFactory,
        definitions: &BTreeMap<String, SchemaDefinition>,
        limits: &Limits,
        operation_label: &str,
    ) -> Result<Self, TemplateError> {
        let context = format!("{operation_label}.{}", definition.name);
        let res =
            Resolution::for_parameter(definitions, limits, context, definition.location);
        let template = factory.resolve(definition.effective_schema(), &res)?;
        Ok(Self {
            name: definition.name.clone(),
            location: definition.location,
            required: definition.required,
            template,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// The key this parameter's value appears under in a parameter set.
    pub fn key(&self) -> &str {
        if self.location == ParameterLocation::Body {
            BODY_PARAMETER
        } else {
            &self.name
        }
    }

    /// One lazy generator for this parameter's value.
    pub fn hypothesize(&self) -> Generator<Value> {
        self.template.hypothesize()
    }
}

/// Template for one `(path, method)` pair.
#[derive(Debug)]
pub struct OperationTemplate {
    method: Method,
    path: String,
    operation_id: Option<String>,
    parameters: Vec<ParameterTemplate>,
    response_codes: BTreeSet<u16>,
    optional_include_probability: f64,
}

impl OperationTemplate {
    pub fn new(
        method: Method,
        path: &str,
        definition: &OperationDefinition,
        factory: &ValueFactory,
        definitions: &BTreeMap<String, SchemaDefinition>,
        limits: &Limits,
    ) -> Result<Self, TemplateError> {
        let label = format!("{method} {path}");

        let mut parameters = Vec::with_capacity(definition.parameters.len());
        let mut seen = BTreeSet::new();
        for param_def in &definition.parameters {
            let template =
                ParameterTemplate::new(param_def, factory, definitions, limits, &label)?;
            if !seen.insert(template.key().to_string()) {
                return Err(TemplateError::malformed(
                    &label,
                    format!("duplicate parameter {:?}", template.key()),
                ));
            }
            parameters.push(template);
        }

        let response_codes = normalize_response_codes(&definition.responses, &label)?;

        Ok(Self {
            method,
            path: path.to_string(),
            operation_id: definition.operation_id.clone(),
            parameters,
            response_codes,
            optional_include_probability: limits.optional_include_probability,
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Display label, e.g. `GET /pets/{id}`.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn parameters(&self) -> &[ParameterTemplate] {
        &self.parameters
    }

    /// Status codes the schema declares acceptable for this operation.
    /// Carried for the caller to validate responses against; this crate
    /// never issues requests.
    pub fn response_codes(&self) -> &BTreeSet<u16> {
        &self.response_codes
    }

    /// Compose all parameter generators into one parameter-set generator.
    ///
    /// Required parameters appear in every draw. Each optional parameter
    /// is included or omitted independently per draw, so repeated draws
    /// exercise both presence and absence.
    pub fn hypothesize(&self) -> Generator<ParameterSet> {
        let entries: Vec<(String, bool, Generator<Value>)> = self
            .parameters
            .iter()
            .map(|p| (p.key().to_string(), p.required(), p.hypothesize()))
            .collect();
        let include_probability = self.optional_include_probability;

        Generator::new(move |rng| {
            let mut set = ParameterSet::new();
            for (key, required, generator) in &entries {
                if *required || rng.gen_bool(include_probability) {
                    set.insert(key.clone(), generator.draw(rng)?);
                }
            }
            Ok(set)
        })
    }
}

/// Collect declared response codes, expanding the `default` entry.
///
/// A lone `default` allows any 2xx; a code set with no success code gains
/// 200, since a conformance run needs at least one acceptable success.
fn normalize_response_codes(
    responses: &BTreeMap<String, Value>,
    label: &str,
) -> Result<BTreeSet<u16>, TemplateError> {
    if responses.is_empty() {
        return Err(TemplateError::malformed(label, "no responses declared"));
    }
    let mut codes: BTreeSet<u16> = responses.keys().filter_map(|k| k.parse().ok()).collect();
    if codes.is_empty() {
        if !responses.contains_key("default") {
            return Err(TemplateError::malformed(
                label,
                "no parseable response codes declared",
            ));
        }
        warn!(operation = label, "only 'default' response defined, allowing any 2xx");
        codes = (200..300).collect();
    }
    if !codes.iter().any(|c| (200..300).contains(c)) {
        warn!(operation = label, "no success response defined, allowing 200");
        codes.insert(200);
    }
    Ok(codes)
}
