//! Value-template factory: `(type, format)` → template builder registry.
//!
//! The factory is instance-owned and passed explicitly wherever resolution
//! happens, so differently-extended factories can coexist in one process.
//! Consumer registrations strictly replace built-in defaults for the same
//! key; lookup falls back from `(type, format)` to `(type, None)` before
//! failing. All resolution happens at template-construction time — once an
//! operation template is built, later factory changes cannot affect it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::TemplateError;
use crate::limits::Limits;
use crate::schema::{ParameterLocation, SchemaDefinition};
use crate::values::{
    ArrayTemplate, BooleanTemplate, BytesTemplate, ConstantTemplate, DateTemplate,
    DateTimeTemplate, EmailTemplate, EnumTemplate, IntegerTemplate, NumberTemplate,
    ObjectTemplate, StringStyle, StringTemplate, UriTemplate, UuidTemplate, ValueTemplate,
};

/// Builds a value template from a schema node.
pub type TemplateBuilder = Arc<
    dyn Fn(
            &SchemaDefinition,
            &ValueFactory,
            &Resolution<'_>,
        ) -> Result<Box<dyn ValueTemplate>, TemplateError>
        + Send
        + Sync,
>;

/// State threaded through recursive schema resolution: the definitions
/// table for named references, the generation limits, the parameter
/// location (top level only), the schema-path context for errors, and the
/// depth counter guarding cyclic definitions.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub definitions: &'a BTreeMap<String, SchemaDefinition>,
    pub limits: &'a Limits,
    pub location: Option<ParameterLocation>,
    context: String,
    depth: u32,
}

impl<'a> Resolution<'a> {
    /// Resolution state for a top-level schema with no parameter location.
    pub fn root(
        definitions: &'a BTreeMap<String, SchemaDefinition>,
        limits: &'a Limits,
        context: impl Into<String>,
    ) -> Self {
        Self {
            definitions,
            limits,
            location: None,
            context: context.into(),
            depth: 0,
        }
    }

    /// Resolution state for an operation parameter.
    pub fn for_parameter(
        definitions: &'a BTreeMap<String, SchemaDefinition>,
        limits: &'a Limits,
        context: impl Into<String>,
        location: ParameterLocation,
    ) -> Self {
        Self {
            location: Some(location),
            ..Self::root(definitions, limits, context)
        }
    }

    /// Schema-path context for error messages, e.g.
    /// `POST /pets.body.properties.tags`.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Descend one level. The location only applies to the top-level
    /// parameter value, never to nested members.
    pub fn child(&self, segment: &str) -> Resolution<'a> {
        Resolution {
            definitions: self.definitions,
            limits: self.limits,
            location: None,
            context: format!("{}.{segment}", self.context),
            depth: self.depth + 1,
        }
    }

    /// True once the resolution depth reaches `limits.max_depth`.
    /// The default array/object builders collapse to a terminal value
    /// here; custom container builders should do the same if they
    /// recurse into nested schemas.
    pub fn at_depth_cap(&self) -> bool {
        self.depth >= self.limits.max_depth
    }
}

/// Registry mapping `(type, format)` to template builders.
#[derive(Clone)]
pub struct ValueFactory {
    builders: BTreeMap<(String, Option<String>), TemplateBuilder>,
}

impl std::fmt::Debug for ValueFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueFactory")
            .field("keys", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ValueFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ValueFactory {
    /// A fresh registry populated with every built-in template.
    ///
    /// Pure constructor: each call returns an independent registry, so
    /// extending one factory never affects another.
    pub fn with_defaults() -> Self {
        let mut factory = Self {
            builders: BTreeMap::new(),
        };
        factory.register("boolean", None, |_, _, _| Ok(Box::new(BooleanTemplate)));
        factory.register("integer", None, |schema, _, res| {
            IntegerTemplate::from_schema(schema, res.context())
                .map(|t| Box::new(t) as Box<dyn ValueTemplate>)
        });
        factory.register("number", None, |schema, _, res| {
            NumberTemplate::from_schema(schema, res.context())
                .map(|t| Box::new(t) as Box<dyn ValueTemplate>)
        });
        factory.register("string", None, |schema, _, res| {
            create_string_template(schema, res)
        });
        factory.register("string", Some("date"), |_, _, _| Ok(Box::new(DateTemplate)));
        factory.register("string", Some("date-time"), |_, _, _| {
            Ok(Box::new(DateTimeTemplate))
        });
        factory.register("string", Some("uuid"), |_, _, _| Ok(Box::new(UuidTemplate)));
        factory.register("string", Some("byte"), |_, _, _| Ok(Box::new(BytesTemplate)));
        factory.register("string", Some("email"), |_, _, _| Ok(Box::new(EmailTemplate)));
        factory.register("string", Some("uri"), |_, _, _| Ok(Box::new(UriTemplate)));
        factory.register("array", None, |schema, factory, res| {
            // Inline containers past the depth cap collapse the same way
            // references do.
            if res.at_depth_cap() {
                return Ok(terminal_template("array"));
            }
            ArrayTemplate::from_schema(schema, factory, res)
                .map(|t| Box::new(t) as Box<dyn ValueTemplate>)
        });
        factory.register("object", None, |schema, factory, res| {
            if res.at_depth_cap() {
                return Ok(terminal_template("object"));
            }
            ObjectTemplate::from_schema(schema, factory, res)
                .map(|t| Box::new(t) as Box<dyn ValueTemplate>)
        });
        factory.register("file", None, |_, _, _| Ok(Box::new(BytesTemplate)));
        factory
    }

    /// Register a builder for a `(type, format)` pair, replacing any
    /// existing mapping — built-in or not.
    pub fn register<F>(&mut self, schema_type: &str, format: Option<&str>, builder: F)
    where
        F: Fn(
                &SchemaDefinition,
                &ValueFactory,
                &Resolution<'_>,
            ) -> Result<Box<dyn ValueTemplate>, TemplateError>
            + Send
            + Sync
            + 'static,
    {
        self.builders.insert(
            (schema_type.to_string(), format.map(str::to_string)),
            Arc::new(builder),
        );
    }

    /// Register the fallback builder for a type: used for any format of
    /// that type with no more specific registration.
    pub fn register_type_default<F>(&mut self, schema_type: &str, builder: F)
    where
        F: Fn(
                &SchemaDefinition,
                &ValueFactory,
                &Resolution<'_>,
            ) -> Result<Box<dyn ValueTemplate>, TemplateError>
            + Send
            + Sync
            + 'static,
    {
        self.register(schema_type, None, builder);
    }

    /// Resolve the schema node to a value template.
    ///
    /// # Errors
    ///
    /// [`TemplateError::MalformedSchema`] for structurally invalid nodes,
    /// [`TemplateError::UnsupportedSchema`] when no builder matches.
    pub fn resolve(
        &self,
        schema: &SchemaDefinition,
        res: &Resolution<'_>,
    ) -> Result<Box<dyn ValueTemplate>, TemplateError> {
        if let Some(name) = schema.reference_name() {
            return self.resolve_reference(name, res);
        }

        // A closed enum wins over type-based generation.
        if schema.enum_values.is_some() {
            return Ok(Box::new(EnumTemplate::from_schema(schema, res.context())?));
        }

        let schema_type = schema.schema_type.as_deref().ok_or_else(|| {
            TemplateError::malformed(res.context(), "schema node has no type")
        })?;

        let format = schema.format.as_deref();
        let builder = self
            .builders
            .get(&(schema_type.to_string(), format.map(str::to_string)))
            .or_else(|| self.builders.get(&(schema_type.to_string(), None)))
            .ok_or_else(|| TemplateError::unsupported(res.context(), schema_type, format))?;

        debug!(context = res.context(), schema_type, ?format, "resolving template");
        builder(schema, self, res)
    }

    fn resolve_reference(
        &self,
        name: &str,
        res: &Resolution<'_>,
    ) -> Result<Box<dyn ValueTemplate>, TemplateError> {
        let target = res.definitions.get(name).ok_or_else(|| {
            TemplateError::malformed(
                res.context(),
                format!("unresolved reference to definition {name:?}"),
            )
        })?;
        if res.at_depth_cap() {
            // Cycle guard: substitute a minimal terminal value instead of
            // recursing further.
            debug!(context = res.context(), name, "depth cap hit, emitting terminal value");
            return Ok(terminal_template(
                target.schema_type.as_deref().unwrap_or(""),
            ));
        }
        self.resolve(target, &res.child(name))
    }
}

/// Minimal conforming stand-in used at the recursion depth cap.
fn terminal_template(schema_type: &str) -> Box<dyn ValueTemplate> {
    let value = match schema_type {
        "array" => json!([]),
        "object" => json!({}),
        "string" => json!(""),
        "integer" | "number" => json!(0),
        "boolean" => json!(false),
        _ => Value::Null,
    };
    Box::new(ConstantTemplate::new(value))
}

/// Default string builder: the parameter location decides the flavour.
fn create_string_template(
    schema: &SchemaDefinition,
    res: &Resolution<'_>,
) -> Result<Box<dyn ValueTemplate>, TemplateError> {
    let style = match res.location {
        Some(ParameterLocation::Path) => StringStyle::UrlPath,
        Some(ParameterLocation::Header) => StringStyle::HttpHeader,
        _ => StringStyle::Plain,
    };
    Ok(Box::new(StringTemplate::from_schema(schema, style, res)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Generator;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn schema(value: serde_json::Value) -> SchemaDefinition {
        serde_json::from_value(value).unwrap()
    }

    fn empty_definitions() -> BTreeMap<String, SchemaDefinition> {
        BTreeMap::new()
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let factory = ValueFactory::with_defaults();
        let definitions = empty_definitions();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "t");
        let err = factory
            .resolve(&schema(json!({"type": "quaternion"})), &res)
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedSchema { .. }));
    }

    #[test]
    fn missing_type_is_malformed() {
        let factory = ValueFactory::with_defaults();
        let definitions = empty_definitions();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "t");
        let err = factory.resolve(&SchemaDefinition::default(), &res).unwrap_err();
        assert!(matches!(err, TemplateError::MalformedSchema { .. }));
    }

    #[test]
    fn unknown_format_falls_back_to_type_default() {
        let factory = ValueFactory::with_defaults();
        let definitions = empty_definitions();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "t");
        let template = factory
            .resolve(&schema(json!({"type": "string", "format": "hostname"})), &res)
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(template.hypothesize().draw(&mut rng).unwrap().is_string());
    }

    #[test]
    fn custom_registration_overrides_builtin() {
        let mut factory = ValueFactory::with_defaults();
        factory.register("string", None, |_, _, _| {
            Ok(Box::new(ConstantTemplate::new(json!("fixed"))))
        });
        let definitions = empty_definitions();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "t");
        let template = factory.resolve(&schema(json!({"type": "string"})), &res).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            template.hypothesize().draw(&mut rng).unwrap(),
            json!("fixed")
        );
    }

    #[test]
    fn registration_is_instance_scoped() {
        let mut extended = ValueFactory::with_defaults();
        extended.register("string", Some("hexcolour"), |_, _, _| {
            Ok(Box::new(ConstantTemplate::new(json!("#00ff00"))))
        });
        let plain = ValueFactory::with_defaults();

        let definitions = empty_definitions();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "t");
        let node = schema(json!({"type": "string", "format": "hexcolour"}));

        let mut rng = SmallRng::seed_from_u64(1);
        let custom = extended.resolve(&node, &res).unwrap();
        assert_eq!(custom.hypothesize().draw(&mut rng).unwrap(), json!("#00ff00"));

        // The unextended factory falls back to the plain string default.
        let fallback = plain.resolve(&node, &res).unwrap();
        assert!(fallback.hypothesize().draw(&mut rng).unwrap().is_string());
    }

    #[test]
    fn container_override_still_applies_at_depth_cap() {
        let mut factory = ValueFactory::with_defaults();
        factory.register("object", Some("wrapper"), |_, _, _| {
            Ok(Box::new(ConstantTemplate::new(json!({"wrapped": true}))))
        });
        let definitions = empty_definitions();
        let limits = Limits::default();
        let mut res = Resolution::root(&definitions, &limits, "t");
        for _ in 0..limits.max_depth {
            res = res.child("p");
        }
        assert!(res.at_depth_cap());

        let mut rng = SmallRng::seed_from_u64(1);
        let template = factory
            .resolve(&schema(json!({"type": "object", "format": "wrapper"})), &res)
            .unwrap();
        assert_eq!(
            template.hypothesize().draw(&mut rng).unwrap(),
            json!({"wrapped": true})
        );

        // Containers without an override still collapse to terminal
        // values at the cap.
        let plain = factory
            .resolve(
                &schema(json!({
                    "type": "object",
                    "properties": {"a": {"type": "string"}},
                    "required": ["a"],
                    "additionalProperties": false
                })),
                &res,
            )
            .unwrap();
        assert_eq!(plain.hypothesize().draw(&mut rng).unwrap(), json!({}));
        let array = factory
            .resolve(
                &schema(json!({"type": "array", "items": {"type": "integer"}})),
                &res,
            )
            .unwrap();
        assert_eq!(array.hypothesize().draw(&mut rng).unwrap(), json!([]));
    }

    #[test]
    fn unresolved_reference_is_malformed() {
        let factory = ValueFactory::with_defaults();
        let definitions = empty_definitions();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "t");
        let err = factory
            .resolve(&schema(json!({"$ref": "#/definitions/Ghost"})), &res)
            .unwrap_err();
        assert!(matches!(err, TemplateError::MalformedSchema { .. }));
    }

    #[test]
    fn self_referential_definition_stays_bounded() {
        let factory = ValueFactory::with_defaults();
        let mut definitions = empty_definitions();
        definitions.insert(
            "Node".to_string(),
            schema(json!({
                "type": "object",
                "properties": {
                    "label": {"type": "string", "maxLength": 4},
                    "children": {
                        "type": "array",
                        "maxItems": 2,
                        "items": {"$ref": "#/definitions/Node"}
                    }
                },
                "required": ["label"],
                "additionalProperties": false
            })),
        );
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "t");
        let template = factory
            .resolve(&schema(json!({"$ref": "#/definitions/Node"})), &res)
            .unwrap();
        let generator: Generator<Value> = template.hypothesize();

        fn depth_of(value: &Value) -> u32 {
            match value {
                Value::Array(items) => 1 + items.iter().map(depth_of).max().unwrap_or(0),
                Value::Object(map) => 1 + map.values().map(depth_of).max().unwrap_or(0),
                _ => 0,
            }
        }

        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let value = generator.draw(&mut rng).unwrap();
            assert!(depth_of(&value) <= limits.max_depth + 2, "runaway nesting");
        }
    }
}
