//! Value templates: one per value shape, each producing a lazy generator.
//!
//! Bounds are enforced at generation time, not filtered after the fact —
//! an integer template only ever draws inside its clamped range, a string
//! template only draws from its alphabet within its length window, and a
//! pattern-constrained string is synthesized from the pattern itself.
//! Templates are immutable once built; all schema resolution (including
//! factory overrides) happens in their constructors.

use std::sync::Arc;

use rand::{Rng, RngCore};
use serde_json::{Map, Value, json};

use crate::error::{DrawError, TemplateError};
use crate::factory::{Resolution, ValueFactory};
use crate::generate::Generator;
use crate::pattern::Pattern;
use crate::schema::{AdditionalProperties, SchemaDefinition};

/// Capability: produce a lazy, restartable generator of conforming values.
pub trait ValueTemplate: std::fmt::Debug + Send + Sync {
    fn hypothesize(&self) -> Generator<Value>;
}

const PRINTABLE: (char, char) = (' ', '~');

/// Random string over the printable-ASCII range.
fn random_text(rng: &mut dyn RngCore, len: usize) -> String {
    let (lo, hi) = (PRINTABLE.0 as u32, PRINTABLE.1 as u32);
    (0..len)
        .map(|_| char::from_u32(rng.gen_range(lo..=hi)).unwrap_or('a'))
        .collect()
}

fn random_alnum(rng: &mut dyn RngCore, len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..len)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

/// Always yields the same value. Used as the terminal substitute when
/// reference resolution hits the depth cap.
#[derive(Debug)]
pub struct ConstantTemplate {
    value: Value,
}

impl ConstantTemplate {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl ValueTemplate for ConstantTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        Generator::constant(self.value.clone())
    }
}

#[derive(Debug)]
pub struct BooleanTemplate;

impl ValueTemplate for BooleanTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        Generator::new(|rng| Ok(Value::Bool(rng.gen_bool(0.5))))
    }
}

/// Integer generation over a pre-clamped range.
///
/// `multipleOf` is folded into the range at construction: the generator
/// draws a factor `k` and yields `k * multiple_of`, so every draw
/// satisfies the constraint without rejection.
#[derive(Debug)]
pub struct IntegerTemplate {
    lo: i64,
    hi: i64,
    scale: i64,
}

impl IntegerTemplate {
    pub fn from_schema(schema: &SchemaDefinition, context: &str) -> Result<Self, TemplateError> {
        if schema.exclusive_minimum == Some(true) && schema.minimum.is_none() {
            return Err(TemplateError::malformed(
                context,
                "exclusiveMinimum set without minimum",
            ));
        }
        if schema.exclusive_maximum == Some(true) && schema.maximum.is_none() {
            return Err(TemplateError::malformed(
                context,
                "exclusiveMaximum set without maximum",
            ));
        }

        // Bounds may arrive as floats; fold exclusivity into inclusive
        // integer bounds.
        let min = match schema.minimum {
            Some(m) if schema.exclusive_minimum == Some(true) => m.floor() as i64 + 1,
            Some(m) => m.ceil() as i64,
            None => -1000,
        };
        let max = match schema.maximum {
            Some(m) if schema.exclusive_maximum == Some(true) => m.ceil() as i64 - 1,
            Some(m) => m.floor() as i64,
            None => 1000,
        };
        if min > max {
            return Err(TemplateError::malformed(
                context,
                format!("integer bounds are empty: minimum {min} > maximum {max}"),
            ));
        }

        let (lo, hi, scale) = match schema.multiple_of {
            Some(m) => {
                if m <= 0.0 || m.fract() != 0.0 {
                    return Err(TemplateError::malformed(
                        context,
                        format!("multipleOf {m} is not a positive integer"),
                    ));
                }
                let m = m as i64;
                let lo = div_ceil(min, m);
                let hi = max.div_euclid(m);
                if lo > hi {
                    return Err(TemplateError::malformed(
                        context,
                        format!("no multiple of {m} within [{min}, {max}]"),
                    ));
                }
                (lo, hi, m)
            }
            None => (min, max, 1),
        };
        Ok(Self { lo, hi, scale })
    }
}

fn div_ceil(a: i64, b: i64) -> i64 {
    a.div_euclid(b) + i64::from(a.rem_euclid(b) != 0)
}

impl ValueTemplate for IntegerTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        let (lo, hi, scale) = (self.lo, self.hi, self.scale);
        Generator::new(move |rng| Ok(json!(rng.gen_range(lo..=hi) * scale)))
    }
}

/// Floating-point generation respecting exclusivity and `multipleOf`.
#[derive(Debug)]
pub struct NumberTemplate {
    min: f64,
    max: f64,
    exclusive_min: bool,
    /// Factor range when `multipleOf` is present.
    factors: Option<(i64, i64, f64)>,
}

impl NumberTemplate {
    pub fn from_schema(schema: &SchemaDefinition, context: &str) -> Result<Self, TemplateError> {
        if schema.exclusive_minimum == Some(true) && schema.minimum.is_none() {
            return Err(TemplateError::malformed(
                context,
                "exclusiveMinimum set without minimum",
            ));
        }
        if schema.exclusive_maximum == Some(true) && schema.maximum.is_none() {
            return Err(TemplateError::malformed(
                context,
                "exclusiveMaximum set without maximum",
            ));
        }
        let min = schema.minimum.unwrap_or(-1000.0);
        let max = schema.maximum.unwrap_or(1000.0);
        let exclusive_min = schema.exclusive_minimum == Some(true);
        let exclusive_max = schema.exclusive_maximum == Some(true);
        if min > max || ((exclusive_min || exclusive_max) && min >= max) {
            return Err(TemplateError::malformed(
                context,
                format!("number bounds are empty: minimum {min}, maximum {max}"),
            ));
        }

        let factors = match schema.multiple_of {
            Some(m) if m > 0.0 => {
                let mut lo = (min / m).ceil() as i64;
                let mut hi = (max / m).floor() as i64;
                if exclusive_min && (lo as f64) * m <= min {
                    lo += 1;
                }
                if exclusive_max && (hi as f64) * m >= max {
                    hi -= 1;
                }
                if lo > hi {
                    return Err(TemplateError::malformed(
                        context,
                        format!("no multiple of {m} within ({min}, {max})"),
                    ));
                }
                Some((lo, hi, m))
            }
            Some(m) => {
                return Err(TemplateError::malformed(
                    context,
                    format!("multipleOf {m} is not positive"),
                ));
            }
            None => None,
        };

        Ok(Self {
            min,
            max,
            exclusive_min,
            factors,
        })
    }
}

impl ValueTemplate for NumberTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        let Self {
            min,
            max,
            exclusive_min,
            factors,
        } = *self;
        Generator::new(move |rng| {
            let value = match factors {
                Some((lo, hi, m)) => rng.gen_range(lo..=hi) as f64 * m,
                None if min == max => min,
                None => {
                    // Half-open range satisfies an exclusive maximum for
                    // free; only the lower edge needs a nudge.
                    let v = rng.gen_range(min..max);
                    if exclusive_min && v <= min {
                        min + (max - min) / 2.0
                    } else {
                        v
                    }
                }
            };
            Ok(json!(value))
        })
    }
}

/// Which alphabet and post-processing a string location needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringStyle {
    /// Printable ASCII, as-is.
    Plain,
    /// URL-unreserved characters only, never empty.
    UrlPath,
    /// No CR/LF, surrounding whitespace stripped.
    HttpHeader,
}

#[derive(Debug)]
pub struct StringTemplate {
    min_len: u64,
    max_len: u64,
    style: StringStyle,
    pattern: Option<Arc<Pattern>>,
}

impl StringTemplate {
    pub fn from_schema(
        schema: &SchemaDefinition,
        style: StringStyle,
        res: &Resolution<'_>,
    ) -> Result<Self, TemplateError> {
        let cap = res.limits.max_string_length;
        let mut min_len = schema.min_length.unwrap_or(0).min(cap);
        if style == StringStyle::UrlPath {
            // An empty path segment would change the request route.
            min_len = min_len.max(1);
        }
        let max_len = schema
            .max_length
            .unwrap_or_else(|| min_len.saturating_add(20))
            .min(cap);
        if min_len > max_len {
            return Err(TemplateError::malformed(
                res.context(),
                format!("minLength {min_len} > maxLength {max_len}"),
            ));
        }
        let pattern = match schema.pattern.as_deref() {
            Some(p) => Some(Arc::new(Pattern::compile(
                p,
                res.limits.pattern_repeat_cap,
                res.context(),
            )?)),
            None => None,
        };

        Ok(Self {
            min_len,
            max_len,
            style,
            pattern,
        })
    }
}

impl ValueTemplate for StringTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        // A pattern drives generation outright; length bounds are not
        // additionally imposed on pattern-derived strings.
        if let Some(pattern) = &self.pattern {
            let pattern = Arc::clone(pattern);
            return Generator::new(move |rng| Ok(Value::String(pattern.generate(rng))));
        }
        let (min, max, style) = (self.min_len as usize, self.max_len as usize, self.style);
        Generator::new(move |rng| {
            let len = rng.gen_range(min..=max);
            let s = match style {
                StringStyle::Plain => random_text(rng, len),
                StringStyle::UrlPath => random_alnum(rng, len.max(1)),
                StringStyle::HttpHeader => random_text(rng, len).trim().to_string(),
            };
            Ok(Value::String(s))
        })
    }
}

/// Uniform draw from a closed value set, whatever the declared base type.
#[derive(Debug)]
pub struct EnumTemplate {
    values: Vec<Value>,
}

impl EnumTemplate {
    pub fn from_schema(schema: &SchemaDefinition, context: &str) -> Result<Self, TemplateError> {
        let values = schema.enum_values.clone().unwrap_or_default();
        if values.is_empty() {
            return Err(TemplateError::malformed(context, "enum with no values"));
        }
        Ok(Self { values })
    }
}

impl ValueTemplate for EnumTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        let values = self.values.clone();
        Generator::new(move |rng| Ok(values[rng.gen_range(0..values.len())].clone()))
    }
}

/// `date` format: always a calendar-valid ISO 8601 date.
#[derive(Debug)]
pub struct DateTemplate;

fn draw_date(rng: &mut dyn RngCore) -> String {
    // Day capped at 28 so every month/year combination is valid.
    format!(
        "{:04}-{:02}-{:02}",
        rng.gen_range(1970..=2999),
        rng.gen_range(1..=12_u8),
        rng.gen_range(1..=28_u8),
    )
}

impl ValueTemplate for DateTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        Generator::new(|rng| Ok(Value::String(draw_date(rng))))
    }
}

/// `date-time` format: RFC 3339 timestamp in UTC.
#[derive(Debug)]
pub struct DateTimeTemplate;

impl ValueTemplate for DateTimeTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        Generator::new(|rng| {
            Ok(Value::String(format!(
                "{}T{:02}:{:02}:{:02}Z",
                draw_date(rng),
                rng.gen_range(0..24_u8),
                rng.gen_range(0..60_u8),
                rng.gen_range(0..60_u8),
            )))
        })
    }
}

/// `uuid` format: random version-4 UUID.
#[derive(Debug)]
pub struct UuidTemplate;

impl ValueTemplate for UuidTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        Generator::new(|rng| {
            Ok(Value::String(format!(
                "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
                rng.gen_range(0..=u32::MAX),
                rng.gen_range(0..=u16::MAX),
                rng.gen_range(0..=u16::MAX) & 0x0FFF,
                (rng.gen_range(0..=u16::MAX) & 0x3FFF) | 0x8000,
                rng.gen_range(0..=u64::MAX) & 0xFFFF_FFFF_FFFF,
            )))
        })
    }
}

/// `byte` format (and `file` parameters): base64 text, padded length.
#[derive(Debug)]
pub struct BytesTemplate;

impl ValueTemplate for BytesTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        const ALPHABET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
        Generator::new(|rng| {
            let len = 4 * rng.gen_range(0..=6_usize);
            let s: String = (0..len)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                .collect();
            Ok(Value::String(s))
        })
    }
}

/// `email` format.
#[derive(Debug)]
pub struct EmailTemplate;

impl ValueTemplate for EmailTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        Generator::new(|rng| {
            Ok(Value::String(format!(
                "user{}@example.com",
                rng.gen_range(1..9999_u32)
            )))
        })
    }
}

/// `uri`/`url` format.
#[derive(Debug)]
pub struct UriTemplate;

impl ValueTemplate for UriTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        Generator::new(|rng| {
            let len = rng.gen_range(1..=10);
            let segment = random_alnum(rng, len);
            Ok(Value::String(format!("https://example.com/{segment}")))
        })
    }
}

/// Ordered sequence built from an items template.
#[derive(Debug)]
pub struct ArrayTemplate {
    items: Box<dyn ValueTemplate>,
    min_items: u64,
    max_items: u64,
    unique: bool,
    retries: u32,
    context: String,
}

impl ArrayTemplate {
    pub fn from_schema(
        schema: &SchemaDefinition,
        factory: &ValueFactory,
        res: &Resolution<'_>,
    ) -> Result<Self, TemplateError> {
        let min_items = schema.min_items.unwrap_or(0);
        let max_items = schema
            .max_items
            .unwrap_or_else(|| min_items.max(res.limits.max_array_items));
        if min_items > max_items {
            return Err(TemplateError::malformed(
                res.context(),
                format!("minItems {min_items} > maxItems {max_items}"),
            ));
        }
        // Unconstrained items default to plain strings.
        let default_items = SchemaDefinition {
            schema_type: Some("string".to_string()),
            ..SchemaDefinition::default()
        };
        let items_schema = schema.items.as_deref().unwrap_or(&default_items);
        let items = factory.resolve(items_schema, &res.child("items"))?;

        Ok(Self {
            items,
            min_items,
            max_items,
            unique: schema.unique_items == Some(true),
            retries: res.limits.unique_item_retries,
            context: res.context().to_string(),
        })
    }
}

impl ValueTemplate for ArrayTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        let item = self.items.hypothesize();
        let (min, max) = (self.min_items, self.max_items);
        let (unique, retries) = (self.unique, self.retries);
        let context = self.context.clone();
        Generator::new(move |rng| {
            let count = rng.gen_range(min..=max) as usize;
            let mut values: Vec<Value> = Vec::with_capacity(count);
            while values.len() < count {
                let mut attempts = 0;
                loop {
                    let candidate = item.draw(rng)?;
                    if !unique || !values.contains(&candidate) {
                        values.push(candidate);
                        break;
                    }
                    attempts += 1;
                    if attempts >= retries {
                        return Err(DrawError::exhausted(
                            &context,
                            format!(
                                "could not draw {count} unique items after {retries} retries"
                            ),
                        ));
                    }
                }
            }
            Ok(Value::Array(values))
        })
    }
}

/// What to generate for keys outside the declared properties.
#[derive(Debug)]
enum ExtraProperties {
    /// `additionalProperties: false` or absent with declared properties.
    Forbidden,
    /// `additionalProperties: true`, or an object with no shape at all.
    FreeForm,
    /// `additionalProperties` carries a schema every extra value obeys.
    Conforming(Box<dyn ValueTemplate>),
}

/// JSON object built from property templates.
#[derive(Debug)]
pub struct ObjectTemplate {
    required: Vec<(String, Box<dyn ValueTemplate>)>,
    optional: Vec<(String, Box<dyn ValueTemplate>)>,
    extra: ExtraProperties,
    max_extra: u64,
    include_probability: f64,
}

impl ObjectTemplate {
    pub fn from_schema(
        schema: &SchemaDefinition,
        factory: &ValueFactory,
        res: &Resolution<'_>,
    ) -> Result<Self, TemplateError> {
        let extra = match &schema.additional_properties {
            Some(AdditionalProperties::Allowed(false)) => ExtraProperties::Forbidden,
            Some(AdditionalProperties::Allowed(true)) => ExtraProperties::FreeForm,
            Some(AdditionalProperties::Schema(inner)) => ExtraProperties::Conforming(
                factory.resolve(inner, &res.child("additionalProperties"))?,
            ),
            // Without any declared shape this is a free-form JSON object;
            // with declared properties, absence means no extras.
            None if schema.properties.is_empty() => ExtraProperties::FreeForm,
            None => ExtraProperties::Forbidden,
        };

        let mut required = Vec::new();
        let mut optional = Vec::new();
        for (name, prop_schema) in &schema.properties {
            let child = res.child(&format!("properties.{name}"));
            let template = factory.resolve(prop_schema, &child)?;
            if schema.required.iter().any(|r| r == name) {
                required.push((name.clone(), template));
            } else {
                optional.push((name.clone(), template));
            }
        }

        // A required name with no property entry must still be producible.
        for name in &schema.required {
            if schema.properties.contains_key(name) {
                continue;
            }
            match &extra {
                ExtraProperties::Forbidden => {
                    return Err(TemplateError::malformed(
                        res.context(),
                        format!("required property {name:?} is not declared"),
                    ));
                }
                ExtraProperties::FreeForm => {
                    required.push((name.clone(), Box::new(FreeFormTemplate)));
                }
                ExtraProperties::Conforming(_) => {
                    let inner = match &schema.additional_properties {
                        Some(AdditionalProperties::Schema(inner)) => inner,
                        _ => unreachable!("Conforming implies a schema"),
                    };
                    let child = res.child(&format!("required.{name}"));
                    required.push((name.clone(), factory.resolve(inner, &child)?));
                }
            }
        }

        Ok(Self {
            required,
            optional,
            extra,
            max_extra: res.limits.max_additional_properties,
            include_probability: res.limits.optional_include_probability,
        })
    }
}

impl ValueTemplate for ObjectTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        let required: Vec<(String, Generator<Value>)> = self
            .required
            .iter()
            .map(|(name, t)| (name.clone(), t.hypothesize()))
            .collect();
        let optional: Vec<(String, Generator<Value>)> = self
            .optional
            .iter()
            .map(|(name, t)| (name.clone(), t.hypothesize()))
            .collect();
        let extra = match &self.extra {
            ExtraProperties::Forbidden => None,
            ExtraProperties::FreeForm => Some(FreeFormTemplate.hypothesize()),
            ExtraProperties::Conforming(t) => Some(t.hypothesize()),
        };
        let max_extra = self.max_extra;
        let include_probability = self.include_probability;

        Generator::new(move |rng| {
            let mut obj = Map::new();
            for (name, generator) in &required {
                obj.insert(name.clone(), generator.draw(rng)?);
            }
            for (name, generator) in &optional {
                if rng.gen_bool(include_probability) {
                    obj.insert(name.clone(), generator.draw(rng)?);
                }
            }
            if let Some(extra_gen) = &extra {
                let count = rng.gen_range(0..=max_extra);
                for _ in 0..count {
                    let len = rng.gen_range(1..=8);
                    let key = random_alnum(rng, len);
                    if !obj.contains_key(&key) {
                        obj.insert(key, extra_gen.draw(rng)?);
                    }
                }
            }
            Ok(Value::Object(obj))
        })
    }
}

/// Bounded free-form JSON: scalars, with shallow nested objects.
#[derive(Debug)]
pub struct FreeFormTemplate;

fn free_form_value(rng: &mut dyn RngCore, depth: u32) -> Value {
    match rng.gen_range(0..6_u8) {
        0 => Value::Null,
        1 => Value::Bool(rng.gen_bool(0.5)),
        2 => json!(rng.gen_range(-1000..=1000_i64)),
        3 => json!(rng.gen_range(-1000.0..1000.0_f64)),
        4 => {
            let len = rng.gen_range(0..=10);
            Value::String(random_alnum(rng, len))
        }
        _ if depth < 2 => {
            let mut obj = Map::new();
            for _ in 0..rng.gen_range(0..=3_u8) {
                let len = rng.gen_range(1..=6);
                let key = random_alnum(rng, len);
                obj.insert(key, free_form_value(rng, depth + 1));
            }
            Value::Object(obj)
        }
        _ => {
            let len = rng.gen_range(0..=10);
            Value::String(random_alnum(rng, len))
        }
    }
}

impl ValueTemplate for FreeFormTemplate {
    fn hypothesize(&self) -> Generator<Value> {
        Generator::new(|rng| Ok(free_form_value(rng, 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ValueFactory;
    use crate::limits::Limits;
    use crate::schema::SchemaDefinition;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::BTreeMap;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn schema(value: serde_json::Value) -> SchemaDefinition {
        serde_json::from_value(value).unwrap()
    }

    fn resolve_and_draw(value: serde_json::Value, draws: usize) -> Vec<Value> {
        let factory = ValueFactory::with_defaults();
        let definitions = BTreeMap::new();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "test");
        let template = factory.resolve(&schema(value), &res).unwrap();
        let generator = template.hypothesize();
        let mut rng = rng();
        (0..draws)
            .map(|_| generator.draw(&mut rng).unwrap())
            .collect()
    }

    #[test]
    fn integer_respects_bounds() {
        for v in resolve_and_draw(json!({"type": "integer", "minimum": 0, "maximum": 10}), 1000) {
            let n = v.as_i64().unwrap();
            assert!((0..=10).contains(&n), "{n} out of range");
        }
    }

    #[test]
    fn integer_exclusive_bounds() {
        for v in resolve_and_draw(
            json!({
                "type": "integer",
                "minimum": 0, "exclusiveMinimum": true,
                "maximum": 3, "exclusiveMaximum": true
            }),
            200,
        ) {
            let n = v.as_i64().unwrap();
            assert!((1..=2).contains(&n), "{n} out of exclusive range");
        }
    }

    #[test]
    fn integer_multiple_of() {
        for v in resolve_and_draw(
            json!({"type": "integer", "minimum": 1, "maximum": 100, "multipleOf": 7}),
            500,
        ) {
            let n = v.as_i64().unwrap();
            assert_eq!(n % 7, 0);
            assert!((1..=100).contains(&n));
        }
    }

    #[test]
    fn integer_contradictory_bounds_rejected() {
        let err = IntegerTemplate::from_schema(
            &schema(json!({"type": "integer", "minimum": 10, "maximum": 2})),
            "t",
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::MalformedSchema { .. }));
    }

    #[test]
    fn number_respects_bounds() {
        for v in resolve_and_draw(
            json!({"type": "number", "minimum": -1.5, "maximum": 1.5}),
            1000,
        ) {
            let f = v.as_f64().unwrap();
            assert!((-1.5..=1.5).contains(&f), "{f} out of range");
        }
    }

    #[test]
    fn number_multiple_of() {
        for v in resolve_and_draw(
            json!({"type": "number", "minimum": 0, "maximum": 10, "multipleOf": 0.5}),
            500,
        ) {
            let f = v.as_f64().unwrap();
            assert!((f / 0.5).fract().abs() < 1e-9, "{f} not a multiple of 0.5");
        }
    }

    #[test]
    fn string_respects_length_bounds() {
        for v in resolve_and_draw(
            json!({"type": "string", "minLength": 5, "maxLength": 10}),
            500,
        ) {
            let len = v.as_str().unwrap().chars().count();
            assert!((5..=10).contains(&len), "length {len} out of range");
        }
    }

    #[test]
    fn string_pattern_drives_generation() {
        for v in resolve_and_draw(
            json!({"type": "string", "pattern": "^[a-f]{4}-[0-9]{2}$"}),
            300,
        ) {
            let s = v.as_str().unwrap();
            assert!(
                regex::Regex::new("^[a-f]{4}-[0-9]{2}$").unwrap().is_match(s),
                "{s:?} does not match pattern"
            );
        }
    }

    #[test]
    fn enum_only_yields_members() {
        let allowed = [json!("a"), json!("b")];
        for v in resolve_and_draw(json!({"type": "string", "enum": ["a", "b"]}), 500) {
            assert!(allowed.contains(&v), "{v:?} not in enum");
        }
    }

    #[test]
    fn empty_enum_rejected() {
        let err =
            EnumTemplate::from_schema(&schema(json!({"type": "string", "enum": []})), "t")
                .unwrap_err();
        assert!(matches!(err, TemplateError::MalformedSchema { .. }));
    }

    #[test]
    fn array_length_and_element_types() {
        for v in resolve_and_draw(
            json!({
                "type": "array",
                "items": {"type": "integer", "minimum": 0, "maximum": 5},
                "minItems": 2, "maxItems": 4
            }),
            300,
        ) {
            let arr = v.as_array().unwrap();
            assert!((2..=4).contains(&arr.len()));
            assert!(arr.iter().all(|e| (0..=5).contains(&e.as_i64().unwrap())));
        }
    }

    #[test]
    fn unique_items_never_repeat() {
        for v in resolve_and_draw(
            json!({
                "type": "array",
                "items": {"type": "integer", "minimum": 0, "maximum": 100},
                "minItems": 3, "maxItems": 5,
                "uniqueItems": true
            }),
            300,
        ) {
            let arr = v.as_array().unwrap();
            for (i, a) in arr.iter().enumerate() {
                assert!(!arr[i + 1..].contains(a), "duplicate {a:?} in {arr:?}");
            }
        }
    }

    #[test]
    fn unique_items_exhaustion_surfaces() {
        // Two representable values cannot fill five unique slots.
        let factory = ValueFactory::with_defaults();
        let definitions = BTreeMap::new();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "test");
        let template = factory
            .resolve(
                &schema(json!({
                    "type": "array",
                    "items": {"type": "integer", "minimum": 0, "maximum": 1},
                    "minItems": 5, "maxItems": 5,
                    "uniqueItems": true
                })),
                &res,
            )
            .unwrap();
        let generator = template.hypothesize();
        let mut rng = rng();
        let err = generator.draw(&mut rng).unwrap_err();
        assert!(matches!(err, DrawError::Exhausted { .. }));
    }

    #[test]
    fn object_required_always_present_extras_forbidden() {
        for v in resolve_and_draw(
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "age": {"type": "integer", "minimum": 0, "maximum": 120}
                },
                "required": ["name"],
                "additionalProperties": false
            }),
            300,
        ) {
            let obj = v.as_object().unwrap();
            assert!(obj.contains_key("name"));
            for key in obj.keys() {
                assert!(key == "name" || key == "age", "unexpected key {key:?}");
            }
        }
    }

    #[test]
    fn object_optional_properties_vary() {
        let mut with = 0;
        let mut without = 0;
        for v in resolve_and_draw(
            json!({
                "type": "object",
                "properties": {"tag": {"type": "string"}},
                "additionalProperties": false
            }),
            300,
        ) {
            if v.as_object().unwrap().contains_key("tag") {
                with += 1;
            } else {
                without += 1;
            }
        }
        assert!(with > 0 && without > 0, "with={with} without={without}");
    }

    #[test]
    fn additional_properties_schema_constrains_extras() {
        for v in resolve_and_draw(
            json!({
                "type": "object",
                "properties": {"id": {"type": "integer"}},
                "required": ["id"],
                "additionalProperties": {"type": "boolean"}
            }),
            300,
        ) {
            let obj = v.as_object().unwrap();
            for (key, value) in obj {
                if key != "id" {
                    assert!(value.is_boolean(), "extra {key:?} is {value:?}");
                }
            }
        }
    }

    #[test]
    fn undeclared_required_property_rejected_when_extras_forbidden() {
        let factory = ValueFactory::with_defaults();
        let definitions = BTreeMap::new();
        let limits = Limits::default();
        let res = Resolution::root(&definitions, &limits, "test");
        let err = factory
            .resolve(
                &schema(json!({
                    "type": "object",
                    "properties": {"a": {"type": "string"}},
                    "required": ["a", "ghost"],
                    "additionalProperties": false
                })),
                &res,
            )
            .unwrap_err();
        assert!(matches!(err, TemplateError::MalformedSchema { .. }));
    }

    #[test]
    fn date_and_datetime_shapes() {
        let date_re = regex::Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
        for v in resolve_and_draw(json!({"type": "string", "format": "date"}), 100) {
            assert!(date_re.is_match(v.as_str().unwrap()));
        }
        let dt_re = regex::Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").unwrap();
        for v in resolve_and_draw(json!({"type": "string", "format": "date-time"}), 100) {
            assert!(dt_re.is_match(v.as_str().unwrap()));
        }
    }

    #[test]
    fn uuid_shape() {
        let re =
            regex::Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
                .unwrap();
        for v in resolve_and_draw(json!({"type": "string", "format": "uuid"}), 100) {
            assert!(re.is_match(v.as_str().unwrap()), "{v:?}");
        }
    }
}
