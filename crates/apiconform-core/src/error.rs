//! Error taxonomy for template construction and value drawing.
//!
//! Construction-time problems (`TemplateError`) are fatal and surfaced
//! immediately, before any generation begins. Draw-time exhaustion
//! (`DrawError`) can only occur after bounded internal retries and carries
//! enough context to locate the offending schema fragment.

/// Fatal error while building a template from a schema definition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    /// Structurally invalid or self-contradictory schema node.
    #[error("malformed schema at {context}: {reason}")]
    MalformedSchema { context: String, reason: String },

    /// No template registered for this type/format pair.
    #[error("unsupported schema at {context}: no template for type {schema_type:?}, format {format:?}")]
    UnsupportedSchema {
        context: String,
        schema_type: String,
        format: Option<String>,
    },

    /// Syntactically valid constraint the generator cannot honor
    /// (e.g. a pattern with a word boundary).
    #[error("unsupported schema at {context}: {reason}")]
    UnsupportedConstraint { context: String, reason: String },
}

impl TemplateError {
    pub(crate) fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(
        context: impl Into<String>,
        schema_type: impl Into<String>,
        format: Option<&str>,
    ) -> Self {
        Self::UnsupportedSchema {
            context: context.into(),
            schema_type: schema_type.into(),
            format: format.map(str::to_string),
        }
    }

    pub(crate) fn unsupported_constraint(
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedConstraint {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Error while drawing a value from a generator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    /// A constraint combination could not be satisfied within the retry
    /// budget (e.g. `uniqueItems` over too few distinct values).
    #[error("generation exhausted at {context}: {reason}")]
    Exhausted { context: String, reason: String },
}

impl DrawError {
    pub(crate) fn exhausted(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Exhausted {
            context: context.into(),
            reason: reason.into(),
        }
    }
}
