//! Generation limits — the fixed caps that keep every draw bounded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Caps applied during template construction and drawing.
///
/// Every draw is bounded by construction: nesting depth, container sizes
/// and retry budgets are all fixed here, so generation never needs a
/// timeout or cancellation concept of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum schema-reference resolution depth. Past it, recursive
    /// references collapse to a minimal terminal value.
    pub max_depth: u32,

    /// Cap on generated string length (guards absurd `maxLength` values).
    pub max_string_length: u64,

    /// Default upper bound on array length when `maxItems` is absent.
    pub max_array_items: u64,

    /// Cap on extra keys added for `additionalProperties`.
    pub max_additional_properties: u64,

    /// Re-draw attempts per element before `uniqueItems` generation
    /// gives up with an exhaustion error.
    pub unique_item_retries: u32,

    /// Upper bound substituted for unbounded regex repetitions (`*`, `+`).
    pub pattern_repeat_cap: u32,

    /// Probability that an optional parameter or property is included
    /// in any given draw.
    pub optional_include_probability: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_string_length: 10_000,
            max_array_items: 5,
            max_additional_properties: 5,
            unique_item_retries: 16,
            pattern_repeat_cap: 8,
            optional_include_probability: 0.5,
        }
    }
}

impl Limits {
    /// Load limits from a TOML (or `.json`) file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// loaded value is out of range.
    pub fn load(path: &Path) -> Result<Self, LimitsError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LimitsError::Io(path.to_path_buf(), e.to_string()))?;

        let limits: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| LimitsError::Parse(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| LimitsError::Parse(e.to_string()))?
        };
        limits.validate()?;
        Ok(limits)
    }

    fn validate(&self) -> Result<(), LimitsError> {
        if !(0.0..=1.0).contains(&self.optional_include_probability) {
            return Err(LimitsError::OutOfRange(
                "optional_include_probability must be within 0.0..=1.0",
            ));
        }
        if self.max_depth == 0 {
            return Err(LimitsError::OutOfRange("max_depth must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LimitsError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid limits: {0}")]
    OutOfRange(&'static str),
}
