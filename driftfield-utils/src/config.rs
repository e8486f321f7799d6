// Driftfield particle configuration
//
// Accepts the particles.js configuration shape. Only `particles.number.value`
// and `particles.size.value` are recognized; every other key is ignored, and
// malformed sections read as absent rather than failing.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::consts::{DEFAULT_PARTICLE_COUNT, MAX_PARTICLE_COUNT};
use crate::errors::{DriftError, DriftResult};

/// Raw configuration as supplied by the caller (possibly partial)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub particles: Option<ParticlesSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticlesSection {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub number: Option<ValueOption>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<ValueOption>,
}

/// A `{ "value": ... }` leaf. The value stays untyped until resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueOption {
    #[serde(default)]
    pub value: Value,
}

/// Settings resolved once from a [`FieldConfig`] at initialization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSettings {
    /// Number of particles to seed
    pub count: usize,
    /// Radius scale factor; `None` means every particle gets the fixed radius
    pub size_scale: Option<f64>,
}

impl FieldSettings {
    pub fn new(count: usize, size_scale: Option<f64>) -> Self {
        Self { count, size_scale }
    }
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self::new(DEFAULT_PARTICLE_COUNT, None)
    }
}

impl FieldConfig {
    /// Interpret an arbitrary JSON value. Never fails: anything
    /// unrecognized reads as absent.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Parse configuration text. Fails only on invalid JSON syntax.
    pub fn from_json_str(text: &str) -> DriftResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(value))
    }

    pub fn from_file(path: &Path) -> DriftResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| DriftError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Set `particles.number.value`
    pub fn with_number(mut self, value: impl Into<Value>) -> Self {
        self.section_mut().number = Some(ValueOption {
            value: value.into(),
        });
        self
    }

    /// Set `particles.size.value`
    pub fn with_size(mut self, value: impl Into<Value>) -> Self {
        self.section_mut().size = Some(ValueOption {
            value: value.into(),
        });
        self
    }

    fn section_mut(&mut self) -> &mut ParticlesSection {
        self.particles.get_or_insert_with(ParticlesSection::default)
    }

    /// Resolve defaults into the immutable settings used for seeding.
    ///
    /// Only a falsy count (absent, `null`, `false`, `0`, `""`) becomes the
    /// default of 40. Any other value is read as a number the way a
    /// JavaScript counting loop would: `true` is 1, `"7"` is 7, `[5]` is 5,
    /// and values with no numeric reading (`"many"`, `{}`) seed nothing.
    /// Negative counts seed nothing; fractional counts round up.
    pub fn resolve(&self) -> FieldSettings {
        let section = self.particles.as_ref();

        let count = match section
            .and_then(|s| s.number.as_ref())
            .map(|n| &n.value)
            .filter(|value| is_truthy(value))
        {
            None => DEFAULT_PARTICLE_COUNT,
            Some(value) => particle_count(coerce_number(value)),
        };

        // A truthy size of "0" still scales, giving every radius exactly 1
        let size_scale = section
            .and_then(|s| s.size.as_ref())
            .map(|s| &s.value)
            .filter(|value| is_truthy(value))
            .map(coerce_number)
            .filter(|scale| scale.is_finite() && *scale >= 0.0);

        FieldSettings::new(count, size_scale)
    }
}

fn particle_count(n: f64) -> usize {
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        n.ceil().min(MAX_PARTICLE_COUNT as f64) as usize
    }
}

/// JavaScript truthiness of a config value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// JavaScript numeric coercion of a config value; NaN when there is none
fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_numeric(s),
        // Arrays coerce through their joined text: [] is "", [x] is x
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [item @ (Value::Null | Value::Number(_) | Value::String(_) | Value::Array(_))] => {
                coerce_number(item)
            }
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn parse_numeric(text: &str) -> f64 {
    let text = text.trim();
    match text {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-' | b'e' | b'E')) =>
        {
            text.parse().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
