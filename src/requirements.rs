//! Caller-facing requirement input: defaults, presets and lenient parsing
//!
//! Values arrive as user-entered text or JSON numbers. Blank or missing
//! values fall back to [`DEFAULT_REQUIREMENTS`]; text is read up to the
//! first character that cannot continue a number, so `"80V"` is 80.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RequirementsError;
use crate::models::Requirements;

pub const DEFAULT_REQUIREMENTS: Requirements = Requirements {
    min_voltage: 80.0,
    max_voltage: 90.0,
    min_energy: 3000.0,
    min_continuous_power: 3000.0,
    max_weight: 65.0,
    max_price: 5000.0,
    max_width: 900.0,
    max_length: 340.0,
    max_height: 250.0,
    ambient_temp: 35.0,
};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("literal pattern")
});

/// A requirement value as entered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Parse the leading number of `text`; `None` if it has none
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let caps = LEADING_NUMBER.captures(text)?;
    caps[1].parse().ok()
}

fn resolve_field(
    field: &'static str,
    value: Option<&RawValue>,
    default: f64,
) -> Result<f64, RequirementsError> {
    match value {
        None => Ok(default),
        Some(RawValue::Number(n)) => Ok(*n),
        Some(RawValue::Text(text)) if text.trim().is_empty() => Ok(default),
        Some(RawValue::Text(text)) => {
            parse_leading_number(text).ok_or_else(|| RequirementsError::NotANumber {
                field,
                value: text.clone(),
            })
        }
    }
}

/// Partially specified requirements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsInput {
    pub min_voltage: Option<RawValue>,
    pub max_voltage: Option<RawValue>,
    pub min_energy: Option<RawValue>,
    pub min_continuous_power: Option<RawValue>,
    pub max_weight: Option<RawValue>,
    pub max_price: Option<RawValue>,
    pub max_width: Option<RawValue>,
    pub max_length: Option<RawValue>,
    pub max_height: Option<RawValue>,
    pub ambient_temp: Option<RawValue>,
}

impl RequirementsInput {
    /// Values set in `top` replace those in `self`
    pub fn overlay(self, top: RequirementsInput) -> RequirementsInput {
        RequirementsInput {
            min_voltage: top.min_voltage.or(self.min_voltage),
            max_voltage: top.max_voltage.or(self.max_voltage),
            min_energy: top.min_energy.or(self.min_energy),
            min_continuous_power: top.min_continuous_power.or(self.min_continuous_power),
            max_weight: top.max_weight.or(self.max_weight),
            max_price: top.max_price.or(self.max_price),
            max_width: top.max_width.or(self.max_width),
            max_length: top.max_length.or(self.max_length),
            max_height: top.max_height.or(self.max_height),
            ambient_temp: top.ambient_temp.or(self.ambient_temp),
        }
    }

    /// Fill gaps from the defaults and parse every value
    pub fn resolve(&self) -> Result<Requirements, RequirementsError> {
        let d = &DEFAULT_REQUIREMENTS;
        Ok(Requirements {
            min_voltage: resolve_field("min_voltage", self.min_voltage.as_ref(), d.min_voltage)?,
            max_voltage: resolve_field("max_voltage", self.max_voltage.as_ref(), d.max_voltage)?,
            min_energy: resolve_field("min_energy", self.min_energy.as_ref(), d.min_energy)?,
            min_continuous_power: resolve_field(
                "min_continuous_power",
                self.min_continuous_power.as_ref(),
                d.min_continuous_power,
            )?,
            max_weight: resolve_field("max_weight", self.max_weight.as_ref(), d.max_weight)?,
            max_price: resolve_field("max_price", self.max_price.as_ref(), d.max_price)?,
            max_width: resolve_field("max_width", self.max_width.as_ref(), d.max_width)?,
            max_length: resolve_field("max_length", self.max_length.as_ref(), d.max_length)?,
            max_height: resolve_field("max_height", self.max_height.as_ref(), d.max_height)?,
            ambient_temp: resolve_field(
                "ambient_temp",
                self.ambient_temp.as_ref(),
                d.ambient_temp,
            )?,
        })
    }
}

/// Typical requirement set for a common application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub label: &'static str,
    pub min_voltage: f64,
    pub max_voltage: f64,
    pub min_continuous_power: f64,
    pub min_energy: f64,
    pub max_weight: Option<f64>,
}

impl Preset {
    /// The preset as a partial input, leaving unrelated fields unset
    pub fn to_input(&self) -> RequirementsInput {
        RequirementsInput {
            min_voltage: Some(self.min_voltage.into()),
            max_voltage: Some(self.max_voltage.into()),
            min_continuous_power: Some(self.min_continuous_power.into()),
            min_energy: Some(self.min_energy.into()),
            max_weight: self.max_weight.map(RawValue::from),
            ..RequirementsInput::default()
        }
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "ebike_36v",
        label: "E-Bike (36V Standard)",
        min_voltage: 30.0,
        max_voltage: 42.0,
        min_continuous_power: 250.0,
        min_energy: 360.0,
        max_weight: None,
    },
    Preset {
        name: "ebike_48v",
        label: "E-Bike (48V High Power)",
        min_voltage: 39.0,
        max_voltage: 54.6,
        min_continuous_power: 750.0,
        min_energy: 600.0,
        max_weight: None,
    },
    Preset {
        name: "ebike_52v",
        label: "E-Bike (52V Performance)",
        min_voltage: 42.0,
        max_voltage: 58.8,
        min_continuous_power: 1000.0,
        min_energy: 800.0,
        max_weight: None,
    },
    Preset {
        name: "esk8_12s",
        label: "Electric Skateboard (12S)",
        min_voltage: 38.0,
        max_voltage: 50.4,
        min_continuous_power: 1500.0,
        min_energy: 300.0,
        max_weight: Some(4.0),
    },
    Preset {
        name: "solar_48v",
        label: "Home Solar Storage (48V)",
        min_voltage: 44.0,
        max_voltage: 56.0,
        min_continuous_power: 5000.0,
        min_energy: 5000.0,
        max_weight: Some(100.0),
    },
];

/// Look up a preset by name. `custom` means no overrides and yields `None`.
pub fn find_preset(name: &str) -> Result<Option<&'static Preset>, RequirementsError> {
    if name == "custom" {
        return Ok(None);
    }
    PRESETS
        .iter()
        .find(|p| p.name == name)
        .map(Some)
        .ok_or_else(|| RequirementsError::UnknownPreset(name.to_string()))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn leading_number_parsing() {
        assert_eq!(parse_leading_number("80"), Some(80.0));
        assert_eq!(parse_leading_number("  42.5 kWh"), Some(42.5));
        assert_eq!(parse_leading_number("80V"), Some(80.0));
        assert_eq!(parse_leading_number("-10C"), Some(-10.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("1e3W"), Some(1000.0));
        assert_eq!(parse_leading_number("V80"), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn empty_input_resolves_to_defaults() {
        let resolved = RequirementsInput::default().resolve().unwrap();
        assert_eq!(resolved, DEFAULT_REQUIREMENTS);
    }

    #[test]
    fn blank_text_takes_default_and_garbage_errors() {
        let input = RequirementsInput {
            min_voltage: Some("   ".into()),
            max_price: Some("1200 EUR".into()),
            ..RequirementsInput::default()
        };
        let resolved = input.resolve().unwrap();
        assert_relative_eq!(resolved.min_voltage, 80.0);
        assert_relative_eq!(resolved.max_price, 1200.0);

        let bad = RequirementsInput {
            max_weight: Some("heavy".into()),
            ..RequirementsInput::default()
        };
        assert_eq!(
            bad.resolve(),
            Err(RequirementsError::NotANumber {
                field: "max_weight",
                value: "heavy".to_string()
            })
        );
    }

    #[test]
    fn overlay_prefers_top_values() {
        let base = find_preset("solar_48v").unwrap().unwrap().to_input();
        let top = RequirementsInput {
            max_weight: Some(80.0.into()),
            ambient_temp: Some("20".into()),
            ..RequirementsInput::default()
        };
        let resolved = base.overlay(top).resolve().unwrap();
        assert_relative_eq!(resolved.min_voltage, 44.0);
        assert_relative_eq!(resolved.max_voltage, 56.0);
        assert_relative_eq!(resolved.min_energy, 5000.0);
        assert_relative_eq!(resolved.max_weight, 80.0);
        assert_relative_eq!(resolved.ambient_temp, 20.0);
        assert_relative_eq!(resolved.max_price, 5000.0);
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(find_preset("custom"), Ok(None));
        assert_eq!(find_preset("esk8_12s").unwrap().unwrap().max_weight, Some(4.0));
        assert!(matches!(
            find_preset("rocket"),
            Err(RequirementsError::UnknownPreset(_))
        ));
        // presets without a weight limit leave the default in place
        let resolved = find_preset("ebike_36v").unwrap().unwrap().to_input().resolve().unwrap();
        assert_relative_eq!(resolved.max_weight, 65.0);
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        let input: RequirementsInput =
            serde_json::from_str(r#"{"min_voltage": 44, "max_voltage": "56V", "max_price": ""}"#)
                .unwrap();
        let resolved = input.resolve().unwrap();
        assert_relative_eq!(resolved.min_voltage, 44.0);
        assert_relative_eq!(resolved.max_voltage, 56.0);
        assert_relative_eq!(resolved.max_price, 5000.0);
    }
}
