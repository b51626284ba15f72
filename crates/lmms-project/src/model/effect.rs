//! Effect chain entries and the built-in effect parameter defaults.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::validate;
use crate::error::ModelError;

/// An effect parameter value: numeric when it parses as one, text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric coercion with text fallback, as used when reading attributes.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => ParamValue::Number(n),
            _ => ParamValue::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Default parameters of the effects bundled with LMMS.
const BUILTIN_EFFECTS: &[(&str, &str, &[(&str, f64)])] = &[
    (
        "dualfilter",
        "Two filters in parallel with crossfade",
        &[
            ("cut1", 14000.0),
            ("res1", 0.5),
            ("gain1", 1.0),
            ("enabled1", 1.0),
            ("cut2", 14000.0),
            ("res2", 0.5),
            ("gain2", 1.0),
            ("enabled2", 0.0),
            ("mix", 0.0),
        ],
    ),
    (
        "waveshaper",
        "Distortion by waveshaping",
        &[("input", 1.0), ("output", 1.0), ("clip", 0.0)],
    ),
    (
        "bassbooster",
        "Low-frequency boost",
        &[("freq", 100.0), ("gain", 1.0), ("ratio", 2.0)],
    ),
    (
        "delay",
        "Tempo-free echo with LFO",
        &[
            ("delay", 200.0),
            ("feedback", 0.5),
            ("lfotime", 2000.0),
            ("lfoamt", 0.0),
            ("outgain", 1.0),
        ],
    ),
    (
        "flanger",
        "Modulated short delay",
        &[
            ("delay", 3.0),
            ("lfofreq", 0.5),
            ("lfoamt", 0.5),
            ("lfophase", 0.0),
            ("feedback", 0.5),
            ("whitenoise", 0.0),
            ("invertfb", 0.0),
        ],
    ),
    (
        "reverbsc",
        "Stereo reverb",
        &[("input", 0.5), ("size", 0.8), ("color", 0.5), ("output", 0.5)],
    ),
    (
        "compressor",
        "Dynamics compressor",
        &[
            ("threshold", -20.0),
            ("ratio", 4.0),
            ("attack", 10.0),
            ("release", 100.0),
            ("knee", 6.0),
            ("makeupgain", 0.0),
        ],
    ),
    (
        "bitcrush",
        "Bit depth and sample rate reduction",
        &[("indep", 0.0), ("depth", 8.0), ("rate", 44100.0)],
    ),
    (
        "stereoenhancer",
        "Stereo width",
        &[("width", 0.5)],
    ),
    (
        "amplifier",
        "Gain and balance",
        &[("volume", 1.0), ("pan", 0.0), ("left", 1.0), ("right", 1.0)],
    ),
    (
        "eq",
        "Three-band equalizer",
        &[
            ("lowgain", 0.0),
            ("midgain", 0.0),
            ("highgain", 0.0),
            ("lowfreq", 200.0),
            ("highfreq", 4000.0),
        ],
    ),
];

/// Names of all built-in effects, in table order.
pub fn builtin_effect_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_EFFECTS.iter().map(|(name, _, _)| *name)
}

/// One-line description of a built-in effect.
pub fn builtin_effect_description(name: &str) -> Option<&'static str> {
    BUILTIN_EFFECTS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, desc, _)| *desc)
}

/// Default parameter map of a built-in effect, or `None` for unknown effects.
pub fn builtin_effect_defaults(name: &str) -> Option<BTreeMap<String, ParamValue>> {
    BUILTIN_EFFECTS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, _, params)| {
            params
                .iter()
                .map(|(k, v)| (k.to_string(), ParamValue::Number(*v)))
                .collect()
        })
}

/// One entry of a track's effect chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Effect {
    pub name: String,
    pub enabled: bool,
    wet: f64,
    pub gate: f64,
    pub params: BTreeMap<String, ParamValue>,
    /// LADSPA library file, for `ladspaeffect`.
    pub plugin_file: Option<String>,
    /// LADSPA plugin label, for `ladspaeffect`.
    pub plugin_name: Option<String>,
}

impl Effect {
    /// New enabled, fully wet effect with no parameter overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            wet: 1.0,
            gate: 0.0,
            params: BTreeMap::new(),
            plugin_file: None,
            plugin_name: None,
        }
    }

    pub fn with_wet(mut self, wet: f64) -> Result<Self, ModelError> {
        self.set_wet(wet)?;
        Ok(self)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn wet(&self) -> f64 {
        self.wet
    }

    pub fn set_wet(&mut self, wet: f64) -> Result<(), ModelError> {
        self.wet = validate::within("effect wet", wet, 0.0..=1.0, "0.0..=1.0")?;
        Ok(())
    }

    pub fn is_builtin(&self) -> bool {
        builtin_effect_defaults(&self.name).is_some()
    }

    /// Built-in defaults overlaid with this effect's own parameters.
    pub fn effective_params(&self) -> BTreeMap<String, ParamValue> {
        let mut merged = builtin_effect_defaults(&self.name).unwrap_or_default();
        merged.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_value_coercion() {
        assert_eq!(ParamValue::parse("0.25"), ParamValue::Number(0.25));
        assert_eq!(ParamValue::parse("-20"), ParamValue::Number(-20.0));
        assert_eq!(
            ParamValue::parse("sine"),
            ParamValue::Text("sine".to_string())
        );
        assert_eq!(ParamValue::parse("nan"), ParamValue::Text("nan".to_string()));
    }

    #[test]
    fn param_value_display() {
        assert_eq!(ParamValue::Number(14000.0).to_string(), "14000");
        assert_eq!(ParamValue::Number(0.5).to_string(), "0.5");
        assert_eq!(ParamValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn effective_params_merge_defaults() {
        let effect = Effect::new("delay").with_param("feedback", 0.8);
        let params = effect.effective_params();
        assert_eq!(params.len(), 5);
        assert_eq!(params["feedback"], ParamValue::Number(0.8));
        assert_eq!(params["delay"], ParamValue::Number(200.0));
    }

    #[test]
    fn unknown_effect_keeps_only_own_params() {
        let effect = Effect::new("ladspaeffect").with_param("port00", 3.0);
        assert!(!effect.is_builtin());
        assert_eq!(effect.effective_params().len(), 1);
    }

    #[test]
    fn table_lists_eleven_effects() {
        let names: Vec<_> = builtin_effect_names().collect();
        assert_eq!(names.len(), 11);
        assert!(names.contains(&"reverbsc"));
        assert_eq!(builtin_effect_description("eq"), Some("Three-band equalizer"));
    }

    #[test]
    fn wet_is_validated() {
        assert!(Effect::new("eq").with_wet(1.5).is_err());
        assert_eq!(Effect::new("eq").with_wet(0.3).unwrap().wet(), 0.3);
    }
}
