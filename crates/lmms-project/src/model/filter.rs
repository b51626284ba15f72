//! Instrument filter, envelopes and envelope LFOs.
//!
//! The file format has no on/off flag for envelopes or their LFOs, so the
//! model keeps them as `Option`s. The decoder infers presence from non-default
//! values (see [`FilterLfo::looks_active`] and [`Envelope::looks_active`]).

use serde::Serialize;

use super::validate;
use crate::error::ModelError;

/// Filter names indexed by their `ftype` code.
pub const FILTER_TYPES: [&str; 22] = [
    "lowpass",
    "hipass",
    "bandpass_csg",
    "bandpass_czpg",
    "notch",
    "allpass",
    "moog",
    "doublelowpass",
    "lowpass_rc12",
    "bandpass_rc12",
    "highpass_rc12",
    "lowpass_rc24",
    "bandpass_rc24",
    "highpass_rc24",
    "formant",
    "doublemoog",
    "lowpass_sv",
    "bandpass_sv",
    "highpass_sv",
    "notch_sv",
    "fastformant",
    "tripole",
];

/// LFO shape names indexed by their `lshp` code.
pub const LFO_SHAPES: [&str; 6] = ["sine", "triangle", "saw", "square", "user", "random"];

pub const DEFAULT_CUTOFF: f64 = 14000.0;
pub const DEFAULT_RESONANCE: f64 = 0.5;
pub const DEFAULT_LFO_SPEED: f64 = 0.1;

/// Look up a filter type code by name.
pub fn filter_type_code(name: &str) -> Result<u8, ModelError> {
    let key = name.trim().to_lowercase();
    FILTER_TYPES
        .iter()
        .position(|n| *n == key)
        .map(|i| i as u8)
        .ok_or_else(|| ModelError::UnknownName {
            table: "filter type",
            name: name.to_string(),
        })
}

/// Name for a filter type code.
pub fn filter_type_name(code: u8) -> Option<&'static str> {
    FILTER_TYPES.get(usize::from(code)).copied()
}

/// Low-frequency oscillator modulating an envelope target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterLfo {
    pub speed: f64,
    pub amount: f64,
    pub shape: u8,
    pub x100: bool,
    pub sync_mode: u8,
}

impl Default for FilterLfo {
    fn default() -> Self {
        Self {
            speed: DEFAULT_LFO_SPEED,
            amount: 0.0,
            shape: 0,
            x100: false,
            sync_mode: 0,
        }
    }
}

impl FilterLfo {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::at_least("lfo speed", self.speed, 0.0, ">= 0")?;
        validate::within("lfo amount", self.amount, -1.0..=1.0, "-1.0..=1.0")?;
        validate::within("lfo shape", self.shape, 0..=5, "0..=5")?;
        Ok(())
    }

    /// Presence heuristic used when reading files: a positive amount or a
    /// speed other than the default.
    pub fn looks_active(&self) -> bool {
        self.amount > 0.0 || self.speed != DEFAULT_LFO_SPEED
    }
}

/// Envelope with an optional LFO.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub predelay: f64,
    pub attack: f64,
    pub hold: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    pub amount: f64,
    pub lfo: Option<FilterLfo>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            predelay: 0.0,
            attack: 0.0,
            hold: 0.5,
            decay: 0.5,
            sustain: 0.5,
            release: 0.1,
            amount: 0.0,
            lfo: None,
        }
    }
}

impl Envelope {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::at_least("envelope predelay", self.predelay, 0.0, ">= 0")?;
        validate::at_least("envelope attack", self.attack, 0.0, ">= 0")?;
        validate::at_least("envelope hold", self.hold, 0.0, ">= 0")?;
        validate::at_least("envelope decay", self.decay, 0.0, ">= 0")?;
        validate::within("envelope sustain", self.sustain, 0.0..=1.0, "0.0..=1.0")?;
        validate::within("envelope amount", self.amount, -1.0..=1.0, "-1.0..=1.0")?;
        validate::at_least("envelope release", self.release, 0.0, ">= 0")?;
        if let Some(lfo) = &self.lfo {
            lfo.validate()?;
        }
        Ok(())
    }

    /// Presence heuristic used when reading files.
    pub fn looks_active(&self) -> bool {
        self.amount > 0.0 || self.lfo.is_some()
    }
}

/// Which envelope of the filter block an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeTarget {
    Volume,
    Cutoff,
    Resonance,
}

impl EnvelopeTarget {
    pub const ALL: [EnvelopeTarget; 3] = [
        EnvelopeTarget::Volume,
        EnvelopeTarget::Cutoff,
        EnvelopeTarget::Resonance,
    ];

    /// Element name inside `eldata`.
    pub fn element(self) -> &'static str {
        match self {
            EnvelopeTarget::Volume => "elvol",
            EnvelopeTarget::Cutoff => "elcut",
            EnvelopeTarget::Resonance => "elres",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ModelError> {
        match name.trim().to_lowercase().as_str() {
            "volume" | "vol" => Ok(EnvelopeTarget::Volume),
            "cutoff" | "cut" => Ok(EnvelopeTarget::Cutoff),
            "resonance" | "res" => Ok(EnvelopeTarget::Resonance),
            _ => Err(ModelError::UnknownName {
                table: "envelope target",
                name: name.to_string(),
            }),
        }
    }
}

/// Filter block of an instrument track (`eldata`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSettings {
    pub filter_type: u8,
    pub cutoff: f64,
    pub resonance: f64,
    pub wet: f64,
    pub volume_envelope: Option<Envelope>,
    pub cutoff_envelope: Option<Envelope>,
    pub resonance_envelope: Option<Envelope>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            filter_type: 0,
            cutoff: DEFAULT_CUTOFF,
            resonance: DEFAULT_RESONANCE,
            wet: 0.0,
            volume_envelope: None,
            cutoff_envelope: None,
            resonance_envelope: None,
        }
    }
}

impl FilterSettings {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::within("filter type", self.filter_type, 0..=21, "0..=21")?;
        validate::at_least("filter cutoff", self.cutoff, 0.0, ">= 0")?;
        validate::within("filter resonance", self.resonance, 0.0..=10.0, "0.0..=10.0")?;
        validate::within("filter wet", self.wet, 0.0..=1.0, "0.0..=1.0")?;
        for target in EnvelopeTarget::ALL {
            if let Some(envelope) = self.envelope(target) {
                envelope.validate()?;
            }
        }
        Ok(())
    }

    pub fn envelope(&self, target: EnvelopeTarget) -> Option<&Envelope> {
        match target {
            EnvelopeTarget::Volume => self.volume_envelope.as_ref(),
            EnvelopeTarget::Cutoff => self.cutoff_envelope.as_ref(),
            EnvelopeTarget::Resonance => self.resonance_envelope.as_ref(),
        }
    }

    pub fn envelope_slot(&mut self, target: EnvelopeTarget) -> &mut Option<Envelope> {
        match target {
            EnvelopeTarget::Volume => &mut self.volume_envelope,
            EnvelopeTarget::Cutoff => &mut self.cutoff_envelope,
            EnvelopeTarget::Resonance => &mut self.resonance_envelope,
        }
    }

    /// Envelope for `target`, created with defaults if absent.
    pub fn envelope_mut(&mut self, target: EnvelopeTarget) -> &mut Envelope {
        self.envelope_slot(target).get_or_insert_with(Envelope::default)
    }

    pub fn type_name(&self) -> &'static str {
        filter_type_name(self.filter_type).unwrap_or("unknown")
    }
}
