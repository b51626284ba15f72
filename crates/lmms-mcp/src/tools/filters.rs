use lmms_project::model::{filter_type_code, filter_type_name, DEFAULT_CUTOFF, DEFAULT_RESONANCE, FILTER_TYPES, LFO_SHAPES};
use lmms_project::{Envelope, EnvelopeTarget, FilterLfo, ModelError, Project};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::error::ToolError;

const FILTER_DESCRIPTIONS: [&str; 22] = [
    "Standard low-pass",
    "Standard high-pass",
    "Band-pass (constant skirt gain)",
    "Band-pass (constant zero peak gain)",
    "Notch",
    "All-pass",
    "Moog-style resonant low-pass",
    "Two low-pass stages for a steeper slope",
    "RC low-pass, 12 dB/oct",
    "RC band-pass, 12 dB/oct",
    "RC high-pass, 12 dB/oct",
    "RC low-pass, 24 dB/oct",
    "RC band-pass, 24 dB/oct",
    "RC high-pass, 24 dB/oct",
    "Vowel formant filter",
    "Two Moog stages",
    "State-variable low-pass",
    "State-variable band-pass",
    "State-variable high-pass",
    "State-variable notch",
    "Cheaper formant filter",
    "Three-pole low-pass",
];

/// A filter type given by name or by its numeric code.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FilterTypeInput {
    Code(u8),
    Name(String),
}

impl FilterTypeInput {
    fn code(&self) -> Result<u8, ModelError> {
        match self {
            FilterTypeInput::Code(code) if filter_type_name(*code).is_some() => Ok(*code),
            FilterTypeInput::Code(code) => Err(ModelError::OutOfRange {
                field: "filter type",
                value: code.to_string(),
                expected: "0..=21",
            }),
            FilterTypeInput::Name(name) => filter_type_code(name),
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct SetTrackFilterParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Instrument track id
    pub track_id: usize,
    /// Filter type name (see list_filter_types) or code (default lowpass)
    pub filter_type: Option<FilterTypeInput>,
    /// Cutoff frequency in Hz (default 14000)
    pub cutoff: Option<f64>,
    /// Resonance, 0.0-10.0 (default 0.5)
    pub resonance: Option<f64>,
    /// Filter wet amount, 0.0-1.0 (default 1.0)
    pub wet: Option<f64>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetFilterEnvelopeParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Instrument track id
    pub track_id: usize,
    /// Envelope target: volume, cutoff or resonance (default cutoff)
    pub target: Option<String>,
    /// Attack time (default 0.0)
    pub attack: Option<f64>,
    /// Decay time (default 0.5)
    pub decay: Option<f64>,
    /// Sustain level, 0.0-1.0 (default 0.5)
    pub sustain: Option<f64>,
    /// Release time (default 0.1)
    pub release: Option<f64>,
    /// Modulation amount, -1.0 to 1.0 (default 0.0)
    pub amount: Option<f64>,
    /// Delay before the attack (default 0.0)
    pub predelay: Option<f64>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetFilterLfoParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Instrument track id
    pub track_id: usize,
    /// Envelope whose LFO to set: volume, cutoff or resonance (default cutoff)
    pub target: Option<String>,
    /// LFO speed (default 1.0)
    pub speed: Option<f64>,
    /// LFO depth, -1.0 to 1.0 (default 0.5)
    pub amount: Option<f64>,
    /// Shape code: 0 sine, 1 triangle, 2 saw, 3 square, 4 user, 5 random (default 0)
    pub shape: Option<u8>,
    /// Multiply the speed by 100 (default false)
    pub x100: Option<bool>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetTrackPitchParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Instrument track id
    pub track_id: usize,
    /// Transpose in semitones, -24 to 24
    pub semitones: i8,
}

fn target(raw: Option<&str>) -> Result<EnvelopeTarget, ModelError> {
    raw.map_or(Ok(EnvelopeTarget::Cutoff), EnvelopeTarget::parse)
}

fn target_name(target: EnvelopeTarget) -> &'static str {
    match target {
        EnvelopeTarget::Volume => "volume",
        EnvelopeTarget::Cutoff => "cutoff",
        EnvelopeTarget::Resonance => "resonance",
    }
}

pub fn list_filter_types() -> Result<Value, ToolError> {
    let types: Vec<Value> = FILTER_TYPES
        .iter()
        .zip(FILTER_DESCRIPTIONS)
        .enumerate()
        .map(|(code, (name, description))| json!({ "code": code, "name": name, "description": description }))
        .collect();
    Ok(json!({ "filter_types": types, "lfo_shapes": LFO_SHAPES }))
}

pub fn set_track_filter(project: &mut Project, params: SetTrackFilterParams) -> Result<Value, ToolError> {
    let code = match &params.filter_type {
        Some(input) => input.code()?,
        None => 0,
    };
    let filter = &mut project.track_mut(params.track_id)?.channel_mut()?.filter;
    let mut next = filter.clone();
    next.filter_type = code;
    next.cutoff = params.cutoff.unwrap_or(DEFAULT_CUTOFF);
    next.resonance = params.resonance.unwrap_or(DEFAULT_RESONANCE);
    next.wet = params.wet.unwrap_or(1.0);
    next.validate()?;
    *filter = next;
    Ok(success(json!({
        "track_id": params.track_id,
        "filter": {
            "type": filter.type_name(),
            "code": filter.filter_type,
            "cutoff": filter.cutoff,
            "resonance": filter.resonance,
            "wet": filter.wet,
        },
    })))
}

/// Replace the ADSR of one envelope, keeping any LFO already on it.
pub fn set_filter_envelope(project: &mut Project, params: SetFilterEnvelopeParams) -> Result<Value, ToolError> {
    let target = target(params.target.as_deref())?;
    let filter = &mut project.track_mut(params.track_id)?.channel_mut()?.filter;
    let lfo = filter.envelope(target).and_then(|e| e.lfo.clone());
    let envelope = Envelope {
        predelay: params.predelay.unwrap_or(0.0),
        attack: params.attack.unwrap_or(0.0),
        decay: params.decay.unwrap_or(0.5),
        sustain: params.sustain.unwrap_or(0.5),
        release: params.release.unwrap_or(0.1),
        amount: params.amount.unwrap_or(0.0),
        lfo,
        ..Envelope::default()
    };
    envelope.validate()?;
    let summary = json!({
        "target": target_name(target),
        "predelay": envelope.predelay,
        "attack": envelope.attack,
        "decay": envelope.decay,
        "sustain": envelope.sustain,
        "release": envelope.release,
        "amount": envelope.amount,
    });
    *filter.envelope_slot(target) = Some(envelope);
    Ok(success(json!({ "track_id": params.track_id, "envelope": summary })))
}

pub fn set_filter_lfo(project: &mut Project, params: SetFilterLfoParams) -> Result<Value, ToolError> {
    let target = target(params.target.as_deref())?;
    let lfo = FilterLfo {
        speed: params.speed.unwrap_or(1.0),
        amount: params.amount.unwrap_or(0.5),
        shape: params.shape.unwrap_or(0),
        x100: params.x100.unwrap_or(false),
        ..FilterLfo::default()
    };
    lfo.validate()?;
    let summary = json!({
        "target": target_name(target),
        "speed": lfo.speed,
        "amount": lfo.amount,
        "shape": lfo.shape,
        "shape_name": LFO_SHAPES[usize::from(lfo.shape)],
        "x100": lfo.x100,
        "effective_speed": if lfo.x100 { lfo.speed * 100.0 } else { lfo.speed },
    });
    let filter = &mut project.track_mut(params.track_id)?.channel_mut()?.filter;
    filter.envelope_mut(target).lfo = Some(lfo);
    Ok(success(json!({ "track_id": params.track_id, "lfo": summary })))
}

pub fn set_track_pitch(project: &mut Project, params: SetTrackPitchParams) -> Result<Value, ToolError> {
    let channel = project.track_mut(params.track_id)?.channel_mut()?;
    channel.set_pitch(params.semitones)?;
    Ok(success(json!({
        "track_id": params.track_id,
        "pitch": channel.pitch,
        "pitch_range": channel.pitch_range,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmms_project::{FilterSettings, Track};
    use pretty_assertions::assert_eq;

    fn synth() -> Project {
        let mut project = Project::new("Demo");
        project.add_track(Track::instrument("Bass", "tripleoscillator"));
        project.add_track(Track::sample("Loop", "loop.wav"));
        project
    }

    fn filter(project: &mut Project) -> FilterSettings {
        project.track_mut(0).unwrap().channel_mut().unwrap().filter.clone()
    }

    #[test]
    fn filter_by_name_or_code() {
        let mut project = synth();
        let params: SetTrackFilterParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "filter_type": "Moog", "cutoff": 400}"#,
        )
        .unwrap();
        set_track_filter(&mut project, params).unwrap();
        let f = filter(&mut project);
        assert_eq!((f.filter_type, f.cutoff, f.wet), (6, 400.0, 1.0));

        let params: SetTrackFilterParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "filter_type": 15}"#).unwrap();
        let out = set_track_filter(&mut project, params).unwrap();
        assert_eq!(out["filter"]["type"], "doublemoog");

        let params: SetTrackFilterParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "filter_type": "wobbly"}"#).unwrap();
        assert!(set_track_filter(&mut project, params).is_err());
        assert_eq!(filter(&mut project).filter_type, 15);
    }

    #[test]
    fn envelope_keeps_existing_lfo() {
        let mut project = synth();
        let lfo: SetFilterLfoParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "speed": 4, "shape": 3}"#).unwrap();
        set_filter_lfo(&mut project, lfo).unwrap();
        let env: SetFilterEnvelopeParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "attack": 0.2, "amount": 0.7}"#).unwrap();
        set_filter_envelope(&mut project, env).unwrap();

        let f = filter(&mut project);
        let envelope = f.envelope(EnvelopeTarget::Cutoff).unwrap();
        assert_eq!(envelope.attack, 0.2);
        assert_eq!(envelope.lfo.as_ref().map(|l| l.shape), Some(3));
        assert!(f.envelope(EnvelopeTarget::Volume).is_none());
    }

    #[test]
    fn lfo_ranges_are_checked() {
        let mut project = synth();
        let params: SetFilterLfoParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "amount": 50}"#).unwrap();
        assert!(set_filter_lfo(&mut project, params).is_err());
        let params: SetFilterLfoParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "target": "res", "x100": true}"#).unwrap();
        let out = set_filter_lfo(&mut project, params).unwrap();
        assert_eq!(out["lfo"]["effective_speed"], 100.0);
        assert_eq!(out["lfo"]["target"], "resonance");
    }

    #[test]
    fn pitch_needs_instrument_and_range() {
        let mut project = synth();
        let params = |track_id, semitones| SetTrackPitchParams {
            path: "a.mmp".into(),
            track_id,
            semitones,
        };
        assert!(set_track_pitch(&mut project, params(1, 2)).is_err());
        assert!(set_track_pitch(&mut project, params(0, 30)).is_err());
        let out = set_track_pitch(&mut project, params(0, -12)).unwrap();
        assert_eq!(out["pitch_range"], 12);
    }

    #[test]
    fn filter_table_is_complete() {
        let out = list_filter_types().unwrap();
        assert_eq!(out["filter_types"].as_array().unwrap().len(), 22);
        assert_eq!(out["filter_types"][6]["name"], "moog");
    }
}
