use lmms_project::model::{ChannelSettings, ModulationAlgo, Oscillator};
use lmms_project::{Kicker, ModelError, Monstro, Project, Track, TrackKind, TripleOscillator, WaveShape};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::error::ToolError;

/// A waveform given by name or by its numeric code.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum WaveInput {
    Code(u8),
    Name(String),
}

impl WaveInput {
    fn shape(&self) -> Result<WaveShape, ModelError> {
        match self {
            WaveInput::Code(code) => WaveShape::from_code(*code).ok_or_else(|| ModelError::OutOfRange {
                field: "wave shape",
                value: code.to_string(),
                expected: "0..=7",
            }),
            WaveInput::Name(name) => WaveShape::parse(name),
        }
    }
}

/// A modulation algorithm given by name or by its numeric code.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AlgoInput {
    Code(u8),
    Name(String),
}

impl AlgoInput {
    fn algo(&self) -> Result<ModulationAlgo, ModelError> {
        match self {
            AlgoInput::Code(code) => ModulationAlgo::from_code(*code).ok_or_else(|| ModelError::OutOfRange {
                field: "modulation algorithm",
                value: code.to_string(),
                expected: "0..=4",
            }),
            AlgoInput::Name(name) => ModulationAlgo::parse(name),
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct AddTripleOscillatorParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track name
    pub name: String,
    /// Oscillator 1 waveform (default saw)
    pub osc1_wave: Option<WaveInput>,
    /// Oscillator 2 waveform (default saw)
    pub osc2_wave: Option<WaveInput>,
    /// Oscillator 3 waveform (default square)
    pub osc3_wave: Option<WaveInput>,
    /// Oscillator 1 volume, 0-200 (default 100)
    pub osc1_vol: Option<f64>,
    /// Oscillator 2 volume, 0-200 (default 100)
    pub osc2_vol: Option<f64>,
    /// Oscillator 3 volume, 0-200 (default 50)
    pub osc3_vol: Option<f64>,
    /// Oscillator 1 coarse detune in semitones (default 0)
    pub osc1_detune: Option<i8>,
    /// Oscillator 2 coarse detune in semitones (default -12)
    pub osc2_detune: Option<i8>,
    /// Oscillator 3 coarse detune in semitones (default 0)
    pub osc3_detune: Option<i8>,
    /// Modulation for both stages: pm, am, mix, sync or fm (default pm)
    pub mod_algo: Option<AlgoInput>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetOscillatorParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// TripleOscillator track id
    pub track_id: usize,
    /// Oscillator number, 1-3
    pub osc_num: u8,
    /// Waveform: sine, triangle, saw, square, moogsaw, exp, noise, user
    pub wave: Option<WaveInput>,
    /// Volume, 0-200
    pub volume: Option<f64>,
    /// Pan, -100 to 100
    pub pan: Option<f64>,
    /// Coarse detune in semitones, -24 to 24
    pub coarse: Option<i8>,
    /// Fine detune of the left channel in cents, -100 to 100
    pub fine_left: Option<f64>,
    /// Fine detune of the right channel in cents, -100 to 100
    pub fine_right: Option<f64>,
    /// Phase offset in degrees, 0-360
    pub phase_offset: Option<f64>,
    /// Stereo phase detune in degrees, 0-360
    pub stereo_phase: Option<f64>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetModulationParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// TripleOscillator track id
    pub track_id: usize,
    /// How oscillator 2 modulates oscillator 1
    pub algo1: Option<AlgoInput>,
    /// How oscillator 3 modulates oscillator 2
    pub algo2: Option<AlgoInput>,
}

#[derive(Deserialize, JsonSchema)]
pub struct KickerSettings {
    /// Start frequency in Hz, 5-1000
    pub start_freq: Option<f64>,
    /// End frequency in Hz, 5-1000
    pub end_freq: Option<f64>,
    /// Decay in ms, 5-5000
    pub decay: Option<f64>,
    /// Distortion at the start, 0-100
    pub distortion: Option<f64>,
    /// Distortion at the end, 0-100
    pub distortion_end: Option<f64>,
    /// Output gain, 0.1-5
    pub gain: Option<f64>,
    /// Envelope slope, 0.01-1
    pub envelope_slope: Option<f64>,
    /// Noise amount, 0-1
    pub noise: Option<f64>,
    /// Click amount, 0-1
    pub click: Option<f64>,
    /// Frequency sweep slope, 0.001-1
    pub freq_slope: Option<f64>,
    /// Start the sweep at the played note
    pub start_from_note: Option<bool>,
    /// End the sweep at the played note
    pub end_to_note: Option<bool>,
}

impl KickerSettings {
    fn apply(&self, kicker: &mut Kicker) {
        let fields = [
            (self.start_freq, &mut kicker.start_freq),
            (self.end_freq, &mut kicker.end_freq),
            (self.decay, &mut kicker.decay),
            (self.distortion, &mut kicker.distortion),
            (self.distortion_end, &mut kicker.distortion_end),
            (self.gain, &mut kicker.gain),
            (self.envelope_slope, &mut kicker.envelope_slope),
            (self.noise, &mut kicker.noise),
            (self.click, &mut kicker.click),
            (self.freq_slope, &mut kicker.freq_slope),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(v) = self.start_from_note {
            kicker.start_from_note = v;
        }
        if let Some(v) = self.end_to_note {
            kicker.end_to_note = v;
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct AddKickerParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track name (default "Kick")
    pub name: Option<String>,
    #[serde(flatten)]
    pub settings: KickerSettings,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetKickerParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Kicker track id
    pub track_id: usize,
    #[serde(flatten)]
    pub settings: KickerSettings,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddMonstroParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track name (default "Monstro")
    pub name: Option<String>,
    /// Oscillator 2 wave code, 0-14 (default 2)
    pub osc2_wave: Option<u8>,
    /// Oscillator 3 primary wave code, 0-14 (default 0)
    pub osc3_wave: Option<u8>,
    /// LFO 1 rate in ms per cycle (default 1.0)
    pub lfo1_rate: Option<f64>,
    /// LFO 2 rate in ms per cycle (default 0.5)
    pub lfo2_rate: Option<f64>,
}

fn oscillator_json(index: usize, osc: &Oscillator) -> Value {
    json!({
        "osc": index + 1,
        "wave": osc.wave_shape.name(),
        "volume": osc.volume,
        "pan": osc.pan,
        "coarse": osc.coarse,
        "fine_left": osc.fine_left,
        "fine_right": osc.fine_right,
        "phase_offset": osc.phase_offset,
        "stereo_phase": osc.stereo_phase,
    })
}

fn synth_json(synth: &TripleOscillator) -> Value {
    let oscillators: Vec<Value> = synth
        .oscillators
        .iter()
        .enumerate()
        .map(|(i, o)| oscillator_json(i, o))
        .collect();
    json!({
        "oscillators": oscillators,
        "modulation": [synth.modulation[0].name(), synth.modulation[1].name()],
    })
}

fn wrong_kind(track: &Track, expected: &'static str) -> ModelError {
    ModelError::WrongTrackKind {
        track: track.id(),
        actual: track.kind().label(),
        expected,
    }
}

fn triple_oscillator(project: &mut Project, track_id: usize) -> Result<&mut TripleOscillator, ToolError> {
    let track = project.track_mut(track_id)?;
    let err = wrong_kind(track, "tripleoscillator");
    match track.kind_mut() {
        TrackKind::TripleOscillator { synth, .. } => Ok(synth),
        _ => Err(err.into()),
    }
}

fn kicker(project: &mut Project, track_id: usize) -> Result<&mut Kicker, ToolError> {
    let track = project.track_mut(track_id)?;
    let err = wrong_kind(track, "kicker");
    match track.kind_mut() {
        TrackKind::Kicker { synth, .. } => Ok(synth),
        _ => Err(err.into()),
    }
}

pub fn add_tripleoscillator_track(project: &mut Project, params: AddTripleOscillatorParams) -> Result<Value, ToolError> {
    let mut synth = TripleOscillator::default();
    let waves = [&params.osc1_wave, &params.osc2_wave, &params.osc3_wave];
    let volumes = [params.osc1_vol, params.osc2_vol, params.osc3_vol];
    let detunes = [params.osc1_detune, params.osc2_detune, params.osc3_detune];
    for (i, osc) in synth.oscillators.iter_mut().enumerate() {
        if let Some(wave) = waves[i] {
            osc.wave_shape = wave.shape()?;
        }
        if let Some(volume) = volumes[i] {
            osc.volume = volume;
        }
        if let Some(coarse) = detunes[i] {
            osc.coarse = coarse;
        }
    }
    let algo = match &params.mod_algo {
        Some(input) => input.algo()?,
        None => ModulationAlgo::Phase,
    };
    synth.modulation = [algo; 2];

    let track = Track::new(
        params.name,
        TrackKind::TripleOscillator {
            synth,
            channel: ChannelSettings::default(),
        },
    )?;
    let id = project.add_track(track);
    let synth = triple_oscillator(project, id)?;
    let summary = synth_json(synth);
    Ok(success(json!({
        "track_id": id,
        "instrument": "tripleoscillator",
        "synth": summary,
    })))
}

pub fn set_oscillator(project: &mut Project, params: SetOscillatorParams) -> Result<Value, ToolError> {
    let index = match params.osc_num {
        1..=3 => usize::from(params.osc_num - 1),
        n => return Err(ToolError::invalid(format!("osc_num must be 1, 2 or 3, got {n}"))),
    };
    let synth = triple_oscillator(project, params.track_id)?;
    let mut osc = synth.oscillators[index].clone();
    if let Some(wave) = &params.wave {
        osc.wave_shape = wave.shape()?;
    }
    let numeric = [
        (params.volume, &mut osc.volume),
        (params.pan, &mut osc.pan),
        (params.fine_left, &mut osc.fine_left),
        (params.fine_right, &mut osc.fine_right),
        (params.phase_offset, &mut osc.phase_offset),
        (params.stereo_phase, &mut osc.stereo_phase),
    ];
    for (value, slot) in numeric {
        if let Some(v) = value {
            *slot = v;
        }
    }
    if let Some(coarse) = params.coarse {
        osc.coarse = coarse;
    }
    osc.validate()?;
    synth.oscillators[index] = osc;
    Ok(success(json!({
        "track_id": params.track_id,
        "oscillator": oscillator_json(index, &synth.oscillators[index]),
    })))
}

pub fn set_modulation(project: &mut Project, params: SetModulationParams) -> Result<Value, ToolError> {
    let algo1 = params.algo1.as_ref().map(AlgoInput::algo).transpose()?;
    let algo2 = params.algo2.as_ref().map(AlgoInput::algo).transpose()?;
    let synth = triple_oscillator(project, params.track_id)?;
    if let Some(algo) = algo1 {
        synth.modulation[0] = algo;
    }
    if let Some(algo) = algo2 {
        synth.modulation[1] = algo;
    }
    Ok(success(json!({
        "track_id": params.track_id,
        "modulation": [synth.modulation[0].name(), synth.modulation[1].name()],
    })))
}

pub fn add_kicker_track(project: &mut Project, params: AddKickerParams) -> Result<Value, ToolError> {
    let mut synth = Kicker::default();
    params.settings.apply(&mut synth);
    let track = Track::new(
        params.name.unwrap_or_else(|| "Kick".to_string()),
        TrackKind::Kicker {
            synth,
            channel: ChannelSettings::default(),
        },
    )?;
    let id = project.add_track(track);
    let synth = kicker(project, id)?;
    let summary = json!(synth);
    Ok(success(json!({
        "track_id": id,
        "instrument": "kicker",
        "kicker": summary,
    })))
}

pub fn set_kicker_params(project: &mut Project, params: SetKickerParams) -> Result<Value, ToolError> {
    let synth = kicker(project, params.track_id)?;
    let mut next = synth.clone();
    params.settings.apply(&mut next);
    next.validate()?;
    *synth = next;
    Ok(success(json!({
        "track_id": params.track_id,
        "kicker": json!(synth),
    })))
}

pub fn add_monstro_track(project: &mut Project, params: AddMonstroParams) -> Result<Value, ToolError> {
    let mut synth = Monstro::default();
    if let Some(wave) = params.osc2_wave {
        synth.osc2_wave = wave;
    }
    if let Some(wave) = params.osc3_wave {
        synth.osc3_wave1 = wave;
    }
    synth.lfos[0].rate = params.lfo1_rate.unwrap_or(1.0);
    synth.lfos[1].rate = params.lfo2_rate.unwrap_or(0.5);
    let summary = json!(synth);
    let track = Track::new(
        params.name.unwrap_or_else(|| "Monstro".to_string()),
        TrackKind::Monstro {
            synth,
            channel: ChannelSettings::default(),
        },
    )?;
    let id = project.add_track(track);
    Ok(success(json!({
        "track_id": id,
        "instrument": "monstro",
        "monstro": summary,
    })))
}

pub fn list_waveforms() -> Result<Value, ToolError> {
    let waves: Vec<Value> = WaveShape::ALL
        .iter()
        .map(|w| json!({ "code": w.code(), "name": w.name() }))
        .collect();
    let algos: Vec<Value> = ModulationAlgo::ALL
        .iter()
        .map(|a| json!({ "code": a.code(), "name": a.name() }))
        .collect();
    Ok(json!({
        "waveforms": waves,
        "modulation_algorithms": algos,
        "aliases": { "pm": "phase", "am": "amplitude" },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn synth(project: &mut Project) -> TripleOscillator {
        triple_oscillator(project, 0).unwrap().clone()
    }

    fn with_triple() -> Project {
        let mut project = Project::new("Demo");
        let params: AddTripleOscillatorParams = serde_json::from_str(
            r#"{"path": "a.mmp", "name": "Bass", "osc3_wave": "sine", "osc2_detune": -24, "mod_algo": "fm"}"#,
        )
        .unwrap();
        add_tripleoscillator_track(&mut project, params).unwrap();
        project
    }

    #[test]
    fn triple_defaults_and_overrides() {
        let mut project = with_triple();
        let s = synth(&mut project);
        assert_eq!(s.oscillators[0].wave_shape, WaveShape::Saw);
        assert_eq!(s.oscillators[2].wave_shape, WaveShape::Sine);
        assert_eq!(s.oscillators[2].volume, 50.0);
        assert_eq!(s.oscillators[1].coarse, -24);
        assert_eq!(s.modulation, [ModulationAlgo::Fm; 2]);
    }

    #[test]
    fn unknown_wave_is_rejected() {
        let mut project = Project::new("Demo");
        let params: AddTripleOscillatorParams =
            serde_json::from_str(r#"{"path": "a.mmp", "name": "Bad", "osc1_wave": "zigzag"}"#).unwrap();
        assert!(add_tripleoscillator_track(&mut project, params).is_err());
        assert!(project.tracks().is_empty());
    }

    #[test]
    fn oscillator_edits_validate_before_applying() {
        let mut project = with_triple();
        let params: SetOscillatorParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "osc_num": 2, "wave": 3, "volume": 250}"#,
        )
        .unwrap();
        assert!(set_oscillator(&mut project, params).is_err());
        assert_eq!(synth(&mut project).oscillators[1].wave_shape, WaveShape::Saw);

        let params: SetOscillatorParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "osc_num": 2, "wave": 3, "pan": -40}"#,
        )
        .unwrap();
        set_oscillator(&mut project, params).unwrap();
        let osc = &synth(&mut project).oscillators[1];
        assert_eq!((osc.wave_shape, osc.pan), (WaveShape::Square, -40.0));

        let params: SetOscillatorParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "osc_num": 4}"#).unwrap();
        assert!(set_oscillator(&mut project, params).is_err());
    }

    #[test]
    fn modulation_accepts_aliases() {
        let mut project = with_triple();
        let params: SetModulationParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "algo2": "am"}"#).unwrap();
        set_modulation(&mut project, params).unwrap();
        assert_eq!(synth(&mut project).modulation, [ModulationAlgo::Fm, ModulationAlgo::Amplitude]);
    }

    #[test]
    fn kicker_settings() {
        let mut project = Project::new("Demo");
        let params: AddKickerParams =
            serde_json::from_str(r#"{"path": "a.mmp", "end_freq": 45, "click": 0.4}"#).unwrap();
        add_kicker_track(&mut project, params).unwrap();
        assert_eq!(project.tracks()[0].name, "Kick");

        let params: SetKickerParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "decay": 9000}"#).unwrap();
        assert!(set_kicker_params(&mut project, params).is_err());
        let params: SetKickerParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "decay": 450, "end_to_note": true}"#)
                .unwrap();
        set_kicker_params(&mut project, params).unwrap();
        let k = kicker(&mut project, 0).unwrap();
        assert_eq!((k.end_freq, k.click, k.decay, k.end_to_note), (45.0, 0.4, 450.0, true));
    }

    #[test]
    fn monstro_defaults() {
        let mut project = Project::new("Demo");
        let params: AddMonstroParams =
            serde_json::from_str(r#"{"path": "a.mmp", "osc3_wave": 4}"#).unwrap();
        add_monstro_track(&mut project, params).unwrap();
        match project.tracks()[0].kind() {
            TrackKind::Monstro { synth, .. } => {
                assert_eq!(synth.osc3_wave1, 4);
                assert_eq!(synth.lfos[1].rate, 0.5);
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(kicker(&mut project, 0).is_err());
    }
}
