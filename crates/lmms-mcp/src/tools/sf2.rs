use lmms_project::{ModelError, Project, Sf2Instrument, Track, TrackKind};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::error::ToolError;

/// General MIDI program families, eight programs each.
const GM_FAMILIES: [&str; 16] = [
    "piano",
    "chromatic_percussion",
    "organ",
    "guitar",
    "bass",
    "strings",
    "ensemble",
    "brass",
    "reed",
    "pipe",
    "synth_lead",
    "synth_pad",
    "synth_effects",
    "ethnic",
    "percussive",
    "sound_effects",
];

const GM_PROGRAMS: [&str; 128] = [
    "Acoustic Grand Piano",
    "Bright Acoustic Piano",
    "Electric Grand Piano",
    "Honky-tonk Piano",
    "Electric Piano 1",
    "Electric Piano 2",
    "Harpsichord",
    "Clavinet",
    "Celesta",
    "Glockenspiel",
    "Music Box",
    "Vibraphone",
    "Marimba",
    "Xylophone",
    "Tubular Bells",
    "Dulcimer",
    "Drawbar Organ",
    "Percussive Organ",
    "Rock Organ",
    "Church Organ",
    "Reed Organ",
    "Accordion",
    "Harmonica",
    "Tango Accordion",
    "Acoustic Guitar (nylon)",
    "Acoustic Guitar (steel)",
    "Electric Guitar (jazz)",
    "Electric Guitar (clean)",
    "Electric Guitar (muted)",
    "Overdriven Guitar",
    "Distortion Guitar",
    "Guitar Harmonics",
    "Acoustic Bass",
    "Electric Bass (finger)",
    "Electric Bass (pick)",
    "Fretless Bass",
    "Slap Bass 1",
    "Slap Bass 2",
    "Synth Bass 1",
    "Synth Bass 2",
    "Violin",
    "Viola",
    "Cello",
    "Contrabass",
    "Tremolo Strings",
    "Pizzicato Strings",
    "Orchestral Harp",
    "Timpani",
    "String Ensemble 1",
    "String Ensemble 2",
    "Synth Strings 1",
    "Synth Strings 2",
    "Choir Aahs",
    "Voice Oohs",
    "Synth Voice",
    "Orchestra Hit",
    "Trumpet",
    "Trombone",
    "Tuba",
    "Muted Trumpet",
    "French Horn",
    "Brass Section",
    "Synth Brass 1",
    "Synth Brass 2",
    "Soprano Sax",
    "Alto Sax",
    "Tenor Sax",
    "Baritone Sax",
    "Oboe",
    "English Horn",
    "Bassoon",
    "Clarinet",
    "Piccolo",
    "Flute",
    "Recorder",
    "Pan Flute",
    "Blown Bottle",
    "Shakuhachi",
    "Whistle",
    "Ocarina",
    "Lead 1 (square)",
    "Lead 2 (sawtooth)",
    "Lead 3 (calliope)",
    "Lead 4 (chiff)",
    "Lead 5 (charang)",
    "Lead 6 (voice)",
    "Lead 7 (fifths)",
    "Lead 8 (bass + lead)",
    "Pad 1 (new age)",
    "Pad 2 (warm)",
    "Pad 3 (polysynth)",
    "Pad 4 (choir)",
    "Pad 5 (bowed)",
    "Pad 6 (metallic)",
    "Pad 7 (halo)",
    "Pad 8 (sweep)",
    "FX 1 (rain)",
    "FX 2 (soundtrack)",
    "FX 3 (crystal)",
    "FX 4 (atmosphere)",
    "FX 5 (brightness)",
    "FX 6 (goblins)",
    "FX 7 (echoes)",
    "FX 8 (sci-fi)",
    "Sitar",
    "Banjo",
    "Shamisen",
    "Koto",
    "Kalimba",
    "Bagpipe",
    "Fiddle",
    "Shanai",
    "Tinkle Bell",
    "Agogo",
    "Steel Drums",
    "Woodblock",
    "Taiko Drum",
    "Melodic Tom",
    "Synth Drum",
    "Reverse Cymbal",
    "Guitar Fret Noise",
    "Breath Noise",
    "Seashore",
    "Bird Tweet",
    "Telephone Ring",
    "Helicopter",
    "Applause",
    "Gunshot",
];

#[derive(Deserialize, JsonSchema)]
pub struct AddSf2TrackParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track name
    pub name: String,
    /// SoundFont file to load
    pub sf2_path: String,
    /// Bank number, 0-999 (default 0)
    pub bank: Option<u16>,
    /// Patch (program) number, 0-127 (default 0)
    pub patch: Option<u8>,
    /// Output gain, 0.0-5.0 (default 1.0)
    pub gain: Option<f64>,
    /// Enable the built-in reverb (default false)
    pub reverb_on: Option<bool>,
    /// Enable the built-in chorus (default false)
    pub chorus_on: Option<bool>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetSf2PatchParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// SF2 track id
    pub track_id: usize,
    /// Patch (program) number, 0-127
    pub patch: u8,
    /// Bank number, 0-999 (unchanged when omitted)
    pub bank: Option<u16>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetSf2EffectsParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// SF2 track id
    pub track_id: usize,
    /// Enable or disable reverb
    pub reverb_on: Option<bool>,
    /// Reverb room size, 0.0-1.0
    pub reverb_room_size: Option<f64>,
    /// Reverb damping, 0.0-1.0
    pub reverb_damping: Option<f64>,
    /// Reverb width, 0.0-1.0
    pub reverb_width: Option<f64>,
    /// Reverb level, 0.0-1.0
    pub reverb_level: Option<f64>,
    /// Enable or disable chorus
    pub chorus_on: Option<bool>,
    /// Chorus voices, 0-10
    pub chorus_voices: Option<u8>,
    /// Chorus level, 0.0-10.0
    pub chorus_level: Option<f64>,
    /// Chorus speed, 0.0-5.0
    pub chorus_speed: Option<f64>,
    /// Chorus depth, 0.0-46.0
    pub chorus_depth: Option<f64>,
}

fn sf2_mut(project: &mut Project, track_id: usize) -> Result<&mut Sf2Instrument, ToolError> {
    let track = project.track_mut(track_id)?;
    let actual = track.kind().label();
    match track.kind_mut() {
        TrackKind::Sf2(sf2) => Ok(sf2),
        _ => Err(ModelError::WrongTrackKind {
            track: track_id,
            actual,
            expected: "sf2",
        }
        .into()),
    }
}

fn gm_name(patch: u8) -> Option<&'static str> {
    GM_PROGRAMS.get(usize::from(patch)).copied()
}

fn sf2_settings(sf2: &Sf2Instrument) -> Value {
    json!({
        "sf2_path": sf2.sf2_path,
        "sf2_file": sf2.sf2_file_name(),
        "bank": sf2.bank,
        "patch": sf2.patch,
        "gm_name": if sf2.bank == 0 { gm_name(sf2.patch) } else { None },
        "gain": sf2.gain,
        "reverb": {
            "on": sf2.reverb.enabled,
            "room_size": sf2.reverb.room_size,
            "damping": sf2.reverb.damping,
            "width": sf2.reverb.width,
            "level": sf2.reverb.level,
        },
        "chorus": {
            "on": sf2.chorus.enabled,
            "voices": sf2.chorus.voices,
            "level": sf2.chorus.level,
            "speed": sf2.chorus.speed,
            "depth": sf2.chorus.depth,
        },
    })
}

pub fn add_sf2_track(project: &mut Project, params: AddSf2TrackParams) -> Result<Value, ToolError> {
    let mut sf2 = Sf2Instrument::new(params.sf2_path, params.bank.unwrap_or(0), params.patch.unwrap_or(0))?;
    sf2.gain = params.gain.unwrap_or(1.0);
    sf2.reverb.enabled = params.reverb_on.unwrap_or(false);
    sf2.chorus.enabled = params.chorus_on.unwrap_or(false);
    let settings = sf2_settings(&sf2);
    let id = project.add_track(Track::new(params.name, TrackKind::Sf2(sf2))?);
    Ok(success(json!({
        "track_id": id,
        "instrument": "sf2player",
        "sf2": settings,
    })))
}

pub fn set_sf2_patch(project: &mut Project, params: SetSf2PatchParams) -> Result<Value, ToolError> {
    let sf2 = sf2_mut(project, params.track_id)?;
    let mut next = sf2.clone();
    next.patch = params.patch;
    if let Some(bank) = params.bank {
        next.bank = bank;
    }
    next.validate()?;
    *sf2 = next;
    Ok(success(json!({
        "track_id": params.track_id,
        "sf2": sf2_settings(sf2),
    })))
}

/// Change only the reverb and chorus settings that were given.
pub fn set_sf2_effects(project: &mut Project, params: SetSf2EffectsParams) -> Result<Value, ToolError> {
    let sf2 = sf2_mut(project, params.track_id)?;
    let mut next = sf2.clone();
    let (reverb, chorus) = (&mut next.reverb, &mut next.chorus);
    let numeric = [
        (params.reverb_room_size, &mut reverb.room_size),
        (params.reverb_damping, &mut reverb.damping),
        (params.reverb_width, &mut reverb.width),
        (params.reverb_level, &mut reverb.level),
        (params.chorus_level, &mut chorus.level),
        (params.chorus_speed, &mut chorus.speed),
        (params.chorus_depth, &mut chorus.depth),
    ];
    for (value, slot) in numeric {
        if let Some(v) = value {
            *slot = v;
        }
    }
    if let Some(on) = params.reverb_on {
        reverb.enabled = on;
    }
    if let Some(on) = params.chorus_on {
        chorus.enabled = on;
    }
    if let Some(voices) = params.chorus_voices {
        chorus.voices = voices;
    }
    next.validate()?;
    *sf2 = next;
    Ok(success(json!({
        "track_id": params.track_id,
        "sf2": sf2_settings(sf2),
    })))
}

pub fn describe_sf2_track(project: &Project, track_id: usize) -> Result<Value, ToolError> {
    let track = project.track(track_id)?;
    let TrackKind::Sf2(sf2) = track.kind() else {
        return Err(ModelError::WrongTrackKind {
            track: track_id,
            actual: track.kind().label(),
            expected: "sf2",
        }
        .into());
    };
    let patterns: Vec<Value> = track.patterns().iter().map(|p| p.describe()).collect();
    Ok(json!({
        "track_id": track_id,
        "name": track.name,
        "volume": track.volume(),
        "pan": track.pan(),
        "sf2": sf2_settings(sf2),
        "pattern_count": patterns.len(),
        "patterns": patterns,
        "description": track.to_description(),
    }))
}

pub fn list_gm_patches() -> Result<Value, ToolError> {
    let families: serde_json::Map<String, Value> = GM_FAMILIES
        .iter()
        .zip(GM_PROGRAMS.chunks(8))
        .enumerate()
        .map(|(family, (name, programs))| {
            let entries: Vec<Value> = programs
                .iter()
                .enumerate()
                .map(|(i, program)| json!({ "patch": family * 8 + i, "name": program }))
                .collect();
            (name.to_string(), Value::Array(entries))
        })
        .collect();
    Ok(json!({
        "bank": 0,
        "families": families,
        "note": "Most General MIDI soundfonts use bank 0 for melodic programs and bank 128 for drum kits",
    }))
}
