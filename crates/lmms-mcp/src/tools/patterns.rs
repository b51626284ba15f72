use lmms_project::model::{parse_pitch, pitch_to_name};
use lmms_project::theory::{build_chord, build_scale};
use lmms_project::{ModelError, Note, Pattern, PitchSpec, Project};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::error::ToolError;

/// A pitch as a MIDI number (0-127) or a note name like "C4", "F#3" or "Bb2".
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PitchInput {
    Midi(i64),
    Name(String),
}

impl From<PitchInput> for PitchSpec {
    fn from(value: PitchInput) -> Self {
        match value {
            PitchInput::Midi(n) => PitchSpec::Midi(n),
            PitchInput::Name(name) => PitchSpec::Name(name),
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct NoteInput {
    /// MIDI note number or note name
    pub pitch: PitchInput,
    /// Start time in beats from the pattern start
    pub start: f64,
    /// Duration in beats
    pub length: f64,
    /// Velocity 0-127 (default 100)
    pub velocity: Option<u8>,
    /// Pan from -1.0 to 1.0 (default 0)
    pub pan: Option<f64>,
}

#[derive(Deserialize, JsonSchema)]
pub struct CreatePatternParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track to add the pattern to
    pub track_id: usize,
    /// Pattern name
    pub name: String,
    /// Start position in bars (default 0)
    pub position: Option<u32>,
    /// Length in bars (default 4)
    pub length: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
pub struct PatternParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track holding the pattern
    pub track_id: usize,
    /// Pattern id on that track
    pub pattern_id: usize,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddNotesParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track holding the pattern
    pub track_id: usize,
    /// Pattern id on that track
    pub pattern_id: usize,
    /// Notes to add
    pub notes: Vec<NoteInput>,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddChordParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track holding the pattern
    pub track_id: usize,
    /// Pattern id on that track
    pub pattern_id: usize,
    /// Chord root, e.g. "C4" or 60
    pub root: PitchInput,
    /// Chord type: maj, min, dim, aug, maj7, min7, dom7, sus2, sus4, ...
    pub chord_type: String,
    /// Start time in beats
    pub start: f64,
    /// Duration in beats
    pub length: f64,
    /// Velocity 0-127 (default 100)
    pub velocity: Option<u8>,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddScaleRunParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track holding the pattern
    pub track_id: usize,
    /// Pattern id on that track
    pub pattern_id: usize,
    /// Scale root, e.g. "A3" or 57
    pub root: PitchInput,
    /// Scale type: major, minor, dorian, pentatonic, blues, ...
    pub scale_type: String,
    /// Start time of the first note in beats (default 0)
    pub start: Option<f64>,
    /// Duration of each note in beats (default 0.5)
    pub note_length: Option<f64>,
    /// Number of octaves (default 1)
    pub octaves: Option<u32>,
    /// Play the run from the top down (default false)
    pub descending: Option<bool>,
    /// Velocity 0-127 (default 100)
    pub velocity: Option<u8>,
}

fn note(pitch: u8, start: f64, length: f64, velocity: Option<u8>) -> Result<Note, ModelError> {
    let note = Note::new(pitch, start, length)?;
    match velocity {
        Some(v) => note.with_velocity(v),
        None => Ok(note),
    }
}

fn pattern_mut(project: &mut Project, track_id: usize, pattern_id: usize) -> Result<&mut Pattern, ToolError> {
    Ok(project.track_mut(track_id)?.pattern_mut(pattern_id)?)
}

pub fn create_pattern(project: &mut Project, params: CreatePatternParams) -> Result<Value, ToolError> {
    let pattern = Pattern::new(params.name, params.position.unwrap_or(0), params.length.unwrap_or(4))?;
    let track = project.track_mut(params.track_id)?;
    let id = track.add_pattern(pattern)?;
    Ok(success(json!({
        "track_id": params.track_id,
        "pattern_id": id,
        "pattern": track.pattern(id)?.describe(),
    })))
}

/// Adds all notes or none: every note is validated before the pattern changes.
pub fn add_notes(project: &mut Project, params: AddNotesParams) -> Result<Value, ToolError> {
    let notes = params
        .notes
        .into_iter()
        .map(|n| {
            let built = note(PitchSpec::from(n.pitch).resolve()?, n.start, n.length, n.velocity)?;
            match n.pan {
                Some(pan) => built.with_pan(pan),
                None => Ok(built),
            }
        })
        .collect::<Result<Vec<_>, ModelError>>()?;
    let added = notes.len();
    let pattern = pattern_mut(project, params.track_id, params.pattern_id)?;
    pattern.extend_notes(notes);
    Ok(success(json!({
        "notes_added": added,
        "pattern": pattern.describe(),
    })))
}

pub fn add_chord(project: &mut Project, params: AddChordParams) -> Result<Value, ToolError> {
    let pitches = build_chord(PitchSpec::from(params.root), &params.chord_type)?;
    let notes = pitches
        .iter()
        .map(|p| note(parse_pitch(*p)?, params.start, params.length, params.velocity))
        .collect::<Result<Vec<_>, ModelError>>()?;
    let names: Vec<String> = notes.iter().map(Note::name).collect();
    let pattern = pattern_mut(project, params.track_id, params.pattern_id)?;
    pattern.extend_notes(notes);
    Ok(success(json!({
        "chord": params.chord_type,
        "notes": names,
        "pattern": pattern.describe(),
    })))
}

pub fn add_scale_run(project: &mut Project, params: AddScaleRunParams) -> Result<Value, ToolError> {
    let mut pitches = build_scale(
        PitchSpec::from(params.root),
        &params.scale_type,
        params.octaves.unwrap_or(1).max(1),
    )?;
    if params.descending.unwrap_or(false) {
        pitches.reverse();
    }
    let start = params.start.unwrap_or(0.0);
    let step = params.note_length.unwrap_or(0.5);
    let notes = pitches
        .iter()
        .enumerate()
        .map(|(i, p)| note(parse_pitch(*p)?, start + i as f64 * step, step, params.velocity))
        .collect::<Result<Vec<_>, ModelError>>()?;
    let names: Vec<String> = notes.iter().map(Note::name).collect();
    let pattern = pattern_mut(project, params.track_id, params.pattern_id)?;
    pattern.extend_notes(notes);
    Ok(success(json!({
        "scale": params.scale_type,
        "notes": names,
        "pattern": pattern.describe(),
    })))
}

pub fn describe_pattern(project: &Project, track_id: usize, pattern_id: usize) -> Result<Value, ToolError> {
    let pattern = project.track(track_id)?.pattern(pattern_id)?;
    let notes: Vec<Value> = pattern
        .notes()
        .iter()
        .map(|n| {
            json!({
                "pitch": n.pitch(),
                "name": pitch_to_name(n.pitch()),
                "start": n.start(),
                "length": n.length(),
                "velocity": n.velocity(),
                "pan": n.pan(),
            })
        })
        .collect();
    Ok(json!({
        "pattern": pattern.describe(),
        "notes": notes,
        "description": pattern.to_description(),
    }))
}

pub fn clear_pattern(project: &mut Project, track_id: usize, pattern_id: usize) -> Result<Value, ToolError> {
    let pattern = pattern_mut(project, track_id, pattern_id)?;
    let removed = pattern.notes().len();
    pattern.clear();
    Ok(success(json!({ "pattern_id": pattern_id, "notes_removed": removed })))
}

pub fn remove_pattern(project: &mut Project, track_id: usize, pattern_id: usize) -> Result<Value, ToolError> {
    let track = project.track_mut(track_id)?;
    let removed = track.remove_pattern(pattern_id)?;
    Ok(success(json!({
        "removed": removed.name,
        "remaining_patterns": track.patterns().len(),
    })))
}
