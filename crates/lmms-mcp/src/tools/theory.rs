use lmms_project::model::pitch_to_name;
use lmms_project::theory;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::patterns::PitchInput;
use crate::error::ToolError;

#[derive(Deserialize, JsonSchema)]
pub struct BuildChordParams {
    /// Chord root, e.g. "C4" or 60
    pub root: PitchInput,
    /// Chord type: maj, min, dim, aug, sus2, sus4, maj7, min7, dom7, dim7, m7b5, maj9, min9, add9, 6, min6
    pub chord_type: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct BuildScaleParams {
    /// Scale root, e.g. "C4" or 60
    pub root: PitchInput,
    /// Scale type: major, minor, harmonic_minor, melodic_minor, dorian, phrygian, lydian,
    /// mixolydian, locrian, major_pentatonic, minor_pentatonic, blues, chromatic, whole_tone
    pub scale_type: String,
    /// Number of octaves (default 1)
    pub octaves: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
pub struct ChordProgressionParams {
    /// Key root, e.g. "C4" or 60
    pub root: PitchInput,
    /// Scale the degrees refer to (default major)
    pub scale_type: Option<String>,
    /// Scale degrees, 1-based, e.g. [1, 5, 6, 4]
    pub degrees: Vec<i32>,
}

/// Pitches with their note names. Pitches outside the MIDI range get no name.
fn named(pitches: &[i32]) -> Value {
    let names: Vec<Option<String>> = pitches
        .iter()
        .map(|p| u8::try_from(*p).ok().filter(|p| *p <= 127).map(pitch_to_name))
        .collect();
    json!({ "pitches": pitches, "names": names })
}

pub fn build_chord(params: BuildChordParams) -> Result<Value, ToolError> {
    let pitches = theory::build_chord(params.root, &params.chord_type)?;
    let mut out = named(&pitches);
    out["chord_type"] = json!(params.chord_type);
    Ok(out)
}

pub fn build_scale(params: BuildScaleParams) -> Result<Value, ToolError> {
    let octaves = params.octaves.unwrap_or(1).max(1);
    let pitches = theory::build_scale(params.root, &params.scale_type, octaves)?;
    let mut out = named(&pitches);
    out["scale_type"] = json!(params.scale_type);
    out["octaves"] = json!(octaves);
    Ok(out)
}

pub fn chord_progression(params: ChordProgressionParams) -> Result<Value, ToolError> {
    let scale = params.scale_type.as_deref().unwrap_or("major");
    let chords = theory::chord_progression(params.root, scale, &params.degrees)?;
    let chords: Vec<Value> = params
        .degrees
        .iter()
        .zip(&chords)
        .map(|(degree, pitches)| {
            let mut chord = named(pitches);
            chord["degree"] = json!(degree);
            chord
        })
        .collect();
    Ok(json!({ "scale_type": scale, "chords": chords }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chord_names() {
        let params: BuildChordParams =
            serde_json::from_str(r#"{"root": "C4", "chord_type": "maj7"}"#).unwrap();
        let out = build_chord(params).unwrap();
        assert_eq!(out["pitches"], json!([60, 64, 67, 71]));
        assert_eq!(out["names"], json!(["C4", "E4", "G4", "B4"]));
    }

    #[test]
    fn two_octave_scale() {
        let params: BuildScaleParams =
            serde_json::from_str(r#"{"root": 57, "scale_type": "minor_pentatonic", "octaves": 2}"#)
                .unwrap();
        let out = build_scale(params).unwrap();
        assert_eq!(out["pitches"].as_array().unwrap().len(), 10);
        assert_eq!(out["names"][0], "A3");
    }

    #[test]
    fn oversized_scale_is_rejected() {
        let params: BuildScaleParams =
            serde_json::from_str(r#"{"root": "C4", "scale_type": "major", "octaves": 2000000000}"#)
                .unwrap();
        let err = build_scale(params).unwrap_err();
        assert!(err.to_string().contains("octaves"), "{err}");
    }

    #[test]
    fn progression_in_c_major() {
        let params: ChordProgressionParams =
            serde_json::from_str(r#"{"root": "C4", "degrees": [1, 5, 6, 4]}"#).unwrap();
        let out = chord_progression(params).unwrap();
        assert_eq!(out["chords"][1]["pitches"], json!([67, 71, 74]));
        assert_eq!(out["chords"][2]["names"], json!(["A4", "C5", "E5"]));
        assert_eq!(out["chords"][3]["degree"], 4);
    }

    #[test]
    fn unknown_chord_is_an_error() {
        let params: BuildChordParams =
            serde_json::from_str(r#"{"root": 60, "chord_type": "mystery"}"#).unwrap();
        assert!(build_chord(params).is_err());
    }
}
