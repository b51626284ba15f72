//! Notes and note-name parsing.

use serde::{Deserialize, Serialize};

use super::validate;
use crate::error::ModelError;

/// Chromatic note names using sharps, indexed by semitone.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave assumed when a note name omits it.
pub const DEFAULT_OCTAVE: i32 = 4;

/// Default note velocity.
pub const DEFAULT_VELOCITY: u8 = 100;

/// A pitch given either as a MIDI number or as a note name like `"C#4"` or `"Bb3"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PitchSpec {
    Midi(i64),
    Name(String),
}

impl PitchSpec {
    /// Resolve to a MIDI number in `0..=127`.
    pub fn resolve(&self) -> Result<u8, ModelError> {
        let midi = match self {
            PitchSpec::Midi(n) => *n,
            PitchSpec::Name(name) => i64::from(parse_note_name(name)?),
        };
        let midi = validate::within("pitch", midi, 0..=127, "0..=127")?;
        Ok(midi as u8)
    }
}

impl From<i64> for PitchSpec {
    fn from(value: i64) -> Self {
        PitchSpec::Midi(value)
    }
}

impl From<i32> for PitchSpec {
    fn from(value: i32) -> Self {
        PitchSpec::Midi(i64::from(value))
    }
}

impl From<u8> for PitchSpec {
    fn from(value: u8) -> Self {
        PitchSpec::Midi(i64::from(value))
    }
}

impl From<&str> for PitchSpec {
    fn from(value: &str) -> Self {
        PitchSpec::Name(value.to_string())
    }
}

impl From<String> for PitchSpec {
    fn from(value: String) -> Self {
        PitchSpec::Name(value)
    }
}

/// Convert a MIDI number or note name to a MIDI pitch.
///
/// Names are case-insensitive, flats are folded to sharps, and the octave
/// defaults to 4: `midi = (octave + 1) * 12 + semitone`.
///
/// ```
/// use lmms_project::model::parse_pitch;
///
/// assert_eq!(parse_pitch("C4").unwrap(), 60);
/// assert_eq!(parse_pitch("A4").unwrap(), 69);
/// assert_eq!(parse_pitch("C#4").unwrap(), 61);
/// assert_eq!(parse_pitch(60).unwrap(), 60);
/// ```
pub fn parse_pitch(pitch: impl Into<PitchSpec>) -> Result<u8, ModelError> {
    pitch.into().resolve()
}

/// Convert a MIDI pitch to a sharp-based note name (`60` -> `"C4"`).
pub fn pitch_to_name(pitch: u8) -> String {
    let octave = i32::from(pitch / 12) - 1;
    format!("{}{}", NOTE_NAMES[usize::from(pitch % 12)], octave)
}

/// Parse a note name into a (possibly out-of-range) MIDI number.
fn parse_note_name(name: &str) -> Result<i32, ModelError> {
    let invalid = || ModelError::InvalidNoteName(name.to_string());
    let upper = name.trim().to_uppercase();
    let mut chars = upper.chars().peekable();

    let letter = chars.next().ok_or_else(invalid)?;
    let natural = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(invalid()),
    };

    let rest: String = chars.collect();
    let (semitone, octave_text) = if let Some(rest) = rest.strip_prefix('#') {
        (natural + 1, rest)
    } else if let Some(rest) = rest.strip_prefix('B') {
        // Uppercased flat: "BB3" is B-flat 3.
        (natural - 1, rest)
    } else {
        (natural, rest.as_str())
    };

    let octave = if octave_text.is_empty() {
        DEFAULT_OCTAVE
    } else {
        octave_text.parse::<i32>().map_err(|_| invalid())?
    };

    // Flats below C wrap into the previous octave (Cb4 == B3).
    octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|base| base.checked_add(semitone))
        .ok_or_else(invalid)
}

/// A single note inside a [`Pattern`](super::Pattern).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pitch: u8,
    start: f64,
    length: f64,
    velocity: u8,
    pan: f64,
}

impl Note {
    /// Create a note with default velocity and centered pan.
    pub fn new(pitch: u8, start: f64, length: f64) -> Result<Self, ModelError> {
        Ok(Self {
            pitch: validate::within("pitch", pitch, 0..=127, "0..=127")?,
            start: validate::at_least("start", start, 0.0, ">= 0")?,
            length: validate::positive("length", length)?,
            velocity: DEFAULT_VELOCITY,
            pan: 0.0,
        })
    }

    /// Builder-style velocity override.
    pub fn with_velocity(mut self, velocity: u8) -> Result<Self, ModelError> {
        self.velocity = validate::within("velocity", velocity, 0..=127, "0..=127")?;
        Ok(self)
    }

    /// Builder-style pan override.
    pub fn with_pan(mut self, pan: f64) -> Result<Self, ModelError> {
        self.pan = validate::pan("pan", pan)?;
        Ok(self)
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    /// Start in beats.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Length in beats.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    /// Note name such as `"C4"`.
    pub fn name(&self) -> String {
        pitch_to_name(self.pitch)
    }

    /// Start plus length, in beats.
    pub fn end(&self) -> f64 {
        self.start + self.length
    }

    /// Move the note by `semitones`, failing if it leaves the MIDI range.
    pub fn transposed(&self, semitones: i32) -> Result<Self, ModelError> {
        let pitch = validate::within(
            "pitch",
            i32::from(self.pitch) + semitones,
            0..=127,
            "0..=127",
        )?;
        Ok(Self {
            pitch: pitch as u8,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pitch_reference_values() {
        assert_eq!(parse_pitch("C4").unwrap(), 60);
        assert_eq!(parse_pitch("A4").unwrap(), 69);
        assert_eq!(parse_pitch("C#4").unwrap(), 61);
        assert_eq!(parse_pitch(60).unwrap(), 60);
    }

    #[test]
    fn parse_pitch_flats_and_defaults() {
        assert_eq!(parse_pitch("Bb3").unwrap(), 58);
        assert_eq!(parse_pitch("eb4").unwrap(), 63);
        assert_eq!(parse_pitch("G").unwrap(), 67);
        assert_eq!(parse_pitch("C-1").unwrap(), 0);
        assert_eq!(parse_pitch("G9").unwrap(), 127);
    }

    #[test]
    fn parse_pitch_rejects_garbage() {
        assert!(matches!(
            parse_pitch("H2"),
            Err(ModelError::InvalidNoteName(_))
        ));
        assert!(parse_pitch("").is_err());
        assert!(parse_pitch("C#x").is_err());
        assert!(matches!(
            parse_pitch(128),
            Err(ModelError::OutOfRange { field: "pitch", .. })
        ));
        assert!(parse_pitch("A9").is_err());
    }

    #[test]
    fn parse_pitch_rejects_huge_octaves() {
        for name in ["C2147483647", "B2147483646", "C-2147483648", "C99999999999"] {
            assert!(
                matches!(parse_pitch(name), Err(ModelError::InvalidNoteName(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn pitch_name_roundtrip() {
        for pitch in 0..=127u8 {
            assert_eq!(parse_pitch(pitch_to_name(pitch)).unwrap(), pitch);
        }
    }

    #[test]
    fn note_validation() {
        assert!(Note::new(60, 0.0, 1.0).is_ok());
        assert!(Note::new(128, 0.0, 1.0).is_err());
        assert!(Note::new(60, -0.5, 1.0).is_err());
        assert!(Note::new(60, 0.0, 0.0).is_err());
        assert!(Note::new(60, 0.0, 1.0).unwrap().with_velocity(200).is_err());
        assert!(Note::new(60, 0.0, 1.0).unwrap().with_pan(1.5).is_err());
    }

    #[test]
    fn note_defaults() {
        let note = Note::new(64, 1.5, 2.0).unwrap();
        assert_eq!(note.velocity(), 100);
        assert_eq!(note.pan(), 0.0);
        assert_eq!(note.name(), "E4");
        assert_eq!(note.end(), 3.5);
    }

    #[test]
    fn transpose_keeps_timing() {
        let note = Note::new(60, 2.0, 0.5).unwrap().with_velocity(90).unwrap();
        let up = note.transposed(7).unwrap();
        assert_eq!(up.pitch(), 67);
        assert_eq!(up.start(), 2.0);
        assert_eq!(up.velocity(), 90);
        assert!(note.transposed(100).is_err());
    }
}
