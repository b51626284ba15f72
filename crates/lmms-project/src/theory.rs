//! Chord and scale helpers for building note material.

use crate::error::ModelError;
use crate::model::validate;
use crate::model::PitchSpec;

/// Widest scale [`build_scale`] produces; ten octaves cover the MIDI range.
pub const MAX_OCTAVES: u32 = 10;

/// Chord types as semitone offsets from the root.
pub const CHORD_INTERVALS: &[(&str, &[i32])] = &[
    ("maj", &[0, 4, 7]),
    ("min", &[0, 3, 7]),
    ("dim", &[0, 3, 6]),
    ("aug", &[0, 4, 8]),
    ("sus2", &[0, 2, 7]),
    ("sus4", &[0, 5, 7]),
    ("maj7", &[0, 4, 7, 11]),
    ("min7", &[0, 3, 7, 10]),
    ("dom7", &[0, 4, 7, 10]),
    ("7", &[0, 4, 7, 10]),
    ("dim7", &[0, 3, 6, 9]),
    ("m7b5", &[0, 3, 6, 10]),
    ("maj9", &[0, 4, 7, 11, 14]),
    ("min9", &[0, 3, 7, 10, 14]),
    ("dom9", &[0, 4, 7, 10, 14]),
    ("add9", &[0, 4, 7, 14]),
    ("6", &[0, 4, 7, 9]),
    ("min6", &[0, 3, 7, 9]),
];

/// Scale types as semitone offsets from the root.
pub const SCALE_INTERVALS: &[(&str, &[i32])] = &[
    ("major", &[0, 2, 4, 5, 7, 9, 11]),
    ("minor", &[0, 2, 3, 5, 7, 8, 10]),
    ("harmonic_minor", &[0, 2, 3, 5, 7, 8, 11]),
    ("melodic_minor", &[0, 2, 3, 5, 7, 9, 11]),
    ("dorian", &[0, 2, 3, 5, 7, 9, 10]),
    ("phrygian", &[0, 1, 3, 5, 7, 8, 10]),
    ("lydian", &[0, 2, 4, 6, 7, 9, 11]),
    ("mixolydian", &[0, 2, 4, 5, 7, 9, 10]),
    ("locrian", &[0, 1, 3, 5, 6, 8, 10]),
    ("minor_pentatonic", &[0, 3, 5, 7, 10]),
    ("major_pentatonic", &[0, 2, 4, 7, 9]),
    ("blues", &[0, 3, 5, 6, 7, 10]),
    ("chromatic", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
    ("whole_tone", &[0, 2, 4, 6, 8, 10]),
];

fn chord_intervals(chord: &str) -> Result<&'static [i32], ModelError> {
    let key = chord.to_lowercase().replace(['-', '_'], "");
    CHORD_INTERVALS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, intervals)| *intervals)
        .ok_or_else(|| ModelError::UnknownChord(chord.to_string()))
}

fn scale_intervals(scale: &str) -> Result<&'static [i32], ModelError> {
    let key = normalize_scale(scale);
    SCALE_INTERVALS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, intervals)| *intervals)
        .ok_or_else(|| ModelError::UnknownScale(scale.to_string()))
}

fn normalize_scale(scale: &str) -> String {
    scale.to_lowercase().replace('-', "_")
}

/// Offsets of `intervals` from `root`. Pitches past the MIDI range are kept
/// as `i32` so callers can decide whether to clip or fail.
fn stack(root: i32, intervals: &[i32], octave: i32) -> impl Iterator<Item = i32> + '_ {
    intervals.iter().map(move |i| root + i + octave * 12)
}

/// MIDI pitches of a chord built on `root`.
///
/// ```
/// use lmms_project::theory::build_chord;
///
/// assert_eq!(build_chord("C4", "maj").unwrap(), vec![60, 64, 67]);
/// assert_eq!(build_chord(57, "min7").unwrap(), vec![57, 60, 64, 67]);
/// ```
pub fn build_chord(root: impl Into<PitchSpec>, chord: &str) -> Result<Vec<i32>, ModelError> {
    let root = i32::from(root.into().resolve()?);
    Ok(stack(root, chord_intervals(chord)?, 0).collect())
}

/// MIDI pitches of a scale spanning `octaves` octaves from `root`.
pub fn build_scale(
    root: impl Into<PitchSpec>,
    scale: &str,
    octaves: u32,
) -> Result<Vec<i32>, ModelError> {
    let octaves = validate::within("octaves", octaves, 1..=MAX_OCTAVES, "1..=10")?;
    let root = i32::from(root.into().resolve()?);
    let intervals = scale_intervals(scale)?;
    Ok((0..octaves as i32)
        .flat_map(|octave| stack(root, intervals, octave))
        .collect())
}

/// The 1-indexed `degree` of a scale, looking up to two octaves above the root.
pub fn scale_degree(
    root: impl Into<PitchSpec>,
    scale: &str,
    degree: i32,
) -> Result<i32, ModelError> {
    let notes = build_scale(root, scale, 2)?;
    degree
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| notes.get(i).copied())
        .ok_or_else(|| ModelError::ScaleDegreeOutOfRange {
            degree,
            scale: scale.to_string(),
        })
}

/// Diatonic chord quality for a degree of a major or minor scale.
fn diatonic_quality(scale: &str, degree: i32) -> &'static str {
    match (normalize_scale(scale).as_str(), degree) {
        ("major", 2 | 3 | 6) => "min",
        ("major", 7) => "dim",
        ("major", _) => "maj",
        ("minor", 1 | 4 | 5) => "min",
        ("minor", 2) => "dim",
        ("minor", 3 | 6 | 7) => "maj",
        ("minor", _) => "min",
        _ => "maj",
    }
}

/// Chord built on scale degree `degree`, with a diatonic quality unless
/// `chord` overrides it.
pub fn chord_in_key(
    root: impl Into<PitchSpec>,
    scale: &str,
    degree: i32,
    chord: Option<&str>,
) -> Result<Vec<i32>, ModelError> {
    let chord_root = scale_degree(root, scale, degree)?;
    let pitch = u8::try_from(chord_root).map_err(|_| ModelError::OutOfRange {
        field: "pitch",
        value: chord_root.to_string(),
        expected: "0..=127",
    })?;
    let quality = chord.unwrap_or_else(|| diatonic_quality(scale, degree));
    build_chord(pitch, quality)
}

/// A progression of diatonic chords, e.g. degrees `[1, 5, 6, 4]`.
pub fn chord_progression(
    root: impl Into<PitchSpec>,
    scale: &str,
    degrees: &[i32],
) -> Result<Vec<Vec<i32>>, ModelError> {
    let root = root.into();
    degrees
        .iter()
        .map(|degree| chord_in_key(root.clone(), scale, *degree, None))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chords() {
        assert_eq!(build_chord("C4", "maj").unwrap(), vec![60, 64, 67]);
        assert_eq!(build_chord("A3", "min").unwrap(), vec![57, 60, 64]);
        assert_eq!(build_chord(60, "dom7").unwrap(), build_chord(60, "7").unwrap());
        assert_eq!(build_chord(60, "Maj-7").unwrap(), vec![60, 64, 67, 71]);
        assert!(matches!(
            build_chord(60, "mystery"),
            Err(ModelError::UnknownChord(_))
        ));
    }

    #[test]
    fn scales() {
        assert_eq!(
            build_scale("C4", "major", 1).unwrap(),
            vec![60, 62, 64, 65, 67, 69, 71]
        );
        assert_eq!(build_scale(60, "minor-pentatonic", 2).unwrap().len(), 10);
        assert!(build_scale(60, "klingon", 1).is_err());
    }

    #[test]
    fn scale_octaves_are_bounded() {
        assert_eq!(build_scale(0, "chromatic", MAX_OCTAVES).unwrap().len(), 120);
        for octaves in [0, MAX_OCTAVES + 1, 2_000_000_000] {
            assert!(matches!(
                build_scale(60, "major", octaves),
                Err(ModelError::OutOfRange { field: "octaves", .. })
            ));
        }
    }

    #[test]
    fn degrees() {
        assert_eq!(scale_degree("C4", "major", 1).unwrap(), 60);
        assert_eq!(scale_degree("C4", "major", 8).unwrap(), 72);
        assert!(scale_degree("C4", "major", 0).is_err());
        assert!(scale_degree("C4", "major", 15).is_err());
        for degree in [i32::MIN, -1, i32::MAX] {
            assert!(matches!(
                scale_degree("C4", "major", degree),
                Err(ModelError::ScaleDegreeOutOfRange { .. })
            ));
        }
        assert!(chord_progression("C4", "major", &[1, i32::MIN]).is_err());
    }

    #[test]
    fn diatonic_chords() {
        assert_eq!(chord_in_key("C4", "major", 2, None).unwrap(), vec![62, 65, 69]);
        assert_eq!(chord_in_key("C4", "major", 7, None).unwrap(), vec![71, 74, 77]);
        assert_eq!(chord_in_key("A3", "minor", 3, None).unwrap(), vec![60, 64, 67]);
        assert_eq!(
            chord_in_key("C4", "major", 5, Some("dom7")).unwrap(),
            vec![67, 71, 74, 77]
        );
    }

    #[test]
    fn progression() {
        let chords = chord_progression("C4", "major", &[1, 5, 6, 4]).unwrap();
        assert_eq!(
            chords,
            vec![
                vec![60, 64, 67],
                vec![67, 71, 74],
                vec![69, 72, 76],
                vec![65, 69, 72],
            ]
        );
    }
}
