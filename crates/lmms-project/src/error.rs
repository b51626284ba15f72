//! Error types for model validation and project file translation.

use thiserror::Error;

/// Errors raised while constructing or mutating the typed project model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A numeric field fell outside its documented range.
    #[error("{field} must be in {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A note name could not be resolved to a MIDI pitch.
    #[error("invalid note name: {0:?}")]
    InvalidNoteName(String),

    /// Chord type not present in the chord table.
    #[error("unknown chord type: {0}")]
    UnknownChord(String),

    /// Scale type not present in the scale table.
    #[error("unknown scale type: {0}")]
    UnknownScale(String),

    /// Scale degree outside the two-octave window.
    #[error("degree {degree} out of range for {scale} scale")]
    ScaleDegreeOutOfRange { degree: i32, scale: String },

    /// Unknown name in one of the lookup tables (filter types, waveforms, ...).
    #[error("unknown {table} name: {name}")]
    UnknownName { table: &'static str, name: String },

    /// No track with the given id.
    #[error("track {0} not found")]
    TrackNotFound(usize),

    /// No pattern with the given id on the track.
    #[error("pattern {pattern} not found on track {track}")]
    PatternNotFound { track: usize, pattern: usize },

    /// No clip with the given id on the automation track.
    #[error("automation clip {0} not found")]
    ClipNotFound(usize),

    /// No row with the given id on the Beat+Bassline track.
    #[error("beat/bassline row {0} not found")]
    RowNotFound(usize),

    /// No effect at the given index in the chain.
    #[error("effect index {0} out of range")]
    EffectNotFound(usize),

    /// The operation needs a different track kind.
    #[error("track {track} is a {actual} track, expected {expected}")]
    WrongTrackKind {
        track: usize,
        actual: &'static str,
        expected: &'static str,
    },
}

/// Errors raised while reading a project file into the model.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read project: {0}")]
    Io(#[from] std::io::Error),

    #[error("compressed project is truncated ({0} bytes, need at least 4)")]
    Truncated(usize),

    #[error("failed to inflate compressed project: {0}")]
    Decompress(std::io::Error),

    #[error("project XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("malformed project XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid value {value:?} for attribute `{attribute}` on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("invalid project: {0}")]
    Model(#[from] ModelError),
}

/// Errors raised while writing the model back to a project file.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write project: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize project XML: {0}")]
    XmlWrite(#[from] quick_xml::Error),

    /// The preserved source document no longer parses or lacks the song track container.
    #[error("preserved source document is unusable: {0}")]
    Source(String),

    #[error("invalid project: {0}")]
    Model(#[from] ModelError),
}

impl DecodeError {
    pub(crate) fn invalid_attribute(element: &str, attribute: &str, value: &str) -> Self {
        DecodeError::InvalidAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_field() {
        let err = ModelError::OutOfRange {
            field: "bpm",
            value: "1000".into(),
            expected: "20..=999",
        };
        assert_eq!(err.to_string(), "bpm must be in 20..=999, got 1000");
    }

    #[test]
    fn model_error_converts_into_decode_error() {
        let err: DecodeError = ModelError::TrackNotFound(3).into();
        assert!(matches!(err, DecodeError::Model(ModelError::TrackNotFound(3))));
        assert_eq!(err.to_string(), "invalid project: track 3 not found");
    }
}
