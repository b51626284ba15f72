//! LMMS Project Library
//!
//! This crate provides a typed model of LMMS song projects and a translator
//! between that model and `.mmp` / `.mmpz` files.
//!
//! # Overview
//!
//! - **Model**: [`Project`] holds song settings and an ordered list of
//!   [`Track`]s. Every ranged field is validated when it is set.
//! - **Format**: [`format::decode_file`] and [`format::encode_file`] read and
//!   write project files. A decoded project remembers its source text, so
//!   re-encoding only rewrites the head and the tracks the model covers.
//! - **Theory**: chord and scale helpers in [`theory`].
//!
//! # Example
//!
//! ```
//! use lmms_project::{Note, Pattern, Project, Track};
//! use lmms_project::format::{decode_str, encode_xml};
//!
//! let mut project = Project::new("Demo");
//! project.set_bpm(128).unwrap();
//!
//! let mut lead = Track::instrument("Lead", "tripleoscillator");
//! let mut pattern = Pattern::new("Intro", 0, 1).unwrap();
//! pattern.add_note(Note::new(60, 0.0, 1.0).unwrap());
//! lead.add_pattern(pattern).unwrap();
//! project.add_track(lead);
//!
//! let xml = encode_xml(&project).unwrap();
//! let decoded = decode_str(xml, "Demo").unwrap();
//! assert_eq!(decoded, project);
//! ```

pub mod error;
pub mod format;
pub mod model;
pub mod theory;

pub use error::{DecodeError, EncodeError, ModelError};
pub use format::ProjectFormat;
pub use model::{
    AutomationClip, AutomationPoint, AutomationTrack, BbRow, BeatBassline, ChannelSettings,
    Effect, Envelope, EnvelopeTarget, FilterLfo, FilterSettings, GenericInstrument, Kicker,
    Monstro, Note, ParamValue, Pattern, PitchSpec, Progression, Project, Sf2Instrument, Track,
    TrackKind, TripleOscillator, WaveShape,
};
