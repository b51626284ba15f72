//! Typed in-memory project model.
//!
//! All numeric fields with a documented range are validated when set, so a
//! [`Project`] that exists is one the encoder can write. Track, pattern,
//! clip and row ids are dense list positions and are reassigned whenever a
//! sibling is removed.

mod automation;
mod bb;
mod effect;
mod filter;
mod instrument;
mod note;
mod pattern;
mod project;
mod synth;
mod track;
pub(crate) mod validate;

pub use automation::{AutomationClip, AutomationPoint, AutomationTrack, Progression};
pub use bb::{BbRow, BbStep, BeatBassline, DEFAULT_STEPS};
pub use effect::{
    builtin_effect_defaults, builtin_effect_description, builtin_effect_names, Effect, ParamValue,
};
pub use filter::{
    filter_type_code, filter_type_name, Envelope, EnvelopeTarget, FilterLfo, FilterSettings,
    DEFAULT_CUTOFF, DEFAULT_LFO_SPEED, DEFAULT_RESONANCE, FILTER_TYPES, LFO_SHAPES,
};
pub use instrument::{
    ChannelSettings, GenericInstrument, SampleSource, Sf2Chorus, Sf2Instrument, Sf2Reverb,
    AUDIOFILEPROCESSOR, SF2PLAYER,
};
pub use note::{parse_pitch, pitch_to_name, Note, PitchSpec, DEFAULT_VELOCITY, NOTE_NAMES};
pub use pattern::Pattern;
pub use project::{Project, SourceDocument};
pub use synth::{Kicker, ModulationAlgo, Monstro, MonstroLfo, Oscillator, TripleOscillator, WaveShape};
pub use track::{Track, TrackKind};
