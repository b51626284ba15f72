//! LMMS project file translation: `.mmp` XML and `.mmpz` compressed XML.

pub mod decode;
mod document;
pub mod encode;
pub mod framing;
pub mod ticks;
pub(crate) mod xml;

pub use decode::{decode_bytes, decode_file, decode_str};
pub use encode::{encode_bytes, encode_file, encode_xml};
pub use framing::ProjectFormat;
pub use ticks::{
    bars_to_ticks, beats_to_ticks, ticks_to_bar_length, ticks_to_bars, ticks_to_beats,
    TICKS_PER_BAR, TICKS_PER_BEAT,
};

/// `track` type codes.
pub(crate) const INSTRUMENT_TRACK: i64 = 0;
pub(crate) const BB_TRACK: i64 = 1;
pub(crate) const SAMPLE_TRACK: i64 = 2;
pub(crate) const HIDDEN_AUTOMATION_TRACK: i64 = 5;
pub(crate) const AUTOMATION_TRACK: i64 = 6;
