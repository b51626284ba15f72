//! Instrument-track channel settings and the plugin-agnostic payloads.

use serde::Serialize;

use super::validate;
use super::{Effect, FilterSettings};
use crate::error::ModelError;

/// Plugin name of the built-in sample player.
pub const AUDIOFILEPROCESSOR: &str = "audiofileprocessor";
/// Plugin name of the SoundFont player.
pub const SF2PLAYER: &str = "sf2player";

/// Settings every instrument track carries regardless of plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSettings {
    /// Track transpose in semitones. Files store it in cents.
    pub pitch: i8,
    pub pitch_range: u8,
    pub base_note: u8,
    pub mixer_channel: u32,
    pub filter: FilterSettings,
    pub effects: Vec<Effect>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            pitch: 0,
            pitch_range: 1,
            base_note: 57,
            mixer_channel: 0,
            filter: FilterSettings::default(),
            effects: Vec::new(),
        }
    }
}

impl ChannelSettings {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::within("track pitch", self.pitch, -24..=24, "-24..=24")?;
        validate::within("pitch range", self.pitch_range, 1..=60, "1..=60")?;
        validate::within("base note", self.base_note, 0..=127, "0..=127")?;
        self.filter.validate()?;
        for effect in &self.effects {
            validate::within("effect wet", effect.wet(), 0.0..=1.0, "0.0..=1.0")?;
        }
        Ok(())
    }

    /// Set the transpose, widening the pitch range so LMMS does not clamp it.
    pub fn set_pitch(&mut self, pitch: i8) -> Result<(), ModelError> {
        self.pitch = validate::within("track pitch", pitch, -24..=24, "-24..=24")?;
        self.pitch_range = self.pitch_range.max(pitch.unsigned_abs());
        Ok(())
    }

    pub fn set_pitch_range(&mut self, range: u8) -> Result<(), ModelError> {
        self.pitch_range = validate::within("pitch range", range, 1..=60, "1..=60")?;
        Ok(())
    }

    pub fn remove_effect(&mut self, index: usize) -> Result<Effect, ModelError> {
        if index < self.effects.len() {
            Ok(self.effects.remove(index))
        } else {
            Err(ModelError::EffectNotFound(index))
        }
    }

    pub fn effect_mut(&mut self, index: usize) -> Result<&mut Effect, ModelError> {
        self.effects
            .get_mut(index)
            .ok_or(ModelError::EffectNotFound(index))
    }
}

/// Instrument track driven by a plugin the model does not interpret.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericInstrument {
    pub plugin: String,
    /// Sample file when the plugin is `audiofileprocessor`.
    pub sample_path: Option<String>,
    /// Attributes of the plugin element as read from a file. They are
    /// written back unchanged, so unmodeled plugin settings survive.
    pub attributes: Vec<(String, String)>,
    pub channel: ChannelSettings,
}

impl GenericInstrument {
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            sample_path: None,
            attributes: Vec::new(),
            channel: ChannelSettings::default(),
        }
    }

    /// An `audiofileprocessor` instrument playing `path`.
    pub fn sample_player(path: impl Into<String>) -> Self {
        Self {
            sample_path: Some(path.into()),
            ..Self::new(AUDIOFILEPROCESSOR)
        }
    }
}

/// Sample track payload (`sampletrack`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleSource {
    pub sample_path: String,
}

/// SoundFont instrument (`sf2player`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sf2Instrument {
    pub sf2_path: String,
    pub bank: u16,
    pub patch: u8,
    pub gain: f64,
    pub reverb: Sf2Reverb,
    pub chorus: Sf2Chorus,
    pub channel: ChannelSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sf2Reverb {
    pub enabled: bool,
    pub room_size: f64,
    pub damping: f64,
    pub width: f64,
    pub level: f64,
}

impl Default for Sf2Reverb {
    fn default() -> Self {
        Self {
            enabled: false,
            room_size: 0.2,
            damping: 0.0,
            width: 0.5,
            level: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sf2Chorus {
    pub enabled: bool,
    pub voices: u8,
    pub level: f64,
    pub speed: f64,
    pub depth: f64,
}

impl Default for Sf2Chorus {
    fn default() -> Self {
        Self {
            enabled: false,
            voices: 3,
            level: 2.0,
            speed: 0.3,
            depth: 8.0,
        }
    }
}

impl Sf2Instrument {
    pub fn new(sf2_path: impl Into<String>, bank: u16, patch: u8) -> Result<Self, ModelError> {
        let instrument = Self {
            sf2_path: sf2_path.into(),
            bank,
            patch,
            gain: 1.0,
            reverb: Sf2Reverb::default(),
            chorus: Sf2Chorus::default(),
            channel: ChannelSettings::default(),
        };
        instrument.validate()?;
        Ok(instrument)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate::within("sf2 bank", self.bank, 0..=999, "0..=999")?;
        validate::within("sf2 patch", self.patch, 0..=127, "0..=127")?;
        validate::within("sf2 gain", self.gain, 0.0..=5.0, "0.0..=5.0")?;
        let r = &self.reverb;
        validate::within("reverb room size", r.room_size, 0.0..=1.0, "0.0..=1.0")?;
        validate::within("reverb damping", r.damping, 0.0..=1.0, "0.0..=1.0")?;
        validate::within("reverb width", r.width, 0.0..=1.0, "0.0..=1.0")?;
        validate::within("reverb level", r.level, 0.0..=1.0, "0.0..=1.0")?;
        let c = &self.chorus;
        validate::within("chorus voices", c.voices, 0..=10, "0..=10")?;
        validate::within("chorus level", c.level, 0.0..=10.0, "0.0..=10.0")?;
        validate::within("chorus speed", c.speed, 0.0..=5.0, "0.0..=5.0")?;
        validate::within("chorus depth", c.depth, 0.0..=46.0, "0.0..=46.0")?;
        self.channel.validate()
    }

    /// File name of the soundfont, without directories.
    pub fn sf2_file_name(&self) -> &str {
        self.sf2_path
            .rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("none")
    }
}
