//! Tracks and their kind-specific payloads.

use serde::Serialize;
use serde_json::{json, Value};

use super::automation::AutomationTrack;
use super::bb::BeatBassline;
use super::instrument::{ChannelSettings, GenericInstrument, SampleSource, Sf2Instrument, SF2PLAYER};
use super::synth::{Kicker, Monstro, TripleOscillator};
use super::validate;
use super::Pattern;
use crate::error::ModelError;

/// Kind-specific track payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackKind {
    Instrument(GenericInstrument),
    Sample(SampleSource),
    Sf2(Sf2Instrument),
    TripleOscillator {
        synth: TripleOscillator,
        channel: ChannelSettings,
    },
    Kicker {
        synth: Kicker,
        channel: ChannelSettings,
    },
    Monstro {
        synth: Monstro,
        channel: ChannelSettings,
    },
    BeatBassline(BeatBassline),
    Automation(AutomationTrack),
}

impl TrackKind {
    /// Payload for an instrument plugin by name. Plugins the model
    /// understands get their typed payload with defaults.
    pub fn for_plugin(plugin: &str) -> Self {
        match plugin {
            "tripleoscillator" => TrackKind::TripleOscillator {
                synth: TripleOscillator::default(),
                channel: ChannelSettings::default(),
            },
            "kicker" => TrackKind::Kicker {
                synth: Kicker::default(),
                channel: ChannelSettings::default(),
            },
            "monstro" => TrackKind::Monstro {
                synth: Monstro::default(),
                channel: ChannelSettings::default(),
            },
            other => TrackKind::Instrument(GenericInstrument::new(other)),
        }
    }

    /// Short kind label used in descriptions and errors.
    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Instrument(_) => "instrument",
            TrackKind::Sample(_) => "sample",
            TrackKind::Sf2(_) => "sf2",
            TrackKind::TripleOscillator { .. } => "tripleoscillator",
            TrackKind::Kicker { .. } => "kicker",
            TrackKind::Monstro { .. } => "monstro",
            TrackKind::BeatBassline(_) => "bb",
            TrackKind::Automation(_) => "automation",
        }
    }

    /// Instrument plugin name, for instrument-family kinds.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            TrackKind::Instrument(i) => Some(&i.plugin),
            TrackKind::Sf2(_) => Some(SF2PLAYER),
            TrackKind::TripleOscillator { .. } => Some("tripleoscillator"),
            TrackKind::Kicker { .. } => Some("kicker"),
            TrackKind::Monstro { .. } => Some("monstro"),
            _ => None,
        }
    }

    /// Whether the kind holds melodic patterns.
    pub fn has_patterns(&self) -> bool {
        !matches!(self, TrackKind::BeatBassline(_) | TrackKind::Automation(_))
    }

    /// Filter and effect settings, for instrument-family kinds.
    pub fn channel(&self) -> Option<&ChannelSettings> {
        match self {
            TrackKind::Instrument(i) => Some(&i.channel),
            TrackKind::Sf2(s) => Some(&s.channel),
            TrackKind::TripleOscillator { channel, .. }
            | TrackKind::Kicker { channel, .. }
            | TrackKind::Monstro { channel, .. } => Some(channel),
            _ => None,
        }
    }

    pub fn channel_mut(&mut self) -> Option<&mut ChannelSettings> {
        match self {
            TrackKind::Instrument(i) => Some(&mut i.channel),
            TrackKind::Sf2(s) => Some(&mut s.channel),
            TrackKind::TripleOscillator { channel, .. }
            | TrackKind::Kicker { channel, .. }
            | TrackKind::Monstro { channel, .. } => Some(channel),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            TrackKind::Sf2(s) => s.validate(),
            TrackKind::TripleOscillator { synth, channel } => {
                synth.validate()?;
                channel.validate()
            }
            TrackKind::Kicker { synth, channel } => {
                synth.validate()?;
                channel.validate()
            }
            TrackKind::Monstro { synth, channel } => {
                synth.validate()?;
                channel.validate()
            }
            TrackKind::Instrument(i) => i.channel.validate(),
            TrackKind::Sample(_) | TrackKind::BeatBassline(_) | TrackKind::Automation(_) => Ok(()),
        }
    }
}

/// A track with common mixer fields and a kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    id: usize,
    pub name: String,
    volume: f64,
    pan: f64,
    pub muted: bool,
    pub solo: bool,
    patterns: Vec<Pattern>,
    kind: TrackKind,
}

impl Track {
    /// New track at unity volume, centered.
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Result<Self, ModelError> {
        kind.validate()?;
        Ok(Self {
            id: 0,
            name: name.into(),
            volume: 1.0,
            pan: 0.0,
            muted: false,
            solo: false,
            patterns: Vec::new(),
            kind,
        })
    }

    /// Instrument track for `plugin` (see [`TrackKind::for_plugin`]).
    pub fn instrument(name: impl Into<String>, plugin: &str) -> Self {
        Self::new_unchecked(name, TrackKind::for_plugin(plugin))
    }

    /// Default-valued payloads never fail validation.
    fn new_unchecked(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: 0,
            name: name.into(),
            volume: 1.0,
            pan: 0.0,
            muted: false,
            solo: false,
            patterns: Vec::new(),
            kind,
        }
    }

    pub fn sample(name: impl Into<String>, sample_path: impl Into<String>) -> Self {
        Self::new_unchecked(
            name,
            TrackKind::Sample(SampleSource {
                sample_path: sample_path.into(),
            }),
        )
    }

    pub fn beat_bassline(name: impl Into<String>) -> Self {
        Self::new_unchecked(name, TrackKind::BeatBassline(BeatBassline::default()))
    }

    pub fn automation(name: impl Into<String>) -> Self {
        Self::new_unchecked(name, TrackKind::Automation(AutomationTrack::default()))
    }

    /// Project-level id, reassigned when sibling tracks are added or removed.
    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<(), ModelError> {
        self.volume = validate::at_least("track volume", volume, 0.0, ">= 0")?;
        Ok(())
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: f64) -> Result<(), ModelError> {
        self.pan = validate::pan("track pan", pan)?;
        Ok(())
    }

    pub fn kind(&self) -> &TrackKind {
        &self.kind
    }

    /// Mutable payload access. Changes are validated on encode via
    /// [`Track::validate`]; prefer the typed setters where they exist.
    pub fn kind_mut(&mut self) -> &mut TrackKind {
        &mut self.kind
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.kind.validate()
    }

    pub fn channel_mut(&mut self) -> Result<&mut ChannelSettings, ModelError> {
        let (id, label) = (self.id, self.kind.label());
        self.kind.channel_mut().ok_or(ModelError::WrongTrackKind {
            track: id,
            actual: label,
            expected: "instrument",
        })
    }

    pub fn beat_bassline_mut(&mut self) -> Result<&mut BeatBassline, ModelError> {
        let (id, label) = (self.id, self.kind.label());
        match &mut self.kind {
            TrackKind::BeatBassline(bb) => Ok(bb),
            _ => Err(ModelError::WrongTrackKind {
                track: id,
                actual: label,
                expected: "bb",
            }),
        }
    }

    pub fn automation_mut(&mut self) -> Result<&mut AutomationTrack, ModelError> {
        let (id, label) = (self.id, self.kind.label());
        match &mut self.kind {
            TrackKind::Automation(a) => Ok(a),
            _ => Err(ModelError::WrongTrackKind {
                track: id,
                actual: label,
                expected: "automation",
            }),
        }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Append a pattern and return its track-local id.
    pub fn add_pattern(&mut self, mut pattern: Pattern) -> Result<usize, ModelError> {
        if !self.kind.has_patterns() {
            return Err(ModelError::WrongTrackKind {
                track: self.id,
                actual: self.kind.label(),
                expected: "melodic",
            });
        }
        let id = self.patterns.len();
        pattern.set_id(id);
        self.patterns.push(pattern);
        Ok(id)
    }

    pub fn pattern(&self, id: usize) -> Result<&Pattern, ModelError> {
        self.patterns.get(id).ok_or(ModelError::PatternNotFound {
            track: self.id,
            pattern: id,
        })
    }

    pub fn pattern_mut(&mut self, id: usize) -> Result<&mut Pattern, ModelError> {
        let track = self.id;
        self.patterns
            .get_mut(id)
            .ok_or(ModelError::PatternNotFound { track, pattern: id })
    }

    /// Remove a pattern; later patterns shift down one id.
    pub fn remove_pattern(&mut self, id: usize) -> Result<Pattern, ModelError> {
        if id >= self.patterns.len() {
            return Err(ModelError::PatternNotFound {
                track: self.id,
                pattern: id,
            });
        }
        let pattern = self.patterns.remove(id);
        for (i, p) in self.patterns.iter_mut().enumerate() {
            p.set_id(i);
        }
        Ok(pattern)
    }

    pub fn note_count(&self) -> usize {
        self.patterns.iter().map(|p| p.notes().len()).sum()
    }

    /// Summary suitable for tool responses.
    pub fn describe(&self) -> Value {
        let mut summary = json!({
            "id": self.id,
            "name": self.name,
            "type": self.kind.label(),
            "volume": self.volume,
            "pan": self.pan,
            "muted": self.muted,
            "solo": self.solo,
            "pattern_count": self.patterns.len(),
        });
        let extra = match &self.kind {
            TrackKind::Instrument(i) => json!({
                "instrument": i.plugin,
                "sample_path": i.sample_path,
            }),
            TrackKind::Sample(s) => json!({ "sample_path": s.sample_path }),
            TrackKind::Sf2(s) => json!({
                "instrument": SF2PLAYER,
                "sf2_path": s.sf2_path,
                "bank": s.bank,
                "patch": s.patch,
                "gain": s.gain,
                "reverb_on": s.reverb.enabled,
                "chorus_on": s.chorus.enabled,
            }),
            TrackKind::TripleOscillator { synth, .. } => json!({
                "instrument": "tripleoscillator",
                "waves": synth.wave_summary(),
            }),
            TrackKind::Kicker { synth: k, .. } => json!({
                "instrument": "kicker",
                "start_freq": k.start_freq,
                "end_freq": k.end_freq,
                "decay": k.decay,
                "distortion": k.distortion,
            }),
            TrackKind::Monstro { synth: m, .. } => json!({
                "instrument": "monstro",
                "osc2_wave": m.osc2_wave,
                "lfo1_rate": m.lfos[0].rate,
                "lfo2_rate": m.lfos[1].rate,
            }),
            TrackKind::BeatBassline(bb) => json!({
                "num_steps": bb.num_steps(),
                "instrument_count": bb.rows().len(),
                "bb_position": bb.position,
                "bb_length": bb.length(),
            }),
            TrackKind::Automation(a) => json!({
                "clip_count": a.clips().len(),
            }),
        };
        if let (Some(map), Value::Object(extra)) = (summary.as_object_mut(), extra) {
            map.extend(extra);
            if let Some(channel) = self.kind.channel() {
                map.insert("pitch".into(), json!(channel.pitch));
                map.insert("filter_type".into(), json!(channel.filter.type_name()));
                map.insert("filter_cutoff".into(), json!(channel.filter.cutoff));
                map.insert("effect_count".into(), json!(channel.effects.len()));
            }
        }
        summary
    }

    /// One-line human-readable description.
    pub fn to_description(&self) -> String {
        let mut status = Vec::new();
        if self.muted {
            status.push("muted");
        }
        if self.solo {
            status.push("solo");
        }
        let status = if status.is_empty() {
            String::new()
        } else {
            format!(" ({})", status.join(", "))
        };
        let fx = match self.kind.channel() {
            Some(c) if !c.effects.is_empty() => format!(" +{}fx", c.effects.len()),
            _ => String::new(),
        };
        let patterns = self.patterns.len();

        match &self.kind {
            TrackKind::Instrument(i) => {
                format!("Instrument '{}'{status} [{}]{fx}: {patterns} patterns", self.name, i.plugin)
            }
            TrackKind::Sample(s) => {
                format!("Sample '{}'{status} [{}]: {patterns} patterns", self.name, s.sample_path)
            }
            TrackKind::Sf2(s) => {
                let mut extras = Vec::new();
                if s.reverb.enabled {
                    extras.push("reverb");
                }
                if s.chorus.enabled {
                    extras.push("chorus");
                }
                let extras = if extras.is_empty() {
                    String::new()
                } else {
                    format!(" +{}", extras.join("+"))
                };
                format!(
                    "SF2 '{}'{status} [{} bank:{} patch:{}{extras}]{fx}: {patterns} patterns",
                    self.name,
                    s.sf2_file_name(),
                    s.bank,
                    s.patch
                )
            }
            TrackKind::TripleOscillator { synth, .. } => format!(
                "TripleOsc '{}'{status} [{}]{fx}: {patterns} patterns",
                self.name,
                synth.wave_summary()
            ),
            TrackKind::Kicker { synth: k, .. } => format!(
                "Kicker '{}'{status} [{}->{}Hz, {}ms]{fx}: {patterns} patterns",
                self.name, k.start_freq, k.end_freq, k.decay
            ),
            TrackKind::Monstro { synth: m, .. } => format!(
                "Monstro '{}'{status} [LFO1:{} LFO2:{}]{fx}: {patterns} patterns",
                self.name, m.lfos[0].rate, m.lfos[1].rate
            ),
            TrackKind::BeatBassline(bb) => {
                let mut lines = vec![format!(
                    "BB Track '{}'{status}: {} instruments, {} steps",
                    self.name,
                    bb.rows().len(),
                    bb.num_steps()
                )];
                for row in bb.rows() {
                    lines.push(format!("    {}: {}", row.name, row.step_string()));
                }
                lines.join("\n")
            }
            TrackKind::Automation(a) => {
                format!("Automation '{}'{status}: {} clips", self.name, a.clips().len())
            }
        }
    }
}
