//! Built-in synthesizer payloads: TripleOscillator, Kicker and Monstro.

use serde::Serialize;

use super::validate;
use crate::error::ModelError;

/// TripleOscillator wave shapes and their `wavetype` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveShape {
    Sine = 0,
    Triangle = 1,
    Saw = 2,
    Square = 3,
    MoogSaw = 4,
    Exp = 5,
    Noise = 6,
    User = 7,
}

impl WaveShape {
    pub const ALL: [WaveShape; 8] = [
        WaveShape::Sine,
        WaveShape::Triangle,
        WaveShape::Saw,
        WaveShape::Square,
        WaveShape::MoogSaw,
        WaveShape::Exp,
        WaveShape::Noise,
        WaveShape::User,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            WaveShape::Sine => "sine",
            WaveShape::Triangle => "triangle",
            WaveShape::Saw => "saw",
            WaveShape::Square => "square",
            WaveShape::MoogSaw => "moogsaw",
            WaveShape::Exp => "exp",
            WaveShape::Noise => "noise",
            WaveShape::User => "user",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ModelError> {
        let key = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|w| w.name() == key)
            .ok_or_else(|| ModelError::UnknownName {
                table: "wave shape",
                name: name.to_string(),
            })
    }
}

/// How one TripleOscillator oscillator modulates the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulationAlgo {
    Phase = 0,
    Amplitude = 1,
    Mix = 2,
    Sync = 3,
    Fm = 4,
}

impl ModulationAlgo {
    pub const ALL: [ModulationAlgo; 5] = [
        ModulationAlgo::Phase,
        ModulationAlgo::Amplitude,
        ModulationAlgo::Mix,
        ModulationAlgo::Sync,
        ModulationAlgo::Fm,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ModulationAlgo::Phase => "phase",
            ModulationAlgo::Amplitude => "amplitude",
            ModulationAlgo::Mix => "mix",
            ModulationAlgo::Sync => "sync",
            ModulationAlgo::Fm => "fm",
        }
    }

    /// Accepts the canonical names plus the `pm`/`am` aliases.
    pub fn parse(name: &str) -> Result<Self, ModelError> {
        match name.trim().to_lowercase().as_str() {
            "phase" | "pm" => Ok(ModulationAlgo::Phase),
            "amplitude" | "am" => Ok(ModulationAlgo::Amplitude),
            "mix" => Ok(ModulationAlgo::Mix),
            "sync" => Ok(ModulationAlgo::Sync),
            "fm" => Ok(ModulationAlgo::Fm),
            _ => Err(ModelError::UnknownName {
                table: "modulation algorithm",
                name: name.to_string(),
            }),
        }
    }
}

/// One oscillator of a TripleOscillator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Oscillator {
    pub volume: f64,
    pub pan: f64,
    pub coarse: i8,
    pub fine_left: f64,
    pub fine_right: f64,
    pub phase_offset: f64,
    pub stereo_phase: f64,
    pub wave_shape: WaveShape,
    pub user_wave: Option<String>,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self {
            volume: 100.0,
            pan: 0.0,
            coarse: 0,
            fine_left: 0.0,
            fine_right: 0.0,
            phase_offset: 0.0,
            stereo_phase: 0.0,
            wave_shape: WaveShape::Saw,
            user_wave: None,
        }
    }
}

impl Oscillator {
    pub fn with_wave(wave_shape: WaveShape) -> Self {
        Self {
            wave_shape,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate::within("oscillator volume", self.volume, 0.0..=200.0, "0..=200")?;
        validate::within("oscillator pan", self.pan, -100.0..=100.0, "-100..=100")?;
        validate::within("oscillator coarse", self.coarse, -24..=24, "-24..=24")?;
        validate::within("oscillator fine left", self.fine_left, -100.0..=100.0, "-100..=100")?;
        validate::within("oscillator fine right", self.fine_right, -100.0..=100.0, "-100..=100")?;
        validate::within("oscillator phase offset", self.phase_offset, 0.0..=360.0, "0..=360")?;
        validate::within("oscillator stereo phase", self.stereo_phase, 0.0..=360.0, "0..=360")?;
        Ok(())
    }
}

/// TripleOscillator: three oscillators chained by two modulation stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripleOscillator {
    pub oscillators: [Oscillator; 3],
    /// Modulation of oscillator 1 by 2, and of 2 by 3.
    pub modulation: [ModulationAlgo; 2],
}

impl Default for TripleOscillator {
    fn default() -> Self {
        Self {
            oscillators: [
                Oscillator::with_wave(WaveShape::Saw),
                Oscillator {
                    coarse: -12,
                    ..Oscillator::with_wave(WaveShape::Saw)
                },
                Oscillator {
                    volume: 50.0,
                    ..Oscillator::with_wave(WaveShape::Square)
                },
            ],
            modulation: [ModulationAlgo::Mix; 2],
        }
    }
}

impl TripleOscillator {
    pub fn validate(&self) -> Result<(), ModelError> {
        self.oscillators.iter().try_for_each(Oscillator::validate)
    }

    /// Compact wave summary like `saw+saw+square`.
    pub fn wave_summary(&self) -> String {
        self.oscillators
            .iter()
            .map(|o| o.wave_shape.name())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Kicker: pitched-sweep bass drum synth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kicker {
    pub start_freq: f64,
    pub end_freq: f64,
    pub decay: f64,
    pub distortion: f64,
    pub distortion_end: f64,
    pub gain: f64,
    pub envelope_slope: f64,
    pub noise: f64,
    pub click: f64,
    pub freq_slope: f64,
    pub start_from_note: bool,
    pub end_to_note: bool,
}

impl Default for Kicker {
    fn default() -> Self {
        Self {
            start_freq: 150.0,
            end_freq: 40.0,
            decay: 300.0,
            distortion: 50.0,
            distortion_end: 50.0,
            gain: 1.0,
            envelope_slope: 0.5,
            noise: 0.0,
            click: 0.0,
            freq_slope: 0.2,
            start_from_note: false,
            end_to_note: false,
        }
    }
}

impl Kicker {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::within("kicker start freq", self.start_freq, 5.0..=1000.0, "5..=1000")?;
        validate::within("kicker end freq", self.end_freq, 5.0..=1000.0, "5..=1000")?;
        validate::within("kicker decay", self.decay, 5.0..=5000.0, "5..=5000")?;
        validate::within("kicker distortion", self.distortion, 0.0..=100.0, "0..=100")?;
        validate::within("kicker distortion end", self.distortion_end, 0.0..=100.0, "0..=100")?;
        validate::within("kicker gain", self.gain, 0.1..=5.0, "0.1..=5")?;
        validate::within("kicker envelope slope", self.envelope_slope, 0.01..=1.0, "0.01..=1")?;
        validate::within("kicker noise", self.noise, 0.0..=1.0, "0..=1")?;
        validate::within("kicker click", self.click, 0.0..=1.0, "0..=1")?;
        validate::within("kicker freq slope", self.freq_slope, 0.001..=1.0, "0.001..=1")?;
        Ok(())
    }
}

/// One Monstro LFO.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonstroLfo {
    pub wave: u8,
    /// Rate in milliseconds per cycle.
    pub rate: f64,
    pub phase: f64,
}

impl Default for MonstroLfo {
    fn default() -> Self {
        Self {
            wave: 0,
            rate: 1.0,
            phase: 0.0,
        }
    }
}

/// Monstro: three-oscillator modular synth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Monstro {
    pub volumes: [f64; 3],
    pub osc1_pulse_width: f64,
    pub osc2_wave: u8,
    pub osc3_wave1: u8,
    pub osc3_wave2: u8,
    pub osc3_sub: f64,
    pub lfos: [MonstroLfo; 2],
}

impl Default for Monstro {
    fn default() -> Self {
        Self {
            volumes: [100.0; 3],
            osc1_pulse_width: 50.0,
            osc2_wave: 2,
            osc3_wave1: 0,
            osc3_wave2: 0,
            osc3_sub: 0.0,
            lfos: [MonstroLfo::default(), MonstroLfo::default()],
        }
    }
}

impl Monstro {
    pub fn validate(&self) -> Result<(), ModelError> {
        for volume in self.volumes {
            validate::within("monstro volume", volume, 0.0..=200.0, "0..=200")?;
        }
        validate::within("monstro osc1 pulse width", self.osc1_pulse_width, 0.25..=75.75, "0.25..=75.75")?;
        validate::within("monstro osc2 wave", self.osc2_wave, 0..=14, "0..=14")?;
        validate::within("monstro osc3 wave1", self.osc3_wave1, 0..=14, "0..=14")?;
        validate::within("monstro osc3 wave2", self.osc3_wave2, 0..=14, "0..=14")?;
        validate::within("monstro osc3 sub", self.osc3_sub, -100.0..=100.0, "-100..=100")?;
        for lfo in &self.lfos {
            validate::within("monstro lfo wave", lfo.wave, 0..=10, "0..=10")?;
            validate::within("monstro lfo rate", lfo.rate, 0.01..=20000.0, "0.01..=20000")?;
            validate::within("monstro lfo phase", lfo.phase, -180.0..=180.0, "-180..=180")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_shape_codes() {
        assert_eq!(WaveShape::parse("saw").unwrap().code(), 2);
        assert_eq!(WaveShape::parse("MoogSaw").unwrap(), WaveShape::MoogSaw);
        assert_eq!(WaveShape::from_code(7), Some(WaveShape::User));
        assert_eq!(WaveShape::from_code(8), None);
        assert!(WaveShape::parse("pulse").is_err());
    }

    #[test]
    fn modulation_aliases() {
        assert_eq!(ModulationAlgo::parse("pm").unwrap(), ModulationAlgo::Phase);
        assert_eq!(ModulationAlgo::parse("am").unwrap(), ModulationAlgo::Amplitude);
        assert_eq!(ModulationAlgo::parse("fm").unwrap().code(), 4);
        assert!(ModulationAlgo::parse("ring").is_err());
    }

    #[test]
    fn triple_oscillator_defaults() {
        let synth = TripleOscillator::default();
        assert_eq!(synth.wave_summary(), "saw+saw+square");
        assert_eq!(synth.oscillators[1].coarse, -12);
        assert_eq!(synth.oscillators[2].volume, 50.0);
        assert_eq!(synth.modulation, [ModulationAlgo::Mix; 2]);
        assert!(synth.validate().is_ok());
    }

    #[test]
    fn oscillator_ranges() {
        let mut synth = TripleOscillator::default();
        synth.oscillators[0].coarse = 30;
        assert!(synth.validate().is_err());
    }

    #[test]
    fn kicker_and_monstro_defaults_validate() {
        assert!(Kicker::default().validate().is_ok());
        assert!(Monstro::default().validate().is_ok());
        let kicker = Kicker {
            decay: 1.0,
            ..Kicker::default()
        };
        assert!(kicker.validate().is_err());
    }
}
