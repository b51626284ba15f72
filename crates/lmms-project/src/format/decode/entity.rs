//! Entity-level decoding: notes, patterns, filter block, effects and
//! instrument plugin payloads.

use std::collections::BTreeMap;

use roxmltree::Node;

use super::attrs::{child, children, first_element, flag, float, int, opt_float, text};
use crate::error::DecodeError;
use crate::format::ticks::{
    from_percent, ticks_to_bar_length, ticks_to_bars, ticks_to_beats, TICKS_PER_BAR,
};
use crate::model::validate::narrow;
use crate::model::{
    ChannelSettings, Effect, Envelope, EnvelopeTarget, FilterLfo, FilterSettings, Kicker,
    ModulationAlgo, Monstro, MonstroLfo, Note, Oscillator, ParamValue, Pattern, Sf2Chorus,
    Sf2Instrument, Sf2Reverb, TripleOscillator, WaveShape, DEFAULT_CUTOFF, DEFAULT_LFO_SPEED,
    DEFAULT_RESONANCE,
};

/// Bar position from a tick attribute.
pub(super) fn bar_position(node: Node<'_, '_>, name: &str) -> Result<u32, DecodeError> {
    let bars = ticks_to_bars(int(node, name, 0)?);
    Ok(narrow("position", bars, ">= 0")?)
}

/// Bar length from a tick attribute, never less than one bar.
pub(super) fn bar_length(node: Node<'_, '_>, name: &str) -> Result<u32, DecodeError> {
    let bars = ticks_to_bar_length(int(node, name, TICKS_PER_BAR)?);
    Ok(narrow("length", bars, ">= 1")?)
}

pub(super) fn note(node: Node<'_, '_>) -> Result<Note, DecodeError> {
    let pos = int(node, "pos", 0)?;
    let mut len = int(node, "len", 48)?;
    if len < 0 {
        len = TICKS_PER_BAR;
    }
    let pitch = narrow("pitch", int(node, "key", 60)?, "0..=127")?;
    let velocity = narrow("velocity", int(node, "vol", 100)?.min(127), "0..=127")?;
    let pan = from_percent(float(node, "pan", 0.0)?);

    Ok(Note::new(pitch, ticks_to_beats(pos), ticks_to_beats(len))?
        .with_velocity(velocity)?
        .with_pan(pan)?)
}

pub(super) fn pattern(node: Node<'_, '_>) -> Result<Pattern, DecodeError> {
    let mut pattern = Pattern::new(
        text(node, "name", "Pattern"),
        bar_position(node, "pos")?,
        bar_length(node, "len")?,
    )?;
    for note_node in children(node, "note") {
        pattern.add_note(note(note_node)?);
    }
    Ok(pattern)
}

fn lfo(node: Node<'_, '_>) -> Result<FilterLfo, DecodeError> {
    Ok(FilterLfo {
        speed: float(node, "lspd", DEFAULT_LFO_SPEED)?,
        amount: float(node, "lamt", 0.0)?,
        shape: narrow("lfo shape", int(node, "lshp", 0)?, "0..=5")?,
        x100: flag(node, "x100")?,
        sync_mode: narrow("lfo sync mode", int(node, "syncmode", 0)?, "0..=255")?,
    })
}

/// An `elvol`/`elcut`/`elres` element. Returns `None` when nothing about it
/// looks configured; the format has no explicit on/off flag.
fn envelope(node: Node<'_, '_>) -> Result<Option<Envelope>, DecodeError> {
    let defaults = Envelope::default();
    let lfo = Some(lfo(node)?).filter(FilterLfo::looks_active);
    let envelope = Envelope {
        predelay: float(node, "pdel", defaults.predelay)?,
        attack: float(node, "att", defaults.attack)?,
        hold: float(node, "hold", defaults.hold)?,
        decay: float(node, "dec", defaults.decay)?,
        sustain: float(node, "sustain", defaults.sustain)?,
        release: float(node, "rel", defaults.release)?,
        amount: float(node, "amt", defaults.amount)?,
        lfo,
    };
    Ok(Some(envelope).filter(Envelope::looks_active))
}

pub(super) fn filter(node: Node<'_, '_>) -> Result<FilterSettings, DecodeError> {
    let mut filter = FilterSettings {
        filter_type: narrow("filter type", int(node, "ftype", 0)?, "0..=21")?,
        cutoff: float(node, "fcut", DEFAULT_CUTOFF)?,
        resonance: float(node, "fres", DEFAULT_RESONANCE)?,
        wet: float(node, "fwet", 0.0)?,
        ..FilterSettings::default()
    };
    for target in EnvelopeTarget::ALL {
        if let Some(env_node) = child(node, target.element()) {
            *filter.envelope_slot(target) = envelope(env_node)?;
        }
    }
    Ok(filter)
}

fn effect(node: Node<'_, '_>) -> Result<Effect, DecodeError> {
    let name = text(node, "name", "");
    let mut effect = Effect::new(name);
    effect.enabled = int(node, "on", 1)? != 0;
    effect.set_wet(float(node, "wet", 1.0)?)?;
    effect.gate = float(node, "gate", 0.0)?;

    let controls = format!("{name}controls");
    if let Some(controls) = child(node, &controls) {
        effect.params = controls
            .attributes()
            .map(|a| (a.name().to_string(), ParamValue::parse(a.value())))
            .collect::<BTreeMap<_, _>>();
    }
    if let Some(key) = child(node, "key") {
        for attribute in children(key, "attribute") {
            let value = text(attribute, "value", "").to_string();
            match text(attribute, "name", "") {
                "file" => effect.plugin_file = Some(value),
                "plugin" => effect.plugin_name = Some(value),
                _ => {}
            }
        }
    }
    Ok(effect)
}

pub(super) fn effects(node: Node<'_, '_>) -> Result<Vec<Effect>, DecodeError> {
    children(node, "effect").map(effect).collect()
}

fn cents_to_semitones(cents: i64) -> i64 {
    (cents as f64 / 100.0).round() as i64
}

/// Channel settings from an `instrumenttrack` element.
pub(super) fn channel(node: Node<'_, '_>) -> Result<ChannelSettings, DecodeError> {
    let defaults = ChannelSettings::default();
    let channel = ChannelSettings {
        pitch: narrow("track pitch", cents_to_semitones(int(node, "pitch", 0)?), "-24..=24")?,
        pitch_range: narrow("pitch range", int(node, "pitchrange", 1)?, "1..=60")?,
        base_note: narrow("base note", int(node, "basenote", 57)?, "0..=127")?,
        mixer_channel: narrow("mixer channel", int(node, "fxch", 0)?, ">= 0")?,
        filter: match child(node, "eldata") {
            Some(eldata) => filter(eldata)?,
            None => defaults.filter,
        },
        effects: match child(node, "fxchain") {
            Some(fxchain) => effects(fxchain)?,
            None => Vec::new(),
        },
    };
    channel.validate()?;
    Ok(channel)
}

pub(super) fn tripleoscillator(node: Node<'_, '_>) -> Result<TripleOscillator, DecodeError> {
    let mut synth = TripleOscillator::default();
    for (i, osc) in synth.oscillators.iter_mut().enumerate() {
        let d = osc.clone();
        let wave_code = int(node, &format!("wavetype{i}"), i64::from(d.wave_shape.code()))?;
        let wave_shape = narrow::<u8>("wave shape", wave_code, "0..=7")
            .ok()
            .and_then(WaveShape::from_code)
            .ok_or_else(|| {
                DecodeError::invalid_attribute(
                    "tripleoscillator",
                    &format!("wavetype{i}"),
                    &wave_code.to_string(),
                )
            })?;
        let user_wave = node
            .attribute(format!("userwavefile{i}").as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        *osc = Oscillator {
            volume: float(node, &format!("vol{i}"), d.volume)?,
            pan: float(node, &format!("pan{i}"), d.pan)?,
            coarse: narrow(
                "oscillator coarse",
                int(node, &format!("coarse{i}"), i64::from(d.coarse))?,
                "-24..=24",
            )?,
            fine_left: float(node, &format!("finel{i}"), d.fine_left)?,
            fine_right: float(node, &format!("finer{i}"), d.fine_right)?,
            phase_offset: float(node, &format!("phoffset{i}"), d.phase_offset)?,
            stereo_phase: float(node, &format!("stphdetun{i}"), d.stereo_phase)?,
            wave_shape,
            user_wave,
        };
    }
    for (i, algo) in synth.modulation.iter_mut().enumerate() {
        let name = format!("modalgo{}", i + 1);
        let code = int(node, &name, i64::from(algo.code()))?;
        *algo = narrow::<u8>("modulation algorithm", code, "0..=4")
            .ok()
            .and_then(ModulationAlgo::from_code)
            .ok_or_else(|| {
                DecodeError::invalid_attribute("tripleoscillator", &name, &code.to_string())
            })?;
    }
    synth.validate()?;
    Ok(synth)
}

pub(super) fn kicker(node: Node<'_, '_>) -> Result<Kicker, DecodeError> {
    let d = Kicker::default();
    let kicker = Kicker {
        start_freq: float(node, "startfreq", d.start_freq)?,
        end_freq: float(node, "endfreq", d.end_freq)?,
        decay: float(node, "decay", d.decay)?,
        distortion: float(node, "dist", d.distortion)?,
        distortion_end: float(node, "distend", d.distortion_end)?,
        gain: float(node, "gain", d.gain)?,
        envelope_slope: float(node, "env", d.envelope_slope)?,
        noise: float(node, "noise", d.noise)?,
        click: float(node, "click", d.click)?,
        freq_slope: float(node, "slope", d.freq_slope)?,
        start_from_note: flag(node, "startnote")?,
        end_to_note: flag(node, "endnote")?,
    };
    kicker.validate()?;
    Ok(kicker)
}

pub(super) fn monstro(node: Node<'_, '_>) -> Result<Monstro, DecodeError> {
    let d = Monstro::default();
    let mut lfos = [MonstroLfo::default(), MonstroLfo::default()];
    for (i, lfo) in lfos.iter_mut().enumerate() {
        let n = i + 1;
        *lfo = MonstroLfo {
            wave: narrow(
                "monstro lfo wave",
                int(node, &format!("l{n}wav"), i64::from(lfo.wave))?,
                "0..=10",
            )?,
            rate: float(node, &format!("l{n}rat"), lfo.rate)?,
            phase: float(node, &format!("l{n}phs"), lfo.phase)?,
        };
    }
    let monstro = Monstro {
        volumes: [
            float(node, "o1vol", d.volumes[0])?,
            float(node, "o2vol", d.volumes[1])?,
            float(node, "o3vol", d.volumes[2])?,
        ],
        osc1_pulse_width: float(node, "o1pw", d.osc1_pulse_width)?,
        osc2_wave: narrow("monstro osc2 wave", int(node, "o2wav", i64::from(d.osc2_wave))?, "0..=14")?,
        osc3_wave1: narrow("monstro osc3 wave1", int(node, "o3wav1", i64::from(d.osc3_wave1))?, "0..=14")?,
        osc3_wave2: narrow("monstro osc3 wave2", int(node, "o3wav2", i64::from(d.osc3_wave2))?, "0..=14")?,
        osc3_sub: float(node, "o3sub", d.osc3_sub)?,
        lfos,
    };
    monstro.validate()?;
    Ok(monstro)
}

pub(super) fn sf2(node: Node<'_, '_>, channel: ChannelSettings) -> Result<Sf2Instrument, DecodeError> {
    let (r, c) = (Sf2Reverb::default(), Sf2Chorus::default());
    let instrument = Sf2Instrument {
        sf2_path: text(node, "src", "").to_string(),
        bank: narrow("sf2 bank", int(node, "bank", 0)?, "0..=999")?,
        patch: narrow("sf2 patch", int(node, "patch", 0)?, "0..=127")?,
        gain: float(node, "gain", 1.0)?,
        reverb: Sf2Reverb {
            enabled: flag(node, "reverbOn")?,
            room_size: float(node, "reverbRoomSize", r.room_size)?,
            damping: float(node, "reverbDamping", r.damping)?,
            width: float(node, "reverbWidth", r.width)?,
            level: float(node, "reverbLevel", r.level)?,
        },
        chorus: Sf2Chorus {
            enabled: flag(node, "chorusOn")?,
            voices: narrow("chorus voices", int(node, "chorusNum", i64::from(c.voices))?, "0..=10")?,
            level: float(node, "chorusLevel", c.level)?,
            speed: float(node, "chorusSpeed", c.speed)?,
            depth: float(node, "chorusDepth", c.depth)?,
        },
        channel,
    };
    instrument.validate()?;
    Ok(instrument)
}

/// Every attribute of a plugin element, in document order.
pub(super) fn raw_attributes(node: Node<'_, '_>) -> Vec<(String, String)> {
    node.attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect()
}

/// Plugin name and element of an `instrumenttrack`, if it names one.
pub(super) fn plugin<'a, 'i>(instrument_track: Node<'a, 'i>) -> Option<(&'a str, Node<'a, 'i>)> {
    let plugin = first_element(child(instrument_track, "instrument")?)?;
    Some((plugin.tag_name().name(), plugin))
}

/// Optional out-value of an automation point.
pub(super) fn out_value(node: Node<'_, '_>) -> Result<Option<f64>, DecodeError> {
    opt_float(node, "outValue")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(xml).unwrap()
    }

    #[test]
    fn note_defaults_and_conversions() {
        let doc = parse(r#"<note/>"#);
        let n = note(doc.root_element()).unwrap();
        assert_eq!((n.pitch(), n.start(), n.length()), (60, 0.0, 1.0));
        assert_eq!((n.velocity(), n.pan()), (100, 0.0));

        let doc = parse(r#"<note key="64" pos="72" len="96" vol="80" pan="-50"/>"#);
        let n = note(doc.root_element()).unwrap();
        assert_eq!((n.pitch(), n.start(), n.length()), (64, 1.5, 2.0));
        assert_eq!((n.velocity(), n.pan()), (80, -0.5));
    }

    #[test]
    fn note_velocity_is_clamped() {
        let doc = parse(r#"<note vol="180"/>"#);
        assert_eq!(note(doc.root_element()).unwrap().velocity(), 127);
    }

    #[test]
    fn negative_length_is_one_bar() {
        let doc = parse(r#"<note len="-192"/>"#);
        assert_eq!(note(doc.root_element()).unwrap().length(), 4.0);
    }

    #[test]
    fn note_pitch_out_of_range() {
        let doc = parse(r#"<note key="200"/>"#);
        assert!(matches!(
            note(doc.root_element()),
            Err(DecodeError::Model(_))
        ));
    }

    #[test]
    fn pattern_bars_floor_with_minimum_length() {
        let doc = parse(r#"<pattern name="Verse" pos="400" len="96"><note/><note key="62"/></pattern>"#);
        let p = pattern(doc.root_element()).unwrap();
        assert_eq!(p.name, "Verse");
        assert_eq!((p.position(), p.length()), (2, 1));
        assert_eq!(p.notes().len(), 2);
    }

    #[test]
    fn envelope_presence_heuristic() {
        let doc = parse(
            r#"<eldata ftype="6" fcut="800" fres="2" fwet="1">
                 <elvol amt="0" lspd="0.1" lamt="0"/>
                 <elcut amt="0.6" att="0.2"/>
                 <elres amt="0" lspd="0.4"/>
               </eldata>"#,
        );
        let f = filter(doc.root_element()).unwrap();
        assert_eq!(f.type_name(), "moog");
        assert_eq!((f.cutoff, f.resonance, f.wet), (800.0, 2.0, 1.0));
        assert!(f.volume_envelope.is_none());
        let cut = f.cutoff_envelope.unwrap();
        assert_eq!((cut.amount, cut.attack), (0.6, 0.2));
        assert!(cut.lfo.is_none());
        let res = f.resonance_envelope.unwrap();
        assert_eq!(res.lfo.map(|l| l.speed), Some(0.4));
    }

    #[test]
    fn effect_params_coerce_numbers() {
        let doc = parse(
            r#"<fxchain enabled="1" numofeffects="2">
                 <effect name="delay" on="1" wet="0.5" gate="0" autoquit="1">
                   <delaycontrols delay="350" feedback="0.4" mode="pingpong"/>
                 </effect>
                 <effect name="ladspaeffect" on="0" wet="1" gate="0">
                   <ladspaeffectcontrols port00="3"/>
                   <key><attribute name="file" value="caps"/><attribute name="plugin" value="Plate"/></key>
                 </effect>
               </fxchain>"#,
        );
        let fx = effects(doc.root_element()).unwrap();
        assert_eq!(fx.len(), 2);
        assert_eq!(fx[0].wet(), 0.5);
        assert_eq!(fx[0].params["delay"], ParamValue::Number(350.0));
        assert_eq!(fx[0].params["mode"], ParamValue::Text("pingpong".into()));
        assert!(!fx[1].enabled);
        assert_eq!(fx[1].plugin_file.as_deref(), Some("caps"));
        assert_eq!(fx[1].plugin_name.as_deref(), Some("Plate"));
    }

    #[test]
    fn tripleoscillator_attributes() {
        let doc = parse(r#"<tripleoscillator wavetype0="0" coarse1="7" vol2="20" modalgo1="4" userwavefile0=""/>"#);
        let synth = tripleoscillator(doc.root_element()).unwrap();
        assert_eq!(synth.oscillators[0].wave_shape, WaveShape::Sine);
        assert_eq!(synth.oscillators[1].coarse, 7);
        assert_eq!(synth.oscillators[2].volume, 20.0);
        assert_eq!(synth.oscillators[2].wave_shape, WaveShape::Square);
        assert_eq!(synth.oscillators[0].user_wave, None);
        assert_eq!(synth.modulation, [ModulationAlgo::Fm, ModulationAlgo::Mix]);

        let doc = parse(r#"<tripleoscillator wavetype1="9"/>"#);
        assert!(matches!(
            tripleoscillator(doc.root_element()),
            Err(DecodeError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn sf2_attributes() {
        let doc = parse(r#"<sf2player src="gm.sf2" bank="128" patch="25" reverbOn="1" chorusNum="4"/>"#);
        let sf2 = sf2(doc.root_element(), ChannelSettings::default()).unwrap();
        assert_eq!((sf2.bank, sf2.patch), (128, 25));
        assert!(sf2.reverb.enabled);
        assert!(!sf2.chorus.enabled);
        assert_eq!(sf2.chorus.voices, 4);
        assert_eq!(sf2.reverb.level, 0.9);
    }

    #[test]
    fn channel_from_instrumenttrack() {
        let doc = parse(
            r#"<instrumenttrack vol="100" pitch="-1200" pitchrange="12" basenote="60" fxch="3">
                 <instrument name="kicker"><kicker startfreq="200"/></instrument>
               </instrumenttrack>"#,
        );
        let node = doc.root_element();
        let ch = channel(node).unwrap();
        assert_eq!((ch.pitch, ch.pitch_range, ch.base_note, ch.mixer_channel), (-12, 12, 60, 3));
        assert!(ch.effects.is_empty());
        let (name, plugin_node) = plugin(node).unwrap();
        assert_eq!(name, "kicker");
        assert_eq!(kicker(plugin_node).unwrap().start_freq, 200.0);
    }
}
