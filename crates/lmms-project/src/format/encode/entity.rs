//! Entity-level encoding: notes, patterns, filter block, effects and
//! instrument plugin payloads.

use crate::format::ticks::{bars_to_ticks, beats_to_ticks, to_percent};
use crate::format::xml::{flag, Element};
use crate::model::{
    ChannelSettings, Effect, Envelope, EnvelopeTarget, FilterLfo, FilterSettings,
    GenericInstrument, Kicker, Monstro, Note, Pattern, Sf2Instrument, TripleOscillator,
    AUDIOFILEPROCESSOR,
};

pub(super) fn note(note: &Note) -> Element {
    Element::new("note")
        .attr("key", note.pitch())
        .attr("pos", beats_to_ticks(note.start()))
        .attr("len", beats_to_ticks(note.length()))
        .attr("vol", note.velocity())
        .attr("pan", to_percent(note.pan()))
}

pub(super) fn pattern(pattern: &Pattern) -> Element {
    let mut el = Element::new("pattern")
        .attr("name", &pattern.name)
        .attr("type", 1)
        .attr("muted", 0)
        .attr("pos", bars_to_ticks(pattern.position()))
        .attr("len", bars_to_ticks(pattern.length()));
    for n in pattern.notes() {
        el.push(note(n));
    }
    el
}

fn envelope(target: EnvelopeTarget, envelope: Option<&Envelope>) -> Element {
    let defaults = Envelope::default();
    let env = envelope.unwrap_or(&defaults);
    let lfo_defaults = FilterLfo::default();
    let lfo = env.lfo.as_ref().unwrap_or(&lfo_defaults);
    Element::new(target.element())
        .attr("pdel", env.predelay)
        .attr("att", env.attack)
        .attr("hold", env.hold)
        .attr("dec", env.decay)
        .attr("sustain", env.sustain)
        .attr("rel", env.release)
        .attr("amt", env.amount)
        .attr("lpdel", 0)
        .attr("latt", 0)
        .attr("lspd", lfo.speed)
        .attr("lamt", lfo.amount)
        .attr("lshp", lfo.shape)
        .attr("x100", flag(lfo.x100))
        .attr("ctlenvamt", 0)
        .attr("syncmode", lfo.sync_mode)
}

pub(super) fn eldata(filter: &FilterSettings) -> Element {
    let mut el = Element::new("eldata")
        .attr("ftype", filter.filter_type)
        .attr("fcut", filter.cutoff)
        .attr("fres", filter.resonance)
        .attr("fwet", filter.wet);
    for target in EnvelopeTarget::ALL {
        el.push(envelope(target, filter.envelope(target)));
    }
    el
}

fn effect(effect: &Effect) -> Element {
    let mut controls = Element::new(format!("{}controls", effect.name));
    for (key, value) in effect.effective_params() {
        controls.set(&key, value);
    }
    let mut el = Element::new("effect")
        .attr("name", &effect.name)
        .attr("on", flag(effect.enabled))
        .attr("wet", effect.wet())
        .attr("gate", effect.gate)
        .attr("autoquit", 1)
        .child(controls);
    if effect.plugin_file.is_some() || effect.plugin_name.is_some() {
        let mut key = Element::new("key");
        if let Some(file) = &effect.plugin_file {
            key.push(Element::new("attribute").attr("name", "file").attr("value", file));
        }
        if let Some(plugin) = &effect.plugin_name {
            key.push(Element::new("attribute").attr("name", "plugin").attr("value", plugin));
        }
        el.push(key);
    }
    el
}

pub(super) fn fxchain(effects: &[Effect]) -> Element {
    let mut el = Element::new("fxchain")
        .attr("enabled", flag(!effects.is_empty()))
        .attr("numofeffects", effects.len());
    for e in effects {
        el.push(effect(e));
    }
    el
}

/// Full `instrumenttrack` element around a plugin element.
pub(super) fn instrument_track(
    volume: f64,
    pan: f64,
    channel: &ChannelSettings,
    plugin: Element,
) -> Element {
    Element::new("instrumenttrack")
        .attr("vol", to_percent(volume))
        .attr("pan", to_percent(pan))
        .attr("pitch", i32::from(channel.pitch) * 100)
        .attr("pitchrange", channel.pitch_range)
        .attr("fxch", channel.mixer_channel)
        .attr("basenote", channel.base_note)
        .attr("usemasterpitch", 1)
        .attr("firstkey", 0)
        .attr("lastkey", 127)
        .child(
            Element::new("instrument")
                .attr("name", plugin.name.clone())
                .child(plugin),
        )
        .child(eldata(&channel.filter))
        .child(
            Element::new("chordcreator")
                .attr("chord-enabled", 0)
                .attr("chord", 0)
                .attr("chordrange", 1),
        )
        .child(
            Element::new("arpeggiator")
                .attr("arp-enabled", 0)
                .attr("arp", 0)
                .attr("arpdir", 0)
                .attr("arprange", 1)
                .attr("arpgate", 100)
                .attr("arptime", 200)
                .attr("arpmode", 0),
        )
        .child(
            Element::new("midiport")
                .attr("readable", 0)
                .attr("writable", 0)
                .attr("inputchannel", 0)
                .attr("outputchannel", 1)
                .attr("basevelocity", 127)
                .attr("fixedinputvelocity", -1)
                .attr("fixedoutputvelocity", -1)
                .attr("fixedoutputnote", -1),
        )
        .child(fxchain(&channel.effects))
}

pub(super) fn tripleoscillator(synth: &TripleOscillator) -> Element {
    let mut el = Element::new("tripleoscillator");
    for (i, osc) in synth.oscillators.iter().enumerate() {
        el.set(&format!("vol{i}"), osc.volume);
        el.set(&format!("pan{i}"), osc.pan);
        el.set(&format!("coarse{i}"), osc.coarse);
        el.set(&format!("finel{i}"), osc.fine_left);
        el.set(&format!("finer{i}"), osc.fine_right);
        el.set(&format!("phoffset{i}"), osc.phase_offset);
        el.set(&format!("stphdetun{i}"), osc.stereo_phase);
        el.set(&format!("wavetype{i}"), osc.wave_shape.code());
        el.set(&format!("useWaveTable{i}"), 1);
        el.set(
            &format!("userwavefile{i}"),
            osc.user_wave.as_deref().unwrap_or_default(),
        );
    }
    el.set("modalgo1", synth.modulation[0].code());
    el.set("modalgo2", synth.modulation[1].code());
    el
}

pub(super) fn kicker(k: &Kicker) -> Element {
    Element::new("kicker")
        .attr("startfreq", k.start_freq)
        .attr("endfreq", k.end_freq)
        .attr("decay", k.decay)
        .attr("dist", k.distortion)
        .attr("distend", k.distortion_end)
        .attr("gain", k.gain)
        .attr("env", k.envelope_slope)
        .attr("noise", k.noise)
        .attr("click", k.click)
        .attr("slope", k.freq_slope)
        .attr("startnote", flag(k.start_from_note))
        .attr("endnote", flag(k.end_to_note))
        .attr("version", 1)
}

pub(super) fn monstro(m: &Monstro) -> Element {
    let mut el = Element::new("monstro")
        .attr("o1vol", m.volumes[0])
        .attr("o2vol", m.volumes[1])
        .attr("o3vol", m.volumes[2])
        .attr("o1pw", m.osc1_pulse_width)
        .attr("o2wav", m.osc2_wave)
        .attr("o3wav1", m.osc3_wave1)
        .attr("o3wav2", m.osc3_wave2)
        .attr("o3sub", m.osc3_sub);
    for (i, lfo) in m.lfos.iter().enumerate() {
        let n = i + 1;
        el.set(&format!("l{n}wav"), lfo.wave);
        el.set(&format!("l{n}rat"), lfo.rate);
        el.set(&format!("l{n}phs"), lfo.phase);
    }
    for n in 1..=3 {
        el.set(&format!("o{n}pan"), 0);
        el.set(&format!("o{n}crs"), 0);
    }
    for n in 1..=2 {
        el.set(&format!("e{n}att"), 0);
        el.set(&format!("e{n}hol"), 0);
        el.set(&format!("e{n}dec"), 0);
        el.set(&format!("e{n}sus"), 1);
        el.set(&format!("e{n}rel"), 0);
    }
    el
}

pub(super) fn sf2player(sf2: &Sf2Instrument) -> Element {
    Element::new("sf2player")
        .attr("src", &sf2.sf2_path)
        .attr("bank", sf2.bank)
        .attr("patch", sf2.patch)
        .attr("gain", sf2.gain)
        .attr("reverbOn", flag(sf2.reverb.enabled))
        .attr("reverbRoomSize", sf2.reverb.room_size)
        .attr("reverbDamping", sf2.reverb.damping)
        .attr("reverbWidth", sf2.reverb.width)
        .attr("reverbLevel", sf2.reverb.level)
        .attr("chorusOn", flag(sf2.chorus.enabled))
        .attr("chorusNum", sf2.chorus.voices)
        .attr("chorusLevel", sf2.chorus.level)
        .attr("chorusSpeed", sf2.chorus.speed)
        .attr("chorusDepth", sf2.chorus.depth)
}

pub(super) fn audiofileprocessor(src: &str) -> Element {
    Element::new(AUDIOFILEPROCESSOR)
        .attr("src", src)
        .attr("amp", 100)
        .attr("sframe", 0)
        .attr("lframe", 0)
        .attr("eframe", 1)
        .attr("looped", 0)
        .attr("reversed", 0)
        .attr("interp", 1)
        .attr("stutter", 0)
}

/// Plugin element for a generic instrument. Attributes read from a file are
/// written back as they were; a fresh sample player gets the full default set.
pub(super) fn generic_plugin(instrument: &GenericInstrument) -> Element {
    let mut el = if instrument.attributes.is_empty() && instrument.plugin == AUDIOFILEPROCESSOR {
        audiofileprocessor("")
    } else {
        let mut el = Element::new(instrument.plugin.as_str());
        el.attrs = instrument.attributes.clone();
        el
    };
    if let Some(src) = &instrument.sample_path {
        el.set("src", src);
    }
    el
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Note, ParamValue, WaveShape};
    use pretty_assertions::assert_eq;

    #[test]
    fn note_ticks_and_percent() {
        let n = Note::new(64, 1.5, 2.0)
            .unwrap()
            .with_velocity(90)
            .unwrap()
            .with_pan(-0.25)
            .unwrap();
        let el = note(&n);
        assert_eq!(el.get("key"), Some("64"));
        assert_eq!(el.get("pos"), Some("72"));
        assert_eq!(el.get("len"), Some("96"));
        assert_eq!(el.get("vol"), Some("90"));
        assert_eq!(el.get("pan"), Some("-25"));
    }

    #[test]
    fn pattern_bars_to_ticks() {
        let mut p = Pattern::new("Verse", 2, 4).unwrap();
        p.add_note(Note::new(60, 0.0, 1.0).unwrap());
        let el = pattern(&p);
        assert_eq!(el.get("pos"), Some("384"));
        assert_eq!(el.get("len"), Some("768"));
        assert_eq!(el.get("type"), Some("1"));
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn effect_params_merge_defaults() {
        let e = Effect::new("delay").with_param("feedback", 0.8);
        let chain = fxchain(&[e]);
        assert_eq!(chain.get("enabled"), Some("1"));
        assert_eq!(chain.get("numofeffects"), Some("1"));
        let controls = &chain.children[0].children[0];
        assert_eq!(controls.name, "delaycontrols");
        assert_eq!(controls.get("feedback"), Some("0.8"));
        assert_eq!(controls.get("delay"), Some("200"));
        assert_eq!(controls.attrs.len(), 5);
    }

    #[test]
    fn ladspa_key_is_written() {
        let mut e = Effect::new("ladspaeffect").with_param("port00", ParamValue::Number(3.0));
        e.plugin_file = Some("caps".into());
        e.plugin_name = Some("Plate".into());
        let el = effect(&e);
        let key = &el.children[1];
        assert_eq!(key.name, "key");
        assert_eq!(key.children[0].get("value"), Some("caps"));
        assert_eq!(key.children[1].get("value"), Some("Plate"));
    }

    #[test]
    fn eldata_writes_every_envelope() {
        let el = eldata(&FilterSettings::default());
        let names: Vec<&str> = el.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["elvol", "elcut", "elres"]);
        assert_eq!(el.get("fcut"), Some("14000"));
        assert_eq!(el.children[0].get("lspd"), Some("0.1"));
    }

    #[test]
    fn instrument_track_writes_pitch_in_cents() {
        let mut channel = ChannelSettings::default();
        channel.set_pitch(-12).unwrap();
        let el = instrument_track(0.8, 0.0, &channel, kicker(&Kicker::default()));
        assert_eq!(el.get("vol"), Some("80"));
        assert_eq!(el.get("pitch"), Some("-1200"));
        assert_eq!(el.get("pitchrange"), Some("12"));
        assert_eq!(el.children[0].get("name"), Some("kicker"));
    }

    #[test]
    fn tripleoscillator_attributes() {
        let mut synth = TripleOscillator::default();
        synth.oscillators[0].wave_shape = WaveShape::Sine;
        synth.oscillators[2].user_wave = Some("waves/a.wav".into());
        let el = tripleoscillator(&synth);
        assert_eq!(el.get("wavetype0"), Some("0"));
        assert_eq!(el.get("coarse1"), Some("-12"));
        assert_eq!(el.get("userwavefile0"), Some(""));
        assert_eq!(el.get("userwavefile2"), Some("waves/a.wav"));
        assert_eq!(el.get("modalgo2"), Some("2"));
    }

    #[test]
    fn generic_plugin_keeps_attributes() {
        let mut inst = GenericInstrument::sample_player("kick.wav");
        assert_eq!(generic_plugin(&inst).get("amp"), Some("100"));
        inst.attributes = vec![("src".into(), "old.wav".into()), ("amp".into(), "70".into())];
        let el = generic_plugin(&inst);
        assert_eq!(el.get("src"), Some("kick.wav"));
        assert_eq!(el.get("amp"), Some("70"));
        assert_eq!(el.get("interp"), None);
    }
}
