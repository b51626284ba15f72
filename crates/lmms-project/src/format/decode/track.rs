//! Track-level decoding, dispatched on the `type` attribute.

use roxmltree::Node;

use super::attrs::{child, children, flag, float, int, text};
use super::entity;
use crate::error::DecodeError;
use crate::format::ticks::{from_percent, ticks_per_step, ticks_to_beats};
use crate::format::{
    AUTOMATION_TRACK, BB_TRACK, HIDDEN_AUTOMATION_TRACK, INSTRUMENT_TRACK, SAMPLE_TRACK,
};
use crate::model::validate::narrow;
use crate::model::{
    AutomationClip, AutomationPoint, AutomationTrack, BbRow, BeatBassline, GenericInstrument,
    Progression, Track, TrackKind, TripleOscillator, AUDIOFILEPROCESSOR, DEFAULT_STEPS,
};

/// Plugin assumed when an instrument track names none.
const DEFAULT_PLUGIN: &str = "tripleoscillator";

/// Decode one `track` element. Returns `Ok(None)` for track types the model
/// does not represent.
pub(super) fn track(node: Node<'_, '_>) -> Result<Option<Track>, DecodeError> {
    let track_type = int(node, "type", INSTRUMENT_TRACK)?;
    let name = text(node, "name", "Track");

    let mut track = match track_type {
        INSTRUMENT_TRACK => instrument_track(node, name)?,
        BB_TRACK => match bb_track(node, name)? {
            Some(track) => track,
            None => return Ok(None),
        },
        SAMPLE_TRACK => sample_track(node, name)?,
        HIDDEN_AUTOMATION_TRACK | AUTOMATION_TRACK => automation_track(node, name)?,
        other => {
            tracing::trace!(track_type = other, name, "skipping unsupported track type");
            return Ok(None);
        }
    };
    track.muted = flag(node, "muted")?;
    track.solo = flag(node, "solo")?;
    Ok(Some(track))
}

fn instrument_kind(instrument_track: Option<Node<'_, '_>>) -> Result<TrackKind, DecodeError> {
    let Some(it) = instrument_track else {
        return Ok(TrackKind::for_plugin(DEFAULT_PLUGIN));
    };
    let channel = entity::channel(it)?;
    let kind = match entity::plugin(it) {
        Some(("sf2player", node)) => TrackKind::Sf2(entity::sf2(node, channel)?),
        Some(("tripleoscillator", node)) => TrackKind::TripleOscillator {
            synth: entity::tripleoscillator(node)?,
            channel,
        },
        Some(("kicker", node)) => TrackKind::Kicker {
            synth: entity::kicker(node)?,
            channel,
        },
        Some(("monstro", node)) => TrackKind::Monstro {
            synth: entity::monstro(node)?,
            channel,
        },
        Some((plugin, node)) => TrackKind::Instrument(GenericInstrument {
            plugin: plugin.to_string(),
            sample_path: (plugin == AUDIOFILEPROCESSOR)
                .then(|| text(node, "src", "").to_string()),
            attributes: entity::raw_attributes(node),
            channel,
        }),
        None => TrackKind::TripleOscillator {
            synth: TripleOscillator::default(),
            channel,
        },
    };
    Ok(kind)
}

/// Mixer volume and pan of an `instrumenttrack` or `sampletrack`.
fn mixer(node: Option<Node<'_, '_>>) -> Result<(f64, f64), DecodeError> {
    match node {
        Some(node) => Ok((
            from_percent(float(node, "vol", 100.0)?),
            from_percent(float(node, "pan", 0.0)?),
        )),
        None => Ok((1.0, 0.0)),
    }
}

fn instrument_track(node: Node<'_, '_>, name: &str) -> Result<Track, DecodeError> {
    let it = child(node, "instrumenttrack");
    let mut track = Track::new(name, instrument_kind(it)?)?;
    let (volume, pan) = mixer(it)?;
    track.set_volume(volume)?;
    track.set_pan(pan)?;
    for pattern in children(node, "pattern") {
        track.add_pattern(entity::pattern(pattern)?)?;
    }
    Ok(track)
}

fn sample_track(node: Node<'_, '_>, name: &str) -> Result<Track, DecodeError> {
    let st = child(node, "sampletrack");
    let src = st.map(|n| text(n, "src", "")).unwrap_or_default();
    let mut track = Track::sample(name, src);
    let (volume, pan) = mixer(st)?;
    track.set_volume(volume)?;
    track.set_pan(pan)?;
    for pattern in children(node, "pattern") {
        track.add_pattern(entity::pattern(pattern)?)?;
    }
    Ok(track)
}

/// One instrument row of a BB track, with its step pattern.
fn bb_row(node: Node<'_, '_>) -> Result<BbRow, DecodeError> {
    let mut row = BbRow::new(text(node, "name", "Drum")).with_plugin(DEFAULT_PLUGIN);
    row.muted = flag(node, "muted")?;

    let it = child(node, "instrumenttrack");
    if let Some((plugin, plugin_node)) = it.and_then(entity::plugin) {
        row.plugin = plugin.to_string();
        if plugin == AUDIOFILEPROCESSOR {
            row.sample_path = plugin_node
                .attribute("src")
                .filter(|src| !src.is_empty())
                .map(str::to_string);
        }
    }
    let (volume, pan) = mixer(it)?;
    row.set_volume(volume)?;
    row.set_pan(pan)?;

    if let Some(pattern) = child(node, "pattern") {
        let steps = narrow("steps", int(pattern, "steps", i64::from(DEFAULT_STEPS))?, "1..=192")?;
        row.set_num_steps(steps)?;
        let tps = ticks_per_step(steps);
        for note in children(pattern, "note") {
            let step = narrow("step", int(note, "pos", 0)?.div_euclid(tps), ">= 0")?;
            let velocity = narrow("step velocity", int(note, "vol", 100)?.min(127), "0..=127")?;
            row.set_step(step, true, velocity)?;
        }
    }
    Ok(row)
}

fn bb_track(node: Node<'_, '_>, name: &str) -> Result<Option<Track>, DecodeError> {
    let Some(bbtrack) = child(node, "bbtrack") else {
        tracing::trace!(name, "skipping bb track without bbtrack element");
        return Ok(None);
    };
    let mut bb = BeatBassline::default();
    if let Some(bbtco) = child(node, "bbtco") {
        bb.position = entity::bar_position(bbtco, "pos")?;
        bb.set_length(entity::bar_length(bbtco, "len")?)?;
    }
    if let Some(container) = child(bbtrack, "trackcontainer") {
        for row in children(container, "track") {
            bb.push_decoded_row(bb_row(row)?);
        }
    }
    // Files without a track-level count take the first row's.
    let fallback = bb.rows().first().map_or(DEFAULT_STEPS, BbRow::num_steps);
    let steps = narrow("steps", int(bbtrack, "steps", i64::from(fallback))?, "1..=192")?;
    bb.set_num_steps(steps)?;
    Ok(Some(Track::new(name, TrackKind::BeatBassline(bb))?))
}

fn automation_clip(node: Node<'_, '_>) -> Result<AutomationClip, DecodeError> {
    let mut clip = AutomationClip::new(
        text(node, "name", "Automation"),
        entity::bar_position(node, "pos")?,
        entity::bar_length(node, "len")?,
    )?;
    clip.progression = Progression::from_code(int(node, "prog", 0)?);
    clip.set_tension(float(node, "tens", 1.0)?)?;
    clip.muted = flag(node, "mute")?;
    clip.object_id = child(node, "object")
        .and_then(|o| o.attribute("id"))
        .map(str::to_string);

    for time in children(node, "time") {
        clip.add_point(AutomationPoint {
            time: ticks_to_beats(int(time, "pos", 0)?),
            value: float(time, "value", 0.0)?,
            out_value: entity::out_value(time)?,
            in_tangent: float(time, "inTan", 0.0)?,
            out_tangent: float(time, "outTan", 0.0)?,
        });
    }
    Ok(clip)
}

fn automation_track(node: Node<'_, '_>, name: &str) -> Result<Track, DecodeError> {
    let mut auto = AutomationTrack::default();
    for clip in children(node, "automationpattern") {
        auto.add_clip(automation_clip(clip)?);
    }
    Ok(Track::new(name, TrackKind::Automation(auto))?)
}
