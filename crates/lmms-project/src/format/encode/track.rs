//! Track-level encoding, one `track` element per model track.

use super::entity;
use crate::format::ticks::{bars_to_ticks, beats_to_ticks, ticks_per_step, to_percent, TICKS_PER_BAR};
use crate::format::xml::{flag, Element};
use crate::format::{AUTOMATION_TRACK, BB_TRACK, INSTRUMENT_TRACK, SAMPLE_TRACK};
use crate::model::{
    AutomationClip, AutomationTrack, BbRow, BeatBassline, ChannelSettings, Kicker, Monstro,
    SampleSource, Track, TrackKind, TripleOscillator, AUDIOFILEPROCESSOR,
};

/// Color LMMS gives new Beat+Bassline clips.
const BB_CLIP_COLOR: u32 = 4282417407;
/// Note key used for every step of a Beat+Bassline row.
const BB_STEP_KEY: u8 = 57;

fn track_element(track_type: i64, name: &str, muted: bool, solo: bool) -> Element {
    Element::new("track")
        .attr("type", track_type)
        .attr("name", name)
        .attr("muted", flag(muted))
        .attr("solo", flag(solo))
}

/// Encode a model track.
pub(super) fn track(track: &Track) -> Element {
    let track_type = match track.kind() {
        TrackKind::Sample(_) => SAMPLE_TRACK,
        TrackKind::BeatBassline(_) => BB_TRACK,
        TrackKind::Automation(_) => AUTOMATION_TRACK,
        _ => INSTRUMENT_TRACK,
    };
    let mut el = track_element(track_type, &track.name, track.muted, track.solo);

    match track.kind() {
        TrackKind::Sample(source) => el.push(sample_track(track, source)),
        TrackKind::BeatBassline(bb) => {
            let (bbtrack, bbtco) = beat_bassline(&track.name, bb);
            el.push(bbtrack);
            el.push(bbtco);
        }
        TrackKind::Automation(auto) => automation(&mut el, auto),
        TrackKind::Instrument(i) => el.push(instrument(track, entity::generic_plugin(i), &i.channel)),
        TrackKind::Sf2(s) => el.push(instrument(track, entity::sf2player(s), &s.channel)),
        TrackKind::TripleOscillator { synth, channel } => {
            el.push(instrument(track, entity::tripleoscillator(synth), channel))
        }
        TrackKind::Kicker { synth, channel } => {
            el.push(instrument(track, entity::kicker(synth), channel))
        }
        TrackKind::Monstro { synth, channel } => {
            el.push(instrument(track, entity::monstro(synth), channel))
        }
    }

    if track.kind().has_patterns() {
        for pattern in track.patterns() {
            el.push(entity::pattern(pattern));
        }
    }
    el
}

fn instrument(track: &Track, plugin: Element, channel: &ChannelSettings) -> Element {
    entity::instrument_track(track.volume(), track.pan(), channel, plugin)
}

fn sample_track(track: &Track, source: &SampleSource) -> Element {
    Element::new("sampletrack")
        .attr("vol", to_percent(track.volume()))
        .attr("pan", to_percent(track.pan()))
        .attr("src", &source.sample_path)
}

/// Default plugin element for a Beat+Bassline row.
fn row_plugin(row: &BbRow) -> Element {
    match row.plugin.as_str() {
        AUDIOFILEPROCESSOR => {
            entity::audiofileprocessor(row.sample_path.as_deref().unwrap_or_default())
        }
        "tripleoscillator" => entity::tripleoscillator(&TripleOscillator::default()),
        "kicker" => entity::kicker(&Kicker::default()),
        "monstro" => entity::monstro(&Monstro::default()),
        other => Element::new(other),
    }
}

fn bb_row(row: &BbRow) -> Element {
    let tps = ticks_per_step(row.num_steps());
    let mut pattern = Element::new("pattern")
        .attr("type", 0)
        .attr("name", &row.name)
        .attr("muted", 0)
        .attr("pos", 0)
        .attr("steps", row.num_steps())
        .attr("len", TICKS_PER_BAR);
    for (step, state) in row.active_steps() {
        pattern.push(
            Element::new("note")
                .attr("key", BB_STEP_KEY)
                .attr("pos", i64::from(step) * tps)
                .attr("len", tps)
                .attr("vol", state.velocity)
                .attr("pan", 0),
        );
    }

    track_element(INSTRUMENT_TRACK, &row.name, row.muted, false)
        .child(entity::instrument_track(
            row.volume(),
            row.pan(),
            &ChannelSettings::default(),
            row_plugin(row),
        ))
        .child(pattern)
}

/// The `bbtrack` container and the song-timeline `bbtco` clip.
fn beat_bassline(name: &str, bb: &BeatBassline) -> (Element, Element) {
    let mut container = Element::new("trackcontainer")
        .attr("type", "bbtrackcontainer")
        .attr("width", 580)
        .attr("height", 300)
        .attr("x", 610)
        .attr("y", 5)
        .attr("maximized", 0)
        .attr("minimized", 0)
        .attr("visible", 1);
    for row in bb.rows() {
        container.push(bb_row(row));
    }
    let bbtco = Element::new("bbtco")
        .attr("name", name)
        .attr("muted", 0)
        .attr("pos", bars_to_ticks(bb.position))
        .attr("len", bars_to_ticks(bb.length()))
        .attr("usestyle", 1)
        .attr("color", BB_CLIP_COLOR);
    let bbtrack = Element::new("bbtrack")
        .attr("steps", bb.num_steps())
        .child(container);
    (bbtrack, bbtco)
}

fn automation_clip(clip: &AutomationClip) -> Element {
    let mut el = Element::new("automationpattern")
        .attr("name", &clip.name)
        .attr("pos", bars_to_ticks(clip.position))
        .attr("len", bars_to_ticks(clip.length()))
        .attr("prog", clip.progression.code())
        .attr("tens", clip.tension())
        .attr("mute", flag(clip.muted));
    for point in clip.points() {
        let mut time = Element::new("time")
            .attr("pos", beats_to_ticks(point.time))
            .attr("value", point.value);
        if let Some(out) = point.out_value {
            time.set("outValue", out);
        }
        time.set("inTan", point.in_tangent);
        time.set("outTan", point.out_tangent);
        el.push(time);
    }
    if let Some(id) = &clip.object_id {
        el.push(Element::new("object").attr("id", id));
    }
    el
}

fn automation(el: &mut Element, auto: &AutomationTrack) {
    el.push(Element::new("automationtrack"));
    for clip in auto.clips() {
        el.push(automation_clip(clip));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AutomationPoint, Pattern, Progression};
    use pretty_assertions::assert_eq;

    fn names(el: &Element) -> Vec<&str> {
        el.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn instrument_track_layout() {
        let mut t = Track::instrument("Lead", "tripleoscillator");
        t.add_pattern(Pattern::new("A", 0, 4).unwrap()).unwrap();
        let el = track(&t);
        assert_eq!(el.get("type"), Some("0"));
        assert_eq!(el.get("name"), Some("Lead"));
        assert_eq!(names(&el), vec!["instrumenttrack", "pattern"]);
        let it = &el.children[0];
        assert_eq!(
            names(it),
            vec!["instrument", "eldata", "chordcreator", "arpeggiator", "midiport", "fxchain"]
        );
    }

    #[test]
    fn sample_track_layout() {
        let mut t = Track::sample("Vox", "vox.wav");
        t.set_volume(0.5).unwrap();
        let el = track(&t);
        assert_eq!(el.get("type"), Some("2"));
        let st = &el.children[0];
        assert_eq!(st.name, "sampletrack");
        assert_eq!(st.get("vol"), Some("50"));
        assert_eq!(st.get("src"), Some("vox.wav"));
    }

    #[test]
    fn bb_steps_become_note_positions() {
        let mut t = Track::beat_bassline("Beat");
        let bb = t.beat_bassline_mut().unwrap();
        let mut kick = BbRow::new("Kick").with_sample("kick.wav");
        for step in [0, 4, 8, 12] {
            kick.enable(step);
        }
        bb.add_row(kick);
        bb.position = 2;

        let el = track(&t);
        assert_eq!(el.get("type"), Some("1"));
        assert_eq!(names(&el), vec!["bbtrack", "bbtco"]);
        assert_eq!(el.children[1].get("pos"), Some("384"));
        assert_eq!(el.children[1].get("len"), Some("768"));

        let row = &el.children[0].children[0].children[0];
        let pattern = &row.children[1];
        assert_eq!(pattern.get("steps"), Some("16"));
        let positions: Vec<&str> = pattern
            .children
            .iter()
            .filter_map(|n| n.get("pos"))
            .collect();
        assert_eq!(positions, vec!["0", "48", "96", "144"]);
        assert_eq!(pattern.children[0].get("len"), Some("12"));
        let plugin = &row.children[0].children[0].children[0];
        assert_eq!(plugin.get("src"), Some("kick.wav"));
    }

    #[test]
    fn automation_points_in_ticks() {
        let mut t = Track::automation("Filter sweep");
        let auto = t.automation_mut().unwrap();
        let mut clip = AutomationClip::new("Sweep", 1, 2).unwrap();
        clip.progression = Progression::Linear;
        clip.add_point(AutomationPoint::new(0.0, 0.0));
        clip.add_point(AutomationPoint {
            out_value: Some(0.5),
            ..AutomationPoint::new(1.5, 1.0)
        });
        auto.add_clip(clip);

        let el = track(&t);
        assert_eq!(el.get("type"), Some("6"));
        assert_eq!(names(&el), vec!["automationtrack", "automationpattern"]);
        let clip = &el.children[1];
        assert_eq!(clip.get("pos"), Some("192"));
        assert_eq!(clip.get("len"), Some("384"));
        assert_eq!(clip.get("prog"), Some("1"));
        assert_eq!(clip.children[1].get("pos"), Some("72"));
        assert_eq!(clip.children[1].get("outValue"), Some("0.5"));
        assert_eq!(clip.children[0].get("outValue"), None);
    }
}
