//! The project root: song settings plus the ordered track list.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::validate;
use super::Track;
use crate::error::ModelError;

/// Text of the file a project was decoded from. The encoder splices
/// regenerated content into it so untouched regions keep their exact bytes.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    text: String,
}

impl SourceDocument {
    pub(crate) fn new(text: String) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An LMMS song project.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    bpm: u16,
    time_sig_numerator: u8,
    time_sig_denominator: u8,
    master_volume: f64,
    master_pitch: i8,
    tracks: Vec<Track>,
    source: Option<SourceDocument>,
}

/// Equality covers modeled fields only; the preserved source is ignored.
impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.bpm == other.bpm
            && self.time_sig_numerator == other.time_sig_numerator
            && self.time_sig_denominator == other.time_sig_denominator
            && self.master_volume == other.master_volume
            && self.master_pitch == other.master_pitch
            && self.tracks == other.tracks
    }
}

impl Project {
    /// Empty project at 120 BPM in 4/4.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bpm: 120,
            time_sig_numerator: 4,
            time_sig_denominator: 4,
            master_volume: 1.0,
            master_pitch: 0,
            tracks: Vec::new(),
            source: None,
        }
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: u16) -> Result<(), ModelError> {
        self.bpm = validate::within("bpm", bpm, 20..=999, "20..=999")?;
        Ok(())
    }

    pub fn time_signature(&self) -> (u8, u8) {
        (self.time_sig_numerator, self.time_sig_denominator)
    }

    pub fn set_time_signature(&mut self, numerator: u8, denominator: u8) -> Result<(), ModelError> {
        let numerator = validate::within("time signature numerator", numerator, 1..=32, "1..=32")?;
        let denominator =
            validate::within("time signature denominator", denominator, 1..=32, "1..=32")?;
        self.time_sig_numerator = numerator;
        self.time_sig_denominator = denominator;
        Ok(())
    }

    pub fn master_volume(&self) -> f64 {
        self.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f64) -> Result<(), ModelError> {
        self.master_volume = validate::within("master volume", volume, 0.0..=2.0, "0.0..=2.0")?;
        Ok(())
    }

    pub fn master_pitch(&self) -> i8 {
        self.master_pitch
    }

    pub fn set_master_pitch(&mut self, pitch: i8) -> Result<(), ModelError> {
        self.master_pitch = validate::within("master pitch", pitch, -12..=12, "-12..=12")?;
        Ok(())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    /// Append a track and return its id.
    pub fn add_track(&mut self, mut track: Track) -> usize {
        let id = self.tracks.len();
        track.set_id(id);
        self.tracks.push(track);
        id
    }

    pub fn track(&self, id: usize) -> Result<&Track, ModelError> {
        self.tracks.get(id).ok_or(ModelError::TrackNotFound(id))
    }

    pub fn track_mut(&mut self, id: usize) -> Result<&mut Track, ModelError> {
        self.tracks.get_mut(id).ok_or(ModelError::TrackNotFound(id))
    }

    /// Remove a track; later tracks shift down one id.
    pub fn remove_track(&mut self, id: usize) -> Result<Track, ModelError> {
        if id >= self.tracks.len() {
            return Err(ModelError::TrackNotFound(id));
        }
        let track = self.tracks.remove(id);
        for (i, t) in self.tracks.iter_mut().enumerate() {
            t.set_id(i);
        }
        Ok(track)
    }

    /// Re-check every track payload.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.tracks.iter().try_for_each(Track::validate)
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        self.source.as_ref()
    }

    pub(crate) fn set_source(&mut self, source: SourceDocument) {
        self.source = Some(source);
    }

    /// Forget the preserved document so the next encode writes from scratch.
    pub fn clear_source(&mut self) {
        self.source = None;
    }

    /// Summary suitable for tool responses.
    pub fn describe(&self) -> Value {
        let mut track_types: BTreeMap<&str, usize> = BTreeMap::new();
        for track in &self.tracks {
            *track_types.entry(track.kind().label()).or_default() += 1;
        }
        json!({
            "name": self.name,
            "bpm": self.bpm,
            "time_signature": format!("{}/{}", self.time_sig_numerator, self.time_sig_denominator),
            "master_volume": self.master_volume,
            "master_pitch": self.master_pitch,
            "track_count": self.tracks.len(),
            "track_types": track_types,
            "pattern_count": self.tracks.iter().map(|t| t.patterns().len()).sum::<usize>(),
            "note_count": self.tracks.iter().map(Track::note_count).sum::<usize>(),
        })
    }

    /// Multi-line human-readable overview.
    pub fn to_description(&self) -> String {
        let mut lines = vec![
            format!("Project: {}", self.name),
            format!(
                "Tempo: {} BPM, Time signature: {}/{}",
                self.bpm, self.time_sig_numerator, self.time_sig_denominator
            ),
            format!("Tracks: {}", self.tracks.len()),
            String::new(),
        ];
        for track in &self.tracks {
            lines.push(format!("  [{}] {}", track.id(), track.to_description()));
            for pattern in track.patterns() {
                lines.push(format!("       - {}", pattern.to_description()));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let project = Project::new("Song");
        assert_eq!(project.bpm(), 120);
        assert_eq!(project.time_signature(), (4, 4));
        assert_eq!(project.master_volume(), 1.0);
        assert!(project.source().is_none());
    }

    #[test]
    fn setters_validate_ranges() {
        let mut project = Project::new("Song");
        assert!(project.set_bpm(19).is_err());
        assert!(project.set_bpm(1000).is_err());
        project.set_bpm(174).unwrap();
        assert!(project.set_time_signature(0, 4).is_err());
        assert!(project.set_time_signature(7, 33).is_err());
        project.set_time_signature(7, 8).unwrap();
        assert!(project.set_master_volume(2.5).is_err());
        assert!(project.set_master_pitch(13).is_err());
        assert_eq!(project.bpm(), 174);
        assert_eq!(project.time_signature(), (7, 8));
    }

    #[test]
    fn track_ids_dense_after_removal() {
        let mut project = Project::new("Song");
        for name in ["a", "b", "c", "d"] {
            project.add_track(Track::instrument(name, "tripleoscillator"));
        }
        project.remove_track(1).unwrap();
        let ids: Vec<usize> = project.tracks().iter().map(Track::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(project.track(1).unwrap().name, "c");
        assert!(matches!(
            project.remove_track(3),
            Err(ModelError::TrackNotFound(3))
        ));
    }

    #[test]
    fn equality_ignores_source() {
        let mut a = Project::new("Song");
        let b = a.clone();
        a.set_source(SourceDocument::new("<lmms-project/>".into()));
        assert_eq!(a, b);
    }

    #[test]
    fn describe_counts_types() {
        let mut project = Project::new("Song");
        project.add_track(Track::instrument("Lead", "tripleoscillator"));
        project.add_track(Track::beat_bassline("Beat"));
        project.add_track(Track::instrument("Pad", "tripleoscillator"));
        let summary = project.describe();
        assert_eq!(summary["track_count"], 3);
        assert_eq!(summary["track_types"]["tripleoscillator"], 2);
        assert_eq!(summary["time_signature"], "4/4");
    }
}
