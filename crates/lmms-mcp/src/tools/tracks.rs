use lmms_project::model::{GenericInstrument, AUDIOFILEPROCESSOR, SF2PLAYER};
use lmms_project::{Project, Sf2Instrument, Track, TrackKind};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::error::ToolError;

#[derive(Deserialize, JsonSchema)]
pub struct TrackParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track id (its index in the project)
    pub track_id: usize,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddInstrumentTrackParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track name
    pub name: String,
    /// Instrument plugin, e.g. tripleoscillator, kicker, monstro, audiofileprocessor, sf2player
    /// (default tripleoscillator)
    pub instrument: Option<String>,
    /// Sample file for audiofileprocessor, or soundfont file for sf2player
    pub preset: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddSampleTrackParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track name
    pub name: String,
    /// Audio file the track plays
    pub sample_path: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetTrackVolumeParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track id
    pub track_id: usize,
    /// Volume, 1.0 is unity (stored as a percentage)
    pub volume: f64,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetTrackPanParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track id
    pub track_id: usize,
    /// Pan from -1.0 (left) to 1.0 (right)
    pub pan: f64,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetTrackMuteParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track id
    pub track_id: usize,
    /// Whether the track is muted
    pub muted: bool,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetTrackSoloParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track id
    pub track_id: usize,
    /// Whether the track is soloed
    pub solo: bool,
}

pub fn list_tracks(project: &Project) -> Result<Value, ToolError> {
    let tracks: Vec<Value> = project.tracks().iter().map(Track::describe).collect();
    Ok(json!({
        "count": tracks.len(),
        "tracks": tracks,
    }))
}

/// Track for an instrument plugin name, with `preset` routed to the plugin's file slot.
fn instrument_track(name: String, plugin: &str, preset: Option<String>) -> Result<Track, ToolError> {
    match (plugin, preset) {
        (SF2PLAYER, preset) => {
            let sf2 = Sf2Instrument::new(preset.unwrap_or_default(), 0, 0)?;
            Ok(Track::new(name, TrackKind::Sf2(sf2))?)
        }
        (AUDIOFILEPROCESSOR, Some(sample)) => Ok(Track::new(
            name,
            TrackKind::Instrument(GenericInstrument::sample_player(sample)),
        )?),
        (plugin, _) => Ok(Track::instrument(name, plugin)),
    }
}

pub fn add_instrument_track(
    project: &mut Project,
    params: AddInstrumentTrackParams,
) -> Result<Value, ToolError> {
    let plugin = params
        .instrument
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("tripleoscillator")
        .to_lowercase();
    let track = instrument_track(params.name, &plugin, params.preset)?;
    let id = project.add_track(track);
    Ok(success(json!({
        "track_id": id,
        "track": project.track(id)?.describe(),
        "track_count": project.tracks().len(),
    })))
}

pub fn add_sample_track(project: &mut Project, params: AddSampleTrackParams) -> Result<Value, ToolError> {
    let id = project.add_track(Track::sample(params.name, params.sample_path));
    Ok(success(json!({
        "track_id": id,
        "track": project.track(id)?.describe(),
    })))
}

pub fn remove_track(project: &mut Project, track_id: usize) -> Result<Value, ToolError> {
    let removed = project.remove_track(track_id)?;
    Ok(success(json!({
        "removed": removed.name,
        "remaining_tracks": project.tracks().len(),
    })))
}

pub fn set_track_volume(project: &mut Project, params: SetTrackVolumeParams) -> Result<Value, ToolError> {
    let track = project.track_mut(params.track_id)?;
    track.set_volume(params.volume)?;
    Ok(success(json!({ "track_id": params.track_id, "volume": track.volume() })))
}

pub fn set_track_pan(project: &mut Project, params: SetTrackPanParams) -> Result<Value, ToolError> {
    let track = project.track_mut(params.track_id)?;
    track.set_pan(params.pan)?;
    Ok(success(json!({ "track_id": params.track_id, "pan": track.pan() })))
}

pub fn set_track_mute(project: &mut Project, params: SetTrackMuteParams) -> Result<Value, ToolError> {
    project.track_mut(params.track_id)?.muted = params.muted;
    Ok(success(json!({ "track_id": params.track_id, "muted": params.muted })))
}

pub fn set_track_solo(project: &mut Project, params: SetTrackSoloParams) -> Result<Value, ToolError> {
    project.track_mut(params.track_id)?.solo = params.solo;
    Ok(success(json!({ "track_id": params.track_id, "solo": params.solo })))
}
