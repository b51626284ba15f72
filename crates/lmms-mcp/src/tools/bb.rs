use lmms_project::model::DEFAULT_VELOCITY;
use lmms_project::{BbRow, BeatBassline, ModelError, Project, Track, TrackKind};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::error::ToolError;

#[derive(Deserialize, JsonSchema)]
pub struct AddBbTrackParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track name (default "Drums")
    pub name: Option<String>,
    /// Steps per row, 1-192 (default 16)
    pub num_steps: Option<u32>,
    /// Position on the song timeline in bars (default 0)
    pub position: Option<u32>,
    /// Length on the song timeline in bars (default 4)
    pub length: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddBbInstrumentParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Beat+Bassline track id
    pub track_id: usize,
    /// Row name, e.g. "Kick"
    pub name: String,
    /// Instrument plugin (default audiofileprocessor)
    pub instrument: Option<String>,
    /// Sample file for audiofileprocessor rows
    pub sample_path: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct BbRowParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Beat+Bassline track id
    pub track_id: usize,
    /// Row id within the track
    pub instrument_id: usize,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetBbStepsParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Beat+Bassline track id
    pub track_id: usize,
    /// Row id within the track
    pub instrument_id: usize,
    /// Zero-based steps to enable; all others are cleared. Steps past the row length are ignored.
    pub steps: Vec<u32>,
    /// Velocity for the enabled steps, 0-127 (default 100)
    pub velocity: Option<u8>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetBbPatternParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Beat+Bassline track id
    pub track_id: usize,
    /// Row id within the track
    pub instrument_id: usize,
    /// Step grid, one character per step: "x" or "X" is a hit, anything else a rest.
    /// Example: "x...x...x...x..."
    pub pattern: String,
    /// Velocity for the hits, 0-127 (default 100)
    pub velocity: Option<u8>,
}

#[derive(Deserialize, JsonSchema)]
pub struct BbTrackParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Beat+Bassline track id
    pub track_id: usize,
}

fn beat_bassline(project: &Project, track_id: usize) -> Result<&BeatBassline, ToolError> {
    let track = project.track(track_id)?;
    match track.kind() {
        TrackKind::BeatBassline(bb) => Ok(bb),
        other => Err(ModelError::WrongTrackKind {
            track: track_id,
            actual: other.label(),
            expected: "bb",
        }
        .into()),
    }
}

fn row_mut(project: &mut Project, track_id: usize, row_id: usize) -> Result<&mut BbRow, ToolError> {
    Ok(project.track_mut(track_id)?.beat_bassline_mut()?.row_mut(row_id)?)
}

/// Replace a row's steps with `hits`, skipping any past the row length.
fn fill_row(row: &mut BbRow, hits: impl IntoIterator<Item = u32>, velocity: u8) -> Result<Value, ToolError> {
    let mut next = row.clone();
    next.clear_steps();
    let mut ignored = Vec::new();
    for step in hits {
        if step < next.num_steps() {
            next.set_step(step, true, velocity)?;
        } else {
            ignored.push(step);
        }
    }
    *row = next;
    Ok(json!({
        "row": row.describe(),
        "ignored_steps": ignored,
    }))
}

pub fn add_bb_track(project: &mut Project, params: AddBbTrackParams) -> Result<Value, ToolError> {
    let mut track = Track::beat_bassline(params.name.unwrap_or_else(|| "Drums".to_string()));
    let bb = track.beat_bassline_mut()?;
    bb.set_num_steps(params.num_steps.unwrap_or(16))?;
    bb.set_length(params.length.unwrap_or(4))?;
    bb.position = params.position.unwrap_or(0);
    let id = project.add_track(track);
    Ok(success(json!({
        "track_id": id,
        "track": project.track(id)?.describe(),
    })))
}

pub fn add_bb_instrument(project: &mut Project, params: AddBbInstrumentParams) -> Result<Value, ToolError> {
    let mut row = BbRow::new(params.name);
    if let Some(plugin) = params.instrument.filter(|p| !p.trim().is_empty()) {
        row = row.with_plugin(plugin.trim().to_lowercase());
    }
    if let Some(sample) = params.sample_path {
        row = row.with_sample(sample);
    }
    let bb = project.track_mut(params.track_id)?.beat_bassline_mut()?;
    let id = bb.add_row(row);
    Ok(success(json!({
        "track_id": params.track_id,
        "instrument_id": id,
        "row": bb.row(id)?.describe(),
    })))
}

pub fn remove_bb_instrument(project: &mut Project, track_id: usize, row_id: usize) -> Result<Value, ToolError> {
    let bb = project.track_mut(track_id)?.beat_bassline_mut()?;
    let removed = bb.remove_row(row_id)?;
    Ok(success(json!({
        "removed": removed.name,
        "remaining_rows": bb.rows().len(),
    })))
}

pub fn set_bb_steps(project: &mut Project, params: SetBbStepsParams) -> Result<Value, ToolError> {
    let row = row_mut(project, params.track_id, params.instrument_id)?;
    let out = fill_row(row, params.steps, params.velocity.unwrap_or(DEFAULT_VELOCITY))?;
    Ok(success(out))
}

pub fn set_bb_pattern(project: &mut Project, params: SetBbPatternParams) -> Result<Value, ToolError> {
    let hits: Vec<u32> = params
        .pattern
        .chars()
        .zip(0u32..)
        .filter(|(c, _)| matches!(c, 'x' | 'X'))
        .map(|(_, step)| step)
        .collect();
    let row = row_mut(project, params.track_id, params.instrument_id)?;
    let out = fill_row(row, hits, params.velocity.unwrap_or(DEFAULT_VELOCITY))?;
    Ok(success(out))
}

pub fn clear_bb_row(project: &mut Project, track_id: usize, row_id: usize) -> Result<Value, ToolError> {
    let row = row_mut(project, track_id, row_id)?;
    row.clear_steps();
    Ok(success(json!({ "row": row.describe() })))
}

pub fn describe_bb_track(project: &Project, track_id: usize) -> Result<Value, ToolError> {
    let track = project.track(track_id)?;
    let bb = beat_bassline(project, track_id)?;
    let rows: Vec<Value> = bb.rows().iter().map(BbRow::describe).collect();
    let grid: Vec<String> = bb
        .rows()
        .iter()
        .map(|r| format!("{:<12} |{}|", r.name, r.step_string()))
        .collect();
    Ok(json!({
        "track_id": track_id,
        "name": track.name,
        "num_steps": bb.num_steps(),
        "position": bb.position,
        "length": bb.length(),
        "rows": rows,
        "grid": grid.join("\n"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drums() -> Project {
        let mut project = Project::new("Demo");
        add_bb_track(
            &mut project,
            serde_json::from_str(r#"{"path": "a.mmp", "num_steps": 8}"#).unwrap(),
        )
        .unwrap();
        add_bb_instrument(
            &mut project,
            serde_json::from_str(
                r#"{"path": "a.mmp", "track_id": 0, "name": "Kick", "sample_path": "drums/kick01.ogg"}"#,
            )
            .unwrap(),
        )
        .unwrap();
        project
    }

    fn grid(project: &Project) -> String {
        beat_bassline(project, 0).unwrap().rows()[0].step_string()
    }

    #[test]
    fn rows_inherit_track_steps() {
        let project = drums();
        let bb = beat_bassline(&project, 0).unwrap();
        assert_eq!(bb.rows()[0].num_steps(), 8);
        assert_eq!(bb.rows()[0].sample_path.as_deref(), Some("drums/kick01.ogg"));
    }

    #[test]
    fn steps_replace_and_skip_out_of_range() {
        let mut project = drums();
        let params: SetBbStepsParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "instrument_id": 0, "steps": [0, 4, 9]}"#,
        )
        .unwrap();
        let out = set_bb_steps(&mut project, params).unwrap();
        assert_eq!(out["ignored_steps"], json!([9]));
        assert_eq!(grid(&project), "x...x...");

        let params: SetBbStepsParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "instrument_id": 0, "steps": [2]}"#,
        )
        .unwrap();
        set_bb_steps(&mut project, params).unwrap();
        assert_eq!(grid(&project), "..x.....");
    }

    #[test]
    fn pattern_string_sets_hits() {
        let mut project = drums();
        let params: SetBbPatternParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "instrument_id": 0, "pattern": "X-x-..x.", "velocity": 80}"#,
        )
        .unwrap();
        set_bb_pattern(&mut project, params).unwrap();
        assert_eq!(grid(&project), "x.x...x.");
        let row = &beat_bassline(&project, 0).unwrap().rows()[0];
        assert!(row.active_steps().all(|(_, s)| s.velocity == 80));

        clear_bb_row(&mut project, 0, 0).unwrap();
        assert_eq!(grid(&project), "........");
    }

    #[test]
    fn wrong_track_kind() {
        let mut project = drums();
        project.add_track(Track::instrument("Lead", "tripleoscillator"));
        assert!(describe_bb_track(&project, 1).is_err());
        assert!(remove_bb_instrument(&mut project, 0, 3).is_err());
        remove_bb_instrument(&mut project, 0, 0).unwrap();
        assert_eq!(describe_bb_track(&project, 0).unwrap()["rows"], json!([]));
    }
}
