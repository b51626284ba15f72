use std::f64::consts::TAU;

use lmms_project::format::ticks::{bars_to_ticks, ticks_to_beats};
use lmms_project::{
    AutomationClip, AutomationPoint, AutomationTrack, ModelError, Progression, Project, Track,
    TrackKind,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::error::ToolError;

/// Points generated per LFO cycle.
const LFO_POINTS_PER_CYCLE: u32 = 8;

#[derive(Deserialize, JsonSchema)]
pub struct AddAutomationTrackParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Track name (default "Automation")
    pub name: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddAutomationClipParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Automation track id
    pub track_id: usize,
    /// Clip name, e.g. "Filter Cutoff" (default "Automation")
    pub name: Option<String>,
    /// Start position in bars (default 0)
    pub position: Option<u32>,
    /// Length in bars (default 4)
    pub length: Option<u32>,
    /// Curve between points: discrete, linear or cubic, or the codes 0, 1, 2 (default linear)
    pub progression: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct ClipParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Automation track id
    pub track_id: usize,
    /// Clip id on that track
    pub clip_id: usize,
}

#[derive(Deserialize, JsonSchema)]
pub struct PointInput {
    /// Time in beats from the clip start
    pub time: f64,
    /// Parameter value at that time
    pub value: f64,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddAutomationPointParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Automation track id
    pub track_id: usize,
    /// Clip id on that track
    pub clip_id: usize,
    /// Time in beats; replaces any point already at this time
    pub time: f64,
    /// Parameter value
    pub value: f64,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetAutomationPointsParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Automation track id
    pub track_id: usize,
    /// Clip id on that track
    pub clip_id: usize,
    /// New points; existing points are removed first
    pub points: Vec<PointInput>,
}

#[derive(Deserialize, JsonSchema)]
pub struct CreateAutomationRampParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Automation track id
    pub track_id: usize,
    /// Clip id on that track
    pub clip_id: usize,
    /// Value at the start of the ramp
    pub start_value: f64,
    /// Value at the end of the ramp
    pub end_value: f64,
    /// Start time in beats (default 0)
    pub start_time: Option<f64>,
    /// End time in beats (default: the clip length)
    pub end_time: Option<f64>,
}

#[derive(Deserialize, JsonSchema)]
pub struct CreateAutomationLfoParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Automation track id
    pub track_id: usize,
    /// Clip id on that track
    pub clip_id: usize,
    /// Lowest value of the sine
    pub min_value: f64,
    /// Highest value of the sine
    pub max_value: f64,
    /// Cycles per bar (default 1.0)
    pub frequency: Option<f64>,
    /// Total cycles across the clip (default: clip length times frequency, at least 1)
    pub num_cycles: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
pub struct LinkAutomationParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Automation track holding the clip
    pub automation_track_id: usize,
    /// Clip to link
    pub clip_id: usize,
    /// Track whose parameter the clip controls
    pub target_track_id: usize,
    /// Parameter name: pitch, vol, pan, cutoff, reso, ...
    pub parameter: String,
}

fn parse_progression(raw: &str) -> Result<Progression, ModelError> {
    match raw.trim().parse::<i64>() {
        Ok(code) if (0..=2).contains(&code) => Ok(Progression::from_code(code)),
        _ => Progression::parse(raw),
    }
}

fn automation_track(project: &Project, track_id: usize) -> Result<&AutomationTrack, ToolError> {
    match project.track(track_id)?.kind() {
        TrackKind::Automation(a) => Ok(a),
        other => Err(ModelError::WrongTrackKind {
            track: track_id,
            actual: other.label(),
            expected: "automation",
        }
        .into()),
    }
}

fn clip_mut(project: &mut Project, track_id: usize, clip_id: usize) -> Result<&mut AutomationClip, ToolError> {
    Ok(project.track_mut(track_id)?.automation_mut()?.clip_mut(clip_id)?)
}

fn clip_beats(clip: &AutomationClip) -> f64 {
    ticks_to_beats(bars_to_ticks(clip.length()))
}

pub fn add_automation_track(project: &mut Project, params: AddAutomationTrackParams) -> Result<Value, ToolError> {
    let name = params.name.unwrap_or_else(|| "Automation".to_string());
    let id = project.add_track(Track::automation(name));
    Ok(success(json!({
        "track_id": id,
        "track": project.track(id)?.describe(),
    })))
}

pub fn add_automation_clip(project: &mut Project, params: AddAutomationClipParams) -> Result<Value, ToolError> {
    let mut clip = AutomationClip::new(
        params.name.unwrap_or_else(|| "Automation".to_string()),
        params.position.unwrap_or(0),
        params.length.unwrap_or(4),
    )?;
    clip.progression = match params.progression.as_deref() {
        Some(raw) => parse_progression(raw)?,
        None => Progression::Linear,
    };
    let track = project.track_mut(params.track_id)?.automation_mut()?;
    let id = track.add_clip(clip);
    Ok(success(json!({
        "track_id": params.track_id,
        "clip_id": id,
        "clip": track.clip(id)?.describe(),
    })))
}

pub fn add_automation_point(project: &mut Project, params: AddAutomationPointParams) -> Result<Value, ToolError> {
    let clip = clip_mut(project, params.track_id, params.clip_id)?;
    clip.add_point(AutomationPoint::new(params.time, params.value));
    Ok(success(json!({ "clip": clip.describe() })))
}

pub fn set_automation_points(project: &mut Project, params: SetAutomationPointsParams) -> Result<Value, ToolError> {
    let clip = clip_mut(project, params.track_id, params.clip_id)?;
    clip.clear();
    for point in params.points {
        clip.add_point(AutomationPoint::new(point.time, point.value));
    }
    Ok(success(json!({ "clip": clip.describe() })))
}

/// Two-point linear ramp replacing the clip's points.
pub fn create_automation_ramp(project: &mut Project, params: CreateAutomationRampParams) -> Result<Value, ToolError> {
    let clip = clip_mut(project, params.track_id, params.clip_id)?;
    let start_time = params.start_time.unwrap_or(0.0);
    let end_time = params.end_time.unwrap_or_else(|| clip_beats(clip));
    if end_time <= start_time {
        return Err(ToolError::invalid(format!(
            "end_time ({end_time}) must be after start_time ({start_time})"
        )));
    }
    clip.progression = Progression::Linear;
    clip.clear();
    clip.add_point(AutomationPoint::new(start_time, params.start_value));
    clip.add_point(AutomationPoint::new(end_time, params.end_value));
    Ok(success(json!({
        "ramp": {
            "start_value": params.start_value,
            "end_value": params.end_value,
            "start_time": start_time,
            "end_time": end_time,
        },
        "clip": clip.describe(),
    })))
}

/// Sine sweep between `min_value` and `max_value` across the whole clip, with
/// cubic interpolation between the generated points.
pub fn create_automation_lfo(project: &mut Project, params: CreateAutomationLfoParams) -> Result<Value, ToolError> {
    let frequency = params.frequency.unwrap_or(1.0);
    if !(frequency.is_finite() && frequency > 0.0) {
        return Err(ToolError::invalid(format!("frequency must be positive, got {frequency}")));
    }
    let clip = clip_mut(project, params.track_id, params.clip_id)?;
    let cycles = params
        .num_cycles
        .unwrap_or_else(|| (f64::from(clip.length()) * frequency) as u32)
        .max(1);
    let total_points = cycles * LFO_POINTS_PER_CYCLE;
    let total_beats = clip_beats(clip);
    let amplitude = (params.max_value - params.min_value) / 2.0;
    let center = (params.max_value + params.min_value) / 2.0;

    clip.progression = Progression::Cubic;
    clip.clear();
    for i in 0..=total_points {
        let time = f64::from(i) / f64::from(total_points) * total_beats;
        let phase = f64::from(i) / f64::from(LFO_POINTS_PER_CYCLE) * TAU;
        clip.add_point(AutomationPoint::new(time, center + amplitude * phase.sin()));
    }
    Ok(success(json!({
        "lfo": {
            "min_value": params.min_value,
            "max_value": params.max_value,
            "frequency": frequency,
            "num_cycles": cycles,
        },
        "clip": clip.describe(),
        "point_count": clip.points().len(),
    })))
}

pub fn clear_automation_clip(project: &mut Project, track_id: usize, clip_id: usize) -> Result<Value, ToolError> {
    let clip = clip_mut(project, track_id, clip_id)?;
    clip.clear();
    Ok(success(json!({ "clip": clip.describe() })))
}

/// Point the clip at a parameter of another track, using the legacy
/// `<object id>` linkage.
pub fn link_automation(project: &mut Project, params: LinkAutomationParams) -> Result<Value, ToolError> {
    automation_track(project, params.automation_track_id)?;
    project.track(params.target_track_id)?;
    let parameter = params.parameter.trim();
    if parameter.is_empty() {
        return Err(ToolError::invalid("parameter must not be empty"));
    }
    let object_id = format!("{}/{}", params.target_track_id * 1_000_000, parameter);
    let clip = clip_mut(project, params.automation_track_id, params.clip_id)?;
    clip.object_id = Some(object_id.clone());
    Ok(success(json!({
        "automation_track": params.automation_track_id,
        "clip_id": params.clip_id,
        "target_track": params.target_track_id,
        "parameter": parameter,
        "object_id": object_id,
    })))
}

pub fn describe_automation_track(project: &Project, track_id: usize) -> Result<Value, ToolError> {
    let track = automation_track(project, track_id)?;
    let clips: Vec<Value> = track
        .clips()
        .iter()
        .map(|clip| {
            let mut info = clip.describe();
            info["points"] = clip
                .points()
                .iter()
                .map(|p| json!({ "time": p.time, "value": p.value }))
                .collect();
            info
        })
        .collect();
    Ok(json!({
        "track_id": track_id,
        "name": project.track(track_id)?.name,
        "clip_count": clips.len(),
        "clips": clips,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_clip(length: u32) -> Project {
        let mut project = Project::new("Demo");
        project.add_track(Track::instrument("Lead", "tripleoscillator"));
        add_automation_track(
            &mut project,
            serde_json::from_str(r#"{"path": "a.mmp"}"#).unwrap(),
        )
        .unwrap();
        let params: AddAutomationClipParams = serde_json::from_str(&format!(
            r#"{{"path": "a.mmp", "track_id": 1, "name": "Cutoff", "length": {length}}}"#
        ))
        .unwrap();
        add_automation_clip(&mut project, params).unwrap();
        project
    }

    fn clip(project: &Project) -> &AutomationClip {
        &automation_track(project, 1).unwrap().clips()[0]
    }

    #[test]
    fn progression_accepts_names_and_codes() {
        assert_eq!(parse_progression("2").unwrap(), Progression::Cubic);
        assert_eq!(parse_progression("Discrete").unwrap(), Progression::Discrete);
        assert!(parse_progression("bouncy").is_err());
        assert_eq!(clip(&with_clip(2)).progression, Progression::Linear);
    }

    #[test]
    fn ramp_defaults_to_clip_length() {
        let mut project = with_clip(2);
        let params: CreateAutomationRampParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 1, "clip_id": 0, "start_value": 0.0, "end_value": 100.0}"#,
        )
        .unwrap();
        let out = create_automation_ramp(&mut project, params).unwrap();
        assert_eq!(out["ramp"]["end_time"], 8.0);
        let points = clip(&project).points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].value, 100.0);
    }

    #[test]
    fn lfo_spans_the_clip() {
        let mut project = with_clip(2);
        let params: CreateAutomationLfoParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 1, "clip_id": 0, "min_value": 0.0, "max_value": 10.0}"#,
        )
        .unwrap();
        let out = create_automation_lfo(&mut project, params).unwrap();
        assert_eq!(out["lfo"]["num_cycles"], 2);
        let clip = clip(&project);
        assert_eq!(clip.progression, Progression::Cubic);
        assert_eq!(clip.points().len(), 17);
        assert_eq!(clip.points()[16].time, 8.0);
        assert!((clip.points()[2].value - 10.0).abs() < 1e-9);
        assert!(clip.points().iter().all(|p| (-1e-9..=10.0 + 1e-9).contains(&p.value)));
    }

    #[test]
    fn points_replace_and_link() {
        let mut project = with_clip(1);
        let params: SetAutomationPointsParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 1, "clip_id": 0,
                "points": [{"time": 2, "value": 0.5}, {"time": 0, "value": 0.1}]}"#,
        )
        .unwrap();
        set_automation_points(&mut project, params).unwrap();
        let times: Vec<f64> = clip(&project).points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 2.0]);

        let link: LinkAutomationParams = serde_json::from_str(
            r#"{"path": "a.mmp", "automation_track_id": 1, "clip_id": 0, "target_track_id": 0, "parameter": "vol"}"#,
        )
        .unwrap();
        link_automation(&mut project, link).unwrap();
        assert_eq!(clip(&project).object_id.as_deref(), Some("0/vol"));

        let bad: LinkAutomationParams = serde_json::from_str(
            r#"{"path": "a.mmp", "automation_track_id": 0, "clip_id": 0, "target_track_id": 1, "parameter": "vol"}"#,
        )
        .unwrap();
        assert!(link_automation(&mut project, bad).is_err());
    }

    #[test]
    fn describe_lists_points() {
        let mut project = with_clip(1);
        let point: AddAutomationPointParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 1, "clip_id": 0, "time": 1.5, "value": 42}"#,
        )
        .unwrap();
        add_automation_point(&mut project, point).unwrap();
        let out = describe_automation_track(&project, 1).unwrap();
        assert_eq!(out["clips"][0]["points"], json!([{ "time": 1.5, "value": 42.0 }]));
        clear_automation_clip(&mut project, 1, 0).unwrap();
        assert!(clip(&project).points().is_empty());
    }
}
