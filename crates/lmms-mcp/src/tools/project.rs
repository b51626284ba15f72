use std::path::Path;

use lmms_project::Project;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::error::ToolError;

#[derive(Deserialize, JsonSchema)]
pub struct ProjectPathParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct CreateProjectParams {
    /// Where to write the new project (.mmp for plain XML, .mmpz for compressed)
    pub path: String,
    /// Project name (defaults to the file stem)
    pub name: Option<String>,
    /// Tempo in BPM, 20-999 (default 120)
    pub bpm: Option<u16>,
    /// Time signature numerator (default 4)
    pub time_sig_num: Option<u8>,
    /// Time signature denominator (default 4)
    pub time_sig_den: Option<u8>,
    /// Replace an existing file at `path` (default false)
    pub overwrite: Option<bool>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetProjectSettingsParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Tempo in BPM, 20-999
    pub bpm: Option<u16>,
    /// Time signature numerator, 1-32
    pub time_sig_num: Option<u8>,
    /// Time signature denominator, 1-32
    pub time_sig_den: Option<u8>,
    /// Master volume, 0.0-2.0
    pub master_volume: Option<f64>,
    /// Master pitch in semitones, -12 to 12
    pub master_pitch: Option<i8>,
}

/// Build the project `create_project` writes.
pub fn new_project(path: &Path, params: &CreateProjectParams) -> Result<Project, ToolError> {
    let name = match &params.name {
        Some(name) => name.clone(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string()),
    };
    let mut project = Project::new(name);
    project.set_bpm(params.bpm.unwrap_or(120))?;
    project.set_time_signature(params.time_sig_num.unwrap_or(4), params.time_sig_den.unwrap_or(4))?;
    Ok(project)
}

pub fn describe_project(project: &Project) -> Result<Value, ToolError> {
    Ok(json!({
        "summary": project.describe(),
        "description": project.to_description(),
    }))
}

pub fn set_project_settings(
    project: &mut Project,
    params: SetProjectSettingsParams,
) -> Result<Value, ToolError> {
    if let Some(bpm) = params.bpm {
        project.set_bpm(bpm)?;
    }
    if params.time_sig_num.is_some() || params.time_sig_den.is_some() {
        let (num, den) = project.time_signature();
        project.set_time_signature(params.time_sig_num.unwrap_or(num), params.time_sig_den.unwrap_or(den))?;
    }
    if let Some(volume) = params.master_volume {
        project.set_master_volume(volume)?;
    }
    if let Some(pitch) = params.master_pitch {
        project.set_master_pitch(pitch)?;
    }
    Ok(success(json!({ "project": project.describe() })))
}
