use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::success;
use crate::cli_runner::{self, RenderJob};
use crate::config::ServerConfig;
use crate::error::ToolError;
use crate::store::ProjectStore;

/// Formats `lmms -r` can write.
pub const RENDER_FORMATS: [&str; 4] = ["wav", "ogg", "mp3", "flac"];

#[derive(Deserialize, JsonSchema)]
pub struct RenderProjectParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Output audio file (default: the project path with the format's extension)
    pub output: Option<String>,
    /// Output format: wav, ogg, mp3 or flac (default flac)
    pub format: Option<String>,
    /// Sample rate in Hz (default 44100)
    pub sample_rate: Option<u32>,
    /// Bits per sample (default 16)
    pub bit_depth: Option<u16>,
}

fn lmms(config: &ServerConfig) -> Result<PathBuf, ToolError> {
    cli_runner::lmms_binary(config.lmms_bin.as_deref()).map_err(|e| ToolError::Command(format!("{e:#}")))
}

fn render_format(raw: Option<&str>) -> Result<String, ToolError> {
    let format = raw.map(|f| f.trim().to_lowercase()).unwrap_or_else(|| "flac".to_string());
    if RENDER_FORMATS.contains(&format.as_str()) {
        Ok(format)
    } else {
        Err(ToolError::invalid(format!(
            "unsupported render format {format:?}; expected one of {}",
            RENDER_FORMATS.join(", ")
        )))
    }
}

fn output_path(config: &ServerConfig, project: &Path, output: Option<&str>, format: &str) -> PathBuf {
    match output {
        Some(out) => config.resolve(out),
        None => project.with_extension(format),
    }
}

pub async fn lmms_version(config: &ServerConfig) -> Result<Value, ToolError> {
    let bin = lmms(config)?;
    let out = cli_runner::lmms_version(&bin)
        .await
        .map_err(|e| ToolError::Command(format!("{e:#}")))?;
    if !out.success {
        return Err(ToolError::Command(format!("lmms --version failed: {}", out.stderr.trim())));
    }
    // Some builds print the banner on stderr.
    let text = if out.stdout.trim().is_empty() { &out.stderr } else { &out.stdout };
    Ok(json!({
        "binary": bin.display().to_string(),
        "version": text.lines().next().unwrap_or_default().trim(),
        "output": text.trim(),
    }))
}

/// Render with LMMS in headless mode. The project stays locked until LMMS
/// exits so no edit lands halfway through a render.
pub async fn render_project(
    config: &ServerConfig,
    store: &ProjectStore,
    params: RenderProjectParams,
) -> Result<Value, ToolError> {
    let format = render_format(params.format.as_deref())?;
    let project = config.resolve(&params.path);
    if !project.is_file() {
        return Err(ToolError::invalid(format!("project not found: {}", project.display())));
    }
    let output = output_path(config, &project, params.output.as_deref(), &format);
    let bin = lmms(config)?;
    let job = RenderJob {
        project: &project,
        output: &output,
        format: &format,
        sample_rate: params.sample_rate.unwrap_or(44_100),
        bit_depth: params.bit_depth.unwrap_or(16),
    };

    let _guard = store.lock(&project).await;
    tracing::info!(project = %project.display(), output = %output.display(), "rendering");
    let out = cli_runner::render(&bin, &job, config.render_timeout)
        .await
        .map_err(|e| ToolError::Command(format!("{e:#}")))?;
    if !out.success {
        return Err(ToolError::Command(format!("render failed: {}", out.stderr.trim())));
    }
    Ok(success(json!({
        "output": output.display().to_string(),
        "format": format,
        "sample_rate": job.sample_rate,
        "bit_depth": job.bit_depth,
        "stderr": out.stderr.trim(),
    })))
}
