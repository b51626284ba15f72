//! Git snapshots of project files.
//!
//! Every command runs inside the project's own directory, so a project tree
//! that is already a git work tree keeps its history in place.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::success;
use crate::cli_runner::{self, CliOutput};
use crate::config::ServerConfig;
use crate::error::ToolError;
use crate::store::ProjectStore;

/// Field separator for `git log` output; commit subjects may contain `|`.
const LOG_SEPARATOR: char = '\x1f';

#[derive(Deserialize, JsonSchema)]
pub struct SaveVersionParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Commit message (default "Save <file>")
    pub message: Option<String>,
    /// Tag to attach to the new commit, e.g. "v1" or "drums-done"
    pub tag: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct ListVersionsParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Maximum number of versions to list (default 10)
    pub limit: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
pub struct RestoreVersionParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Commit hash or tag to restore
    pub version: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Version {
    pub hash: String,
    pub message: String,
    pub when: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// A project file split into the directory git runs in and the file name
/// passed to it.
struct Tracked {
    dir: PathBuf,
    file: String,
}

impl Tracked {
    fn new(config: &ServerConfig, path: &str) -> Result<Self, ToolError> {
        let full = config.resolve(path);
        if !full.is_file() {
            return Err(ToolError::invalid(format!("project not found: {}", full.display())));
        }
        let file = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ToolError::invalid(format!("not a file path: {path}")))?;
        let dir = match full.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self { dir, file })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }

    async fn git(&self, args: &[&str]) -> Result<CliOutput, ToolError> {
        cli_runner::git(&self.dir, args)
            .await
            .map_err(|e| ToolError::Command(format!("{e:#}")))
    }

    /// Like [`Tracked::git`] but a non-zero exit is an error.
    async fn git_ok(&self, what: &str, args: &[&str]) -> Result<CliOutput, ToolError> {
        let out = self.git(args).await?;
        if out.success {
            Ok(out)
        } else {
            Err(ToolError::Command(format!("git {what} failed: {}", out.stderr.trim())))
        }
    }

    /// Commit the file if it changed. Caller holds the project lock.
    async fn commit(&self, message: &str, tag: Option<&str>) -> Result<Value, ToolError> {
        self.git_ok("add", &["add", "--", self.file.as_str()]).await?;
        let status = self.git_ok("status", &["status", "--porcelain", "--", self.file.as_str()]).await?;
        if status.stdout.trim().is_empty() {
            return Ok(json!({
                "status": "no_changes",
                "message": "No changes to commit",
                "project": self.file,
            }));
        }

        self.git_ok("commit", &["commit", "-m", message, "--", self.file.as_str()]).await?;
        let head = self.git_ok("rev-parse", &["rev-parse", "--short", "HEAD"]).await?;
        let mut out = json!({
            "status": "committed",
            "hash": head.stdout.trim(),
            "message": message,
            "project": self.file,
        });
        if let Some(tag) = tag {
            let tagged = self.git(&["tag", "-f", tag, "-m", message]).await?;
            if tagged.success {
                out["tag"] = json!(tag);
            } else {
                out["tag_error"] = json!(tagged.stderr.trim());
            }
        }
        tracing::info!(project = %self.path().display(), hash = %head.stdout.trim(), "version saved");
        Ok(out)
    }
}

fn check_ref(name: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() || value.starts_with('-') {
        return Err(ToolError::invalid(format!("invalid {name}: {value:?}")));
    }
    Ok(())
}

/// Parse `git log` lines of `hash SEP subject SEP relative-date SEP refs`.
pub fn parse_log(stdout: &str) -> Vec<Version> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split(LOG_SEPARATOR);
            let hash = parts.next()?.trim();
            let message = parts.next()?;
            let when = parts.next()?;
            if hash.is_empty() {
                return None;
            }
            let tags = parts
                .next()
                .map(|refs| refs.trim().trim_start_matches('(').trim_end_matches(')').trim())
                .filter(|refs| !refs.is_empty())
                .map(str::to_string);
            Some(Version {
                hash: hash.to_string(),
                message: message.to_string(),
                when: when.to_string(),
                tags,
            })
        })
        .collect()
}

pub async fn save_version(
    config: &ServerConfig,
    store: &ProjectStore,
    params: SaveVersionParams,
) -> Result<Value, ToolError> {
    let tracked = Tracked::new(config, &params.path)?;
    if let Some(tag) = &params.tag {
        check_ref("tag", tag)?;
    }
    let message = params
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Save {}", tracked.file));

    let _guard = store.lock(&tracked.path()).await;
    tracked.commit(&message, params.tag.as_deref()).await
}

pub async fn list_versions(config: &ServerConfig, params: ListVersionsParams) -> Result<Value, ToolError> {
    let tracked = Tracked::new(config, &params.path)?;
    let limit = format!("-{}", params.limit.unwrap_or(10).max(1));
    let out = tracked
        .git_ok(
            "log",
            &[
                "log",
                limit.as_str(),
                "--pretty=format:%h%x1f%s%x1f%cr%x1f%d",
                "--follow",
                "--",
                tracked.file.as_str(),
            ],
        )
        .await?;
    let versions = parse_log(&out.stdout);
    Ok(json!({
        "project": tracked.file,
        "count": versions.len(),
        "versions": versions,
    }))
}

/// Check out an older revision of the file after committing whatever is on
/// disk now, so the restore itself can be undone.
pub async fn restore_version(
    config: &ServerConfig,
    store: &ProjectStore,
    params: RestoreVersionParams,
) -> Result<Value, ToolError> {
    let tracked = Tracked::new(config, &params.path)?;
    check_ref("version", &params.version)?;

    let _guard = store.lock(&tracked.path()).await;
    let previous = tracked
        .commit(&format!("Auto-save before restore to {}", params.version), None)
        .await?;
    tracked
        .git_ok("checkout", &["checkout", params.version.as_str(), "--", tracked.file.as_str()])
        .await?;
    tracing::info!(project = %tracked.path().display(), version = %params.version, "version restored");
    Ok(success(json!({
        "restored_to": params.version,
        "project": tracked.file,
        "previous_save": previous,
    })))
}
