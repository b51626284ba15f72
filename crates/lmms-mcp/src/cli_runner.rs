use anyhow::{bail, Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Limit for `lmms --version`.
pub const VERSION_TIMEOUT: Duration = Duration::from_secs(10);
/// Limit for each git invocation.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolve the LMMS binary: explicit flag, then `LMMS_BIN`, then `lmms` on `PATH`.
pub fn lmms_binary(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(bin) = explicit {
        return Ok(bin.to_path_buf());
    }

    if let Ok(bin) = std::env::var("LMMS_BIN") {
        if !bin.is_empty() {
            return Ok(PathBuf::from(bin));
        }
    }

    which::which("lmms").context("Could not find 'lmms' on PATH; pass --lmms-bin or set LMMS_BIN")
}

pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Run `program` to completion, killing it if `timeout` elapses first.
pub async fn run<I, S>(
    program: impl AsRef<OsStr>,
    args: I,
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<CliOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    tracing::debug!(program = %program.to_string_lossy(), "launching subprocess");
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => {
            result.with_context(|| format!("failed to launch {}", program.to_string_lossy()))?
        }
        Err(_) => bail!(
            "{} timed out after {}s",
            program.to_string_lossy(),
            timeout.as_secs()
        ),
    };
    tracing::debug!(
        program = %program.to_string_lossy(),
        status = ?output.status.code(),
        "subprocess exited"
    );

    Ok(CliOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}

/// Headless render settings for `lmms -r`.
pub struct RenderJob<'a> {
    pub project: &'a Path,
    pub output: &'a Path,
    pub format: &'a str,
    pub sample_rate: u32,
    pub bit_depth: u16,
}

impl RenderJob<'_> {
    fn args(&self) -> Vec<&OsStr> {
        vec![
            OsStr::new("-r"),
            self.project.as_os_str(),
            OsStr::new("-o"),
            self.output.as_os_str(),
            OsStr::new("-f"),
            OsStr::new(self.format),
        ]
    }
}

pub async fn render(lmms: &Path, job: &RenderJob<'_>, timeout: Duration) -> Result<CliOutput> {
    let rate = job.sample_rate.to_string();
    let bits = job.bit_depth.to_string();
    let mut args = job.args();
    args.extend([OsStr::new("-s"), OsStr::new(&rate), OsStr::new("-b"), OsStr::new(&bits)]);
    run(lmms, args, None, timeout).await
}

pub async fn lmms_version(lmms: &Path) -> Result<CliOutput> {
    run(lmms, ["--version"], None, VERSION_TIMEOUT).await
}

/// Run git inside `dir`.
pub async fn git(dir: &Path, args: &[&str]) -> Result<CliOutput> {
    run("git", args, Some(dir), GIT_TIMEOUT).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_binary_wins() {
        let bin = lmms_binary(Some(Path::new("/opt/lmms/bin/lmms"))).unwrap();
        assert_eq!(bin, PathBuf::from("/opt/lmms/bin/lmms"));
    }

    #[test]
    fn render_arguments() {
        let job = RenderJob {
            project: Path::new("song.mmpz"),
            output: Path::new("song.flac"),
            format: "flac",
            sample_rate: 44100,
            bit_depth: 16,
        };
        let args: Vec<_> = job.args().iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-r", "song.mmpz", "-o", "song.flac", "-f", "flac"]);
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let result = run(
            "definitely-not-a-real-binary-7f3a",
            ["--version"],
            None,
            Duration::from_secs(5),
        )
        .await;
        assert!(result.is_err());
    }
}
