use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lmms_mcp::config::ServerConfig;
use lmms_mcp::tools::LmmsMcp;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lmms-mcp", about = "MCP server for LMMS projects")]
struct Args {
    /// Directory relative project paths resolve against
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// LMMS binary used for rendering (defaults to `lmms` on PATH)
    #[arg(long, env = "LMMS_BIN")]
    lmms_bin: Option<PathBuf>,

    /// Seconds a render may run before it is killed
    #[arg(long, default_value_t = 300)]
    render_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP transport.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = ServerConfig::new(args.project_dir)
        .with_lmms_bin(args.lmms_bin)
        .with_render_timeout(Duration::from_secs(args.render_timeout_secs));

    let server = LmmsMcp::new(config);
    tracing::info!(project_dir = %server.config().project_dir.display(), "starting lmms-mcp");
    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
