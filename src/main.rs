use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tube_batch_lib::config::AppConfig;
use tube_batch_lib::downloader::models::RunMode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "tube-batch", version = VERSION)]
#[command(about = "Download a queue of video URLs into per-group folders")]
struct Cli {
    /// JSON config file merged over the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// URL queue file (one URL per line, `#` for comments)
    #[arg(long)]
    queue: Option<PathBuf>,

    /// Parent directory of the group folders
    #[arg(long)]
    output: Option<PathBuf>,

    /// `batch`: one yt-dlp call per group; `adaptive`: per-URL format selection and fallbacks
    #[arg(long, value_parser = parse_mode)]
    mode: Option<RunMode>,

    /// Maximum video height
    #[arg(long)]
    height: Option<u32>,

    /// SOCKS5/HTTP proxy for yt-dlp
    #[arg(long)]
    proxy: Option<String>,

    /// Do not read browser cookies
    #[arg(long, default_value_t = false)]
    no_cookies: bool,

    /// Classify the queue and print the groups without downloading
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Enable debug logging (download progress included)
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn parse_mode(s: &str) -> Result<RunMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "batch" => Ok(RunMode::Batch),
        "adaptive" => Ok(RunMode::Adaptive),
        other => Err(format!("unknown mode '{}' (expected batch or adaptive)", other)),
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .try_init();
}

fn apply_cli(config: &mut AppConfig, cli: &Cli) {
    if let Some(queue) = &cli.queue {
        config.queue_file = queue.clone();
    }
    if let Some(output) = &cli.output {
        config.output_root = output.clone();
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(height) = cli.height {
        config.height_ceiling = height;
    }
    if let Some(proxy) = &cli.proxy {
        config.proxy = Some(proxy.clone());
    }
    if cli.no_cookies {
        config.cookies_browser = None;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    apply_cli(&mut config, &cli);
    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    info!(
        "tube-batch v{} | mode={} | ceiling={}p | queue={}",
        VERSION,
        config.mode,
        config.height_ceiling,
        config.queue_file.display()
    );

    match tube_batch_lib::run(&config, cli.dry_run).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
