//! Paseo CLI: drive the mobile-web search-to-playback journey.
//!
//! ## Usage
//!
//! ```bash
//! paseo run                          # Run the journey with defaults
//! paseo run --term "speedrun"        # Different search query
//! paseo run --headless false        # Watch the browser work
//! ```

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use paseo::prelude::*;

mod error;
mod logging;
mod runner;

use error::CliResult;

#[derive(Debug, Parser)]
#[command(name = "paseo", version, about = "Resilient mobile-web journey automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the search-to-playback journey and capture evidence
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Site under test
    #[arg(long, env = "PASEO_BASE_URL", default_value = "https://m.twitch.tv")]
    url: String,

    /// Search query to type
    #[arg(long, env = "PASEO_SEARCH_TERM", default_value = "lofi hip hop")]
    term: String,

    /// Force headless on or off; unset means headless only in CI
    #[arg(long, env = "PASEO_HEADLESS")]
    headless: Option<bool>,

    /// Directory for logs and failure evidence
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Path of the evidence screenshot (default: <output-dir>/final_screen.png)
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Chromium binary to launch (default: auto-detect)
    #[arg(long, env = "PASEO_CHROMIUM")]
    chromium_path: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let output_dir = match &cli.command {
        Commands::Run(args) => args.output_dir.clone(),
    };
    let _guard = match logging::init(cli.verbose, cli.quiet, &output_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Run(args) => run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: RunArgs) -> CliResult<()> {
    let config = build_config(&args);

    let mut browser_config = BrowserConfig::new()
        .with_device(config.device.clone())
        .with_no_sandbox();
    if let Some(headless) = config.headless {
        browser_config = browser_config.with_headless(headless);
    }
    if let Some(path) = args.chromium_path {
        browser_config = browser_config.with_chromium_path(path);
    }

    let browser = Browser::launch(browser_config).await?;
    let session = browser.new_session().await?;

    let outcome = runner::run_with_evidence(&session, &config).await;
    if let Err(e) = browser.close().await {
        // teardown failure does not change the journey verdict
        tracing::warn!(error = %e, "browser close failed");
    }

    let report = outcome?;
    info!(
        url = %report.final_url,
        dismissed = report.dismissed,
        playback = report.playback_verified,
        screenshot = %report.screenshot.display(),
        "journey finished"
    );
    println!("Screenshot saved to: {}", report.screenshot.display());
    Ok(())
}

fn build_config(args: &RunArgs) -> JourneyConfig {
    let screenshot = args
        .screenshot
        .clone()
        .unwrap_or_else(|| args.output_dir.join("final_screen.png"));
    let mut config = JourneyConfig::new()
        .with_base_url(args.url.clone())
        .with_search_term(args.term.clone())
        .with_output_dir(args.output_dir.clone())
        .with_screenshot_path(screenshot);
    if let Some(headless) = args.headless {
        config = config.with_headless(headless);
    }
    config
}
