//! Logging bootstrap: console output plus a rolling file in the output
//! directory, so a CI artifact always carries the full trace.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{CliError, CliResult};

/// Initialize tracing. `RUST_LOG` wins over the verbosity flags.
///
/// The returned guard must stay alive for the duration of the program or
/// file logs are dropped.
pub fn init(verbosity: u8, quiet: bool, output_dir: &Path) -> CliResult<WorkerGuard> {
    std::fs::create_dir_all(output_dir)?;

    let file_appender = tracing_appender::rolling::daily(output_dir, "paseo.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })?;

    Ok(guard)
}

fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
