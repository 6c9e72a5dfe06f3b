use std::io::IsTerminal;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use lif::commands::Commands;
use miette::{IntoDiagnostic, Result};
use tracing_log::AsTrace;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Inspect Leica LIF containers and pull out their blocks
#[derive(Parser)]
#[command(version, about, long_about = None, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

/// Log to stderr. `RUST_LOG` overrides the level picked by `-v`/`-q`.
fn init_tracing(verbose: &Verbosity<InfoLevel>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(verbose.log_level_filter().as_trace().into())
        .from_env_lossy();

    let stderr = fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .try_init()
        .into_diagnostic()
}

fn main() -> Result<()> {
    better_panic::install();

    let Cli { command, verbose } = Cli::parse();
    init_tracing(&verbose)?;

    command.handle()
}
