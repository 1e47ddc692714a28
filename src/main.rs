//! lg - commit history graphs with lane layout

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lanegraph::cli::{self, Cli};
use lanegraph::ui::output;

/// Log filter from `LANEGRAPH_LOG`, `warn` when unset. `--debug` forces
/// `debug` for this crate.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("lanegraph=debug")
    } else {
        EnvFilter::try_from_env("LANEGRAPH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let args = Cli::parse_args();
    init_tracing(args.debug);

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
