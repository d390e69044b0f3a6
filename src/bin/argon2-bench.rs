#![deny(unsafe_code)]

use mimalloc::MiMalloc;

/// High-performance memory allocator for the harness's own bookkeeping.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::{io, process::ExitCode};

use logging::LogConfig;
use throughput::HarnessConfig;

const SELECTION_LABEL: &str = "[libargon2] ";

fn main() -> ExitCode {
    // A subscriber installed by an embedder wins.
    if let Err(error) = logging::init_tracing(LogConfig::default()) {
        tracing::debug!(target: "argon2::bench", %error, "tracing subscriber already installed");
    }

    if let Err(error) = dispatch::select_implementation(Some(io::stderr()), SELECTION_LABEL) {
        tracing::warn!(target: "argon2::select", %error, "kernel selection skipped");
    }

    let config = HarnessConfig::default();
    let mut stdout = io::stdout().lock();
    match throughput::run(&config, dispatch::global(), &mut stdout) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("argon2-bench: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}
