//! Reference run: populate a 3x3 square randomly, then by the determined
//! strategy, verifying and printing after each.
//!
//! Usage: magic-sampler
//!
//! Set `RUST_LOG=debug` to see population diagnostics on stderr.

use magic_sampler::{MagicSquare, PopulateParams, SquareConfig};
use rand::TryRngCore;
use rand::rngs::OsRng;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the squares; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn report<W: Write>(out: &mut W, label: &str, square: &MagicSquare) -> io::Result<()> {
    write!(out, "{}", square)?;
    writeln!(out, "{}", square.status_line(label))
}

/// Runs both strategies on one square, writing squares and verdicts to
/// `out`. Returns false after reporting the first population failure.
fn run<R, W>(
    config: SquareConfig,
    params: &PopulateParams,
    rng: &mut R,
    out: &mut W,
) -> io::Result<bool>
where
    R: TryRngCore + ?Sized,
    W: Write,
{
    let mut square = MagicSquare::new(config);

    if let Err(e) = square.populate_random(rng, params) {
        writeln!(out, "Error populating square: {}", e)?;
        return Ok(false);
    }
    report(out, "Random", &square)?;

    if let Err(e) = square.populate_determined(rng, params) {
        writeln!(out, "Error populating determined square: {}", e)?;
        return Ok(false);
    }
    report(out, "Determined", &square)?;

    Ok(true)
}

fn main() -> ExitCode {
    init_tracing();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(
        SquareConfig::default(),
        &PopulateParams::default(),
        &mut OsRng,
        &mut out,
    ) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "failed to write output");
            ExitCode::FAILURE
        }
    }
}
