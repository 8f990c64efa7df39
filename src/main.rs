//! addrq: an interactive identifier-to-address lookup client.
//!
//! Reads unsigned 64-bit identifiers from the console, sends each one over
//! a persistent TCP connection as an 8-byte big-endian frame, and reports
//! the reply as an IPv4 address (or a closure / unexpected-data notice).
//! Configuration via CLI arguments or TOML file.

mod codec;
mod config;
mod repl;
mod session;

use config::Config;
use repl::Outcome;
use session::Session;
use std::io;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        host = %config.host,
        port = config.port,
        recv_buffer = config.recv_buffer,
        "Starting addrq client"
    );

    println!("Connecting to {}:{}", config.host, config.port);

    let mut session = match Session::open(&config.host, config.port, config.recv_buffer) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let outcome = match repl::run(&mut stdin.lock(), &mut stdout.lock(), &mut session) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("I/O error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Outcome::Closed => println!("Connection closed."),
        Outcome::InputExhausted => println!("End of input."),
        _ => {}
    }

    ExitCode::from(outcome.exit_code())
}
