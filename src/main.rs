use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use stockroom::config::{CliArgs, Config, LoggingConfig};
use stockroom::lexer;
use stockroom::session::{Session, SessionError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);
    init_logging(&config.logging);

    let mut session = match Session::open(config.backend.kind, config.backend.sheet_path.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: could not open {} backend: {}", config.backend.kind, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(backend = %session.kind(), "Stockroom ready");

    match cli.exec {
        Some(script) => {
            if run_text(&mut session, &script) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => {
            run_shell(&mut session);
            ExitCode::SUCCESS
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_shell(session: &mut Session) {
    let stdin = io::stdin();
    prompt(session);
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                run_text(session, &line);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
        prompt(session);
    }
}

fn prompt(session: &Session) {
    print!("{}> ", session.kind());
    let _ = io::stdout().flush();
}

/// Runs every statement in `text`, reporting problems to stderr. Returns
/// false if anything failed.
fn run_text(session: &mut Session, text: &str) -> bool {
    let statements = match lexer::parse(text) {
        Ok(s) => s,
        Err(e) => {
            report(&SessionError::from(e));
            return false;
        }
    };

    let mut ok = true;
    for statement in &statements {
        match session.execute(statement) {
            Ok(outcome) => {
                if let Some(warning) = &outcome.warning {
                    eprintln!("Warning: {}", warning);
                }
                print!("{}", outcome);
            }
            Err(e) => {
                report(&e);
                ok = false;
            }
        }
    }
    ok
}

fn report(e: &SessionError) {
    match e {
        SessionError::Storage(inner) => {
            tracing::error!(error = %inner, "Backend operation failed");
            eprintln!("Error: {}", e);
        }
        SessionError::Parse(_) | SessionError::Input(_) => eprintln!("Warning: {}", e),
    }
}
