//! Grades assistant entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at the configured level
//!   4. Load student records
//!   5. Build the embedding provider (degrades to keyword-only on failure)
//!   6. Build the knowledge base and run the requested command
//!
//! # Usage
//!
//! ```text
//! grades-rag [--config <path>] [<command>]
//!
//! Commands:
//!   ask <question...>     answer one question and exit
//!   export <id-or-name>   write a grade report and exit
//!   console               interactive console (default)
//! ```

use std::path::PathBuf;
use std::process;

use grades_rag::config::{self, DEFAULT_CONFIG_PATH};
use grades_rag::console;
use grades_rag::embeddings::providers;
use grades_rag::error::AppError;
use grades_rag::logger;
use grades_rag::records::stores;
use grades_rag::report::ReportGenerator;
use grades_rag::router::Assistant;
use tracing::{info, warn};

const USAGE: &str = "\
usage: grades-rag [--config <path>] [<command>]

commands:
  ask <question...>     answer one question and exit
  export <id-or-name>   write a grade report and exit
  console               interactive console (default)

flags:
  --config <path>       config file (default: config/default.toml)
  --help, -h            print this help";

// ── CLI arg parsing ────────────────────────────────────────────────────────

enum Command {
    Ask(String),
    Export(String),
    Console,
}

struct Args {
    config: PathBuf,
    command: Command,
}

fn parse_args() -> Result<Args, String> {
    let mut config = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut positional = Vec::new();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config requires a path")?;
                config = PathBuf::from(path);
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                process::exit(0);
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.split_first() {
        None => Command::Console,
        Some((cmd, rest)) => match cmd.as_str() {
            "console" => Command::Console,
            "ask" if !rest.is_empty() => Command::Ask(rest.join(" ")),
            "export" if !rest.is_empty() => Command::Export(rest.join(" ")),
            "ask" | "export" => return Err(format!("{cmd} needs an argument")),
            other => return Err(format!("unknown command: {other}")),
        },
    };

    Ok(Args { config, command })
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            process::exit(2);
        }
    };

    match run(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but did not succeed (failed export).
fn run(args: Args) -> Result<bool, AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let config = config::load(&args.config)?;
    logger::init(config.log_level)?;

    info!(
        name = %config.name,
        records = %config.records.path.display(),
        mode = ?config.retrieval_mode,
        "config loaded"
    );

    let records = stores::build(&config.records)?.load()?;

    let provider = match providers::build(&config.embeddings, config.embeddings_api_key.clone()) {
        Ok(Some(p)) => {
            info!(provider = p.name(), "embedding provider ready");
            Some(p)
        }
        Ok(None) => {
            info!("embeddings disabled, keyword retrieval only");
            None
        }
        Err(e) => {
            warn!(error = %e, "embedding provider unavailable, keyword retrieval only");
            None
        }
    };

    let assistant = Assistant::new(records, provider, config.retrieval_mode)?;
    let reports = ReportGenerator::new(config.export.clone());

    match args.command {
        Command::Ask(question) => {
            println!("{}", assistant.answer(&question));
            Ok(true)
        }
        Command::Export(key) => {
            let outcome = reports.generate(&assistant.knowledge(), &key);
            match outcome.path {
                Some(path) => {
                    println!("{}", outcome.message);
                    println!("{}", path.display());
                    Ok(true)
                }
                None => {
                    eprintln!("error: {}", outcome.message);
                    Ok(false)
                }
            }
        }
        Command::Console => {
            let stdin = std::io::stdin();
            console::run(&assistant, &reports, stdin.lock(), std::io::stdout())?;
            Ok(true)
        }
    }
}
