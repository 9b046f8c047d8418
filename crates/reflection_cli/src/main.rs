//! Command-line front end for the learning reflections journal.
//!
//! # Responsibility
//! - Parse commands and route them to the session API.
//! - Render rows and messages; map failures to a non-zero exit code.

mod api;

use api::{ActionResponse, Session};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::warn;
use reflection_core::logging::LOG_DIR_ENV;
use reflection_core::{core_version, default_log_level, init_logging};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "reflections", version, about = "Record and review learning reflections")]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Reflection file (default: $REFLECTIONS_FILE or reflections.json)"
    )]
    file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = LOG_DIR_ENV,
        help = "Absolute directory for rolling logs; logging is off when unset"
    )]
    log_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "LEVEL", help = "trace|debug|info|warn|error")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Add a new reflection")]
    Add {
        #[arg(long, value_name = "YYYY-MM-DD", help = "Entry date (default: today)")]
        date: Option<NaiveDate>,

        #[arg(long, default_value = "")]
        topic: String,

        #[arg(long, default_value = "")]
        reflection: String,
    },
    #[command(about = "List reflections with their positions")]
    List {
        #[arg(long, short, value_name = "TERM")]
        search: Option<String>,

        #[arg(long, help = "Treat the search term as a regular expression")]
        pattern: bool,
    },
    #[command(about = "Remove reflections by position (as shown by `list`)")]
    Remove {
        #[arg(required = true, value_name = "POSITION")]
        positions: Vec<usize>,
    },
    #[command(about = "Export (optionally filtered) reflections to CSV")]
    Export {
        #[arg(long, short, value_name = "TERM")]
        search: Option<String>,

        #[arg(long, help = "Treat the search term as a regular expression")]
        pattern: bool,

        #[arg(
            long,
            short,
            value_name = "FILE",
            help = "Output path (default: learning_reflections.csv)"
        )]
        out: Option<PathBuf>,
    },
    #[command(about = "Delete every reflection")]
    Clear,
    #[command(about = "Print the core version")]
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let mut session = Session::open(cli.file.as_deref());
    match cli.command {
        Command::Add {
            date,
            topic,
            reflection,
        } => report(session.submit(date, topic, reflection)),
        Command::List { search, pattern } => {
            let response = session.list(search.as_deref(), pattern);
            if !response.ok {
                eprintln!("{}", response.message);
                return ExitCode::FAILURE;
            }
            for row in &response.rows {
                println!(
                    "[{}] {} | {} | {}",
                    row.position,
                    row.reflection.date,
                    row.reflection.topic,
                    row.reflection.body.replace('\n', " ")
                );
            }
            println!("{}", response.message);
            ExitCode::SUCCESS
        }
        Command::Remove { positions } => {
            let positions = positions.into_iter().collect::<BTreeSet<_>>();
            report(session.remove(&positions))
        }
        Command::Export {
            search,
            pattern,
            out,
        } => report(session.export(search.as_deref(), pattern, out.as_deref())),
        Command::Clear => report(session.clear_all()),
        Command::Version => {
            println!("reflection_core version={}", core_version());
            println!("store={}", session.store_path().display());
            ExitCode::SUCCESS
        }
    }
}

fn report(response: ActionResponse) -> ExitCode {
    if response.ok {
        println!("{}", response.message);
        ExitCode::SUCCESS
    } else {
        warn!("event=cli_command module=cli status=error");
        eprintln!("{}", response.message);
        ExitCode::FAILURE
    }
}
