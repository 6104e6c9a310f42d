#![deny(
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! `termfreq` - Term and document frequency counter with a persistent search history.

use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use clap_cargo::style::CLAP_STYLING;
use termfreq::crawler::Crawler;
use termfreq::error::Result;
use termfreq::history::{DEFAULT_HISTORY_FILE, History};
use termfreq::report::ReportBuilder;
use termfreq::shell::Shell;
use tracing::Level;

/// CLI arguments for `termfreq`
#[derive(Parser, Debug)]
#[command(author, version, about, styles = CLAP_STYLING)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// History log location
    #[arg(long, global = true, env = "TERMFREQ_HISTORY", default_value = DEFAULT_HISTORY_FILE)]
    history: PathBuf,

    /// Only scan file names matching this glob (e.g. "*.txt")
    #[arg(long, global = true)]
    include: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive menu (default)
    Shell,
    /// Count terms in a directory and save the result
    Scan {
        /// Directory to scan
        dir:     PathBuf,
        /// Terms to count
        #[arg(required = true)]
        terms:   Vec<String>,
        /// Print the report without saving it to history
        #[arg(long)]
        no_save: bool,
    },
    /// Show saved searches
    History,
    /// Delete all saved searches
    Clear,
}

/// Map the `-v` count to a log level
const fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Count `terms` in `dir`, print the report and optionally save it
fn scan(
    builder: &ReportBuilder,
    history: &History,
    dir: &Path,
    terms: &[String],
    save: bool,
) -> Result<()> {
    let report = builder.build(dir, terms)?;
    println!("{report}");

    if save {
        history.append(&report)?;
        println!("\nSearch saved to {}", history.path().display());
    }

    Ok(())
}

/// Print every saved search
fn show_history(history: &History) -> Result<()> {
    let reports = history.list()?;
    if reports.is_empty() {
        println!("No data found!");
        return Ok(());
    }

    println!("\t\t\t\t\tSEARCH HISTORY\n");
    for (i, report) in reports.iter().enumerate() {
        println!("\t#{}\n{report}\n", i + 1);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let crawler = match cli.include.as_deref() {
        Some(pattern) => Crawler::with_include(pattern)?,
        None => Crawler::new(),
    };
    let builder = ReportBuilder::new(crawler);
    let history = History::new(cli.history);

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let stdin = io::stdin().lock();
            let stdout = io::stdout().lock();
            Shell::new(stdin, stdout, builder, history).run()
        },
        Command::Scan { dir, terms, no_save } => scan(&builder, &history, &dir, &terms, !no_save),
        Command::History => show_history(&history),
        Command::Clear => {
            history.clear()?;
            println!("Successfully deleted search history");
            Ok(())
        },
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
