use clap::{CommandFactory, Parser};
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};
use eyre::{Context, Result};
use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tasktrack::{DEFAULT_FILE, Dispatch, Prompt, Report, Requests, Store, TaskId, dispatch};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "tasktrack")]
#[command(about = "Task Tracker - add, update, delete and list tasks stored in a JSON file")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Add new task
    #[arg(short, long, value_name = "TEXT")]
    add: Option<String>,

    /// Update task (ID required); prompts for the new description
    #[arg(short, long, value_name = "ID")]
    update: Option<TaskId>,

    /// New description for --update instead of prompting
    #[arg(long, value_name = "TEXT", requires = "update")]
    text: Option<String>,

    /// Delete task (ID required)
    #[arg(short, long, value_name = "ID")]
    delete: Option<TaskId>,

    /// Mark task as done (ID required) [short: -md]
    #[arg(long, value_name = "ID")]
    markdone: Option<TaskId>,

    /// Mark task in progress (ID required) [short: -mp]
    #[arg(long, value_name = "ID")]
    markinprogress: Option<TaskId>,

    /// List completed tasks [short: -ld]
    #[arg(long)]
    listdone: bool,

    /// List in-progress tasks [short: -lp]
    #[arg(long)]
    listinprogress: bool,

    /// List pending tasks [short: -lnd]
    #[arg(long)]
    listnotdone: bool,

    /// List all tasks
    #[arg(short, long)]
    list: bool,

    /// Path to the task file
    #[arg(short, long, default_value = DEFAULT_FILE)]
    file: PathBuf,

    /// Print debug diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn requests(&self) -> Requests {
        Requests {
            add: self.add.clone(),
            update: self.update,
            delete: self.delete,
            mark_done: self.markdone,
            mark_in_progress: self.markinprogress,
            list_done: self.listdone,
            list_in_progress: self.listinprogress,
            list_not_done: self.listnotdone,
            list_all: self.list,
        }
    }
}

/// Multi-letter single-dash flags, which clap would otherwise read as clusters
fn legacy_flag(arg: &str) -> Option<&'static str> {
    match arg {
        "-md" => Some("--markdone"),
        "-mp" => Some("--markinprogress"),
        "-ld" => Some("--listdone"),
        "-lp" => Some("--listinprogress"),
        "-lnd" => Some("--listnotdone"),
        _ => None,
    }
}

/// Rewrite legacy flags to their long forms, leaving anything after `--` alone
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    arg
                }
                Some(s) => legacy_flag(s).map(OsString::from).unwrap_or(arg),
                None => arg,
            }
        })
        .collect()
}

const UPDATE_PROMPT: &str = "Enter new task description";

/// Reads the new description for an update from the terminal, or from
/// stdin when it is piped
struct TerminalPrompt {
    preset: Option<String>,
}

impl Prompt for TerminalPrompt {
    fn new_text(&mut self, _id: TaskId) -> Result<String> {
        if let Some(text) = self.preset.take() {
            return Ok(text);
        }

        if !io::stdin().is_terminal() {
            print!("{}: ", UPDATE_PROMPT);
            io::stdout().flush()?;
            return read_answer(io::stdin().lock());
        }

        let text: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(UPDATE_PROMPT)
            .allow_empty(true)
            .interact_text()?;
        Ok(text)
    }
}

/// First line of input without its line ending; empty at end of input
fn read_answer<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read task description")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_report(report: &Report) {
    match report {
        Report::Listed(listing) => println!("{}", listing),
        other => println!("{}", other.to_string().green()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    // Setup tracing
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut store = Store::open(&cli.file)?;
    let mut prompt = TerminalPrompt {
        preset: cli.text.clone(),
    };

    let dispatched = dispatch(&mut store, cli.requests(), &mut prompt)?;
    if dispatched.mutated() {
        store.save()?;
    }

    match dispatched {
        Dispatch::NotHandled => {
            Cli::command().print_help()?;
        }
        Dispatch::Handled { outcome: Ok(report), .. } => print_report(&report),
        Dispatch::Handled { outcome: Err(e), .. } => {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
    }

    Ok(())
}
