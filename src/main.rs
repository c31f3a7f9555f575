// scriptpad: a terminal playground for example scripts

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use scriptpad::catalog::{LoadError, SourceBuffer};
use scriptpad::config::{Config, LogConfig};
use scriptpad::exec::{ExecutionDriver, PythonInterpreter, TracebackFilter};
use scriptpad::output::OutputSink;
use scriptpad::session::Session;
use scriptpad::ui::App;

#[derive(Debug, Parser)]
#[command(name = "scriptpad", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Config file (default: ./scriptpad.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Example catalog, overriding the config
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Catalog example to load at startup, by file stem
    #[arg(short, long)]
    example: Option<String>,

    /// Script to open instead of a catalog example
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a script once without the TUI and print the console
    Run {
        file: PathBuf,

        /// Print the console as escaped markup
        #[arg(long)]
        html: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Run { file, html }) => {
            init_logging(&config.log, true);
            run_headless(&config, &file, html)
        }
        None => {
            init_logging(&config.log, false);
            run_tui(&config, &cli)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Stderr in headless mode; the log file (if any) while the TUI owns the terminal
fn init_logging(config: &LogConfig, to_stderr: bool) {
    let filter = EnvFilter::try_from_env("SCRIPTPAD_LOG")
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if to_stderr {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    } else if let Some(path) = &config.file {
        match File::options().create(true).append(true).open(path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
            }
            Err(e) => eprintln!("Warning: cannot open log file {}: {}", path.display(), e),
        }
    }
}

fn run_headless(config: &Config, file: &Path, html: bool) -> Result<ExitCode> {
    let buffer = SourceBuffer::open(file)
        .with_context(|| format!("cannot read script {}", file.display()))?;

    let interpreter = PythonInterpreter::new(config.interpreter.python());
    let filter = TracebackFilter::new(config.interpreter.entry_point.clone());
    let mut driver = ExecutionDriver::new(Box::new(interpreter), filter);
    let mut sink = OutputSink::new();

    if let Some(preload) = &config.interpreter.preload {
        driver.run_to_completion(Some(preload.clone()), &buffer, &mut sink)?;
    }
    let result = driver.run_to_completion(None, &buffer, &mut sink)?;

    if html {
        print!("{}", sink.to_markup());
        if let Some(rich) = sink.rich().content() {
            println!("<div class=\"rich\">{}</div>", rich.markup);
        }
    } else {
        print!("{}", sink.to_plain());
        if let Some(rich) = sink.rich().content() {
            for line in &rich.text_lines {
                println!("{}", line);
            }
        }
    }

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_tui(config: &Config, cli: &Cli) -> Result<()> {
    let mut session = Session::from_config(config, cli.catalog.as_deref())?;
    let mut title = String::from("Source");

    if let Some(file) = &cli.file {
        let buffer = SourceBuffer::open(file)
            .with_context(|| format!("cannot read script {}", file.display()))?;
        session = session.with_buffer(buffer).with_initial_example(None);
        title = file.display().to_string();
    } else if let Some(slug) = &cli.example {
        let idx = session
            .catalog
            .position(slug)
            .ok_or_else(|| LoadError::UnknownExample(slug.clone()))?;
        session = session.with_initial_example(Some(idx));
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, title);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")
}
