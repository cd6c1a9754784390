//! Companion Sim Entry Point
//!
//! Runs the desk companion core against a terminal stand-in for the panel.
//!
//! Usage:
//!   companion-sim [OPTIONS]
//!   companion-sim --headless --seconds 180 --seed 7
//!
//! Keys: space = tap, l = long press, r = factory reset, q = quit

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use companion_sim::headless::{self, HeadlessOptions};
use companion_sim::session::{open_storage, start_companion};
use companion_sim::{App, Args};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.headless {
        run_headless(&args)
    } else {
        run_terminal(&args)
    }
}

fn run_headless(args: &Args) -> anyhow::Result<()> {
    // stdout carries the snapshots
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(EnvFilter::from_default_env())
        .init();

    let start = args.start_millis();
    let storage = open_storage(args)?;
    let mut companion = start_companion(args, storage, start)?;
    let options = HeadlessOptions {
        seconds: args.seconds,
        frame_ms: args.frame_ms,
        start,
        ..HeadlessOptions::default()
    };

    let mut stdout = io::stdout().lock();
    headless::run(&mut companion, &options, &mut stdout)?;
    Ok(())
}

fn run_terminal(args: &Args) -> anyhow::Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: companion-sim requires a terminal (TTY)");
        eprintln!();
        eprintln!("For a non-interactive run:");
        eprintln!("  companion-sim --headless --seconds 60");
        std::process::exit(1);
    }

    // The terminal owns stdout, so logs go to a file
    let log_path = args.log_path();
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Build before touching the terminal so setup errors print plainly
    let (mut app, clock) = App::new(args)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = app.run(&mut terminal, &clock);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
