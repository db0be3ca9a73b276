//! Socratic CLI - terminal loop and script replay for the tutor.
//!
//! ```text
//! main() -> Cli::parse() -> SocraticConfig (+ overrides) -> Orchestrator
//!                                                              |
//!                                   --script FILE: replay lines until done
//!                                   otherwise:     read stdin until /quit
//! ```
//!
//! Logs go to `~/.socratic/logs/socratic.log` so they never interleave with
//! the conversation on stdout.

mod args;
mod repl;
mod transcript;

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use socratic_engine::{SharedIndex, SocraticConfig, orchestrator_from_config};

use crate::args::Cli;
use crate::repl::{HELP, Outcome, Session};
use crate::transcript::{RuntimeInfo, TranscriptWriter};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than mix logs into the dialogue.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.socratic/logs/socratic.log
    if let Some(config_path) = SocraticConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("socratic.log"));
    }

    // Fallback: ./.socratic/logs/socratic.log
    candidates.push(PathBuf::from(".socratic").join("logs").join("socratic.log"));

    candidates
}

fn load_config(cli: &Cli) -> Result<SocraticConfig> {
    let loaded = match &cli.config {
        Some(path) => Some(SocraticConfig::read(path)?),
        None => SocraticConfig::load()?,
    };
    let mut config = loaded.unwrap_or_default();
    cli.apply(&mut config);
    Ok(config)
}

/// Model name for the transcript header.
fn model_label(config: &SocraticConfig, generating: bool) -> String {
    if !generating {
        return "offline".to_string();
    }
    config.model().map_or_else(
        || config.provider().default_model().as_str().to_string(),
        ToString::to_string,
    )
}

async fn run_script(session: &mut Session, path: &Path, out: &mut impl Write) -> Result<()> {
    let script = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;

    for line in script.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        writeln!(out, "> {line}")?;
        match session.handle(line, out).await? {
            Outcome::Continue => {}
            Outcome::Finished | Outcome::Quit => break,
        }
    }
    Ok(())
}

async fn run_interactive(session: &mut Session, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{HELP}\n")?;
    let mut lines = BufReader::new(stdin()).lines();

    loop {
        write!(out, "you> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match session.handle(&line, out).await? {
            Outcome::Continue => {}
            Outcome::Finished => writeln!(out, "(conversation complete; keep going or /quit)")?,
            Outcome::Quit => break,
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli)?;
    let index = SharedIndex::new(config.retrieval().bm25_params());
    let orchestrator = orchestrator_from_config(&config, index)?;

    let transcript = match &cli.transcript {
        Some(path) => {
            let generating = orchestrator.policy().capabilities().generator().is_some();
            let runtime = RuntimeInfo::now(
                model_label(&config, generating),
                !generating,
                orchestrator.policy().settings().tau,
                cli.scenario_label(),
            );
            let writer = TranscriptWriter::create(path, &runtime)
                .with_context(|| format!("failed to open transcript {}", path.display()))?;
            Some(writer)
        }
        None => None,
    };

    tracing::info!(
        session = %orchestrator.session_id(),
        script = cli.script.is_some(),
        "Session started"
    );

    let mut session = Session::new(orchestrator, transcript);
    let mut out = io::stdout();
    match &cli.script {
        Some(path) => run_script(&mut session, path, &mut out).await?,
        None => run_interactive(&mut session, &mut out).await?,
    }

    tracing::info!(turns = session.orchestrator().turns(), "Session ended");
    Ok(())
}
