//! Line handling shared by the interactive loop and script replay.

use std::io::Write;

use anyhow::{Context, Result};
use socratic_engine::{Orchestrator, TurnResult};

use crate::transcript::TranscriptWriter;

pub const HELP: &str = "Commands:
  /ingest <url> [url...]   fetch and index sources
  /ask <question>          show the top passages for a question
  /help                    show this help
  /quit                    leave
Anything else is sent to the tutor. Start a lesson with `RAG[url,...]: topic`.";

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Ingest(Vec<String>),
    Ask(&'a str),
    Help,
    Quit,
    Unknown(&'a str),
    Message(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Message(line);
        };

        let (name, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, args)| (name, args.trim()));
        match name {
            "ingest" => Command::Ingest(args.split_whitespace().map(str::to_string).collect()),
            "ask" => Command::Ask(args),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// The tutor marked the conversation done.
    Finished,
    Quit,
}

/// One conversation plus its optional transcript.
pub struct Session {
    orchestrator: Orchestrator,
    transcript: Option<TranscriptWriter>,
}

impl Session {
    pub fn new(orchestrator: Orchestrator, transcript: Option<TranscriptWriter>) -> Self {
        Self {
            orchestrator,
            transcript,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub async fn handle(&mut self, line: &str, out: &mut impl Write) -> Result<Outcome> {
        match Command::parse(line) {
            Command::Empty => {}
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Outcome::Quit),
            Command::Unknown(name) => writeln!(out, "Unknown command /{name}. Try /help.")?,
            Command::Ingest(urls) if urls.is_empty() => writeln!(out, "Usage: /ingest <url> [url...]")?,
            Command::Ingest(urls) => {
                let report = self.orchestrator.ingest(&urls).await;
                writeln!(out, "{report}")?;
            }
            Command::Ask(question) => {
                writeln!(out, "{}", self.orchestrator.ask(question, None))?;
            }
            Command::Message(message) => {
                let turn = self.orchestrator.step(message).await;
                if let Some(transcript) = &mut self.transcript {
                    transcript.record(message, &turn).with_context(|| {
                        format!("failed to write transcript {}", transcript.path().display())
                    })?;
                }
                writeln!(out, "{}", render(&turn))?;
                if turn.done {
                    return Ok(Outcome::Finished);
                }
            }
        }
        Ok(Outcome::Continue)
    }
}

#[must_use]
pub fn render(turn: &TurnResult) -> String {
    format!(
        "[{}/{} R={}] {}",
        turn.act, turn.stance, turn.readiness, turn.text
    )
}
