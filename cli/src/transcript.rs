//! JSONL run transcripts.
//!
//! The first line is `{"runtime": {...}}`; each following line is one turn.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use socratic_engine::{Readiness, SpeechAct, Stance, TurnResult};

/// Phrases that suggest the tutor handed over an answer.
const LEAK_MARKERS: [&str; 6] = [
    "final answer",
    "solution is",
    "≈",
    "approximately",
    "the area is",
    "answer is",
];

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    pub timestamp: String,
    pub model: String,
    pub offline: bool,
    pub tau: f64,
    pub scenario: String,
}

impl RuntimeInfo {
    pub fn now(model: impl Into<String>, offline: bool, tau: f64, scenario: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            model: model.into(),
            offline,
            tau,
            scenario: scenario.into(),
        }
    }
}

#[derive(Serialize)]
struct Header<'a> {
    runtime: &'a RuntimeInfo,
}

#[derive(Serialize)]
struct TurnRow<'a> {
    t: u32,
    msg: &'a str,
    act: SpeechAct,
    stance: Stance,
    #[serde(rename = "R")]
    readiness: Readiness,
    tool_calls: u8,
    has_answer_token: u8,
    done: u8,
    text: &'a str,
}

#[must_use]
pub fn has_answer_token(text: &str) -> bool {
    let lower = text.to_lowercase();
    LEAK_MARKERS.iter().any(|marker| lower.contains(marker))
}

pub struct TranscriptWriter {
    path: PathBuf,
    out: BufWriter<File>,
    turns: u32,
}

impl TranscriptWriter {
    /// Open `path` for appending and write the runtime header.
    pub fn create(path: &Path, runtime: &RuntimeInfo) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            turns: 0,
        };
        writer.write_line(&Header { runtime })?;
        Ok(writer)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, message: &str, turn: &TurnResult) -> io::Result<()> {
        self.turns += 1;
        let row = TurnRow {
            t: self.turns,
            msg: message,
            act: turn.act,
            stance: turn.stance,
            readiness: turn.readiness,
            tool_calls: u8::from(turn.act == SpeechAct::Verify),
            has_answer_token: u8::from(has_answer_token(&turn.text)),
            done: u8::from(turn.done),
            text: &turn.text,
        };
        self.write_line(&row)
    }

    fn write_line(&mut self, value: &impl Serialize) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}
