//! The comma-delimited result log, one row per completed trial

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

/// The header row of every result log
pub const LOG_HEADER: &str = "Deck Size,Hand Size,Trial,Attempts,Time (sec)";

/// One completed trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialResult {
    pub deck: u32,
    pub hand: u32,

    /// 1-based trial index within its cell
    pub trial: u32,

    pub attempts: u64,

    /// Wall-clock time the trial took
    pub seconds: f64,
}

impl TrialResult {
    /// This result as a log row, including the trailing newline
    pub fn to_row(&self) -> String {
        format!("{},{},{},{},{:.3}\n", self.deck, self.hand, self.trial, self.attempts, self.seconds)
    }
}

/// An append-only result log over any writer
///
/// The header is written when the log is created. Each row goes out in a single write and is flushed right away, so
/// a run that dies part way leaves a log holding whole rows only.
#[derive(Debug)]
pub struct ResultLog<W: Write> {
    out: W,
    path: PathBuf,
    rows: usize,
}

impl ResultLog<BufWriter<File>> {
    /// Create (or truncate) the log file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        Self::new(BufWriter::new(file), path)
    }
}

impl<W: Write> ResultLog<W> {
    /// Start a log on `out`, where `path` names the destination in error messages
    pub fn new(out: W, path: impl Into<PathBuf>) -> Result<Self> {
        let mut log = Self { out, path: path.into(), rows: 0 };
        log.write_line(&format!("{}\n", LOG_HEADER))?;
        Ok(log)
    }

    /// Append one row
    pub fn append(&mut self, result: &TrialResult) -> Result<()> {
        self.write_line(&result.to_row())?;
        self.rows += 1;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.out
            .write_all(line.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::io(&self.path, e))
    }

    /// Rows written so far, not counting the header
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
