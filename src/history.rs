use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::format::format_number;

pub const DEFAULT_HISTORY_FILE: &str = "calculator_history.log";
/// File name used when the chosen save path names a directory.
pub const DIRECTORY_LOG_FILE: &str = "log.log";
pub const LOG_EXTENSION: &str = ".log";

/// Ordered, append-only log of evaluated expressions, one line per entry.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<String>,
    path: PathBuf,
}

impl History {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        History {
            entries: Vec::new(),
            path: path.into(),
        }
    }

    /// Loads entries from `path`. A missing file is a first run and gives an
    /// empty history; any other read failure is reported and also gives an
    /// empty history.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut history = History::new(path);
        match read_entries(&history.path) {
            Ok(entries) => history.entries = entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => eprintln!(
                "Warning: could not read history from {}: {}",
                history.path.display(),
                e
            ),
        }
        history
    }

    pub fn record(&mut self, expression: &str, value: f64) {
        self.entries.push(format!("{} = {}", expression, format_number(value)));
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }

        let file = fs::File::create(&self.path)
            .with_context(|| format!("opening {} for writing", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        for entry in &self.entries {
            writeln!(writer, "{}", entry)?;
        }
        writer
            .flush()
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }
}

// Undecodable bytes are replaced, never dropped: the file is rewritten on save.
fn read_entries(path: &Path) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect())
}

/// Interprets the answer to the "change save path" prompt.
///
/// Returns `None` when the current path should be kept.
pub fn resolve_save_path(input: &str, cwd: &Path) -> Option<PathBuf> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains('/') || input.contains(MAIN_SEPARATOR) {
        if input.ends_with(LOG_EXTENSION) {
            Some(PathBuf::from(input))
        } else {
            Some(Path::new(input).join(DIRECTORY_LOG_FILE))
        }
    } else {
        Some(cwd.join(input))
    }
}
