use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;

use crate::calc_engine::{evaluate_traced, EvalError, EvaluationTrace, Step};
use crate::format::format_number;
use crate::history::{resolve_save_path, History};

pub const PROMPT: &str =
    "Enter an expression (or 'h' for history, 's' to save, 'c' to change save path, 'q' to quit):";
pub const PATH_PROMPT: &str = "Enter a file path to save to (or leave empty to use default):";

const DETAILS_PREFIX: &str = "details ";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    History,
    Save,
    ChangePath,
    Evaluate { expression: String, detailed: bool },
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let input = line.trim();
        match input.to_ascii_lowercase().as_str() {
            "q" => return Command::Quit,
            "h" => return Command::History,
            "s" => return Command::Save,
            "c" => return Command::ChangePath,
            _ => {}
        }

        let detailed = input.len() > DETAILS_PREFIX.len()
            && input.is_char_boundary(DETAILS_PREFIX.len())
            && input[..DETAILS_PREFIX.len()].eq_ignore_ascii_case(DETAILS_PREFIX);
        if detailed {
            Command::Evaluate {
                expression: input[DETAILS_PREFIX.len()..].trim().to_string(),
                detailed: true,
            }
        } else {
            Command::Evaluate {
                expression: input.to_string(),
                detailed: false,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value { expression: String, value: f64, steps: Vec<Step> },
    Failed { expression: String, error: EvalError },
    History(Vec<String>),
    Saved(PathBuf),
    SaveFailed { path: PathBuf, message: String },
    PathChanged(PathBuf),
    Goodbye,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Value { value, steps, .. } => {
                write!(f, "Result: {}", format_number(*value))?;
                for (i, step) in steps.iter().enumerate() {
                    write!(f, "\n  Step {}: {} = {}", i + 1, step.operation, format_number(step.result))?;
                }
                Ok(())
            }
            Reply::Failed { expression, error } => {
                write!(f, "Invalid expression: {} ({})", expression, error)
            }
            Reply::History(entries) if entries.is_empty() => write!(f, "History is empty."),
            Reply::History(entries) => write!(f, "{}", entries.join("\n")),
            Reply::Saved(path) => write!(f, "History saved to: {}", path.display()),
            Reply::SaveFailed { path, message } => {
                write!(f, "Error saving history to {}: {}", path.display(), message)
            }
            Reply::PathChanged(path) => write!(f, "History file path changed to: {}", path.display()),
            Reply::Goodbye => write!(f, "Exiting calculator."),
        }
    }
}

/// One interactive run: dispatches input lines and owns the history.
pub struct Session {
    history: History,
    cwd: PathBuf,
    awaiting_path: bool,
    finished: bool,
}

impl Session {
    pub fn new(history: History) -> Result<Self> {
        let cwd = std::env::current_dir().context("reading current directory")?;
        Ok(Session::with_working_dir(history, cwd))
    }

    pub fn with_working_dir(history: History, cwd: impl Into<PathBuf>) -> Self {
        Session {
            history,
            cwd: cwd.into(),
            awaiting_path: false,
            finished: false,
        }
    }

    pub fn banner(&self) -> String {
        format!("Calculator started. Default history file: {}", self.history.path().display())
    }

    pub fn prompt(&self) -> &'static str {
        if self.awaiting_path {
            PATH_PROMPT
        } else {
            PROMPT
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_awaiting_path(&self) -> bool {
        self.awaiting_path
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn submit(&mut self, line: &str) -> Vec<Reply> {
        if self.finished {
            return Vec::new();
        }
        if self.awaiting_path {
            self.awaiting_path = false;
            return vec![self.change_path(line)];
        }

        match Command::parse(line) {
            Command::Quit => self.finish(),
            Command::History => vec![Reply::History(self.history.entries().to_vec())],
            Command::Save => vec![self.save()],
            Command::ChangePath => {
                self.awaiting_path = true;
                Vec::new()
            }
            Command::Evaluate { expression, detailed } => vec![self.evaluate(expression, detailed)],
        }
    }

    /// Saves and ends the session. Also used when the input stream closes.
    pub fn finish(&mut self) -> Vec<Reply> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        self.awaiting_path = false;

        let mut replies = Vec::new();
        if let failed @ Reply::SaveFailed { .. } = self.save() {
            replies.push(failed);
        }
        replies.push(Reply::Goodbye);
        replies
    }

    fn evaluate(&mut self, expression: String, detailed: bool) -> Reply {
        let mut trace = EvaluationTrace::new(detailed);
        match evaluate_traced(&expression, &mut trace) {
            Ok(value) => {
                self.history.record(&expression, value);
                Reply::Value { expression, value, steps: trace.steps }
            }
            Err(error) => Reply::Failed { expression, error },
        }
    }

    fn save(&self) -> Reply {
        let path = self.history.path().to_path_buf();
        match self.history.save() {
            Ok(()) => Reply::Saved(path),
            Err(e) => Reply::SaveFailed { path, message: format!("{:#}", e) },
        }
    }

    fn change_path(&mut self, answer: &str) -> Reply {
        if let Some(path) = resolve_save_path(answer, &self.cwd) {
            self.history.set_path(path);
        }
        Reply::PathChanged(self.history.path().to_path_buf())
    }
}

/// Line source and display sink the session loop talks to.
pub trait Console {
    /// Returns `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
    fn show(&mut self, message: &str);
}

pub fn run<C: Console>(session: &mut Session, console: &mut C) -> Result<()> {
    console.show(&session.banner());

    while !session.is_finished() {
        let replies = match console.read_line(session.prompt())? {
            Some(line) => session.submit(&line),
            None => session.finish(),
        };
        for reply in replies {
            console.show(&reply.to_string());
        }
    }
    Ok(())
}
