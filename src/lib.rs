//! Interactive arithmetic calculator with a persisted evaluation history.

pub mod calc_engine;
pub mod format;
pub mod history;
pub mod session;

pub use calc_engine::{evaluate, evaluate_traced, EvalError, EvaluationTrace, ParseError, ParseErrorKind, Step, MAX_NESTING};
pub use history::{resolve_save_path, History, DEFAULT_HISTORY_FILE};
pub use session::{run, Command, Console, Reply, Session};
