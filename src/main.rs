mod plain_mode;
#[cfg(feature = "line")]
mod line_mode;
#[cfg(feature = "tui")]
mod tui_mode;
#[cfg(feature = "tui")]
mod render_help;

use anyhow::Result;
use clap::Parser as ClapParser;
use histcalc::{History, Session, DEFAULT_HISTORY_FILE};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(version, about = "Arithmetic calculator that keeps a history of its results")]
struct Cli {
    /// History file loaded at start and written on save/quit.
    #[arg(long, default_value = DEFAULT_HISTORY_FILE)]
    history: PathBuf,

    /// Read plain lines from stdin instead of the interactive terminal view.
    #[arg(long)]
    plain: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let session = Session::new(History::load(&cli.history))?;

    if cli.plain || !io::stdin().is_terminal() {
        return plain_mode::run_plain(session);
    }
    run_interactive(session)
}

#[cfg(feature = "tui")]
fn run_interactive(session: Session) -> Result<()> {
    tui_mode::run_tui(session)
}

#[cfg(all(feature = "line", not(feature = "tui")))]
fn run_interactive(session: Session) -> Result<()> {
    line_mode::run_line(session)
}

#[cfg(not(any(feature = "tui", feature = "line")))]
fn run_interactive(session: Session) -> Result<()> {
    plain_mode::run_plain(session)
}
