use anyhow::{Context, Result};
use histcalc::session::{self, Console, Session};
use std::io::{self, BufRead, Write};

/// Reads whole lines from stdin; used when stdin is not a terminal.
pub struct PlainConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PlainConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        PlainConsole { input, output }
    }
}

impl<R: BufRead, W: Write> Console for PlainConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        writeln!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("reading input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn show(&mut self, message: &str) {
        if writeln!(self.output, "{}", message).is_err() {
            eprintln!("{}", message);
        }
    }
}

pub fn run_plain(mut session: Session) -> Result<()> {
    let stdin = io::stdin();
    let mut console = PlainConsole::new(stdin.lock(), io::stdout());
    session::run(&mut session, &mut console)
}

#[cfg(test)]
mod tests {
    use super::*;
    use histcalc::History;
    use std::io::Cursor;

    #[test]
    fn test_plain_session_transcript() {
        let dir = std::env::temp_dir().join(format!("histcalc-plain-{}", std::process::id()));
        let mut session = Session::with_working_dir(History::new(dir.join("h.log")), &dir);
        let mut output = Vec::new();
        {
            let mut console = PlainConsole::new(Cursor::new("1+1\r\nh\n"), &mut output);
            session::run(&mut session, &mut console).unwrap();
        }

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("Calculator started. Default history file: "));
        assert!(text.contains("Result: 2\n"));
        assert!(text.contains("\n1+1 = 2\n"));
        assert!(text.ends_with("Exiting calculator.\n"));
        assert!(session.is_finished());
        assert_eq!(std::fs::read_to_string(dir.join("h.log")).unwrap(), "1+1 = 2\n");
    }
}
