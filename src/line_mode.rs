use anyhow::{Context, Result};
use histcalc::session::{self, Console, Session};
use std::io::{stdin, stdout, Stdout, Write};
use termion::{
    clear::CurrentLine as ClearLine,
    cursor::{DetectCursorPos, Goto},
    event::Key,
    input::TermRead,
    raw::{IntoRawMode, RawTerminal},
};
use unicode_width::UnicodeWidthStr;

const INPUT_MARKER: &str = "> ";

// Перевод позиции символа в байтовую позицию
fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or_else(|| s.len())
}

// Колонка терминала (с 1) для курсора после `cursor_pos` символов
fn input_column(line: &str, cursor_pos: usize) -> u16 {
    let before_cursor = &line[..char_index_to_byte_index(line, cursor_pos)];
    let column = 1 + INPUT_MARKER.width() + before_cursor.width();
    u16::try_from(column).unwrap_or(u16::MAX)
}

/// Writes each line of `message` with raw-mode line endings.
fn write_message<W: Write>(out: &mut W, message: &str) -> std::io::Result<()> {
    for text in message.lines() {
        write!(out, "{}\r\n", text)?;
    }
    out.flush()
}

/// Raw-mode line editor with recall of earlier inputs.
pub struct LineConsole {
    stdout: RawTerminal<Stdout>,
    recall: Vec<String>,
}

impl LineConsole {
    pub fn new() -> Result<Self> {
        let stdout = stdout().into_raw_mode().context("switching terminal to raw mode")?;
        Ok(LineConsole { stdout, recall: Vec::new() })
    }

    fn redraw(&mut self, row: u16, line: &str, cursor_pos: usize) -> Result<()> {
        write!(self.stdout, "{}{}{}{}", Goto(1, row), ClearLine, INPUT_MARKER, line)?;

        write!(self.stdout, "{}", Goto(input_column(line, cursor_pos), row))?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Console for LineConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.stdout, "{}\r\n", prompt)?;
        self.stdout.flush()?;

        let mut line = String::new();
        let mut cursor_pos = 0; // в символах
        let mut recall_index = self.recall.len();
        let (_, row) = self.stdout.cursor_pos()?;

        let stdin = stdin();
        let mut keys = stdin.keys();

        loop {
            self.redraw(row, &line, cursor_pos)?;

            let key = match keys.next() {
                Some(key) => key?,
                None => return Ok(None),
            };

            match key {
                Key::Char('\n') => break,
                Key::Ctrl('c') => return Ok(None),
                Key::Ctrl('d') if line.is_empty() => return Ok(None),
                Key::Ctrl('u') => {
                    line.clear();
                    cursor_pos = 0;
                }
                Key::Char(c) => {
                    let byte_idx = char_index_to_byte_index(&line, cursor_pos);
                    line.insert(byte_idx, c);
                    cursor_pos += 1;
                }
                Key::Backspace if cursor_pos > 0 => {
                    cursor_pos -= 1;
                    let byte_idx = char_index_to_byte_index(&line, cursor_pos);
                    line.remove(byte_idx);
                }
                Key::Delete if cursor_pos < line.chars().count() => {
                    let byte_idx = char_index_to_byte_index(&line, cursor_pos);
                    line.remove(byte_idx);
                }
                Key::Left if cursor_pos > 0 => cursor_pos -= 1,
                Key::Right if cursor_pos < line.chars().count() => cursor_pos += 1,
                Key::Home => cursor_pos = 0,
                Key::End => cursor_pos = line.chars().count(),
                Key::Up if recall_index > 0 => {
                    recall_index -= 1;
                    line = self.recall[recall_index].clone();
                    cursor_pos = line.chars().count();
                }
                Key::Down => {
                    if recall_index + 1 < self.recall.len() {
                        recall_index += 1;
                        line = self.recall[recall_index].clone();
                    } else {
                        recall_index = self.recall.len();
                        line.clear();
                    }
                    cursor_pos = line.chars().count();
                }
                _ => {}
            }
        }

        write!(self.stdout, "\r\n")?;
        if !line.trim().is_empty() {
            self.recall.push(line.clone());
        }
        Ok(Some(line))
    }

    fn show(&mut self, message: &str) {
        if write_message(&mut self.stdout, message).is_err() {
            eprintln!("{}", message);
        }
    }
}

pub fn run_line(mut session: Session) -> Result<()> {
    let mut console = LineConsole::new()?;
    session::run(&mut session, &mut console)
}
