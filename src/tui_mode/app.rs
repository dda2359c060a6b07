use histcalc::session::{Reply, Session};
use std::time::{Duration, Instant};

/// One submitted line and what the session answered.
pub struct TranscriptEntry {
    pub input: String,
    pub replies: Vec<Reply>,
    pub duration: Duration,
    pub was_path_answer: bool,
}

pub struct App {
    pub session: Session,
    pub input: String,
    pub cursor_position: usize,
    pub input_scroll: usize,
    pub transcript: Vec<TranscriptEntry>,
    pub cursor_history: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub list_height: usize,
    pub item_start_indices: Vec<usize>,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        App {
            session,
            input: String::new(),
            cursor_position: 0,
            input_scroll: 0,
            transcript: Vec::new(),
            cursor_history: 0,
            should_quit: false,
            show_help: false,
            help_scroll: 0,
            list_height: 5,
            item_start_indices: Vec::new(),
            history_scroll: 0,
            scroll_to_bottom: false,
            terminal_too_small: false,
        }
    }

    pub fn adjust_input_scroll(&mut self, visible_width: usize) {
        let total_chars = self.input.chars().count();
        let cursor_pos = self.cursor_position;

        if cursor_pos < self.input_scroll {
            self.input_scroll = cursor_pos;
        }
        else if cursor_pos >= self.input_scroll + visible_width {
            self.input_scroll = cursor_pos - visible_width + 1;
        }

        if self.input_scroll > total_chars.saturating_sub(visible_width) {
            self.input_scroll = total_chars.saturating_sub(visible_width);
        }
    }

    pub fn submit(&mut self) {
        let was_path_answer = self.session.is_awaiting_path();
        let input = self.input.trim().to_string();
        // пустая строка допустима только как ответ на запрос пути
        if input.is_empty() && !was_path_answer {
            return;
        }

        let start_time = Instant::now();
        let replies = self.session.submit(&input);
        let duration = start_time.elapsed();

        self.record(TranscriptEntry { input, replies, duration, was_path_answer });
        self.should_quit = self.session.is_finished();
    }

    /// Ends the session the same way `q` does.
    pub fn quit(&mut self) {
        let replies = self.session.finish();
        self.record(TranscriptEntry {
            input: "q".to_string(),
            replies,
            duration: Duration::ZERO,
            was_path_answer: false,
        });
        self.should_quit = true;
    }

    fn record(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
        self.cursor_history = self.transcript.len().saturating_sub(1);
        self.clear_input();
        self.scroll_to_bottom = true;
    }

    /// Replies of the last entry, printed after the terminal is restored.
    pub fn farewell(&self) -> Vec<String> {
        self.transcript
            .last()
            .map(|entry| entry.replies.iter().map(|r| r.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn move_cursor(&mut self, direction: i32) {
        match direction {
            -1 => self.cursor_position = self.cursor_position.saturating_sub(1),
            1 => self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count()),
            _ => {}
        }
    }

    pub fn move_cursor_by_words(&mut self, direction: i32) {
        let input_chars: Vec<char> = self.input.chars().collect();
        let mut pos = self.cursor_position;

        if direction < 0 {
            while pos > 0 && input_chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
            while pos > 0 && !input_chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
        } else {
            let len = input_chars.len();
            while pos < len && !input_chars[pos].is_whitespace() {
                pos += 1;
            }
            while pos < len && input_chars[pos].is_whitespace() {
                pos += 1;
            }
        }

        self.cursor_position = pos.min(input_chars.len());
    }

    pub fn navigate_history(&mut self, direction: i32) {
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < self.transcript.len().saturating_sub(1) {
            self.cursor_history += 1;
        }
        self.recall_selected();
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self.cursor_history.saturating_add(step)
                .min(self.transcript.len().saturating_sub(1));
        }
        self.recall_selected();
    }

    fn recall_selected(&mut self) {
        match self.transcript.get(self.cursor_history) {
            Some(entry) => self.input = entry.input.clone(),
            None => self.input.clear(),
        }
        self.cursor_position = self.input.chars().count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = App::char_index_to_byte_index(&self.input, self.cursor_position);
        self.input.insert(byte_idx, c);
        self.cursor_position += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            self.delete_at_cursor();
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let byte_idx = App::char_index_to_byte_index(&self.input, self.cursor_position);
        if byte_idx < self.input.len() {
            self.input.remove(byte_idx);
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
        self.input_scroll = 0;
    }

    pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
        s.char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or_else(|| s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use histcalc::History;

    fn app() -> App {
        App::new(Session::with_working_dir(History::new("unused.log"), "/work"))
    }

    fn type_line(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
        app.submit();
    }

    #[test]
    fn test_submit_records_transcript() {
        let mut app = app();
        type_line(&mut app, "2**3");
        assert_eq!(app.transcript.len(), 1);
        assert!(matches!(app.transcript[0].replies[..], [Reply::Value { value, .. }] if value == 8.0));
        assert!(app.input.is_empty());
        assert_eq!(app.session.history().entries(), ["2**3 = 8"]);
    }

    #[test]
    fn test_blank_input_ignored_unless_path_answer() {
        let mut app = app();
        app.submit();
        assert!(app.transcript.is_empty());

        type_line(&mut app, "c");
        app.submit();
        assert_eq!(app.transcript.len(), 2);
        assert!(app.transcript[1].was_path_answer);
    }

    #[test]
    fn test_editing_with_multibyte_chars() {
        let mut app = app();
        for c in "1×2".chars() {
            app.insert_char(c);
        }
        app.move_cursor(-1);
        app.delete_before_cursor();
        assert_eq!(app.input, "12");
        assert_eq!(app.cursor_position, 1);
    }

    #[test]
    fn test_navigate_history_recalls_input() {
        let mut app = app();
        type_line(&mut app, "1+1");
        type_line(&mut app, "2+2");
        app.navigate_history(-1);
        assert_eq!(app.input, "1+1");
        app.navigate_history(1);
        assert_eq!(app.input, "2+2");
    }
}
