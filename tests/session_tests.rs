// tests/session_tests.rs

use histcalc::session::{PATH_PROMPT, PROMPT};
use histcalc::{run, History, Reply, Session};
use std::fs;
use test_utils::*;

#[cfg(test)]
mod history_file_tests {
    use super::*;

    #[test]
    fn test_missing_history_is_empty() {
        let dir = scratch_dir("missing");
        let history = History::load(dir.join("never-written.log"));
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_save_then_load_reproduces_lines() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("calculator_history.log");

        let mut history = History::new(&path);
        for (expression, value) in [("2+3*4", 14.0), ("10/0", f64::INFINITY), ("1/3", 1.0 / 3.0)] {
            history.record(expression, value);
        }
        history.save().unwrap();

        let reloaded = History::load(&path);
        assert_eq!(reloaded.entries(), history.entries());
        assert_eq!(reloaded.entries()[1], "10/0 = Infinity");

        reloaded.save().unwrap();
        assert_eq!(History::load(&path).entries(), history.entries());
    }

    #[test]
    fn test_loaded_history_is_appended_to() {
        let dir = scratch_dir("append");
        let path = dir.join("h.log");
        fs::write(&path, "1+1 = 2\n").unwrap();

        let mut session = Session::with_working_dir(History::load(&path), &dir);
        session.submit("2*2");
        session.submit("q");

        assert_eq!(fs::read_to_string(&path).unwrap(), "1+1 = 2\n2*2 = 4\n");
    }

    #[test]
    fn test_undecodable_line_survives_quit() {
        let dir = scratch_dir("latin1");
        let path = dir.join("h.log");
        fs::write(&path, b"1+1 = 2\ncaf\xe9 = 3\n2*2 = 4\n").unwrap();

        let mut session = Session::with_working_dir(History::load(&path), &dir);
        assert_eq!(session.history().len(), 3);
        session.submit("3+3");
        session.submit("q");

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "1+1 = 2\ncaf\u{fffd} = 3\n2*2 = 4\n3+3 = 6\n"
        );
    }

    #[test]
    fn test_unreadable_history_starts_empty() {
        let dir = scratch_dir("unreadable");
        let blocked = dir.join("history.log");
        fs::create_dir_all(&blocked).unwrap();

        let mut session = Session::with_working_dir(History::load(&blocked), &dir);
        assert!(session.history().is_empty());
        assert!(matches!(&session.submit("1+1")[..], [Reply::Value { .. }]));
        assert!(blocked.is_dir());
    }
}

#[cfg(test)]
mod session_loop_tests {
    use super::*;

    #[test]
    fn test_full_interaction() {
        let dir = scratch_dir("loop");
        let mut session = Session::with_working_dir(History::new(dir.join("start.log")), &dir);
        let mut console = ScriptedConsole::new(&["h", "2+3*4", "oops", "H", "c", "moved.log", "s", "q"]);

        run(&mut session, &mut console).unwrap();

        let moved = dir.join("moved.log");
        assert_eq!(
            console.shown,
            vec![
                format!("Calculator started. Default history file: {}", dir.join("start.log").display()),
                "History is empty.".to_string(),
                "Result: 14".to_string(),
                "Invalid expression: oops (Parse error: Unexpected: 'o' at position 0)".to_string(),
                "2+3*4 = 14".to_string(),
                format!("History file path changed to: {}", moved.display()),
                format!("History saved to: {}", moved.display()),
                "Exiting calculator.".to_string(),
            ]
        );
        assert_eq!(console.prompts[5], PATH_PROMPT);
        assert!(console.prompts.iter().enumerate().all(|(i, p)| i == 5 || p == PROMPT));
        assert_eq!(fs::read_to_string(&moved).unwrap(), "2+3*4 = 14\n");
        assert!(!dir.join("start.log").exists());
    }

    #[test]
    fn test_end_of_input_saves_like_quit() {
        let dir = scratch_dir("eof");
        let path = dir.join("h.log");
        let mut session = Session::with_working_dir(History::new(&path), &dir);
        let mut console = ScriptedConsole::new(&["2^3^2"]);

        run(&mut session, &mut console).unwrap();

        assert!(session.is_finished());
        assert_eq!(console.shown.last().map(String::as_str), Some("Exiting calculator."));
        assert_eq!(fs::read_to_string(&path).unwrap(), "2^3^2 = 512\n");
    }

    #[test]
    fn test_save_failure_does_not_end_session() {
        let dir = scratch_dir("savefail");
        // a directory where the file should be
        let blocked = dir.join("blocked.log");
        fs::create_dir_all(&blocked).unwrap();

        let mut session = Session::with_working_dir(History::new(&blocked), &dir);
        let replies = session.submit("s");
        assert!(matches!(&replies[..], [Reply::SaveFailed { .. }]));
        assert!(!session.is_finished());

        assert!(matches!(&session.submit("1+1")[..], [Reply::Value { .. }]));

        let replies = session.submit("q");
        assert!(matches!(&replies[..], [Reply::SaveFailed { .. }, Reply::Goodbye]));
        assert!(session.is_finished());
        assert!(session.submit("1+1").is_empty());
    }

    #[test]
    fn test_too_deep_input_keeps_session_alive() {
        let dir = scratch_dir("deep");
        let path = dir.join("h.log");
        let mut session = Session::with_working_dir(History::new(&path), &dir);

        session.submit("1+1");
        let deep = format!("{}5", "-".repeat(200_000));
        assert!(matches!(&session.submit(&deep)[..], [Reply::Failed { .. }]));
        assert!(!session.is_finished());

        session.submit("q");
        assert_eq!(fs::read_to_string(&path).unwrap(), "1+1 = 2\n");
    }

    #[test]
    fn test_surrounding_blanks_are_not_recorded() {
        let mut session = Session::with_working_dir(History::new("unused.log"), "/work");
        session.submit("  2+2\t");
        assert_eq!(session.history().entries(), ["2+2 = 4"]);
    }

    #[test]
    fn test_directory_answer_gets_log_file() {
        let dir = scratch_dir("dirpath");
        let target = dir.join("logs");
        let mut session = Session::with_working_dir(History::new(dir.join("h.log")), &dir);

        session.submit("c");
        let replies = session.submit(&target.display().to_string());
        assert_eq!(replies, vec![Reply::PathChanged(target.join("log.log"))]);

        session.submit("5%3");
        session.submit("q");
        assert_eq!(fs::read_to_string(target.join("log.log")).unwrap(), "5%3 = 2\n");
    }
}
