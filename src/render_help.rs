use crate::tui_mode::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)))
}

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" histcalc Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let history_line = format!("  Current history file: {}", app.session.history().path().display());

    let help_text = vec![
        Line::from(Span::styled("histcalc - Terminal Calculator with History", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        section("Operators:"),
        Line::from("  +  : Addition        (e.g., 5 + 3 = 8)"),
        Line::from("  -  : Subtraction     (e.g., 10 - 4 = 6)"),
        Line::from("  *  : Multiplication  (e.g., 6 * 7 = 42)"),
        Line::from("  /  : Division        (e.g., 15 / 3 = 5, 1 / 0 = Infinity)"),
        Line::from("  %  : Remainder       (e.g., 10 % 3 = 1, -10 % 3 = -1)"),
        Line::from("  ^  : Power           (e.g., 2 ^ 3 ^ 2 = 512)"),
        Line::from("  ** : Power, same as ^ (e.g., 2 ** 3 = 8)"),
        Line::from("  -x : Sign, binds tighter than power (-2 ^ 2 = 4)"),
        Line::from(""),
        section("Commands:"),
        Line::from("  q : Save history and quit"),
        Line::from("  h : Show saved history"),
        Line::from("  s : Save history now"),
        Line::from("  c : Change history file (next line is the path)"),
        Line::from("  details <expression> : Show step-by-step evaluation with time"),
        Line::from(history_line),
        Line::from(""),
        section("Navigation:"),
        Line::from("  ← → : Move cursor left/right"),
        Line::from("  Ctrl+←/→ : Move cursor by words"),
        Line::from("  Home/End : Move to start/end of line"),
        Line::from("  ↑ ↓ : Recall earlier input"),
        Line::from("  PgUp/PgDn : Page through the session"),
        Line::from("  Ctrl+U : Clear current input"),
        Line::from("  Ctrl+C : Save and quit"),
        Line::from("  Esc / F1 : Close this help"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}
