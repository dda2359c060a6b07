use super::app::{App, TranscriptEntry};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use histcalc::format::{format_compact, format_with_spaces};
use histcalc::session::Reply;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;
use super::helpers::{highlight_expression, wrap_text};
use crate::render_help::render_help;

const MIN_TERMINAL_WIDTH: u16 = 50;
const MIN_TERMINAL_HEIGHT: u16 = 10;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            if app.show_help {
                render_help(f, app);
            } else {
                ui(f, app);
            }
        })?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind == KeyEventKind::Press => {
                    handle_key_event(app, code, modifiers);
                }
                Event::Mouse(event) => {
                    handle_mouse_event(app, event);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.show_help {
        match code {
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::Esc | KeyCode::F(1) => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('c') | KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
        }
        KeyCode::Char('u') | KeyCode::Char('U') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_input();
        }
        KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            app.insert_char(c);
        }
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left if modifiers.contains(KeyModifiers::CONTROL) => app.move_cursor_by_words(-1),
        KeyCode::Right if modifiers.contains(KeyModifiers::CONTROL) => app.move_cursor_by_words(1),
        KeyCode::Left => app.move_cursor(-1),
        KeyCode::Right => app.move_cursor(1),
        KeyCode::Home => {
            app.cursor_position = 0;
            app.input_scroll = 0;
        }
        KeyCode::End => app.cursor_position = app.input.chars().count(),
        KeyCode::Up => app.navigate_history(-1),
        KeyCode::Down => app.navigate_history(1),
        KeyCode::PageUp => app.scroll_history(-1),
        KeyCode::PageDown => app.scroll_history(1),
        KeyCode::Enter => app.submit(),
        KeyCode::F(1) => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, event: crossterm::event::MouseEvent) {
    let scroll = if app.show_help { &mut app.help_scroll } else { &mut app.history_scroll };
    match event.kind {
        MouseEventKind::ScrollDown => *scroll = scroll.saturating_add(3),
        MouseEventKind::ScrollUp => *scroll = scroll.saturating_sub(3),
        _ => {}
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();

    app.terminal_too_small = terminal_size.width < MIN_TERMINAL_WIDTH ||
                             terminal_size.height < MIN_TERMINAL_HEIGHT;

    if app.terminal_too_small {
        render_resize_message(frame, terminal_size);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(terminal_size);

    render_input(frame, app, layout[0]);
    render_status(frame, layout[1]);
    render_transcript(frame, app, layout[2]);
    app.list_height = layout[2].height as usize;
}

fn render_resize_message(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH,
        MIN_TERMINAL_HEIGHT,
        area.width,
        area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(Color::Yellow)
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn indented(lines: Vec<String>, style: Style) -> Vec<ListItem<'static>> {
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            let prefix = if idx == 0 { "    - " } else { "      " };
            ListItem::new(Line::from(Span::styled(format!("{}{}", prefix, line), style)))
        })
        .collect()
}

fn entry_items(entry: &TranscriptEntry, is_selected: bool, wrap_width: usize) -> Vec<ListItem<'static>> {
    let mut items = Vec::new();
    let base_style = Style::default()
        .fg(if is_selected { Color::Yellow } else { Color::Cyan });

    let shown_input = if entry.was_path_answer {
        entry.input.clone()
    } else {
        format_with_spaces(&entry.input)
    };

    for (line_idx, line) in wrap_text(&shown_input, wrap_width).into_iter().enumerate() {
        let mut spans = vec![if line_idx == 0 {
            Span::styled("> ", Style::default().fg(Color::Green))
        } else {
            Span::raw("  ")
        }];

        if entry.was_path_answer {
            spans.push(Span::styled(line, base_style));
        } else {
            spans.extend(highlight_expression(&line, base_style));
        }

        if line_idx == 0 {
            match entry.replies.first() {
                Some(Reply::Value { value, .. }) => {
                    spans.push(Span::styled(" = ", Style::default().fg(Color::Gray)));
                    spans.push(Span::styled(
                        format_compact(*value),
                        Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
                    ));
                }
                Some(Reply::Failed { error, .. }) => {
                    spans.push(Span::styled(" = ", Style::default().fg(Color::Gray)));
                    spans.push(Span::styled(
                        format!("Error: {}", error),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ));
                }
                _ => {}
            }
        }

        items.push(ListItem::new(Line::from(spans)));
    }

    for reply in &entry.replies {
        match reply {
            Reply::Value { steps, .. } if !steps.is_empty() => {
                for (j, step) in steps.iter().enumerate() {
                    let step_text = format!("Step {}: {} = {}", j + 1, step.operation, format_compact(step.result));
                    items.extend(indented(wrap_text(&step_text, wrap_width), Style::default().fg(Color::DarkGray)));
                }
                let time_str = format!("Time: {:.6} ms", entry.duration.as_secs_f64() * 1000.0);
                items.extend(indented(vec![time_str], Style::default().fg(Color::Magenta)));
            }
            Reply::Value { .. } | Reply::Failed { .. } => {}
            Reply::SaveFailed { .. } => {
                items.extend(indented(wrap_text(&reply.to_string(), wrap_width), Style::default().fg(Color::Red)));
            }
            _ => {
                for text in reply.to_string().lines() {
                    items.extend(indented(wrap_text(text, wrap_width), Style::default().fg(Color::Gray)));
                }
            }
        }
    }

    items
}

fn render_transcript(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", app.session.history().path().display()))
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.transcript.is_empty() {
        let empty_msg = Paragraph::new(app.session.banner())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let mut items = Vec::new();
    app.item_start_indices.clear();

    let wrap_width = inner_area.width.saturating_sub(4) as usize;

    for (i, entry) in app.transcript.iter().enumerate() {
        app.item_start_indices.push(items.len());
        items.extend(entry_items(entry, i == app.cursor_history, wrap_width));

        if i < app.transcript.len() - 1 {
            let separator = Span::styled(
                "-".repeat(inner_area.width as usize),
                Style::default().fg(Color::DarkGray)
            );
            items.push(ListItem::new(Line::from(separator)));
        }
    }

    if app.scroll_to_bottom {
        app.history_scroll = items.len().saturating_sub(inner_area.height as usize);
        app.scroll_to_bottom = false;
    }

    let selected_index = app.item_start_indices.get(app.cursor_history).copied();

    let list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default()
        .with_selected(selected_index)
        .with_offset(app.history_scroll);

    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn render_status(frame: &mut Frame, area: Rect) {
    let keys = [
        ("Enter", "Submit"),
        ("q", "Quit"),
        ("h", "History"),
        ("s", "Save"),
        ("c", "Path"),
        ("Up/Down", "Recall"),
        ("F1", "Help"),
    ];

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    *key,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", desc),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// Курсор после "> " и `prefix_width` колонок, не дальше правого края поля
fn cursor_x(area: Rect, prefix_width: usize) -> u16 {
    let offset = u16::try_from(prefix_width).unwrap_or(u16::MAX);
    let last_column = area.right().saturating_sub(1).max(area.x);
    area.x.saturating_add(2).saturating_add(offset).min(last_column)
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.session.is_awaiting_path() {
        " Save path (empty keeps current) "
    } else {
        " Expression "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let visible_width = (inner_area.width.saturating_sub(2)) as usize;
    let total_chars = app.input.chars().count();
    app.adjust_input_scroll(visible_width);

    let visible_input: String = app.input
        .chars()
        .skip(app.input_scroll)
        .take(visible_width)
        .collect();

    let input_line = format!("> {}", visible_input);
    frame.render_widget(Paragraph::new(input_line), inner_area);

    let visible_cursor = app.cursor_position.saturating_sub(app.input_scroll);
    let visible_prefix = visible_input.chars().take(visible_cursor).collect::<String>();
    frame.set_cursor(cursor_x(inner_area, visible_prefix.width()), inner_area.y);

    let scroll_indicator_style = Style::default().fg(Color::DarkGray);

    if app.input_scroll > 0 {
        let left_indicator = Paragraph::new("<").style(scroll_indicator_style);
        frame.render_widget(left_indicator, Rect::new(inner_area.x, inner_area.y, 1, 1));
    }

    if total_chars > app.input_scroll + visible_width {
        let right_indicator = Paragraph::new(">").style(scroll_indicator_style);
        frame.render_widget(
            right_indicator,
            Rect::new(inner_area.x + inner_area.width - 1, inner_area.y, 1, 1),
        );
    }
}
