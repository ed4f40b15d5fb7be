use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};
use tasklist_core::{Filter, FormField, Priority, RowMode, Task};

use crate::tui::app::{App, InputMode};

const HIGHLIGHT_SYMBOL: &str = ">> ";
const STATUS_WIDTH: u16 = 3;
const PRIORITY_WIDTH: u16 = 3;
const DEADLINE_WIDTH: u16 = 12;
const FORM_LABEL_WIDTH: u16 = 10;

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Filter tabs
            Constraint::Min(3),    // Task list
            Constraint::Length(5), // New task form
            Constraint::Length(1), // Error / status
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    draw_filter_tabs(f, app, main_chunks[0]);
    draw_task_list(f, app, main_chunks[1]);
    draw_form(f, app, main_chunks[2]);
    draw_message(f, app, main_chunks[3]);
    draw_footer(f, app, main_chunks[4]);
}

fn draw_filter_tabs(f: &mut Frame, app: &App, area: Rect) {
    let counts = app.store.counts();
    let titles = Filter::ALL.iter().map(|filter| {
        let n = match filter {
            Filter::All => counts.total,
            Filter::Active => counts.active,
            Filter::Completed => counts.completed,
        };
        Line::from(format!("{} ({})", capitalize(filter.label()), n))
    });
    let selected = Filter::ALL
        .iter()
        .position(|f| *f == app.store.filter())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(
            Block::default()
                .title(" TASKLIST ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn draw_task_list(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" Tasks ({}) ", app.store.filter()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    if app.tasks.is_empty() {
        let empty = Paragraph::new("No tasks")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = {
        let app: &App = app;
        app.tasks.iter().map(|task| task_row(app, task)).collect()
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(STATUS_WIDTH),
            Constraint::Length(PRIORITY_WIDTH),
            Constraint::Length(DEADLINE_WIDTH),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["St", "Pr", "Deadline", "Task"]).style(Style::default().fg(Color::Yellow)))
    .block(block)
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(HIGHLIGHT_SYMBOL);

    f.render_stateful_widget(table, area, &mut app.state);

    // Put the terminal cursor inside the cell being edited.
    let (column_x, text) = match app.input_mode {
        InputMode::EditText(id) => match app.edits.session(id) {
            Some(session) => (STATUS_WIDTH + PRIORITY_WIDTH + DEADLINE_WIDTH + 3, session.draft.as_str()),
            None => return,
        },
        InputMode::EditDeadline(_) => (STATUS_WIDTH + PRIORITY_WIDTH + 2, app.deadline_draft.as_str()),
        _ => return,
    };
    if let Some(selected) = app.state.selected() {
        let row = selected.saturating_sub(app.state.offset()) as u16;
        let x = area.x + 1 + HIGHLIGHT_SYMBOL.len() as u16 + column_x + app.cursor.display_offset(text);
        let y = area.y + 2 + row;
        if x < area.right() && y < area.bottom() {
            f.set_cursor_position((x, y));
        }
    }
}

fn task_row(app: &App, task: &Task) -> Row<'static> {
    let status_icon = if task.completed { "✔" } else { "☐" };

    let priority_style = match task.priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Green),
    };

    let editing_style = Style::default().fg(Color::Yellow);

    let deadline_cell = match app.input_mode {
        InputMode::EditDeadline(id) if id == task.id => {
            Cell::from(Span::styled(app.deadline_draft.clone(), editing_style))
        }
        _ => Cell::from(
            task.deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
    };

    let text_cell = match app.edits.mode(task.id) {
        RowMode::Edit => {
            let draft = app
                .edits
                .session(task.id)
                .map(|s| s.draft.clone())
                .unwrap_or_default();
            Cell::from(Span::styled(draft, editing_style))
        }
        RowMode::Display if task.completed => Cell::from(Span::styled(
            task.text.to_string(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
        )),
        RowMode::Display => Cell::from(task.text.to_string()),
    };

    Row::new(vec![
        Cell::from(status_icon),
        Cell::from(Span::styled(task.priority.short(), priority_style)),
        deadline_cell,
        text_cell,
    ])
}

fn draw_form(f: &mut Frame, app: &App, area: Rect) {
    let focused = match app.input_mode {
        InputMode::Form(field) => Some(field),
        _ => None,
    };
    let label_style = |field: FormField| {
        if focused == Some(field) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Blue)
        }
    };

    let deadline_value = if app.form.deadline.is_empty() && focused != Some(FormField::Deadline) {
        Span::styled("(optional: tom, fri, +3d, 2025-01-31)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.form.deadline.as_str())
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Text:     ", label_style(FormField::Text)),
            Span::raw(app.form.text.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Deadline: ", label_style(FormField::Deadline)),
            deadline_value,
        ]),
        Line::from(vec![
            Span::styled("Priority: ", label_style(FormField::Priority)),
            Span::raw(format!("< {} >", app.form.priority)),
        ]),
    ];

    let form = Paragraph::new(lines).block(
        Block::default()
            .title(" New task ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(form, area);

    let (line, text) = match focused {
        Some(FormField::Text) => (0, app.form.text.as_str()),
        Some(FormField::Deadline) => (1, app.form.deadline.as_str()),
        _ => return,
    };
    let x = area.x + 1 + FORM_LABEL_WIDTH + app.cursor.display_offset(text);
    let y = area.y + 1 + line;
    if x < area.right() && y < area.bottom() {
        f.set_cursor_position((x, y));
    }
}

fn draw_message(f: &mut Frame, app: &App, area: Rect) {
    let Some((msg, is_error)) = app.message() else {
        return;
    };
    let style = if is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    f.render_widget(Paragraph::new(format!(" {}", msg)).style(style), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = match app.input_mode {
        InputMode::Normal => {
            "a: Add | e: Edit | D: Deadline | p: Priority | space: Toggle | d: Delete | f: Filter | c: Clear done | q: Quit"
        }
        InputMode::Form(_) => "Tab: Next field | ←/→: Priority | Enter: Add | Esc: Back",
        InputMode::EditText(_) => "Enter: Save | Esc: Cancel",
        InputMode::EditDeadline(_) => "Enter: Save (empty clears) | Esc: Cancel",
    };
    let left = app.store.counts().active;
    let footer = Paragraph::new(format!("{} item(s) left | {}", left, help))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
