pub mod app;
pub mod line;
pub mod ui;

use std::io;
use std::panic;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tasklist_core::Filter;
use tracing::info;

use crate::config::AppConfig;
use crate::tui::app::{App, InputMode};

pub fn run(config: &AppConfig) -> Result<()> {
    // Setup terminal
    chain_panic_hook(restore_terminal);
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config.filter);
    info!(filter = %config.filter, "tui started");
    let res = run_app(&mut terminal, &mut app, config.tick_rate);

    // Restore terminal
    restore_terminal()?;

    info!(tasks = app.store.len(), "tui closed");
    res?;
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, cursor::Show)
}

/// Runs `restore` before the current panic hook, so a panic message is
/// printed on the normal screen and the shell is left usable.
fn chain_panic_hook(restore: fn() -> io::Result<()>) {
    let original = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore();
        original(info);
    }));
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, tick_rate: Duration) -> io::Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => {
            app.status = None;
            match key.code {
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle_status(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_task(),
                KeyCode::Char('a') => app.enter_form(),
                KeyCode::Char('e') => app.begin_edit_text(),
                KeyCode::Char('D') => app.begin_edit_deadline(),
                KeyCode::Char('p') => app.cycle_priority(),
                KeyCode::Char('f') => app.cycle_filter(),
                KeyCode::Char('1') => app.set_filter(Filter::All),
                KeyCode::Char('2') => app.set_filter(Filter::Active),
                KeyCode::Char('3') => app.set_filter(Filter::Completed),
                KeyCode::Char('c') => app.clear_completed(),
                _ => {}
            }
        }
        InputMode::Form(_) | InputMode::EditText(_) | InputMode::EditDeadline(_) => match key.code {
            KeyCode::Enter => app.submit(),
            KeyCode::Esc => app.cancel(),
            KeyCode::Tab => app.next_form_field(),
            KeyCode::Char(c) => app.input_char(c),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            _ => {}
        },
    }
}
