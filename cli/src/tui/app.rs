use std::cell::Cell;
use std::rc::Rc;

use ratatui::widgets::TableState;
use tasklist_core::{
    parse_optional_date, EditSessions, Filter, FormField, Priority, Task, TaskId, TaskForm,
    TaskStore,
};
use tracing::debug;

use crate::tui::line::LineCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form(FormField),
    EditText(TaskId),
    EditDeadline(TaskId),
}

pub struct App {
    pub store: TaskStore,
    pub form: TaskForm,
    pub edits: EditSessions,
    /// Visible rows, refreshed whenever the store reports a change.
    pub tasks: Vec<Task>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub cursor: LineCursor,
    pub deadline_draft: String,
    pub deadline_error: Option<String>,
    pub status: Option<String>,
    pub should_quit: bool,
    dirty: Rc<Cell<bool>>,
}

impl App {
    pub fn new(filter: Filter) -> App {
        let mut store = TaskStore::with_filter(filter);
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        store.subscribe(move |_| flag.set(true));

        let mut app = App {
            store,
            form: TaskForm::new(),
            edits: EditSessions::new(),
            tasks: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            cursor: LineCursor::default(),
            deadline_draft: String::new(),
            deadline_error: None,
            status: None,
            should_quit: false,
            dirty,
        };
        app.refresh();
        app
    }

    /// Recomputes the visible rows if the store changed since the last call.
    pub fn refresh(&mut self) {
        if !self.dirty.replace(false) {
            return;
        }
        self.tasks = self.store.visible_tasks();
        self.edits.retain_existing(&self.store);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.tasks.is_empty() {
            self.state.select(None);
        } else {
            let i = self.state.selected().unwrap_or(0).min(self.tasks.len() - 1);
            self.state.select(Some(i));
        }
    }

    fn select_id(&mut self, id: TaskId) {
        if let Some(i) = self.tasks.iter().position(|t| t.id == id) {
            self.state.select(Some(i));
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.tasks.get(i))
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id)
    }

    pub fn next(&mut self) {
        if self.tasks.is_empty() { return; }

        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.tasks.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.tasks.is_empty() { return; }

        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.tasks.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    // Row actions

    pub fn toggle_status(&mut self) {
        if let Some(id) = self.selected_id() {
            self.store.toggle(id);
            self.refresh();
        }
    }

    pub fn delete_task(&mut self) {
        if let Some(id) = self.selected_id() {
            self.store.delete(id);
            self.refresh();
        }
    }

    pub fn cycle_priority(&mut self) {
        if let Some(task) = self.selected_task() {
            let (id, next) = (task.id, task.priority.next());
            self.store.update_priority(id, next);
            self.status = Some(format!("Priority set to {}", next));
            self.refresh();
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.store.set_filter(filter);
        self.refresh();
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.store.filter().next());
    }

    pub fn clear_completed(&mut self) {
        let removed = self.store.clear_completed();
        self.status = Some(format!("Cleared {} completed task(s)", removed));
        self.refresh();
    }

    // Mode changes

    pub fn enter_form(&mut self) {
        self.input_mode = InputMode::Form(FormField::Text);
        self.cursor = LineCursor::at_end(&self.form.text);
    }

    pub fn next_form_field(&mut self) {
        if let InputMode::Form(field) = self.input_mode {
            let field = field.next();
            self.input_mode = InputMode::Form(field);
            self.cursor = match field {
                FormField::Text => LineCursor::at_end(&self.form.text),
                FormField::Deadline => LineCursor::at_end(&self.form.deadline),
                FormField::Priority => LineCursor::default(),
            };
        }
    }

    pub fn begin_edit_text(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            return;
        };
        if self.edits.begin(&task) {
            self.input_mode = InputMode::EditText(task.id);
            let draft = self.edits.session(task.id).map(|s| s.draft.as_str()).unwrap_or("");
            self.cursor = LineCursor::at_end(draft);
        } else {
            self.status = Some("Completed tasks cannot be edited".to_string());
        }
    }

    pub fn begin_edit_deadline(&mut self) {
        let Some((id, deadline)) = self.selected_task().map(|t| (t.id, t.deadline)) else {
            return;
        };
        self.deadline_draft = deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        self.deadline_error = None;
        self.cursor = LineCursor::at_end(&self.deadline_draft);
        self.input_mode = InputMode::EditDeadline(id);
    }

    /// Enter in any input mode.
    pub fn submit(&mut self) {
        match self.input_mode {
            InputMode::Normal => {}
            InputMode::Form(_) => {
                if let Some(id) = self.form.submit(&mut self.store) {
                    self.status = Some("Task added".to_string());
                    self.input_mode = InputMode::Normal;
                    self.refresh();
                    self.select_id(id);
                }
            }
            InputMode::EditText(id) => {
                if self.edits.commit(id, &mut self.store).is_ok() {
                    self.input_mode = InputMode::Normal;
                    self.refresh();
                }
            }
            InputMode::EditDeadline(id) => match parse_optional_date(&self.deadline_draft) {
                Ok(deadline) => {
                    self.store.update_deadline(id, deadline);
                    self.deadline_draft.clear();
                    self.deadline_error = None;
                    self.input_mode = InputMode::Normal;
                    self.refresh();
                }
                Err(e) => {
                    debug!(error = %e, "deadline rejected");
                    self.deadline_error = Some(e.to_string());
                }
            },
        }
    }

    /// Esc in any input mode. The form keeps what was typed; row edits are
    /// thrown away.
    pub fn cancel(&mut self) {
        match self.input_mode {
            InputMode::Normal => {}
            InputMode::Form(_) => {}
            InputMode::EditText(id) => {
                self.edits.cancel(id);
            }
            InputMode::EditDeadline(_) => {
                self.deadline_draft.clear();
                self.deadline_error = None;
            }
        }
        self.input_mode = InputMode::Normal;
    }

    // Text input

    pub fn input_char(&mut self, c: char) {
        if self.input_mode == InputMode::Form(FormField::Priority) {
            match c.to_ascii_lowercase() {
                'h' => self.form.priority = Priority::High,
                'm' => self.form.priority = Priority::Medium,
                'l' => self.form.priority = Priority::Low,
                ' ' => self.form.priority = self.form.priority.next(),
                _ => {}
            }
            return;
        }
        let App { input_mode, form, edits, deadline_draft, cursor, .. } = self;
        if let Some(text) = focused_text(*input_mode, form, edits, deadline_draft) {
            cursor.input_char(text, c);
        }
    }

    pub fn delete_char(&mut self) {
        let App { input_mode, form, edits, deadline_draft, cursor, .. } = self;
        if let Some(text) = focused_text(*input_mode, form, edits, deadline_draft) {
            cursor.delete_char(text);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.input_mode == InputMode::Form(FormField::Priority) {
            self.form.priority = self.form.priority.prev();
            return;
        }
        self.cursor.move_left();
    }

    pub fn move_cursor_right(&mut self) {
        if self.input_mode == InputMode::Form(FormField::Priority) {
            self.form.priority = self.form.priority.next();
            return;
        }
        let App { input_mode, form, edits, deadline_draft, cursor, .. } = self;
        if let Some(text) = focused_text(*input_mode, form, edits, deadline_draft) {
            cursor.move_right(text);
        }
    }

    /// The message to show under the list, errors first.
    pub fn message(&self) -> Option<(&str, bool)> {
        let error = match self.input_mode {
            InputMode::Form(_) => self.form.error(),
            InputMode::EditText(id) => self.edits.error(id),
            InputMode::EditDeadline(_) => self.deadline_error.as_deref(),
            InputMode::Normal => None,
        };
        match error {
            Some(e) => Some((e, true)),
            None => self.status.as_deref().map(|s| (s, false)),
        }
    }
}

fn focused_text<'a>(
    mode: InputMode,
    form: &'a mut TaskForm,
    edits: &'a mut EditSessions,
    deadline_draft: &'a mut String,
) -> Option<&'a mut String> {
    match mode {
        InputMode::Form(FormField::Text) => Some(&mut form.text),
        InputMode::Form(FormField::Deadline) => Some(&mut form.deadline),
        InputMode::Form(FormField::Priority) | InputMode::Normal => None,
        InputMode::EditText(id) => edits.draft_mut(id),
        InputMode::EditDeadline(_) => Some(deadline_draft),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_core::RowMode;

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.input_char(c);
        }
    }

    fn add(app: &mut App, text: &str) {
        app.enter_form();
        type_str(app, text);
        app.submit();
    }

    fn visible(app: &App) -> Vec<String> {
        app.tasks.iter().map(|t| t.text.to_string()).collect()
    }

    #[test]
    fn test_form_adds_and_selects() {
        let mut app = App::new(Filter::All);
        add(&mut app, "Buy milk");
        add(&mut app, "Write report");

        assert_eq!(visible(&app), vec!["Buy milk", "Write report"]);
        assert_eq!(app.state.selected(), Some(1));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.form.text.is_empty());
    }

    #[test]
    fn test_form_fields_and_priority() {
        let mut app = App::new(Filter::All);
        app.enter_form();
        type_str(&mut app, "Pay rent");
        app.next_form_field();
        type_str(&mut app, "2030-02-01");
        app.next_form_field();
        app.input_char('h');
        app.move_cursor_right();
        app.move_cursor_left();
        app.submit();

        let task = &app.tasks[0];
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.deadline.unwrap().to_string(), "2030-02-01");
    }

    #[test]
    fn test_blank_form_shows_error_and_stays() {
        let mut app = App::new(Filter::All);
        app.enter_form();
        type_str(&mut app, "   ");
        app.submit();

        assert!(app.tasks.is_empty());
        assert_eq!(app.input_mode, InputMode::Form(FormField::Text));
        assert_eq!(app.message(), Some(("Task text cannot be empty", true)));
        assert_eq!(app.form.text, "   ");
    }

    #[test]
    fn test_escape_keeps_form_input() {
        let mut app = App::new(Filter::All);
        app.enter_form();
        type_str(&mut app, "half");
        app.cancel();
        assert_eq!(app.input_mode, InputMode::Normal);
        app.enter_form();
        type_str(&mut app, " done");
        assert_eq!(app.form.text, "half done");
    }

    #[test]
    fn test_toggle_under_active_filter_hides_row() {
        let mut app = App::new(Filter::Active);
        add(&mut app, "a");
        add(&mut app, "b");
        app.state.select(Some(0));

        app.toggle_status();
        assert_eq!(visible(&app), vec!["b"]);
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_delete_clamps_selection() {
        let mut app = App::new(Filter::All);
        add(&mut app, "a");
        add(&mut app, "b");
        app.delete_task();
        assert_eq!(visible(&app), vec!["a"]);
        assert_eq!(app.state.selected(), Some(0));
        app.delete_task();
        assert!(app.tasks.is_empty());
        assert_eq!(app.state.selected(), None);
        // Nothing selected: no-op.
        app.delete_task();
        app.toggle_status();
    }

    #[test]
    fn test_edit_text_commit_and_cancel() {
        let mut app = App::new(Filter::All);
        add(&mut app, "draft");
        let id = app.tasks[0].id;

        app.begin_edit_text();
        assert_eq!(app.edits.mode(id), RowMode::Edit);
        type_str(&mut app, "!");
        app.cancel();
        assert_eq!(visible(&app), vec!["draft"]);
        assert_eq!(app.edits.mode(id), RowMode::Display);

        app.begin_edit_text();
        for _ in 0..5 {
            app.delete_char();
        }
        app.submit();
        assert_eq!(app.input_mode, InputMode::EditText(id));
        assert_eq!(app.message(), Some(("Task text cannot be empty", true)));

        type_str(&mut app, "final");
        app.submit();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(visible(&app), vec!["final"]);
    }

    #[test]
    fn test_completed_row_not_editable() {
        let mut app = App::new(Filter::All);
        add(&mut app, "done");
        app.toggle_status();
        app.begin_edit_text();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.message(), Some(("Completed tasks cannot be edited", false)));
    }

    #[test]
    fn test_deadline_editor() {
        let mut app = App::new(Filter::All);
        add(&mut app, "a");

        app.begin_edit_deadline();
        type_str(&mut app, "soon");
        app.submit();
        assert!(matches!(app.input_mode, InputMode::EditDeadline(_)));
        assert!(app.message().unwrap().1);
        assert_eq!(app.tasks[0].deadline, None);

        for _ in 0..4 {
            app.delete_char();
        }
        type_str(&mut app, "2031-07-08");
        app.submit();
        assert_eq!(app.tasks[0].deadline.unwrap().to_string(), "2031-07-08");

        // Empty input clears.
        app.begin_edit_deadline();
        assert_eq!(app.deadline_draft, "2031-07-08");
        for _ in 0..10 {
            app.delete_char();
        }
        app.submit();
        assert_eq!(app.tasks[0].deadline, None);
    }

    #[test]
    fn test_priority_filter_and_clear() {
        let mut app = App::new(Filter::All);
        add(&mut app, "a");
        add(&mut app, "b");
        app.cycle_priority();
        assert_eq!(app.tasks[1].priority, Priority::Low);

        app.toggle_status();
        app.cycle_filter();
        assert_eq!(app.store.filter(), Filter::Active);
        assert_eq!(visible(&app), vec!["a"]);

        app.clear_completed();
        app.set_filter(Filter::All);
        assert_eq!(visible(&app), vec!["a"]);
        assert_eq!(app.message(), Some(("Cleared 1 completed task(s)", false)));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = App::new(Filter::All);
        add(&mut app, "a");
        add(&mut app, "b");
        app.state.select(Some(1));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(1));
    }
}
