use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Result};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::{
    normalize_metadata, parse_args, parse_filter, parse_optional_date, parse_priority, Filter,
    Priority, Task, TaskStore, TASK_KEYS,
};
use tracing::{debug, info};

const HELP: &str = "\
Commands (N is the row number shown by `list`):
  add <text> [deadline:<date>] [priority:<h|m|l>]
  toggle N | delete N | edit N <text>
  deadline N <date|none> | priority N <h|m|l>
  clear                      remove completed tasks
  filter <all|active|completed>
  list | help | quit";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Pri")]
    priority: &'static str,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "ID")]
    id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Reply {
    Nothing,
    Changed(String),
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Line-oriented front end over a [`TaskStore`].
#[derive(Debug, Default)]
pub struct Shell {
    store: TaskStore,
}

impl Shell {
    pub fn new(filter: Filter) -> Self {
        Self {
            store: TaskStore::with_filter(filter),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W, prompt: bool) -> Result<()> {
        let mut line = String::new();
        loop {
            if prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            if self.execute(&line, out)? == Outcome::Quit {
                break;
            }
        }
        info!(tasks = self.store.len(), "shell session ended");
        Ok(())
    }

    /// Runs one command. Only output failures are returned as errors; bad
    /// input is reported on `out` and the session goes on.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Outcome> {
        let reply = match self.apply(line) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(error = %e, line = line.trim(), "command failed");
                writeln!(out, "error: {}", e)?;
                return Ok(Outcome::Continue);
            }
        };

        match reply {
            Reply::Nothing => {}
            Reply::Changed(msg) => {
                writeln!(out, "{}", msg)?;
                self.write_list(out)?;
            }
            Reply::List => self.write_list(out)?,
            Reply::Help => writeln!(out, "{}", HELP)?,
            Reply::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue)
    }

    fn apply(&mut self, line: &str) -> Result<Reply> {
        let tokens: Vec<String> = line.split_whitespace().map(|s| s.to_string()).collect();
        let Some((command, args)) = tokens.split_first() else {
            return Ok(Reply::Nothing);
        };

        match command.to_lowercase().as_str() {
            "add" | "a" => self.add(args),
            "toggle" | "t" => {
                let task = self.resolve(args)?;
                self.store.toggle(task.id);
                let verb = if task.completed { "Reopened" } else { "Completed" };
                Ok(Reply::Changed(format!("{}: {}", verb, task.text)))
            }
            "delete" | "rm" => {
                let task = self.resolve(args)?;
                self.store.delete(task.id);
                Ok(Reply::Changed(format!("Deleted: {}", task.text)))
            }
            "edit" | "e" => {
                let task = self.resolve(args)?;
                if task.completed {
                    bail!("Task {} is completed; reopen it to edit", args[0]);
                }
                self.store.update_text(task.id, &args[1..].join(" "))?;
                Ok(Reply::Changed(format!("Updated: {}", args[1..].join(" "))))
            }
            "deadline" | "due" => {
                let task = self.resolve(args)?;
                if args.len() < 2 {
                    bail!("Usage: deadline N <date|none>");
                }
                let deadline = parse_optional_date(&args[1..].join(" "))?;
                self.store.update_deadline(task.id, deadline);
                let msg = match deadline {
                    Some(d) => format!("Deadline of '{}' set to {}", task.text, d.format("%Y-%m-%d")),
                    None => format!("Deadline of '{}' cleared", task.text),
                };
                Ok(Reply::Changed(msg))
            }
            "priority" | "pri" => {
                let task = self.resolve(args)?;
                let value = args.get(1).ok_or_else(|| anyhow!("Usage: priority N <h|m|l>"))?;
                let priority = parse_priority(value)?;
                self.store.update_priority(task.id, priority);
                Ok(Reply::Changed(format!("Priority of '{}' set to {}", task.text, priority)))
            }
            "clear" => {
                let removed = self.store.clear_completed();
                Ok(Reply::Changed(format!("Cleared {} completed task(s)", removed)))
            }
            "filter" | "f" => {
                let value = args.first().ok_or_else(|| anyhow!("Usage: filter <all|active|completed>"))?;
                let filter = parse_filter(value)?;
                self.store.set_filter(filter);
                Ok(Reply::Changed(format!("Showing {} tasks", filter)))
            }
            "list" | "ls" => Ok(Reply::List),
            "help" | "?" => Ok(Reply::Help),
            "quit" | "exit" | "q" => Ok(Reply::Quit),
            other => Err(anyhow!("Unknown command: '{}' (type 'help')", other)),
        }
    }

    fn add(&mut self, args: &[String]) -> Result<Reply> {
        let parsed = parse_args(args);
        let metadata = normalize_metadata(parsed.metadata, &TASK_KEYS)?;

        let deadline = match metadata.get("deadline") {
            Some(d) => parse_optional_date(d)?,
            None => None,
        };
        let priority = match metadata.get("priority") {
            Some(p) => parse_priority(p)?,
            None => Priority::default(),
        };

        let id = self.store.add(&parsed.name, deadline, priority)?;
        Ok(Reply::Changed(format!("Added: {} (ID: {})", parsed.name, id.short())))
    }

    /// The visible task at the 1-based position in `args[0]`.
    fn resolve(&self, args: &[String]) -> Result<Task> {
        let raw = args.first().ok_or_else(|| anyhow!("Missing task number"))?;
        let n: usize = raw
            .parse()
            .map_err(|_| anyhow!("Not a task number: '{}'", raw))?;
        let visible = self.store.visible_tasks();
        n.checked_sub(1)
            .and_then(|i| visible.get(i).cloned())
            .ok_or_else(|| anyhow!("No task at position {}", n))
    }

    fn write_list<W: Write>(&self, out: &mut W) -> Result<()> {
        let visible = self.store.visible_tasks();
        if visible.is_empty() {
            writeln!(out, "No tasks.")?;
            return Ok(());
        }
        let rows: Vec<TaskRow> = visible
            .iter()
            .enumerate()
            .map(|(i, t)| to_row(i + 1, t))
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        writeln!(out, "{}", table)?;

        let counts = self.store.counts();
        writeln!(
            out,
            "{} item(s) left, {} completed ({} shown)",
            counts.active,
            counts.completed,
            self.store.filter()
        )?;
        Ok(())
    }
}

fn to_row(index: usize, task: &Task) -> TaskRow {
    TaskRow {
        index,
        done: if task.completed { "x" } else { " " },
        priority: task.priority.short(),
        deadline: task
            .deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string()),
        text: task.text.to_string(),
        id: task.id.short(),
    }
}
