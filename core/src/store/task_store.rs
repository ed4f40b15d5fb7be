use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::model::filter::Filter;
use crate::model::task::{Priority, Task, TaskId, TaskText};
use crate::store::observer::{Observers, StoreEvent, SubscriptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// In-memory task collection plus the current filter.
///
/// Every write publishes a new `Rc<[Task]>`; snapshots returned by
/// [`TaskStore::tasks`] before the write keep their contents.
pub struct TaskStore {
    tasks: Rc<[Task]>,
    filter: Filter,
    revision: u64,
    observers: Observers,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self {
            tasks: Rc::from(Vec::new()),
            filter: Filter::default(),
            revision: 0,
            observers: Observers::default(),
        }
    }
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks)
            .field("filter", &self.filter)
            .field("revision", &self.revision)
            .field("subscribers", &self.observers.len())
            .finish()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    // Writes

    pub fn add(
        &mut self,
        text: &str,
        deadline: Option<NaiveDate>,
        priority: Priority,
    ) -> Result<TaskId, ValidationError> {
        let text = TaskText::new(text).inspect_err(|e| warn!(error = %e, "rejected new task"))?;
        let task = Task::new(text, deadline, priority);
        let id = task.id;

        let mut next = self.tasks.to_vec();
        next.push(task);
        self.publish(next, StoreEvent::Added(id));
        Ok(id)
    }

    pub fn add_text(&mut self, text: &str) -> Result<TaskId, ValidationError> {
        self.add(text, None, Priority::default())
    }

    pub fn toggle(&mut self, id: TaskId) -> bool {
        self.replace(id, Task::toggled)
    }

    pub fn delete(&mut self, id: TaskId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        let next: Vec<Task> = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.publish(next, StoreEvent::Removed(vec![id]));
        true
    }

    /// `Ok(false)` means the text was valid but no task has `id`.
    pub fn update_text(&mut self, id: TaskId, text: &str) -> Result<bool, ValidationError> {
        let text = TaskText::new(text).inspect_err(|e| warn!(%id, error = %e, "rejected text edit"))?;
        Ok(self.replace(id, |t| t.with_text(text)))
    }

    pub fn update_deadline(&mut self, id: TaskId, deadline: Option<NaiveDate>) -> bool {
        self.replace(id, |t| t.with_deadline(deadline))
    }

    pub fn update_priority(&mut self, id: TaskId, priority: Priority) -> bool {
        self.replace(id, |t| t.with_priority(priority))
    }

    /// Returns how many tasks were removed.
    pub fn clear_completed(&mut self) -> usize {
        let (done, kept): (Vec<Task>, Vec<Task>) =
            self.tasks.iter().cloned().partition(|t| t.completed);
        if done.is_empty() {
            return 0;
        }
        let removed: Vec<TaskId> = done.iter().map(|t| t.id).collect();
        let count = removed.len();
        self.publish(kept, StoreEvent::Removed(removed));
        count
    }

    pub fn set_filter(&mut self, filter: Filter) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.revision += 1;
        debug!(%filter, revision = self.revision, "filter changed");
        self.observers.notify(&StoreEvent::FilterChanged(filter));
    }

    // Reads

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// The whole collection in insertion order.
    pub fn tasks(&self) -> Rc<[Task]> {
        Rc::clone(&self.tasks)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn visible_tasks(&self) -> Vec<Task> {
        self.visible_tasks_with(self.filter)
    }

    pub fn visible_tasks_with(&self, filter: Filter) -> Vec<Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).cloned().collect()
    }

    pub fn counts(&self) -> Counts {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        Counts {
            total: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    // Subscriptions

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn replace(&mut self, id: TaskId, f: impl FnOnce(&Task) -> Task) -> bool {
        let Some(pos) = self.position(id) else {
            debug!(%id, "no task with this id, nothing to update");
            return false;
        };
        let mut next = self.tasks.to_vec();
        next[pos] = f(&self.tasks[pos]);
        self.publish(next, StoreEvent::Updated(id));
        true
    }

    fn publish(&mut self, tasks: Vec<Task>, event: StoreEvent) {
        self.tasks = tasks.into();
        self.revision += 1;
        debug!(?event, revision = self.revision, len = self.tasks.len(), "store updated");
        self.observers.notify(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.text.as_str()).collect()
    }

    fn store_with(items: &[&str]) -> (TaskStore, Vec<TaskId>) {
        let mut store = TaskStore::new();
        let ids = items.iter().map(|s| store.add_text(s).unwrap()).collect();
        (store, ids)
    }

    #[test]
    fn test_add_appends_with_defaults() {
        let mut store = TaskStore::new();
        let id = store.add_text("Buy milk").unwrap();

        assert_eq!(store.len(), 1);
        let task = store.get(id).unwrap();
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.deadline, None);
    }

    #[test]
    fn test_add_keeps_given_fields() {
        let mut store = TaskStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let id = store.add("Pay rent", Some(date), Priority::High).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.deadline, Some(date));
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let (mut store, _) = store_with(&["a"]);
        let before = store.revision();

        assert_eq!(store.add_text(""), Err(ValidationError::EmptyText));
        assert_eq!(store.add("  \t ", None, Priority::High), Err(ValidationError::EmptyText));
        assert_eq!(store.len(), 1);
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn test_add_generates_distinct_ids() {
        let (store, ids) = store_with(&["same", "same", "same"]);
        assert_eq!(store.len(), 3);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let (mut store, ids) = store_with(&["a", "b"]);

        assert!(store.toggle(ids[0]));
        assert!(store.get(ids[0]).unwrap().completed);
        assert!(!store.get(ids[1]).unwrap().completed);

        assert!(store.toggle(ids[0]));
        assert!(!store.get(ids[0]).unwrap().completed);
    }

    #[test]
    fn test_missing_id_is_noop() {
        let (mut store, _) = store_with(&["a", "b"]);
        let before = store.tasks();
        let rev = store.revision();
        let ghost = TaskId::new();

        assert!(!store.toggle(ghost));
        assert!(!store.delete(ghost));
        assert_eq!(store.update_text(ghost, "x"), Ok(false));
        assert!(!store.update_deadline(ghost, None));
        assert!(!store.update_priority(ghost, Priority::Low));

        assert_eq!(store.tasks(), before);
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_delete_removes_only_match() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        assert!(store.delete(ids[1]));
        assert_eq!(texts(&store.tasks()), vec!["a", "c"]);
        assert!(store.get(ids[1]).is_none());
    }

    #[test]
    fn test_update_text() {
        let (mut store, ids) = store_with(&["draft"]);
        assert_eq!(store.update_text(ids[0], "final"), Ok(true));
        assert_eq!(store.get(ids[0]).unwrap().text.as_str(), "final");
    }

    #[test]
    fn test_update_text_rejects_blank() {
        let (mut store, ids) = store_with(&["keep me"]);
        assert_eq!(store.update_text(ids[0], "   "), Err(ValidationError::EmptyText));
        assert_eq!(store.get(ids[0]).unwrap().text.as_str(), "keep me");
    }

    #[test]
    fn test_update_deadline_sets_and_clears() {
        let (mut store, ids) = store_with(&["a"]);
        let date = NaiveDate::from_ymd_opt(2030, 12, 24).unwrap();

        assert!(store.update_deadline(ids[0], Some(date)));
        assert_eq!(store.get(ids[0]).unwrap().deadline, Some(date));

        assert!(store.update_deadline(ids[0], None));
        assert_eq!(store.get(ids[0]).unwrap().deadline, None);
    }

    #[test]
    fn test_update_priority() {
        let (mut store, ids) = store_with(&["a"]);
        assert!(store.update_priority(ids[0], Priority::Low));
        assert_eq!(store.get(ids[0]).unwrap().priority, Priority::Low);
    }

    #[test]
    fn test_clear_completed_keeps_order() {
        let (mut store, ids) = store_with(&["a", "b", "c", "d", "e"]);
        store.toggle(ids[1]);
        store.toggle(ids[3]);

        assert_eq!(store.clear_completed(), 2);
        assert_eq!(texts(&store.tasks()), vec!["a", "c", "e"]);
        assert_eq!(store.clear_completed(), 0);
    }

    #[test]
    fn test_visible_tasks_by_filter() {
        let (mut store, ids) = store_with(&["a", "b", "c", "d"]);
        store.toggle(ids[0]);
        store.toggle(ids[2]);

        assert_eq!(texts(&store.visible_tasks()), vec!["a", "b", "c", "d"]);
        store.set_filter(Filter::Active);
        assert_eq!(texts(&store.visible_tasks()), vec!["b", "d"]);
        store.set_filter(Filter::Completed);
        assert_eq!(texts(&store.visible_tasks()), vec!["a", "c"]);
        assert_eq!(texts(&store.visible_tasks_with(Filter::All)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_filter_does_not_touch_tasks() {
        let (mut store, _) = store_with(&["a"]);
        let before = store.tasks();
        store.set_filter(Filter::Completed);
        assert!(Rc::ptr_eq(&before, &store.tasks()));
        assert_eq!(store.filter(), Filter::Completed);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let (mut store, ids) = store_with(&["a", "b"]);
        let snapshot = store.tasks();

        store.toggle(ids[0]);
        store.update_text(ids[1], "changed").unwrap();
        store.add_text("c").unwrap();

        assert_eq!(texts(&snapshot), vec!["a", "b"]);
        assert!(!snapshot[0].completed);
        assert_eq!(texts(&store.tasks()), vec!["a", "changed", "c"]);
    }

    #[test]
    fn test_counts() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        store.toggle(ids[2]);
        assert_eq!(
            store.counts(),
            Counts {
                total: 3,
                active: 2,
                completed: 1
            }
        );
    }

    #[test]
    fn test_events_only_on_effective_writes() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = TaskStore::new();
        let sink = Rc::clone(&events);
        store.subscribe(move |e: &StoreEvent| sink.borrow_mut().push(e.clone()));

        let a = store.add_text("a").unwrap();
        let _ = store.add_text(" ");
        store.toggle(a);
        store.toggle(TaskId::new());
        store.set_filter(Filter::All);
        store.set_filter(Filter::Active);
        store.clear_completed();
        store.clear_completed();

        assert_eq!(
            *events.borrow(),
            vec![
                StoreEvent::Added(a),
                StoreEvent::Updated(a),
                StoreEvent::FilterChanged(Filter::Active),
                StoreEvent::Removed(vec![a]),
            ]
        );
        assert_eq!(store.revision(), 4);
    }

    #[test]
    fn test_unsubscribed_listener_is_silent() {
        let hits = Rc::new(RefCell::new(0));
        let mut store = TaskStore::new();
        let sink = Rc::clone(&hits);
        let sub = store.subscribe(move |_| *sink.borrow_mut() += 1);

        store.add_text("a").unwrap();
        assert!(store.unsubscribe(sub));
        store.add_text("b").unwrap();

        assert_eq!(*hits.borrow(), 1);
    }
}
