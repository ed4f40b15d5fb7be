use pretty_assertions::assert_eq;
use tasklist_core::{Filter, Priority, TaskStore, ValidationError};

fn summary(store: &TaskStore) -> Vec<(String, Priority, bool)> {
    store
        .tasks()
        .iter()
        .map(|t| (t.text.to_string(), t.priority, t.completed))
        .collect()
}

#[test]
fn buy_milk_write_report() {
    let mut store = TaskStore::new();
    let milk = store.add_text("Buy milk").unwrap();
    store.add("Write report", None, Priority::High).unwrap();

    assert_eq!(
        summary(&store),
        vec![
            ("Buy milk".to_string(), Priority::Medium, false),
            ("Write report".to_string(), Priority::High, false),
        ]
    );

    store.toggle(milk);
    let active: Vec<String> = store
        .visible_tasks_with(Filter::Active)
        .iter()
        .map(|t| t.text.to_string())
        .collect();
    assert_eq!(active, vec!["Write report".to_string()]);

    assert_eq!(store.clear_completed(), 1);
    assert_eq!(
        summary(&store),
        vec![("Write report".to_string(), Priority::High, false)]
    );
}

#[test]
fn filters_partition_the_collection() {
    let mut store = TaskStore::new();
    let ids: Vec<_> = (0..6)
        .map(|i| store.add_text(&format!("task {}", i)).unwrap())
        .collect();
    for id in ids.iter().step_by(2) {
        store.toggle(*id);
    }

    let active = store.visible_tasks_with(Filter::Active);
    let completed = store.visible_tasks_with(Filter::Completed);
    let all = store.visible_tasks_with(Filter::All);

    assert_eq!(active.len() + completed.len(), all.len());
    assert!(active.iter().all(|t| !t.completed));
    assert!(completed.iter().all(|t| t.completed));

    let active_text: Vec<String> = active.iter().map(|t| t.text.to_string()).collect();
    assert_eq!(active_text, vec!["task 1", "task 3", "task 5"]);
}

#[test]
fn failed_writes_leave_store_untouched() {
    let mut store = TaskStore::new();
    let id = store.add_text("stay").unwrap();
    let before = store.tasks();

    assert_eq!(store.add_text("\n"), Err(ValidationError::EmptyText));
    assert_eq!(store.update_text(id, " "), Err(ValidationError::EmptyText));

    assert_eq!(store.tasks(), before);
}
