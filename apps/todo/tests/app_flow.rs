//! End-to-end flows through the controller, store, reducer and snapshot
//! stores.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use todo::snapshot::{decode, encode};
use todo::{
    AppError, FileSnapshotStore, RestoreOutcome, Todo, TodoApp, TodoConfig, TodoEnvironment,
    TodoId, TodoListState,
};
use todolist_core::environment::ClockIdGenerator;
use todolist_testing::{InMemorySnapshotStore, SequentialIdGenerator, test_clock};

fn app_with(store: &InMemorySnapshotStore) -> TodoApp {
    TodoApp::new(
        TodoListState::seeded(),
        TodoEnvironment::new(Arc::new(store.clone()), "todos"),
        Arc::new(SequentialIdGenerator::default()),
    )
}

fn find(state: &TodoListState, text: &str) -> TodoId {
    state.todos.iter().find(|todo| todo.text == text).unwrap().id
}

#[tokio::test]
async fn test_seed_scenario() {
    let store = InMemorySnapshotStore::new();
    let app = app_with(&store);
    assert_eq!(app.restore().await.unwrap(), RestoreOutcome::Seeded);

    app.add("Read a book").await.unwrap();
    assert_eq!(app.snapshot().await.len(), 6);

    let seed = app.snapshot().await;
    app.delete(find(&seed, "Walk the dog")).await.unwrap();
    assert_eq!(app.snapshot().await.len(), 5);

    app.toggle(find(&seed, "Buy groceries")).await.unwrap();
    let state = app.snapshot().await;
    assert_eq!(state.completed_count(), 1);

    // The starting list, then every change, was written through
    assert_eq!(store.save_count(), 4);
    assert_eq!(decode(&store.get("todos").unwrap()).unwrap(), state.todos);
    assert_eq!(app.render().await[0], "Todo App  1 / 5 completed");

    app.finish().await.unwrap();
}

#[tokio::test]
async fn test_blank_add_changes_nothing() {
    let store = InMemorySnapshotStore::new();
    let app = app_with(&store);

    for input in ["", "   ", "\t\n"] {
        let error = app.add(input).await.unwrap_err();
        assert!(matches!(error, AppError::EmptyInput));
        assert_eq!(error.to_string(), "Input field is empty");
    }

    assert_eq!(app.snapshot().await, TodoListState::seeded());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_new_ids_skip_existing_ones() {
    let store = InMemorySnapshotStore::new();
    let app = app_with(&store);

    // Sequential ids start at 1, which the seed list already uses
    let first = app.add("Water plants").await.unwrap();
    let second = app.add("Pay rent").await.unwrap();

    assert_eq!(first.id, TodoId::new(6));
    assert_eq!(second.id, TodoId::new(7));
}

#[tokio::test]
async fn test_clock_ids_are_unique_within_one_millisecond() {
    let app = TodoApp::new(
        TodoListState::default(),
        TodoEnvironment::ephemeral(),
        Arc::new(ClockIdGenerator::new(Arc::new(test_clock()))),
    );

    let a = app.add("a").await.unwrap();
    let b = app.add("b").await.unwrap();

    assert_eq!(a.id, TodoId::new(1_735_689_600_000));
    assert!(b.id > a.id);
}

#[tokio::test]
async fn test_restore_dispatches_saved_list() {
    let saved = vec![
        Todo {
            id: TodoId::new(42),
            text: "From last time".to_string(),
            completed: true,
        },
        Todo::new(TodoId::new(43), ""),
    ];
    let store = InMemorySnapshotStore::with_blob("todos", encode(&saved).unwrap());
    let app = app_with(&store);

    assert_eq!(app.restore().await.unwrap(), RestoreOutcome::Restored { count: 2 });
    assert_eq!(app.snapshot().await.todos, saved);
}

#[tokio::test]
async fn test_malformed_snapshot_keeps_seed_list() {
    let store = InMemorySnapshotStore::with_blob("todos", "{\"not\": \"a list\"}");
    let app = app_with(&store);

    let outcome = app.restore().await.unwrap();

    assert!(matches!(outcome, RestoreOutcome::Malformed { .. }));
    assert_eq!(app.snapshot().await, TodoListState::seeded());
    // Left untouched until the next change
    assert_eq!(store.get("todos").as_deref(), Some("{\"not\": \"a list\"}"));
}

#[tokio::test]
async fn test_unreadable_store_keeps_seed_list() {
    let store = InMemorySnapshotStore::new();
    store.fail_operations(true);
    let app = app_with(&store);

    let outcome = app.restore().await.unwrap();

    assert!(matches!(outcome, RestoreOutcome::Unavailable { .. }));
    assert_eq!(app.snapshot().await, TodoListState::seeded());

    // A failed save is reported but the transition stands
    let error = app.toggle(TodoId::new(1)).await.unwrap_err();
    assert!(matches!(error, AppError::Snapshot(_)));
    assert!(!error.is_recoverable());
    assert_eq!(app.snapshot().await.completed_count(), 1);
}

#[tokio::test]
async fn test_fresh_start_saves_starting_list() {
    let store = InMemorySnapshotStore::new();
    let app = app_with(&store);

    assert_eq!(app.restore().await.unwrap(), RestoreOutcome::Seeded);

    assert_eq!(store.save_count(), 1);
    assert_eq!(
        decode(&store.get("todos").unwrap()).unwrap(),
        TodoListState::seeded().todos
    );
}

#[tokio::test]
async fn test_failed_save_reaches_the_caller() {
    let store = InMemorySnapshotStore::new();
    let app = app_with(&store);
    app.restore().await.unwrap();

    store.fail_operations(true);
    let error = app.add("Water plants").await.unwrap_err();
    assert!(matches!(error, AppError::Snapshot(_)));
    assert_eq!(app.snapshot().await.len(), 6);

    // Once the store recovers, the next change saves the whole list again
    store.fail_operations(false);
    app.toggle(TodoId::new(1)).await.unwrap();
    assert_eq!(
        decode(&store.get("todos").unwrap()).unwrap(),
        app.snapshot().await.todos
    );
}

#[tokio::test]
async fn test_corrupt_storage_file_is_overwritten_by_next_change() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TodoConfig::default();
    config.storage.path = dir.path().join("storage.json");
    std::fs::write(&config.storage.path, "garbage").unwrap();

    let first = TodoApp::from_config(&config);
    assert!(matches!(
        first.restore().await.unwrap(),
        RestoreOutcome::Unavailable { .. }
    ));
    first.add("Water plants").await.unwrap();
    first.toggle(TodoId::new(1)).await.unwrap();
    first.finish().await.unwrap();

    let second = TodoApp::from_config(&config);
    assert_eq!(second.restore().await.unwrap(), RestoreOutcome::Restored { count: 6 });
    assert_eq!(second.snapshot().await.completed_count(), 1);
}

#[tokio::test]
async fn test_noop_actions_do_not_write() {
    let store = InMemorySnapshotStore::new();
    let app = app_with(&store);

    app.delete(TodoId::new(999)).await.unwrap();
    app.toggle(TodoId::new(999)).await.unwrap();

    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_dispatch_json() {
    let store = InMemorySnapshotStore::new();
    let app = app_with(&store);

    app.dispatch_json(r#"{"type":"toggleTodo","payload":{"id":3}}"#)
        .await
        .unwrap();
    app.dispatch_json(r#"{"type":"setTodos","payload":[{"id":9,"text":"only","completed":false}]}"#)
        .await
        .unwrap();

    assert_eq!(app.snapshot().await.todos, vec![Todo::new(TodoId::new(9), "only")]);

    let error = app
        .dispatch_json(r#"{"type":"archiveTodo","payload":{"id":9}}"#)
        .await
        .unwrap_err();
    assert!(!error.is_recoverable());
    assert_eq!(app.snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_reset_restores_seed_list() {
    let store = InMemorySnapshotStore::new();
    let app = app_with(&store);

    app.replace(Vec::new()).await.unwrap();
    assert!(app.snapshot().await.is_empty());

    app.reset().await.unwrap();
    assert_eq!(app.snapshot().await, TodoListState::seeded());
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TodoConfig::default();
    config.storage.path = dir.path().join("storage.json");

    let first = TodoApp::from_config(&config);
    assert_eq!(first.restore().await.unwrap(), RestoreOutcome::Seeded);
    first.toggle(TodoId::new(2)).await.unwrap();
    let water = first.add("Water plants").await.unwrap();
    first.finish().await.unwrap();

    let second = TodoApp::from_config(&config);
    assert_eq!(second.restore().await.unwrap(), RestoreOutcome::Restored { count: 6 });

    let state = second.snapshot().await;
    assert!(state.get(TodoId::new(2)).unwrap().completed);
    assert_eq!(state.todos.last(), Some(&water));

    let blob = FileSnapshotStore::new(&config.storage.path);
    let raw = todolist_core::snapshot::SnapshotStore::load(&blob, "todos")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decode(&raw).unwrap(), state.todos);
}

#[tokio::test]
async fn test_persistence_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TodoConfig::default();
    config.storage.path = dir.path().join("storage.json");
    config.storage.persist = false;

    let app = TodoApp::from_config(&config);
    app.restore().await.unwrap();
    app.toggle(TodoId::new(1)).await.unwrap();
    app.finish().await.unwrap();

    assert!(!config.storage.path.exists());
}
