//! Task Store Scenario Tests
//!
//! Store behavior against the in-memory backend.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use crate::domain::{Priority, SubtaskId, TaskId, TaskPatch, TaskStatus};
    use crate::mock::{subtask, task, Call, MockBackend, Op, QueuedSpawner};
    use crate::store::TaskStore;

    fn setup(backend: MockBackend) -> (TaskStore<MockBackend>, QueuedSpawner) {
        let spawner = QueuedSpawner::default();
        (TaskStore::new(backend, spawner.clone()), spawner)
    }

    /// Store with A (Pending, newer) and B (Done, older) loaded
    async fn loaded_store() -> (TaskStore<MockBackend>, QueuedSpawner) {
        let backend = MockBackend::with_rows(
            vec![
                task("b", "Book dentist", TaskStatus::Done, 1),
                task("a", "Plan trip", TaskStatus::Pending, 2),
            ],
            vec![
                subtask("s1", "a", "Book flight", 0),
                subtask("s2", "a", "Reserve hotel", 1),
                subtask("s3", "b", "Call clinic", 0),
            ],
        );
        let (store, spawner) = setup(backend);
        store.fetch_tasks().await;
        (store, spawner)
    }

    fn ids(store: &TaskStore<MockBackend>) -> Vec<String> {
        store.tasks().iter().map(|t| t.id.to_string()).collect()
    }

    // ========================
    // fetch_tasks
    // ========================

    #[tokio::test]
    async fn test_fetch_tasks_orders_newest_first() {
        let (store, _) = loaded_store().await;
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_tasks_sets_loading_while_in_flight() {
        let (store, _) = setup(MockBackend::default());
        let gate = store.backend().hold(Op::ListTasks);

        let observe = async {
            assert!(store.is_loading());
            gate.notify_one();
        };
        tokio::join!(store.fetch_tasks(), observe);

        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_overlapping_fetches_stay_loading_until_last_answer() {
        let (store, _) = loaded_store().await;
        let gate = store.backend().hold(Op::ListTasks);

        let second = async {
            store.fetch_tasks().await;
            // First fetch is still held
            assert!(store.is_loading());
            gate.notify_one();
        };
        tokio::join!(store.fetch_tasks(), second);

        assert!(!store.is_loading());
        assert_eq!(ids(&store), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_fetch_tasks_failure_keeps_previous_state() {
        let (store, _) = loaded_store().await;
        store.backend().fail(Op::ListTasks);

        store.fetch_tasks().await;

        assert_eq!(ids(&store), vec!["a", "b"]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_refetch_prunes_buckets_of_vanished_tasks() {
        let (store, _) = loaded_store().await;
        let b = TaskId::new("b");
        store.fetch_subtasks(&b).await;
        store.backend().tasks.borrow_mut().retain(|t| t.id != b);

        store.fetch_tasks().await;

        assert_eq!(ids(&store), vec!["a"]);
        assert_eq!(store.subtasks(&b), None);
    }

    // ========================
    // add_task
    // ========================

    #[tokio::test]
    async fn test_add_task_inserts_pending_placeholder_immediately() {
        let (store, _) = loaded_store().await;
        let gate = store.backend().hold(Op::CreateTask);

        let observe = async {
            let tasks = store.tasks();
            assert_eq!(tasks.len(), 3);
            assert!(tasks[0].id.is_temporary());
            assert_eq!(tasks[0].title, "Buy groceries");
            assert_eq!(tasks[0].status, TaskStatus::Pending);
            assert_eq!(tasks[0].priority, Priority::High);
            gate.notify_one();
        };
        let (created, ()) = tokio::join!(store.add_task("  Buy groceries ", Priority::High), observe);

        let created = created.expect("create should succeed");
        let tasks = store.tasks();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0], created);
        assert!(!tasks.iter().any(|t| t.id.is_temporary()));
    }

    #[tokio::test]
    async fn test_add_task_blank_title_is_noop() {
        let (store, _) = loaded_store().await;
        for title in ["", "   ", "\t\n"] {
            assert!(store.add_task(title, Priority::Low).await.is_none());
        }
        assert_eq!(store.tasks().len(), 2);
        assert_eq!(store.backend().count(|c| matches!(c, Call::CreateTask(_))), 0);
    }

    #[tokio::test]
    async fn test_add_task_failure_removes_placeholder() {
        let (store, spawner) = loaded_store().await;
        store.backend().fail(Op::CreateTask);

        assert!(store.add_task("Doomed", Priority::Medium).await.is_none());

        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(spawner.pending(), 0);
    }

    #[tokio::test]
    async fn test_add_task_keeps_placeholder_position() {
        let (store, _) = loaded_store().await;
        let first_gate = store.backend().hold(Op::CreateTask);

        // Second task is created while the first is still in flight, so the
        // first placeholder sits at index 1 when its answer arrives
        let second = async {
            let created = store.add_task("Second", Priority::High).await;
            assert!(store.tasks()[1].id.is_temporary());
            first_gate.notify_one();
            created
        };
        let (first, second) = tokio::join!(store.add_task("First", Priority::Low), second);

        let (first, second) = (first.unwrap(), second.unwrap());
        let tasks = store.tasks();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].id, second.id);
        assert_eq!(tasks[1].id, first.id);
        assert!(!tasks.iter().any(|t| t.id.is_temporary()));
    }

    #[tokio::test]
    async fn test_add_task_reinserts_row_dropped_by_refetch() {
        let (store, _) = loaded_store().await;
        let gate = store.backend().hold(Op::CreateTask);

        // A refetch lands before the create answers and drops the placeholder
        let refetch = async {
            store.fetch_tasks().await;
            assert_eq!(ids(&store), vec!["a", "b"]);
            gate.notify_one();
        };
        let (created, ()) = tokio::join!(store.add_task("Late", Priority::Low), refetch);

        let created = created.unwrap();
        let tasks = store.tasks();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0], created);
        assert_eq!(tasks.iter().filter(|t| t.id == created.id).count(), 1);
    }

    #[tokio::test]
    async fn test_embedding_is_detached_and_attached_later() {
        let (store, spawner) = loaded_store().await;
        *store.backend().embedding.borrow_mut() = Some(vec![0.1, 0.2, 0.3]);

        let created = store.add_task("Water plants", Priority::Low).await.unwrap();

        // Nothing embedding-related happened before the caller got its answer
        assert_eq!(store.backend().count(|c| matches!(c, Call::GenerateEmbedding(_))), 0);
        assert_eq!(spawner.pending(), 1);

        spawner.run_all().await;

        let calls = store.backend().calls();
        assert!(calls.contains(&Call::GenerateEmbedding("Water plants".to_string())));
        assert!(calls.contains(&Call::AttachEmbedding(created.id.clone(), 3)));
    }

    #[tokio::test]
    async fn test_embedding_failure_does_not_touch_task() {
        let (store, spawner) = loaded_store().await;
        store.backend().fail(Op::GenerateEmbedding);

        let created = store.add_task("Water plants", Priority::Low).await.unwrap();
        spawner.run_all().await;

        assert_eq!(store.tasks()[0], created);
        assert_eq!(store.backend().count(|c| matches!(c, Call::AttachEmbedding(..))), 0);
    }

    // ========================
    // update_task
    // ========================

    #[tokio::test]
    async fn test_update_task_applies_immediately_and_persists_patch() {
        let (store, _) = loaded_store().await;
        let b = TaskId::new("b");
        let gate = store.backend().hold(Op::UpdateTask);

        let observe = async {
            let snapshot = store.snapshot();
            assert_eq!(snapshot.task(&b).unwrap().status, TaskStatus::Pending);
            gate.notify_one();
        };
        tokio::join!(store.update_task(&b, TaskPatch::status(TaskStatus::Pending)), observe);

        assert!(store
            .backend()
            .calls()
            .contains(&Call::UpdateTask(b.clone(), TaskPatch::status(TaskStatus::Pending))));
        assert_eq!(store.snapshot().task(&b).unwrap().status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_task_failure_rolls_back() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.backend().fail(Op::UpdateTask);

        store.update_task(&a, TaskPatch::title("Plan holiday")).await;

        assert_eq!(store.snapshot().task(&a).unwrap().title, "Plan trip");
    }

    #[tokio::test]
    async fn test_failed_update_does_not_clobber_later_write() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        let gate = store.backend().hold(Op::UpdateTask);
        store.backend().fail(Op::UpdateTask);

        let later = async {
            // A second local write lands before the first call fails
            store.mutate_for_test(|s| {
                s.tasks.iter_mut().find(|t| t.id == a).unwrap().priority = Priority::Low
            });
            gate.notify_one();
        };
        tokio::join!(store.update_task(&a, TaskPatch::priority(Priority::High)), later);

        assert_eq!(store.snapshot().task(&a).unwrap().priority, Priority::Low);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_newer_write_of_same_value() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        let gate = store.backend().hold(Op::UpdateTask);
        store.backend().fail_next(Op::UpdateTask);

        // Pending -> Done (held, fails), then Pending, then Done again (both persist)
        let later = async {
            store.update_task(&a, TaskPatch::status(TaskStatus::Pending)).await;
            store.update_task(&a, TaskPatch::status(TaskStatus::Done)).await;
            gate.notify_one();
        };
        tokio::join!(store.update_task(&a, TaskPatch::status(TaskStatus::Done)), later);

        assert_eq!(store.snapshot().task(&a).unwrap().status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_update_task_rejects_blank_title_and_placeholders() {
        let (store, _) = loaded_store().await;
        store.update_task(&TaskId::new("a"), TaskPatch::title("   ")).await;
        store.update_task(&TaskId::temporary(99), TaskPatch::status(TaskStatus::Done)).await;
        assert_eq!(store.backend().count(|c| matches!(c, Call::UpdateTask(..))), 0);
    }

    // ========================
    // delete_task
    // ========================

    #[tokio::test]
    async fn test_delete_task_removes_task_and_bucket() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.fetch_subtasks(&a).await;
        assert_eq!(store.subtasks(&a).unwrap().len(), 2);

        store.delete_task(&a).await;

        let snapshot = store.snapshot();
        assert!(!snapshot.contains_task(&a));
        assert!(snapshot.subtasks.values().flatten().all(|s| s.task_id != a));
        assert_eq!(store.backend().calls().last(), Some(&Call::DeleteTask(a)));
    }

    #[tokio::test]
    async fn test_delete_task_is_synchronous_before_remote_answer() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.fetch_subtasks(&a).await;
        let gate = store.backend().hold(Op::DeleteTask);

        let observe = async {
            assert_eq!(store.subtasks(&a), None);
            assert!(!store.snapshot().contains_task(&a));
            gate.notify_one();
        };
        tokio::join!(store.delete_task(&a), observe);
    }

    #[tokio::test]
    async fn test_delete_task_failure_restores_task_and_bucket() {
        let (store, _) = loaded_store().await;
        let b = TaskId::new("b");
        store.fetch_subtasks(&b).await;
        store.backend().fail(Op::DeleteTask);

        store.delete_task(&b).await;

        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.subtasks(&b).unwrap().len(), 1);
    }

    // ========================
    // Subtasks
    // ========================

    #[tokio::test]
    async fn test_fetch_subtasks_is_idempotent() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");

        store.fetch_subtasks(&a).await;
        let first = store.subtasks(&a);
        store.fetch_subtasks(&a).await;

        assert_eq!(store.subtasks(&a), first);
        let titles: Vec<_> = first.unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Book flight", "Reserve hotel"]);
        assert!(!store.is_loading_subtasks(&a));
    }

    #[tokio::test]
    async fn test_fetched_empty_bucket_differs_from_unfetched() {
        let (store, _) = loaded_store().await;
        let id = store.add_task("Fresh", Priority::Low).await.unwrap().id;
        assert_eq!(store.subtasks(&id), None);

        store.fetch_subtasks(&id).await;

        assert_eq!(store.subtasks(&id), Some(vec![]));
    }

    #[tokio::test]
    async fn test_generate_subtasks_appends_incomplete_subtasks() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.fetch_subtasks(&a).await;
        *store.backend().generated_titles.borrow_mut() =
            vec!["Book flight".to_string(), "Reserve hotel".to_string()];

        let added = store.generate_subtasks(&a, "Plan trip").await;

        assert_eq!(added, 2);
        let bucket = store.subtasks(&a).unwrap();
        assert_eq!(bucket.len(), 4);
        assert!(bucket[2..].iter().all(|s| !s.is_completed && s.task_id == a));
        assert!(!store.is_generating(&a));
        assert!(store.backend().calls().contains(&Call::GenerateSubtaskTitles("Plan trip".to_string())));
    }

    #[tokio::test]
    async fn test_generate_subtasks_flag_set_during_call_and_cleared_on_failure() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.backend().fail(Op::GenerateSubtaskTitles);
        let gate = store.backend().hold(Op::GenerateSubtaskTitles);

        let observe = async {
            assert!(store.is_generating(&a));
            gate.notify_one();
        };
        let (added, ()) = tokio::join!(store.generate_subtasks(&a, "Plan trip"), observe);

        assert_eq!(added, 0);
        assert!(!store.is_generating(&a));
        assert_eq!(store.subtasks(&a), None);
    }

    #[tokio::test]
    async fn test_generate_subtasks_persist_failure_clears_flag() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        *store.backend().generated_titles.borrow_mut() = vec!["Step".to_string()];
        store.backend().fail(Op::CreateSubtasks);

        assert_eq!(store.generate_subtasks(&a, "Plan trip").await, 0);
        assert!(!store.is_generating(&a));
    }

    #[tokio::test]
    async fn test_generate_subtasks_allows_one_in_flight_per_task() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        *store.backend().generated_titles.borrow_mut() = vec!["Step".to_string()];
        let gate = store.backend().hold(Op::GenerateSubtaskTitles);

        let duplicate = async {
            let added = store.generate_subtasks(&a, "Plan trip").await;
            gate.notify_one();
            added
        };
        let (first, second) = tokio::join!(store.generate_subtasks(&a, "Plan trip"), duplicate);

        assert_eq!((first, second), (1, 0));
        assert_eq!(store.backend().count(|c| matches!(c, Call::GenerateSubtaskTitles(_))), 1);
    }

    #[tokio::test]
    async fn test_toggle_subtask_round_trip() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.fetch_subtasks(&a).await;
        let s1 = SubtaskId::new("s1");

        store.toggle_subtask(&s1, true).await;
        assert!(store.subtasks(&a).unwrap()[0].is_completed);
        store.toggle_subtask(&s1, false).await;

        assert!(!store.subtasks(&a).unwrap()[0].is_completed);
        assert_eq!(
            store.backend().count(|c| matches!(c, Call::SetSubtaskCompleted(..))),
            2
        );
    }

    #[tokio::test]
    async fn test_toggle_subtask_failure_rolls_back() {
        let (store, _) = loaded_store().await;
        let b = TaskId::new("b");
        store.fetch_subtasks(&b).await;
        store.backend().fail(Op::SetSubtaskCompleted);

        store.toggle_subtask(&SubtaskId::new("s3"), true).await;

        assert!(!store.subtasks(&b).unwrap()[0].is_completed);
    }

    #[tokio::test]
    async fn test_failed_toggle_keeps_newer_toggle_of_same_value() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.fetch_subtasks(&a).await;
        let s1 = SubtaskId::new("s1");
        let gate = store.backend().hold(Op::SetSubtaskCompleted);
        store.backend().fail_next(Op::SetSubtaskCompleted);

        let later = async {
            store.toggle_subtask(&s1, false).await;
            store.toggle_subtask(&s1, true).await;
            gate.notify_one();
        };
        tokio::join!(store.toggle_subtask(&s1, true), later);

        assert!(store.subtasks(&a).unwrap()[0].is_completed);
    }

    #[tokio::test]
    async fn test_generate_on_unfetched_bucket_leaves_it_unfetched() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.backend().fail(Op::ListSubtasks);
        store.fetch_subtasks(&a).await;
        store.backend().recover(Op::ListSubtasks);
        *store.backend().generated_titles.borrow_mut() = vec!["Pack".to_string()];

        assert_eq!(store.generate_subtasks(&a, "Plan trip").await, 1);
        assert_eq!(store.subtasks(&a), None);

        // The next fetch shows the server rows together with the generated one
        store.fetch_subtasks(&a).await;
        let titles: Vec<_> = store.subtasks(&a).unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Book flight", "Reserve hotel", "Pack"]);
    }

    #[tokio::test]
    async fn test_add_subtask_on_unfetched_bucket_leaves_it_unfetched() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");

        let created = store.add_subtask(&a, "Pack bags").await.unwrap();

        assert_eq!(store.subtasks(&a), None);
        store.fetch_subtasks(&a).await;
        let bucket = store.subtasks(&a).unwrap();
        assert_eq!(bucket.len(), 3);
        assert_eq!(bucket[2], created);
    }

    #[tokio::test]
    async fn test_generate_during_first_fetch_does_not_hide_server_rows() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        *store.backend().generated_titles.borrow_mut() = vec!["Pack".to_string()];
        let gate = store.backend().hold(Op::ListSubtasks);

        let generate = async {
            let added = store.generate_subtasks(&a, "Plan trip").await;
            gate.notify_one();
            added
        };
        let ((), added) = tokio::join!(store.fetch_subtasks(&a), generate);

        assert_eq!(added, 1);
        assert_eq!(store.subtasks(&a).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_add_subtask_replaces_placeholder() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.fetch_subtasks(&a).await;

        let created = store.add_subtask(&a, " Pack bags ").await.unwrap();

        let bucket = store.subtasks(&a).unwrap();
        assert_eq!(bucket.len(), 3);
        assert_eq!(bucket[2], created);
        assert_eq!(created.title, "Pack bags");
    }

    #[tokio::test]
    async fn test_add_subtask_failure_rolls_back() {
        let (store, _) = loaded_store().await;
        let a = TaskId::new("a");
        store.fetch_subtasks(&a).await;
        store.backend().fail(Op::CreateSubtasks);

        assert!(store.add_subtask(&a, "Pack bags").await.is_none());
        assert_eq!(store.subtasks(&a).unwrap().len(), 2);
    }

    // ========================
    // Observation and reset
    // ========================

    #[tokio::test]
    async fn test_subscribers_see_each_change_until_unsubscribed() {
        let (store, _) = loaded_store().await;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |state| sink.borrow_mut().push(state.tasks.len()));

        store.add_task("Observed", Priority::Low).await;
        // Placeholder inserted, then replaced
        assert_eq!(*seen.borrow(), vec![3, 3]);

        store.unsubscribe(id);
        store.delete_task(&TaskId::new("a")).await;
        assert_eq!(seen.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_listener_may_read_store() {
        let (store, _) = loaded_store().await;
        let reader = store.clone();
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        store.subscribe(move |_| *sink.borrow_mut() = reader.tasks().len());

        store.delete_task(&TaskId::new("b")).await;

        assert_eq!(*seen.borrow(), 1);
    }

    #[tokio::test]
    async fn test_clear_discards_in_flight_fetch() {
        let (store, _) = loaded_store().await;
        let gate = store.backend().hold(Op::ListTasks);

        let sign_out = async {
            store.clear();
            gate.notify_one();
        };
        tokio::join!(store.fetch_tasks(), sign_out);

        assert!(store.tasks().is_empty());
        assert!(!store.is_loading());
    }
}
