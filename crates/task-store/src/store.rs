//! Task Store
//!
//! Client-side source of truth for tasks and their subtasks. Every mutation is
//! applied locally first, then persisted; a failed remote call undoes the local
//! change. Subscribers are notified with a snapshot after each mutation.
//!
//! The store lives on a single-threaded executor. State sits behind a `RefCell`
//! and no borrow is ever held across an `.await`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chrono::Utc;

use crate::backend::{Spawner, TaskBackend};
use crate::domain::{
    Entity, NewSubtask, NewTask, Priority, Subtask, SubtaskId, Task, TaskField, TaskId, TaskPatch,
};
use crate::error::BackendResult;

/// Async-operation flags for one task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFlags {
    /// An AI subtask generation call is outstanding
    pub generating: bool,
    /// A subtask fetch is outstanding
    pub loading_subtasks: bool,
}

/// Everything the views render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Newest first
    pub tasks: Vec<Task>,
    /// Absent key means "not fetched yet"; an empty bucket means "fetched, none"
    pub subtasks: HashMap<TaskId, Vec<Subtask>>,
    /// Entries only exist while some flag is set
    pub flags: HashMap<TaskId, TaskFlags>,
    /// A full task fetch is outstanding
    pub loading: bool,
}

impl StoreState {
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.task(id).is_some()
    }

    pub fn flags(&self, id: &TaskId) -> TaskFlags {
        self.flags.get(id).copied().unwrap_or_default()
    }

    fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Subtask ids are globally unique, so the first match is the only one
    fn subtask_mut(&mut self, id: &SubtaskId) -> Option<&mut Subtask> {
        self.subtasks.values_mut().flat_map(|bucket| bucket.iter_mut()).find(|s| &s.id == id)
    }

    fn update_flags(&mut self, id: &TaskId, f: impl FnOnce(&mut TaskFlags)) {
        if !self.contains_task(id) {
            self.flags.remove(id);
            return;
        }
        let flags = self.flags.entry(id.clone()).or_default();
        f(flags);
        if *flags == TaskFlags::default() {
            self.flags.remove(id);
        }
    }

    /// Drop buckets and flags of tasks that are no longer listed
    fn prune_orphans(&mut self) {
        let tasks = &self.tasks;
        self.subtasks.retain(|id, _| tasks.iter().any(|t| &t.id == id));
        self.flags.retain(|id, _| tasks.iter().any(|t| &t.id == id));
    }

    fn remove_task(&mut self, id: &TaskId) -> Option<RemovedTask> {
        let index = self.tasks.iter().position(|t| &t.id == id)?;
        let task = self.tasks.remove(index);
        let subtasks = self.subtasks.remove(id);
        self.flags.remove(id);
        Some(RemovedTask { index, task, subtasks })
    }

    fn restore_task(&mut self, removed: RemovedTask) {
        if self.contains_task(&removed.task.id) {
            return;
        }
        let index = removed.index.min(self.tasks.len());
        let id = removed.task.id.clone();
        self.tasks.insert(index, removed.task);
        if let Some(bucket) = removed.subtasks {
            self.subtasks.entry(id).or_insert(bucket);
        }
    }
}

/// Snapshot taken by `delete_task` so a failed delete can be undone
struct RemovedTask {
    index: usize,
    task: Task,
    subtasks: Option<Vec<Subtask>>,
}

/// Swap a placeholder for the confirmed entity, keeping its position.
/// Returns false when the placeholder is gone (e.g. replaced by a refetch).
fn replace_placeholder<T: Entity>(items: &mut [T], temp_id: &T::Id, confirmed: T) -> bool {
    match items.iter_mut().find(|item| item.id() == temp_id) {
        Some(slot) => {
            *slot = confirmed;
            true
        }
        None => false,
    }
}

/// Handle returned by [`TaskStore::subscribe`]
pub type ListenerId = u64;

type Listener = Rc<dyn Fn(&StoreState)>;

/// A locally written field. The latest optimistic write to a key owns its rollback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum WriteKey {
    Task(TaskId, TaskField),
    Completed(SubtaskId),
}

struct Inner<B> {
    backend: B,
    spawner: Box<dyn Spawner>,
    state: RefCell<StoreState>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<ListenerId>,
    next_temp: Cell<u64>,
    /// Bumped by `clear`; responses started in an older epoch are discarded
    epoch: Cell<u64>,
    /// Sequence of the last optimistic write per field
    writes: RefCell<HashMap<WriteKey, u64>>,
    next_write: Cell<u64>,
    /// Only the most recently started task fetch may apply its rows
    latest_fetch: Cell<u64>,
    fetches_in_flight: Cell<u32>,
}

/// Shared handle to the task store. Clones refer to the same state.
pub struct TaskStore<B> {
    inner: Rc<Inner<B>>,
}

impl<B> Clone for TaskStore<B> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<B: TaskBackend + 'static> TaskStore<B> {
    pub fn new(backend: B, spawner: impl Spawner + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                backend,
                spawner: Box::new(spawner),
                state: RefCell::new(StoreState::default()),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
                next_temp: Cell::new(1),
                epoch: Cell::new(0),
                writes: RefCell::new(HashMap::new()),
                next_write: Cell::new(1),
                latest_fetch: Cell::new(0),
                fetches_in_flight: Cell::new(0),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    // ========================
    // Observation
    // ========================

    /// Register a callback run after every state change
    pub fn subscribe(&self, listener: impl Fn(&StoreState) + 'static) -> ListenerId {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    pub fn snapshot(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.inner.state.borrow().tasks.clone()
    }

    /// `None` until the task's subtasks have been fetched
    pub fn subtasks(&self, task_id: &TaskId) -> Option<Vec<Subtask>> {
        self.inner.state.borrow().subtasks.get(task_id).cloned()
    }

    pub fn is_generating(&self, task_id: &TaskId) -> bool {
        self.inner.state.borrow().flags(task_id).generating
    }

    pub fn is_loading_subtasks(&self, task_id: &TaskId) -> bool {
        self.inner.state.borrow().flags(task_id).loading_subtasks
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let result = {
            let mut state = self.inner.state.borrow_mut();
            f(&mut state)
        };
        self.notify();
        result
    }

    #[cfg(test)]
    pub(crate) fn mutate_for_test(&self, f: impl FnOnce(&mut StoreState)) {
        self.mutate(f)
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let listeners: Vec<Listener> =
            self.inner.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn next_temp_seq(&self) -> u64 {
        let seq = self.inner.next_temp.get();
        self.inner.next_temp.set(seq + 1);
        seq
    }

    fn epoch(&self) -> u64 {
        self.inner.epoch.get()
    }

    /// Record `keys` as last written by a new write and return its sequence
    fn claim_writes(&self, keys: &[WriteKey]) -> u64 {
        let seq = self.inner.next_write.get();
        self.inner.next_write.set(seq + 1);
        let mut writes = self.inner.writes.borrow_mut();
        for key in keys {
            writes.insert(key.clone(), seq);
        }
        seq
    }

    fn owns_write(&self, key: &WriteKey, seq: u64) -> bool {
        self.inner.writes.borrow().get(key) == Some(&seq)
    }

    fn release_writes(&self, keys: &[WriteKey], seq: u64) {
        let mut writes = self.inner.writes.borrow_mut();
        for key in keys {
            if writes.get(key) == Some(&seq) {
                writes.remove(key);
            }
        }
    }

    /// Forget everything (sign-out). In-flight responses are discarded.
    pub fn clear(&self) {
        self.inner.epoch.set(self.epoch() + 1);
        self.inner.writes.borrow_mut().clear();
        self.inner.fetches_in_flight.set(0);
        self.mutate(|s| *s = StoreState::default());
    }

    // ========================
    // Tasks
    // ========================

    /// Replace the task list with the server's, newest first.
    ///
    /// Overlapping fetches keep `loading` set until the last one answers; only
    /// the most recently started one applies its rows.
    pub async fn fetch_tasks(&self) {
        let epoch = self.epoch();
        let seq = self.inner.latest_fetch.get() + 1;
        self.inner.latest_fetch.set(seq);
        self.inner.fetches_in_flight.set(self.inner.fetches_in_flight.get() + 1);
        self.mutate(|s| s.loading = true);

        let result = self.inner.backend.list_tasks().await;
        if epoch != self.epoch() {
            return;
        }
        let in_flight = self.inner.fetches_in_flight.get().saturating_sub(1);
        self.inner.fetches_in_flight.set(in_flight);
        let is_latest = seq == self.inner.latest_fetch.get();
        self.mutate(|s| {
            s.loading = in_flight > 0;
            match result {
                Ok(_) if !is_latest => log::debug!("[STORE] dropping superseded task fetch"),
                Ok(tasks) => {
                    log::debug!("[STORE] fetched {} tasks", tasks.len());
                    s.tasks = tasks;
                    s.prune_orphans();
                }
                Err(e) => log::error!("[STORE] failed to fetch tasks: {}", e),
            }
        });
    }

    /// Create a task. The placeholder shows up at the front immediately and is
    /// swapped for the server row on success, or removed on failure.
    pub async fn add_task(&self, title: &str, priority: Priority) -> Option<Task> {
        let Some(draft) = NewTask::new(title, priority) else {
            log::debug!("[STORE] add_task ignored: blank title");
            return None;
        };
        let epoch = self.epoch();
        let temp_id = TaskId::temporary(self.next_temp_seq());
        let placeholder = Task::placeholder(temp_id.clone(), &draft, Utc::now());
        self.mutate(|s| s.tasks.insert(0, placeholder));

        match self.inner.backend.create_task(&draft).await {
            Ok(created) => {
                if epoch == self.epoch() {
                    self.mutate(|s| {
                        let replaced = replace_placeholder(&mut s.tasks, &temp_id, created.clone());
                        if !replaced && !s.contains_task(&created.id) {
                            s.tasks.insert(0, created.clone());
                        }
                    });
                }
                log::info!("[STORE] created task {}", created.id);
                self.spawn_embedding(created.id.clone(), created.title.clone());
                Some(created)
            }
            Err(e) => {
                log::error!("[STORE] failed to create task, rolling back: {}", e);
                self.mutate(|s| s.tasks.retain(|t| t.id != temp_id));
                None
            }
        }
    }

    /// Request and attach an embedding without holding up the caller
    fn spawn_embedding(&self, id: TaskId, title: String) {
        let store = self.clone();
        self.inner.spawner.spawn_detached(Box::pin(async move {
            let backend = store.backend();
            match backend.generate_embedding(&title).await {
                Ok(Some(embedding)) => {
                    if let Err(e) = backend.attach_embedding(&id, &embedding).await {
                        log::warn!("[EMBED] failed to store embedding for {}: {}", id, e);
                    }
                }
                Ok(None) => log::debug!("[EMBED] no embedding returned for {}", id),
                Err(e) => log::warn!("[EMBED] embedding generation failed for {}: {}", id, e),
            }
        }));
    }

    /// Apply a partial update locally, then persist it
    pub async fn update_task(&self, id: &TaskId, patch: TaskPatch) {
        if id.is_temporary() {
            log::debug!("[STORE] update_task ignored: {} is not confirmed yet", id);
            return;
        }
        let Some(patch) = patch.normalized() else {
            log::debug!("[STORE] update_task ignored: empty patch");
            return;
        };
        let Some(inverse) = self.mutate(|s| s.task_mut(id).map(|t| patch.apply(t))) else {
            log::debug!("[STORE] update_task ignored: unknown task {}", id);
            return;
        };
        let keys: Vec<WriteKey> =
            patch.fields().into_iter().map(|f| WriteKey::Task(id.clone(), f)).collect();
        let seq = self.claim_writes(&keys);

        if let Err(e) = self.inner.backend.update_task(id, &patch).await {
            log::error!("[STORE] failed to update task {}, rolling back: {}", id, e);
            self.mutate(|s| {
                if let Some(task) = s.task_mut(id) {
                    patch.revert(&inverse, task, |field| {
                        self.owns_write(&WriteKey::Task(id.clone(), field), seq)
                    });
                }
            });
        }
        self.release_writes(&keys, seq);
    }

    /// Remove a task and its subtasks locally, then delete it remotely
    pub async fn delete_task(&self, id: &TaskId) {
        if id.is_temporary() {
            log::debug!("[STORE] delete_task ignored: {} is not confirmed yet", id);
            return;
        }
        let epoch = self.epoch();
        let Some(removed) = self.mutate(|s| s.remove_task(id)) else {
            return;
        };

        if let Err(e) = self.inner.backend.delete_task(id).await {
            log::error!("[STORE] failed to delete task {}, restoring: {}", id, e);
            if epoch == self.epoch() {
                self.mutate(|s| s.restore_task(removed));
            }
        }
    }

    // ========================
    // Subtasks
    // ========================

    /// Load (or reload) the subtask bucket of one task
    pub async fn fetch_subtasks(&self, task_id: &TaskId) {
        if task_id.is_temporary() {
            return;
        }
        let epoch = self.epoch();
        self.mutate(|s| s.update_flags(task_id, |f| f.loading_subtasks = true));

        let result = self.inner.backend.list_subtasks(task_id).await;
        if epoch != self.epoch() {
            return;
        }
        self.mutate(|s| {
            s.update_flags(task_id, |f| f.loading_subtasks = false);
            match result {
                Ok(rows) if s.contains_task(task_id) => {
                    s.subtasks.insert(task_id.clone(), rows);
                }
                Ok(_) => log::debug!("[STORE] dropping subtasks of removed task {}", task_id),
                Err(e) => log::error!("[STORE] failed to fetch subtasks of {}: {}", task_id, e),
            }
        });
    }

    /// Ask the AI function for subtasks and append them to the task's bucket.
    ///
    /// At most one generation runs per task; a second call while one is
    /// outstanding returns 0 without calling out. Returns the number created.
    /// An unfetched bucket stays unfetched; the next fetch brings the new rows.
    pub async fn generate_subtasks(&self, task_id: &TaskId, task_title: &str) -> usize {
        if task_id.is_temporary() {
            log::debug!("[STORE] generate_subtasks ignored: {} is not confirmed yet", task_id);
            return 0;
        }
        let started = self.mutate(|s| {
            if !s.contains_task(task_id) || s.flags(task_id).generating {
                return false;
            }
            s.update_flags(task_id, |f| f.generating = true);
            true
        });
        if !started {
            log::debug!("[STORE] generation already running or task gone: {}", task_id);
            return 0;
        }
        let _guard = GeneratingGuard { store: self.clone(), task_id: task_id.clone() };

        match self.request_subtasks(task_id, task_title).await {
            Ok(created) => {
                let count = created.len();
                self.mutate(|s| {
                    if let Some(bucket) = s.subtasks.get_mut(task_id) {
                        for row in created {
                            if !bucket.iter().any(|st| st.id == row.id) {
                                bucket.push(row);
                            }
                        }
                    }
                });
                count
            }
            Err(e) => {
                log::warn!("[STORE] subtask generation failed for {}: {}", task_id, e);
                0
            }
        }
    }

    async fn request_subtasks(&self, task_id: &TaskId, task_title: &str) -> BackendResult<Vec<Subtask>> {
        let titles = self.inner.backend.generate_subtask_titles(task_title).await?;
        let drafts = NewSubtask::batch(task_id, titles.iter().map(String::as_str));
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        self.inner.backend.create_subtasks(&drafts).await
    }

    /// Add one subtask by hand. Same placeholder rules as `add_task`, except that
    /// an unfetched bucket gets no placeholder and stays unfetched.
    pub async fn add_subtask(&self, task_id: &TaskId, title: &str) -> Option<Subtask> {
        if task_id.is_temporary() {
            return None;
        }
        let Some(draft) = NewSubtask::new(task_id, title) else {
            log::debug!("[STORE] add_subtask ignored: blank title");
            return None;
        };
        let epoch = self.epoch();
        let temp_id = SubtaskId::temporary(self.next_temp_seq());
        let placeholder = Subtask::placeholder(temp_id.clone(), &draft, Utc::now());
        let known = self.mutate(|s| {
            if !s.contains_task(task_id) {
                return false;
            }
            if let Some(bucket) = s.subtasks.get_mut(task_id) {
                bucket.push(placeholder);
            }
            true
        });
        if !known {
            return None;
        }

        let created = self
            .inner
            .backend
            .create_subtasks(std::slice::from_ref(&draft))
            .await
            .and_then(|mut rows| {
                rows.pop().ok_or_else(|| {
                    crate::error::BackendError::Decode("insert returned no row".to_string())
                })
            });

        match created {
            Ok(created) => {
                if epoch == self.epoch() {
                    self.mutate(|s| {
                        if let Some(bucket) = s.subtasks.get_mut(task_id) {
                            let replaced = replace_placeholder(bucket, &temp_id, created.clone());
                            if !replaced && !bucket.iter().any(|st| st.id == created.id) {
                                bucket.push(created.clone());
                            }
                        }
                    });
                }
                Some(created)
            }
            Err(e) => {
                log::error!("[STORE] failed to add subtask, rolling back: {}", e);
                self.mutate(|s| {
                    if let Some(bucket) = s.subtasks.get_mut(task_id) {
                        bucket.retain(|st| st.id != temp_id);
                    }
                });
                None
            }
        }
    }

    /// Set a subtask's completion locally, then persist it
    pub async fn toggle_subtask(&self, id: &SubtaskId, is_completed: bool) {
        if id.is_temporary() {
            return;
        }
        let previous = self.mutate(|s| {
            s.subtask_mut(id).map(|st| std::mem::replace(&mut st.is_completed, is_completed))
        });
        let Some(previous) = previous else {
            log::debug!("[STORE] toggle_subtask ignored: unknown subtask {}", id);
            return;
        };
        let keys = [WriteKey::Completed(id.clone())];
        let seq = self.claim_writes(&keys);

        if let Err(e) = self.inner.backend.set_subtask_completed(id, is_completed).await {
            log::error!("[STORE] failed to toggle subtask {}, rolling back: {}", id, e);
            let owned = self.owns_write(&keys[0], seq);
            self.mutate(|s| {
                if let Some(st) = s.subtask_mut(id) {
                    if owned && st.is_completed == is_completed {
                        st.is_completed = previous;
                    }
                }
            });
        }
        self.release_writes(&keys, seq);
    }
}

/// Clears the generating flag when a generation ends, however it ends
struct GeneratingGuard<B: TaskBackend + 'static> {
    store: TaskStore<B>,
    task_id: TaskId,
}

impl<B: TaskBackend + 'static> Drop for GeneratingGuard<B> {
    fn drop(&mut self) {
        let cleared = match self.store.inner.state.try_borrow_mut() {
            Ok(mut state) => {
                state.update_flags(&self.task_id, |f| f.generating = false);
                true
            }
            Err(_) => {
                log::warn!("[STORE] could not clear generating flag of {}: state is borrowed", self.task_id);
                false
            }
        };
        if cleared {
            self.store.notify();
        }
    }
}
