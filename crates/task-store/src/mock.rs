//! In-memory backend for store tests.
//!
//! Records every call, fails on demand per operation, and can hold the next call
//! of an operation on a `Notify` gate so a test can look at the optimistic state
//! mid-flight.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;

use crate::backend::{DetachedTask, Spawner, TaskBackend};
use crate::domain::{NewSubtask, NewTask, Priority, Subtask, SubtaskId, Task, TaskId, TaskPatch, TaskStatus};
use crate::error::{BackendError, BackendResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
    ListSubtasks,
    CreateSubtasks,
    SetSubtaskCompleted,
    GenerateEmbedding,
    AttachEmbedding,
    GenerateSubtaskTitles,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListTasks,
    CreateTask(NewTask),
    UpdateTask(TaskId, TaskPatch),
    DeleteTask(TaskId),
    ListSubtasks(TaskId),
    CreateSubtasks(Vec<NewSubtask>),
    SetSubtaskCompleted(SubtaskId, bool),
    GenerateEmbedding(String),
    AttachEmbedding(TaskId, usize),
    GenerateSubtaskTitles(String),
}

#[derive(Default)]
pub struct MockBackend {
    pub tasks: RefCell<Vec<Task>>,
    pub subtasks: RefCell<Vec<Subtask>>,
    pub calls: RefCell<Vec<Call>>,
    pub generated_titles: RefCell<Vec<String>>,
    pub embedding: RefCell<Option<Vec<f32>>>,
    failing: RefCell<HashSet<Op>>,
    fail_next: RefCell<HashSet<Op>>,
    gates: RefCell<HashMap<Op, Rc<Notify>>>,
    next_id: Cell<u32>,
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
}

pub fn task(id: &str, title: &str, status: TaskStatus, minutes: i64) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        status,
        priority: Priority::Medium,
        created_at: base_time() + Duration::minutes(minutes),
    }
}

pub fn subtask(id: &str, task_id: &str, title: &str, minutes: i64) -> Subtask {
    Subtask {
        id: SubtaskId::new(id),
        task_id: TaskId::new(task_id),
        title: title.to_string(),
        is_completed: false,
        created_at: base_time() + Duration::minutes(minutes),
    }
}

impl MockBackend {
    pub fn with_rows(tasks: Vec<Task>, subtasks: Vec<Subtask>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
            subtasks: RefCell::new(subtasks),
            ..Default::default()
        }
    }

    pub fn fail(&self, op: Op) {
        self.failing.borrow_mut().insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.borrow_mut().remove(&op);
    }

    /// Fail only the next call of `op`
    pub fn fail_next(&self, op: Op) {
        self.fail_next.borrow_mut().insert(op);
    }

    /// Hold the next call of `op` until the returned gate is notified.
    /// Later calls pass straight through.
    pub fn hold(&self, op: Op) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        self.gates.borrow_mut().insert(op, Rc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    async fn pass(&self, op: Op, call: Call) -> BackendResult<()> {
        self.calls.borrow_mut().push(call);
        let gate = self.gates.borrow_mut().remove(&op);
        let doomed = self.fail_next.borrow_mut().remove(&op);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if doomed || self.failing.borrow().contains(&op) {
            return Err(BackendError::Network(format!("{:?} unavailable", op)));
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        format!("{}-{:04}", prefix, n)
    }

    fn now(&self) -> DateTime<Utc> {
        base_time() + Duration::hours(1) + Duration::seconds(self.next_id.get() as i64)
    }
}

#[async_trait(?Send)]
impl TaskBackend for MockBackend {
    async fn list_tasks(&self) -> BackendResult<Vec<Task>> {
        self.pass(Op::ListTasks, Call::ListTasks).await?;
        let mut tasks = self.tasks.borrow().clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn create_task(&self, draft: &NewTask) -> BackendResult<Task> {
        self.pass(Op::CreateTask, Call::CreateTask(draft.clone())).await?;
        let task = Task {
            id: TaskId::new(self.next_id("task")),
            title: draft.title.clone(),
            status: draft.status,
            priority: draft.priority,
            created_at: self.now(),
        };
        self.tasks.borrow_mut().push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> BackendResult<()> {
        self.pass(Op::UpdateTask, Call::UpdateTask(id.clone(), patch.clone())).await?;
        if let Some(task) = self.tasks.borrow_mut().iter_mut().find(|t| &t.id == id) {
            patch.apply(task);
        }
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> BackendResult<()> {
        self.pass(Op::DeleteTask, Call::DeleteTask(id.clone())).await?;
        self.tasks.borrow_mut().retain(|t| &t.id != id);
        self.subtasks.borrow_mut().retain(|s| &s.task_id != id);
        Ok(())
    }

    async fn list_subtasks(&self, task_id: &TaskId) -> BackendResult<Vec<Subtask>> {
        self.pass(Op::ListSubtasks, Call::ListSubtasks(task_id.clone())).await?;
        let mut rows: Vec<Subtask> =
            self.subtasks.borrow().iter().filter(|s| &s.task_id == task_id).cloned().collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn create_subtasks(&self, drafts: &[NewSubtask]) -> BackendResult<Vec<Subtask>> {
        self.pass(Op::CreateSubtasks, Call::CreateSubtasks(drafts.to_vec())).await?;
        let rows: Vec<Subtask> = drafts
            .iter()
            .map(|d| Subtask {
                id: SubtaskId::new(self.next_id("sub")),
                task_id: d.task_id.clone(),
                title: d.title.clone(),
                is_completed: d.is_completed,
                created_at: self.now(),
            })
            .collect();
        self.subtasks.borrow_mut().extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn set_subtask_completed(&self, id: &SubtaskId, is_completed: bool) -> BackendResult<()> {
        self.pass(Op::SetSubtaskCompleted, Call::SetSubtaskCompleted(id.clone(), is_completed)).await?;
        if let Some(row) = self.subtasks.borrow_mut().iter_mut().find(|s| &s.id == id) {
            row.is_completed = is_completed;
        }
        Ok(())
    }

    async fn generate_embedding(&self, text: &str) -> BackendResult<Option<Vec<f32>>> {
        self.pass(Op::GenerateEmbedding, Call::GenerateEmbedding(text.to_string())).await?;
        Ok(self.embedding.borrow().clone())
    }

    async fn attach_embedding(&self, id: &TaskId, embedding: &[f32]) -> BackendResult<()> {
        self.pass(Op::AttachEmbedding, Call::AttachEmbedding(id.clone(), embedding.len())).await
    }

    async fn generate_subtask_titles(&self, task_title: &str) -> BackendResult<Vec<String>> {
        self.pass(Op::GenerateSubtaskTitles, Call::GenerateSubtaskTitles(task_title.to_string()))
            .await?;
        Ok(self.generated_titles.borrow().clone())
    }
}

/// Collects detached work so a test decides when it runs
#[derive(Clone, Default)]
pub struct QueuedSpawner {
    queue: Rc<RefCell<Vec<DetachedTask>>>,
}

impl QueuedSpawner {
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub async fn run_all(&self) {
        let tasks: Vec<DetachedTask> = self.queue.borrow_mut().drain(..).collect();
        for task in tasks {
            task.await;
        }
    }
}

impl Spawner for QueuedSpawner {
    fn spawn_detached(&self, task: DetachedTask) {
        self.queue.borrow_mut().push(task);
    }
}
