//! Task Entity
//!
//! Top-level work item with status and priority.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, TaskId};
use crate::error::UnknownVariant;

/// Progress state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In-progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In-progress",
            TaskStatus::Done => "Done",
        }
    }

}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TaskStatus::Pending),
            "In-progress" => Ok(TaskStatus::InProgress),
            "Done" => Ok(TaskStatus::Done),
            _ => Err(UnknownVariant::new("status", s)),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            _ => Err(UnknownVariant::new("priority", s)),
        }
    }
}

/// A task as stored in the `tasks` table (embedding column excluded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Optimistic placeholder shown until the server confirms the create
    pub fn placeholder(id: TaskId, draft: &NewTask, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            status: draft.status,
            priority: draft.priority,
            created_at,
        }
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &TaskId {
        &self.id
    }
}

/// Insert payload for a new task. The server assigns id, owner and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
}

impl NewTask {
    /// Build a draft from user input; `None` when the title is blank after trimming
    pub fn new(title: &str, priority: Priority) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            status: TaskStatus::Pending,
            priority,
        })
    }
}

/// One editable column of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Title,
    Status,
    Priority,
}

/// Partial field set for `update_task`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    pub fn priority(priority: Priority) -> Self {
        Self { priority: Some(priority), ..Default::default() }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none() && self.priority.is_none()
    }

    /// Fields this patch writes
    pub fn fields(&self) -> Vec<TaskField> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push(TaskField::Title);
        }
        if self.status.is_some() {
            fields.push(TaskField::Status);
        }
        if self.priority.is_some() {
            fields.push(TaskField::Priority);
        }
        fields
    }

    /// Trims the title. Returns `None` for an empty patch or a blank title.
    pub fn normalized(mut self) -> Option<Self> {
        if let Some(title) = self.title.take() {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return None;
            }
            self.title = Some(trimmed.to_string());
        }
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Apply to `task` and return the patch that undoes it
    pub fn apply(&self, task: &mut Task) -> TaskPatch {
        let mut inverse = TaskPatch::default();
        if let Some(title) = &self.title {
            inverse.title = Some(std::mem::replace(&mut task.title, title.clone()));
        }
        if let Some(status) = self.status {
            inverse.status = Some(std::mem::replace(&mut task.status, status));
        }
        if let Some(priority) = self.priority {
            inverse.priority = Some(std::mem::replace(&mut task.priority, priority));
        }
        inverse
    }

    /// Undo `self` using `inverse` for the fields `owned` still grants and that
    /// still hold the value `self` wrote. Later writes to the same field win.
    pub fn revert(&self, inverse: &TaskPatch, task: &mut Task, owned: impl Fn(TaskField) -> bool) {
        if let (Some(written), Some(old)) = (&self.title, &inverse.title) {
            if &task.title == written && owned(TaskField::Title) {
                task.title = old.clone();
            }
        }
        if let (Some(written), Some(old)) = (self.status, inverse.status) {
            if task.status == written && owned(TaskField::Status) {
                task.status = old;
            }
        }
        if let (Some(written), Some(old)) = (self.priority, inverse.priority) {
            if task.priority == written && owned(TaskField::Priority) {
                task.priority = old;
            }
        }
    }
}
