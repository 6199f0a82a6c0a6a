//! Subtask Entity
//!
//! Child item of a task, produced by the AI generator or added by hand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, SubtaskId, TaskId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    /// Non-owning reference to the parent task
    pub task_id: TaskId,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Subtask {
    pub fn placeholder(id: SubtaskId, draft: &NewSubtask, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            task_id: draft.task_id.clone(),
            title: draft.title.clone(),
            is_completed: draft.is_completed,
            created_at,
        }
    }
}

impl Entity for Subtask {
    type Id = SubtaskId;

    fn id(&self) -> &SubtaskId {
        &self.id
    }
}

/// Insert payload for a subtask
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSubtask {
    pub task_id: TaskId,
    pub title: String,
    pub is_completed: bool,
}

impl NewSubtask {
    /// `None` when the title is blank after trimming
    pub fn new(task_id: &TaskId, title: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            task_id: task_id.clone(),
            title: title.to_string(),
            is_completed: false,
        })
    }

    /// Drafts for a batch of generated titles; blank titles are skipped
    pub fn batch<'a>(task_id: &TaskId, titles: impl IntoIterator<Item = &'a str>) -> Vec<Self> {
        titles.into_iter().filter_map(|t| Self::new(task_id, t)).collect()
    }
}
