use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Status::Todo),
            "in_progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(other.to_string()),
        }
    }
}

/// A catalog task bound to a dossier, held by one user.
/// At most one exists per (task_id, dossier_id).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Assignment {
    pub assignment_id: String,
    pub task_id: u32,
    pub dossier_id: String,
    pub assignee_id: u32,
    pub status: Status,
    pub assigned_at: String,
}

/// Change applied by a conditional ledger write
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentUpdate {
    pub assignee_id: Option<u32>,
    pub status: Status,
}

// ========== PAYLOADS ==========

#[derive(Debug, Deserialize)]
pub struct AssignPayload {
    pub assignee_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
}

// ========== VIEWS ==========

/// One task in a user's work list
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AssignedTask {
    pub task_id: u32,
    pub task_description: String,
    pub status: Status,
    pub assignee_id: u32,
    pub dossier_id: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StepGroup {
    pub step_id: u32,
    pub step_name: String,
    pub step_description: String,
    pub tasks: Vec<AssignedTask>,
}

/// A user's assignments within one dossier, grouped by step
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DossierGroup {
    pub dossier_id: String,
    pub dossier_title: String,
    pub steps: Vec<StepGroup>,
}

/// Catalog task as seen from a manager's dossier page
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TaskSlot {
    pub task_id: u32,
    pub task_description: String,
    pub assignee_id: Option<u32>,
    pub status: Option<Status>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StepOverview {
    pub step_id: u32,
    pub step_name: String,
    pub step_description: String,
    pub tasks: Vec<TaskSlot>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DossierOverview {
    pub dossier: crate::dossiers::Dossier,
    pub steps: Vec<StepOverview>,
}
