use super::model::{CatalogTask, ObligationType, Step};
use crate::error::ReferenceError;
use std::collections::{HashMap, HashSet};

const DEFAULT_CATALOG: &str = include_str!("../../data/catalog.json");

/// Where a task sits in the tree
#[derive(Debug, Clone, Copy)]
struct TaskPosition {
    obligation: usize,
    step: usize,
    task: usize,
}

/// Static ObligationType -> Step -> Task tree. Loaded once and never mutated.
#[derive(Debug, Clone)]
pub struct Catalog {
    obligations: Vec<ObligationType>,
    by_task: HashMap<u32, TaskPosition>,
}

impl Catalog {
    pub fn new(obligations: Vec<ObligationType>) -> Result<Self, ReferenceError> {
        let mut by_task = HashMap::new();
        let mut seen_steps = HashSet::new();

        for (oi, obligation) in obligations.iter().enumerate() {
            for (si, step) in obligation.steps.iter().enumerate() {
                if !seen_steps.insert(step.step_id) {
                    return Err(ReferenceError::DuplicateStep(step.step_id));
                }
                for (ti, task) in step.tasks.iter().enumerate() {
                    let pos = TaskPosition { obligation: oi, step: si, task: ti };
                    if by_task.insert(task.task_id, pos).is_some() {
                        return Err(ReferenceError::DuplicateTask(task.task_id));
                    }
                }
            }
        }

        Ok(Self { obligations, by_task })
    }

    pub fn from_json(json: &str) -> Result<Self, ReferenceError> {
        let obligations: Vec<ObligationType> = serde_json::from_str(json)?;
        Self::new(obligations)
    }

    /// The seeded catalog shipped with the crate (TVA, BIC, HTA)
    pub fn embedded() -> Result<Self, ReferenceError> {
        Self::from_json(DEFAULT_CATALOG)
    }

    pub fn obligations(&self) -> &[ObligationType] {
        &self.obligations
    }

    pub fn find_obligation(&self, name: &str) -> Option<&ObligationType> {
        self.obligations.iter().find(|o| o.obligation_name == name)
    }

    /// Steps (with nested tasks) of an obligation type, in catalog order
    pub fn list_steps_for_obligation(&self, name: &str) -> Option<&[Step]> {
        self.find_obligation(name).map(|o| o.steps.as_slice())
    }

    pub fn find_task(&self, task_id: u32) -> Option<&CatalogTask> {
        let pos = self.by_task.get(&task_id)?;
        self.obligations
            .get(pos.obligation)?
            .steps
            .get(pos.step)?
            .tasks
            .get(pos.task)
    }

    /// Step owning the task
    pub fn step_for_task(&self, task_id: u32) -> Option<&Step> {
        let pos = self.by_task.get(&task_id)?;
        self.obligations.get(pos.obligation)?.steps.get(pos.step)
    }

    /// Sort key that follows catalog order: (obligation, step, task).
    /// Unknown tasks sort last.
    pub fn order_of(&self, task_id: u32) -> (usize, usize, usize) {
        self.by_task
            .get(&task_id)
            .map(|p| (p.obligation, p.step, p.task))
            .unwrap_or((usize::MAX, usize::MAX, usize::MAX))
    }

    /// Whether the task belongs to the subtree of the named obligation type
    pub fn task_in_obligation(&self, task_id: u32, obligation_name: &str) -> bool {
        match self.by_task.get(&task_id) {
            Some(pos) => self
                .obligations
                .get(pos.obligation)
                .map(|o| o.obligation_name == obligation_name)
                .unwrap_or(false),
            None => false,
        }
    }
}
