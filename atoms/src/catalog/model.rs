use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CatalogTask {
    pub task_id: u32,
    pub task_description: String,
}

/// An ordered phase of an obligation type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Step {
    pub step_id: u32,
    pub step_name: String,
    pub step_description: String,
    #[serde(default)]
    pub tasks: Vec<CatalogTask>,
}

/// A fiscal-process category (e.g. VAT filing); dossiers select one by name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ObligationType {
    pub obligation_id: u32,
    pub obligation_name: String,
    pub obligation_description: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}
