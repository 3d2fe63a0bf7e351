use crate::users::Role;
use serde::Serialize;

/// Completion figures for one collaborator or assistant
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UserStats {
    pub user_id: u32,
    pub user_name: String,
    pub role: Role,
    pub total_assigned: u32,
    pub total_done: u32,
    /// Percentage, one decimal
    pub completion_rate: f64,
}
