//! Ledger storage.
//!
//! Every ledger operation receives a `&dyn LedgerStore`; nothing in this crate
//! holds a process-wide client. Two backends exist:
//! - [`DynamoStore`]: single-table DynamoDB layout used in production
//! - [`MemoryStore`]: lock-guarded maps for local runs and tests
//!
//! Mutations that depend on a precondition (reassignment, status change) are
//! expressed as one conditional write so the check and the write cannot be
//! split by a concurrent request.

pub mod dynamo;
pub mod memory;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

use crate::assignments::{Assignment, AssignmentUpdate};
use crate::error::StoreError;
use crate::users::User;
use async_trait::async_trait;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_user(&self, user_id: u32) -> Result<Option<User>, StoreError>;

    /// All users, ordered by id
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn find_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
    ) -> Result<Option<Assignment>, StoreError>;

    /// Bind the (task, dossier) pair to `assignee_id` with status `todo`.
    /// Updates the existing row in place when there is one; the id and the
    /// original assignment timestamp are kept.
    async fn upsert_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
        assignee_id: u32,
    ) -> Result<Assignment, StoreError>;

    /// Apply `update` only if the row exists and is still held by
    /// `expected_assignee`. Returns `None` when that precondition fails.
    async fn update_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
        expected_assignee: u32,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>, StoreError>;

    async fn list_assignments_for_user(&self, user_id: u32)
        -> Result<Vec<Assignment>, StoreError>;

    async fn list_assignments_for_dossier(
        &self,
        dossier_id: &str,
    ) -> Result<Vec<Assignment>, StoreError>;

    /// Full ledger scan
    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError>;
}
