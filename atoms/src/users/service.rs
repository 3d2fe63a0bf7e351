use super::model::{Role, User, UserSummary};
use crate::error::{LedgerError, ReferenceError};
use crate::store::LedgerStore;

/// Get a user or fail with `UnknownUser`
pub async fn get_user(store: &dyn LedgerStore, user_id: u32) -> Result<User, LedgerError> {
    store
        .get_user(user_id)
        .await?
        .ok_or(LedgerError::UnknownUser(user_id))
}

/// Collaborators and assistants, i.e. everyone a manager can assign to
pub async fn list_assignable_users(
    store: &dyn LedgerStore,
) -> Result<Vec<UserSummary>, LedgerError> {
    let users = store.list_users().await?;
    Ok(users
        .iter()
        .filter(|u| u.user_role.is_assignable())
        .map(UserSummary::from)
        .collect())
}

/// Assistants only, the targets of a collaborator's reassignment
pub async fn list_assistants(store: &dyn LedgerStore) -> Result<Vec<UserSummary>, LedgerError> {
    let users = store.list_users().await?;
    Ok(users
        .iter()
        .filter(|u| u.user_role == Role::Assistant)
        .map(UserSummary::from)
        .collect())
}

/// Parse a seed file: a JSON array of users.
pub fn parse_seed_users(json: &str) -> Result<Vec<User>, ReferenceError> {
    Ok(serde_json::from_str(json)?)
}
