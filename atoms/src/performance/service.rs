use super::model::UserStats;
use crate::assignments::Status;
use crate::error::LedgerError;
use crate::store::LedgerStore;
use std::collections::HashMap;

/// `done / total * 100`, rounded to one decimal; 0 when nothing is assigned
pub fn completion_rate(done: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = done as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Per-user completion over the current ledger state.
///
/// Every collaborator and assistant is reported, including those with no
/// assignment. Managers are left out. Ordered by user id.
pub async fn compute_stats(store: &dyn LedgerStore) -> Result<Vec<UserStats>, LedgerError> {
    let (users, assignments) = tokio::join!(store.list_users(), store.list_assignments());
    let users = users?;
    let assignments = assignments?;

    // (total, done) per assignee
    let mut counts: HashMap<u32, (u32, u32)> = HashMap::new();
    for a in &assignments {
        let entry = counts.entry(a.assignee_id).or_default();
        entry.0 += 1;
        if a.status == Status::Done {
            entry.1 += 1;
        }
    }

    let mut stats: Vec<UserStats> = users
        .into_iter()
        .filter(|u| u.user_role.is_assignable())
        .map(|u| {
            let (total, done) = counts.get(&u.user_id).copied().unwrap_or_default();
            UserStats {
                user_id: u.user_id,
                user_name: u.user_name,
                role: u.user_role,
                total_assigned: total,
                total_done: done,
                completion_rate: completion_rate(done, total),
            }
        })
        .collect();
    stats.sort_by_key(|s| s.user_id);

    tracing::debug!(users = stats.len(), rows = assignments.len(), "Computed performance stats");

    Ok(stats)
}
