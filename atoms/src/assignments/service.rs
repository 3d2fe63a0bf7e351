use super::model::{
    AssignedTask, Assignment, AssignmentUpdate, DossierGroup, DossierOverview, Status,
    StepGroup, StepOverview, TaskSlot,
};
use crate::dossiers::Dossier;
use crate::error::LedgerError;
use crate::reference::ReferenceData;
use crate::store::LedgerStore;
use crate::users::{Role, User};
use std::collections::{BTreeMap, HashMap};

/// Load the acting user and check it manages the dossier
async fn authorize_manager(
    store: &dyn LedgerStore,
    dossier: &Dossier,
    acting_user_id: u32,
    action: &'static str,
) -> Result<User, LedgerError> {
    let actor = store
        .get_user(acting_user_id)
        .await?
        .ok_or(LedgerError::UnknownUser(acting_user_id))?;

    match actor.user_role {
        Role::Manager if dossier.manager_id == actor.user_id => Ok(actor),
        Role::Manager | Role::Collaborator | Role::Assistant => Err(LedgerError::NotAuthorized {
            user_id: acting_user_id,
            action,
        }),
    }
}

/// Find the row for the pair and check `acting_user_id` currently holds it
async fn held_assignment(
    store: &dyn LedgerStore,
    task_id: u32,
    dossier_id: &str,
    acting_user_id: u32,
) -> Result<Assignment, LedgerError> {
    let not_assigned = || LedgerError::NotAssigned {
        task_id,
        dossier_id: dossier_id.to_string(),
        user_id: acting_user_id,
    };

    match store.find_assignment(task_id, dossier_id).await? {
        Some(a) if a.assignee_id == acting_user_id => Ok(a),
        _ => Err(not_assigned()),
    }
}

/// Assign a catalog task within a dossier (manager only).
///
/// Creates the ledger row for the (task, dossier) pair, or updates the
/// existing one in place. Either way the status starts over at `todo`.
/// Managers may assign to collaborators and assistants.
pub async fn assign(
    store: &dyn LedgerStore,
    refs: &ReferenceData,
    task_id: u32,
    dossier_id: &str,
    assignee_id: u32,
    acting_manager_id: u32,
) -> Result<Assignment, LedgerError> {
    let dossier = refs
        .dossiers
        .find(dossier_id)
        .ok_or_else(|| LedgerError::UnknownDossier(dossier_id.to_string()))?;

    authorize_manager(store, dossier, acting_manager_id, "assign tasks in this dossier").await?;

    if !refs.catalog.task_in_obligation(task_id, &dossier.obligation) {
        return Err(LedgerError::UnknownTask(task_id));
    }

    let assignee = store
        .get_user(assignee_id)
        .await?
        .ok_or(LedgerError::UnknownUser(assignee_id))?;

    match assignee.user_role {
        Role::Collaborator | Role::Assistant => {}
        Role::Manager => {
            return Err(LedgerError::InvalidRole {
                user_id: assignee_id,
                role: assignee.user_role,
                expected: "collaborator or assistant",
            })
        }
    }

    let assignment = store
        .upsert_assignment(task_id, dossier_id, assignee_id)
        .await?;

    tracing::info!(
        task_id,
        dossier_id,
        assignee_id,
        manager_id = acting_manager_id,
        assignment_id = %assignment.assignment_id,
        "Task assigned"
    );

    Ok(assignment)
}

/// Hand a held task over to an assistant (collaborator only).
/// The status is reset to `todo`.
pub async fn reassign(
    store: &dyn LedgerStore,
    task_id: u32,
    dossier_id: &str,
    new_assignee_id: u32,
    acting_user_id: u32,
) -> Result<Assignment, LedgerError> {
    held_assignment(store, task_id, dossier_id, acting_user_id).await?;

    let actor = store
        .get_user(acting_user_id)
        .await?
        .ok_or(LedgerError::UnknownUser(acting_user_id))?;

    match actor.user_role {
        Role::Collaborator => {}
        Role::Manager | Role::Assistant => {
            return Err(LedgerError::NotAuthorized {
                user_id: acting_user_id,
                action: "reassign tasks",
            })
        }
    }

    let target = store
        .get_user(new_assignee_id)
        .await?
        .ok_or(LedgerError::UnknownUser(new_assignee_id))?;

    match target.user_role {
        Role::Assistant => {}
        Role::Manager | Role::Collaborator => {
            return Err(LedgerError::InvalidRole {
                user_id: new_assignee_id,
                role: target.user_role,
                expected: "assistant",
            })
        }
    }

    let update = AssignmentUpdate {
        assignee_id: Some(new_assignee_id),
        status: Status::Todo,
    };

    // Conditional on the actor still holding the row
    let assignment = store
        .update_assignment(task_id, dossier_id, acting_user_id, update)
        .await?
        .ok_or_else(|| LedgerError::NotAssigned {
            task_id,
            dossier_id: dossier_id.to_string(),
            user_id: acting_user_id,
        })?;

    tracing::info!(
        task_id,
        dossier_id,
        from = acting_user_id,
        to = new_assignee_id,
        "Task reassigned"
    );

    Ok(assignment)
}

/// Set the status of a held task. Any status may follow any other,
/// including `done` back to `todo`.
pub async fn update_status(
    store: &dyn LedgerStore,
    task_id: u32,
    dossier_id: &str,
    new_status: &str,
    acting_user_id: u32,
) -> Result<Assignment, LedgerError> {
    let current = held_assignment(store, task_id, dossier_id, acting_user_id).await?;

    let status: Status = new_status
        .parse()
        .map_err(LedgerError::InvalidTransition)?;

    let update = AssignmentUpdate {
        assignee_id: None,
        status,
    };

    let assignment = store
        .update_assignment(task_id, dossier_id, acting_user_id, update)
        .await?
        .ok_or_else(|| LedgerError::NotAssigned {
            task_id,
            dossier_id: dossier_id.to_string(),
            user_id: acting_user_id,
        })?;

    tracing::info!(
        task_id,
        dossier_id,
        user_id = acting_user_id,
        from = %current.status,
        to = %assignment.status,
        "Task status updated"
    );

    Ok(assignment)
}

/// A user's assignments grouped by dossier, then by step.
///
/// Dossiers are ordered by id, steps and tasks follow catalog order.
/// Rows whose task or step no longer resolves in the catalog are logged
/// and left out; they never fail the listing.
pub async fn list_for_user(
    store: &dyn LedgerStore,
    refs: &ReferenceData,
    user_id: u32,
) -> Result<Vec<DossierGroup>, LedgerError> {
    let mut rows = store.list_assignments_for_user(user_id).await?;
    rows.sort_by(|a, b| {
        a.dossier_id
            .cmp(&b.dossier_id)
            .then_with(|| refs.catalog.order_of(a.task_id).cmp(&refs.catalog.order_of(b.task_id)))
    });

    let mut groups: BTreeMap<String, DossierGroup> = BTreeMap::new();

    for row in rows {
        let (Some(step), Some(task)) = (
            refs.catalog.step_for_task(row.task_id),
            refs.catalog.find_task(row.task_id),
        ) else {
            tracing::warn!(
                task_id = row.task_id,
                dossier_id = %row.dossier_id,
                "Missing step for assigned task, skipping"
            );
            continue;
        };

        let group = groups.entry(row.dossier_id.clone()).or_insert_with(|| {
            let dossier_title = refs
                .dossiers
                .find(&row.dossier_id)
                .map(|d| d.title.clone())
                .unwrap_or_else(|| format!("Dossier {}", row.dossier_id));
            DossierGroup {
                dossier_id: row.dossier_id.clone(),
                dossier_title,
                steps: Vec::new(),
            }
        });

        // Rows are sorted in catalog order, so a step is always the last one
        // pushed or a new one.
        let needs_step = group
            .steps
            .last()
            .map(|s| s.step_id != step.step_id)
            .unwrap_or(true);
        if needs_step {
            group.steps.push(StepGroup {
                step_id: step.step_id,
                step_name: step.step_name.clone(),
                step_description: step.step_description.clone(),
                tasks: Vec::new(),
            });
        }

        if let Some(step_group) = group.steps.last_mut() {
            step_group.tasks.push(AssignedTask {
                task_id: task.task_id,
                task_description: task.task_description.clone(),
                status: row.status,
                assignee_id: row.assignee_id,
                dossier_id: row.dossier_id.clone(),
            });
        }
    }

    Ok(groups.into_values().collect())
}

/// Dossier page for its manager: every step of the dossier's obligation,
/// each task annotated with its current holder and status.
pub async fn dossier_overview(
    store: &dyn LedgerStore,
    refs: &ReferenceData,
    dossier_id: &str,
    acting_manager_id: u32,
) -> Result<DossierOverview, LedgerError> {
    let dossier = refs
        .dossiers
        .find(dossier_id)
        .ok_or_else(|| LedgerError::UnknownDossier(dossier_id.to_string()))?;

    authorize_manager(store, dossier, acting_manager_id, "view this dossier").await?;

    let steps = refs
        .catalog
        .list_steps_for_obligation(&dossier.obligation)
        .ok_or_else(|| LedgerError::UnknownObligation(dossier.obligation.clone()))?;

    let rows = store.list_assignments_for_dossier(dossier_id).await?;
    let by_task: HashMap<u32, &Assignment> = rows.iter().map(|a| (a.task_id, a)).collect();

    let steps = steps
        .iter()
        .map(|step| StepOverview {
            step_id: step.step_id,
            step_name: step.step_name.clone(),
            step_description: step.step_description.clone(),
            tasks: step
                .tasks
                .iter()
                .map(|task| {
                    let row = by_task.get(&task.task_id);
                    TaskSlot {
                        task_id: task.task_id,
                        task_description: task.task_description.clone(),
                        assignee_id: row.map(|a| a.assignee_id),
                        status: row.map(|a| a.status),
                    }
                })
                .collect(),
        })
        .collect();

    Ok(DossierOverview {
        dossier: dossier.clone(),
        steps,
    })
}

/// Dossiers owned by a manager
pub async fn list_managed_dossiers(
    store: &dyn LedgerStore,
    refs: &ReferenceData,
    manager_id: u32,
) -> Result<Vec<Dossier>, LedgerError> {
    let manager = store
        .get_user(manager_id)
        .await?
        .ok_or(LedgerError::UnknownUser(manager_id))?;

    match manager.user_role {
        Role::Manager => Ok(refs.dossiers.list_for_manager(manager_id)),
        Role::Collaborator | Role::Assistant => Err(LedgerError::NotAuthorized {
            user_id: manager_id,
            action: "list managed dossiers",
        }),
    }
}
