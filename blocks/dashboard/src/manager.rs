use crate::responses::{parse_body, respond};
use fiscal_atoms::assignments::{self, AssignPayload};
use fiscal_atoms::{users, LedgerStore, ReferenceData};
use lambda_http::{http::StatusCode, Body, Error, Response};

/// Dossiers owned by the calling manager
pub async fn list_dossiers(
    store: &dyn LedgerStore,
    refs: &ReferenceData,
    manager_id: u32,
) -> Result<Response<Body>, Error> {
    let result = assignments::list_managed_dossiers(store, refs, manager_id).await;
    respond(StatusCode::OK, result)
}

/// Dossier page: steps and tasks with their current holder
pub async fn get_dossier(
    store: &dyn LedgerStore,
    refs: &ReferenceData,
    dossier_id: &str,
    manager_id: u32,
) -> Result<Response<Body>, Error> {
    let result = assignments::dossier_overview(store, refs, dossier_id, manager_id).await;
    respond(StatusCode::OK, result)
}

/// Assign (or re-assign) a catalog task of the dossier
pub async fn assign_task(
    store: &dyn LedgerStore,
    refs: &ReferenceData,
    dossier_id: &str,
    task_id: u32,
    manager_id: u32,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: AssignPayload = match parse_body(body) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };

    let result = assignments::assign(
        store,
        refs,
        task_id,
        dossier_id,
        payload.assignee_id,
        manager_id,
    )
    .await;
    respond(StatusCode::OK, result)
}

/// Collaborators and assistants for the assign picker
pub async fn list_assignable_users(store: &dyn LedgerStore) -> Result<Response<Body>, Error> {
    let result = users::list_assignable_users(store).await;
    respond(StatusCode::OK, result)
}
