//! Views for collaborators and assistants: their task list, status changes,
//! and hand-over to an assistant.

use crate::responses::{parse_body, respond};
use fiscal_atoms::assignments::{self, AssignPayload, UpdateStatusPayload};
use fiscal_atoms::{users, LedgerStore, ReferenceData};
use lambda_http::{http::StatusCode, Body, Error, Response};

/// Tasks held by the caller, grouped by dossier and step
pub async fn my_tasks(
    store: &dyn LedgerStore,
    refs: &ReferenceData,
    user_id: u32,
) -> Result<Response<Body>, Error> {
    let result = assignments::list_for_user(store, refs, user_id).await;
    respond(StatusCode::OK, result)
}

pub async fn update_status(
    store: &dyn LedgerStore,
    dossier_id: &str,
    task_id: u32,
    user_id: u32,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: UpdateStatusPayload = match parse_body(body) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };

    let result =
        assignments::update_status(store, task_id, dossier_id, &payload.status, user_id).await;
    respond(StatusCode::OK, result)
}

/// Collaborator hands a held task to an assistant
pub async fn reassign_task(
    store: &dyn LedgerStore,
    dossier_id: &str,
    task_id: u32,
    user_id: u32,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: AssignPayload = match parse_body(body) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };

    let result =
        assignments::reassign(store, task_id, dossier_id, payload.assignee_id, user_id).await;
    respond(StatusCode::OK, result)
}

pub async fn list_assistants(store: &dyn LedgerStore) -> Result<Response<Body>, Error> {
    let result = users::list_assistants(store).await;
    respond(StatusCode::OK, result)
}
