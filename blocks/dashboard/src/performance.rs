use crate::responses::respond;
use fiscal_atoms::performance::compute_stats;
use fiscal_atoms::LedgerStore;
use lambda_http::{http::StatusCode, Body, Error, Response};

/// Completion rates of every collaborator and assistant
pub async fn get_performance(store: &dyn LedgerStore) -> Result<Response<Body>, Error> {
    let result = compute_stats(store).await;
    respond(StatusCode::OK, result)
}
