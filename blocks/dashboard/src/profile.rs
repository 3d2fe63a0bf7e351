use crate::responses::respond;
use fiscal_atoms::{users, LedgerStore};
use lambda_http::{http::StatusCode, Body, Error, Response};

/// Full profile of the signed-in user
pub async fn get_profile(store: &dyn LedgerStore, user_id: u32) -> Result<Response<Body>, Error> {
    let result = users::get_user(store, user_id).await;
    respond(StatusCode::OK, result)
}
