use fiscal_atoms::LedgerError;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    message: String,
}

pub fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(payload)?.into())
        .map_err(Box::new)?)
}

pub fn error_response(
    status: StatusCode,
    error: &str,
    message: impl Into<String>,
) -> Result<Response<Body>, Error> {
    let body = ErrorResponse {
        error,
        message: message.into(),
    };
    json_response(status, &body)
}

pub fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
        LedgerError::NotAssigned { .. } => StatusCode::CONFLICT,
        LedgerError::UnknownTask(_)
        | LedgerError::UnknownDossier(_)
        | LedgerError::UnknownUser(_)
        | LedgerError::UnknownObligation(_) => StatusCode::NOT_FOUND,
        LedgerError::InvalidRole { .. } | LedgerError::InvalidTransition(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a ledger failure onto a JSON error response
pub fn ledger_error(err: LedgerError) -> Result<Response<Body>, Error> {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("Ledger operation failed: {}", err);
        // Don't leak backend details
        return error_response(status, err.kind(), "Internal storage error");
    }
    tracing::info!(kind = err.kind(), "Ledger request rejected: {}", err);
    error_response(status, err.kind(), err.to_string())
}

/// Render a ledger result: payload on success, mapped error otherwise
pub fn respond<T: Serialize>(
    status: StatusCode,
    result: Result<T, LedgerError>,
) -> Result<Response<Body>, Error> {
    match result {
        Ok(payload) => json_response(status, &payload),
        Err(err) => ledger_error(err),
    }
}

/// Decode a JSON body or produce the 400 to return
pub fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, Response<Body>> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Invalid request body: {}", e);
        let payload = ErrorResponse {
            error: "InvalidRequest",
            message: format!("Invalid request body: {}", e),
        };
        let body = serde_json::to_string(&payload).unwrap_or_default();
        Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_kind() {
        assert_eq!(
            status_for(&LedgerError::NotAuthorized { user_id: 1, action: "x" }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&LedgerError::NotAssigned { task_id: 1, dossier_id: "D".into(), user_id: 2 }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_for(&LedgerError::UnknownTask(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&LedgerError::InvalidTransition("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn malformed_body_is_bad_request() {
        #[derive(serde::Deserialize, Debug)]
        struct Payload {
            #[allow(dead_code)]
            assignee_id: u32,
        }
        let resp = parse_body::<Payload>(b"{not json").unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
