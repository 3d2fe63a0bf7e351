use dashboard_block::{manager, performance, profile, responses, workbench};
use fiscal_atoms::users::Role;
use fiscal_shared::{AppState, SessionUser};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;

use lambda_http::http::header::{HeaderValue, SET_COOKIE, VARY};

fn with_set_cookies(mut resp: Response<Body>, cookies: &[String]) -> Response<Body> {
    let headers = resp.headers_mut();
    for cookie in cookies {
        if let Ok(v) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, v);
        }
    }
    resp
}

fn with_cors_headers(
    mut resp: Response<Body>,
    state: &AppState,
    request_origin: Option<&str>,
) -> Response<Body> {
    let cors_origin = state.config.cors_origin(request_origin);

    let headers = resp.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&cors_origin) {
        headers.insert("Access-Control-Allow-Origin", v);
    }
    headers.insert("Access-Control-Allow-Credentials", HeaderValue::from_static("true"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Cookie"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    state: &AppState,
    request_origin: Option<&str>,
    cookies: &[String],
) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(with_set_cookies(r, cookies), state, request_origin))
}

/// Route shapes, ignoring the method
fn is_known_path(parts: &[&str]) -> bool {
    matches!(
        parts,
        ["dossiers"]
            | ["dossiers", _]
            | ["dossiers", _, "tasks", _, "assignee" | "reassign" | "status"]
            | ["me"]
            | ["me", "tasks"]
            | ["users", "assignable" | "assistants"]
            | ["performance"]
            | ["logout"]
    )
}

fn require_role(session: &SessionUser, allowed: &[Role]) -> Result<(), Result<Response<Body>, Error>> {
    if allowed.contains(&session.role) {
        return Ok(());
    }
    tracing::info!(
        user_id = session.user_id,
        role = %session.role,
        "Route not available for role"
    );
    Err(responses::error_response(
        StatusCode::FORBIDDEN,
        "NotAuthorized",
        format!("Not available for role {}", session.role),
    ))
}

fn parse_task_id(raw: &str) -> Result<u32, Result<Response<Body>, Error>> {
    raw.parse().map_err(|_| {
        responses::error_response(
            StatusCode::BAD_REQUEST,
            "InvalidRequest",
            format!("Invalid task id {:?}", raw),
        )
    })
}

/// Main Lambda handler - resolves the session then routes by path
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();
    let body = event.body();
    let request_origin = event.headers().get("Origin").and_then(|v| v.to_str().ok());
    tracing::info!("API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, &state, request_origin));
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if !is_known_path(&parts) {
        return finalize_response(
            responses::error_response(StatusCode::NOT_FOUND, "NotFound", "Route not found"),
            &state,
            request_origin,
            &[],
        );
    }

    // Logout does not need a live session
    if matches!(parts.as_slice(), ["logout"]) {
        let resp = match method {
            Method::POST => responses::json_response(
                StatusCode::OK,
                &serde_json::json!({"message": "ok"}),
            ),
            _ => responses::error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                "MethodNotAllowed",
                "Method not allowed",
            ),
        };
        return finalize_response(resp, &state, request_origin, &state.sessions.end_session());
    }

    let store = state.store.as_ref();
    let refs = &state.refs;

    let Some(session) = state.sessions.current_user(store, event.headers()).await else {
        return finalize_response(
            responses::error_response(StatusCode::UNAUTHORIZED, "Unauthorized", "No active session"),
            &state,
            request_origin,
            &[],
        );
    };

    let resp = match (&method, parts.as_slice()) {
        (&Method::GET, ["me"]) => profile::get_profile(store, session.user_id).await,

        // ---------- manager ----------
        (&Method::GET, ["dossiers"]) => match require_role(&session, &[Role::Manager]) {
            Ok(()) => manager::list_dossiers(store, refs, session.user_id).await,
            Err(resp) => resp,
        },
        (&Method::GET, ["dossiers", dossier_id]) => match require_role(&session, &[Role::Manager]) {
            Ok(()) => manager::get_dossier(store, refs, dossier_id, session.user_id).await,
            Err(resp) => resp,
        },
        (&Method::PUT, ["dossiers", dossier_id, "tasks", task, "assignee"]) => {
            match require_role(&session, &[Role::Manager]).and_then(|_| parse_task_id(task)) {
                Ok(task_id) => {
                    manager::assign_task(store, refs, dossier_id, task_id, session.user_id, body)
                        .await
                }
                Err(resp) => resp,
            }
        }
        (&Method::GET, ["users", "assignable"]) => match require_role(&session, &[Role::Manager]) {
            Ok(()) => manager::list_assignable_users(store).await,
            Err(resp) => resp,
        },
        (&Method::GET, ["performance"]) => match require_role(&session, &[Role::Manager]) {
            Ok(()) => performance::get_performance(store).await,
            Err(resp) => resp,
        },

        // ---------- collaborator / assistant ----------
        (&Method::GET, ["me", "tasks"]) => {
            match require_role(&session, &[Role::Collaborator, Role::Assistant]) {
                Ok(()) => workbench::my_tasks(store, refs, session.user_id).await,
                Err(resp) => resp,
            }
        }
        (&Method::PATCH, ["dossiers", dossier_id, "tasks", task, "status"]) => {
            match require_role(&session, &[Role::Collaborator, Role::Assistant])
                .and_then(|_| parse_task_id(task))
            {
                Ok(task_id) => {
                    workbench::update_status(store, dossier_id, task_id, session.user_id, body)
                        .await
                }
                Err(resp) => resp,
            }
        }
        (&Method::POST, ["dossiers", dossier_id, "tasks", task, "reassign"]) => {
            match require_role(&session, &[Role::Collaborator]).and_then(|_| parse_task_id(task)) {
                Ok(task_id) => {
                    workbench::reassign_task(store, dossier_id, task_id, session.user_id, body)
                        .await
                }
                Err(resp) => resp,
            }
        }
        (&Method::GET, ["users", "assistants"]) => {
            match require_role(&session, &[Role::Collaborator]) {
                Ok(()) => workbench::list_assistants(store).await,
                Err(resp) => resp,
            }
        }

        _ => responses::error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "MethodNotAllowed",
            "Method not allowed",
        ),
    };

    if let Err(e) = &resp {
        tracing::error!("Handler failed for {} {}: {:?}", method, path, e);
    }

    finalize_response(resp, &state, request_origin, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiscal_atoms::reference::load_seed_users;
    use fiscal_atoms::{MemoryStore, ReferenceData};
    use fiscal_shared::{Config, CookieSession};

    fn state() -> Arc<AppState> {
        let store = MemoryStore::with_users(load_seed_users(None).unwrap());
        Arc::new(AppState::new(
            Arc::new(store),
            ReferenceData::embedded().unwrap(),
            Arc::new(CookieSession),
            Config::default(),
        ))
    }

    fn request(method: &str, uri: &str, user: Option<u32>, body: Option<&str>) -> Request {
        let mut builder = lambda_http::http::Request::builder().method(method).uri(uri);
        if let Some(id) = user {
            builder = builder.header("Cookie", format!("session={}", id));
        }
        let body = match body {
            Some(b) => Body::from(b.to_string()),
            None => Body::Empty,
        };
        builder.body(body).unwrap()
    }

    fn json(resp: &Response<Body>) -> serde_json::Value {
        match resp.body() {
            Body::Text(t) => serde_json::from_str(t).unwrap(),
            Body::Binary(b) => serde_json::from_slice(b).unwrap(),
            Body::Empty => serde_json::Value::Null,
        }
    }

    async fn call(state: &Arc<AppState>, req: Request) -> Response<Body> {
        function_handler(req, state.clone()).await.unwrap()
    }

    #[tokio::test]
    async fn rejects_missing_session() {
        let state = state();
        let resp = call(&state, request("GET", "/dossiers", None, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let state = state();
        let resp = call(&state, request("GET", "/nowhere", Some(1), None)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn manager_lists_owned_dossiers() {
        let state = state();
        let resp = call(&state, request("GET", "/dossiers", Some(1), None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json(&resp);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn collaborator_cannot_open_performance() {
        let state = state();
        let resp = call(&state, request("GET", "/performance", Some(3), None)).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn assign_then_update_status_over_http() {
        let state = state();

        let resp = call(
            &state,
            request("PUT", "/dossiers/D001/tasks/1/assignee", Some(1), Some(r#"{"assignee_id":3}"#)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json(&resp)["status"], "todo");

        let resp = call(
            &state,
            request("PATCH", "/dossiers/D001/tasks/1/status", Some(3), Some(r#"{"status":"in_progress"}"#)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json(&resp)["status"], "in_progress");

        let resp = call(&state, request("GET", "/me/tasks", Some(3), None)).await;
        let body = json(&resp);
        assert_eq!(body[0]["dossier_id"], "D001");
        assert_eq!(body[0]["steps"][0]["tasks"][0]["status"], "in_progress");
    }

    #[tokio::test]
    async fn ledger_errors_map_to_status_codes() {
        let state = state();

        // manager 2 does not own D001
        let resp = call(
            &state,
            request("PUT", "/dossiers/D001/tasks/1/assignee", Some(2), Some(r#"{"assignee_id":3}"#)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(json(&resp)["error"], "NotAuthorized");

        // nothing assigned yet
        let resp = call(
            &state,
            request("PATCH", "/dossiers/D001/tasks/1/status", Some(3), Some(r#"{"status":"done"}"#)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(json(&resp)["error"], "NotAssigned");

        let resp = call(
            &state,
            request("PUT", "/dossiers/D001/tasks/abc/assignee", Some(1), Some(r#"{"assignee_id":3}"#)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = call(
            &state,
            request("PUT", "/dossiers/D001/tasks/1/assignee", Some(1), Some("{}")),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn me_returns_full_profile() {
        let state = state();
        let resp = call(&state, request("GET", "/me", Some(3), None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json(&resp);
        assert_eq!(body["user_id"], 3);
        assert_eq!(body["user_name"], "collaborator1");
        assert_eq!(body["user_role"], "collaborator");
        assert_eq!(body["competence"], "Project management");
    }

    #[tokio::test]
    async fn role_gate_answers_before_ledger() {
        let state = state();
        call(
            &state,
            request("PUT", "/dossiers/D001/tasks/1/assignee", Some(1), Some(r#"{"assignee_id":5}"#)),
        )
        .await;

        // the assistant holds the task but may not hand it over
        let resp = call(
            &state,
            request("POST", "/dossiers/D001/tasks/1/reassign", Some(5), Some(r#"{"assignee_id":6}"#)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(json(&resp)["error"], "NotAuthorized");

        let resp = call(
            &state,
            request("PATCH", "/dossiers/D001/tasks/1/status", Some(1), Some(r#"{"status":"done"}"#)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn logout_clears_session_cookie() {
        let state = state();
        let resp = call(&state, request("POST", "/logout", None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("session=;"));
    }

    #[tokio::test]
    async fn wrong_method_on_known_path() {
        let state = state();
        let resp = call(&state, request("DELETE", "/dossiers/D001", Some(1), None)).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
