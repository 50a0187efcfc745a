use crate::ipc::error::{err, grade_err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::GradeStore;
use serde_json::json;
use std::path::PathBuf;

fn health_record_count(store: &GradeStore) -> Option<i64> {
    match store.record_count() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "health could not count records");
            None
        }
    }
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let record_count = state.store.as_ref().and_then(health_record_count);
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "recordCount": record_count,
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    // Re-selecting, even the same folder, starts from a fresh connection.
    state.close_store();
    state.workspace = None;

    match GradeStore::open(&path) {
        Ok(store) => {
            state.workspace = Some(path.clone());
            state.store = Some(store);
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => grade_err(&req.id, &e),
    }
}

fn handle_workspace_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let was_open = state.store.is_some();
    if let Some(store) = state.store.take() {
        if let Err(e) = store.close() {
            state.workspace = None;
            return grade_err(&req.id, &e);
        }
    }
    state.workspace = None;
    ok(&req.id, json!({ "closed": was_open }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "workspace.close" => Some(handle_workspace_close(state, req)),
        _ => None,
    }
}
