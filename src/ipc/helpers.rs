use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::store::GradeStore;
use std::path::PathBuf;

pub fn store_ref<'a>(state: &'a AppState, req: &Request) -> Result<&'a GradeStore, serde_json::Value> {
    state
        .store
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn required_path(req: &Request, key: &str) -> Result<PathBuf, serde_json::Value> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(PathBuf::from(v.trim())),
        _ => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    }
}

/// Explicit `workspacePath` param, falling back to the selected workspace.
pub fn workspace_path(state: &AppState, req: &Request) -> Result<PathBuf, serde_json::Value> {
    req.params
        .get("workspacePath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .or_else(|| state.workspace.clone())
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}
