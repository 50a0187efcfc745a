use std::path::PathBuf;

use crate::store::GradeStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<GradeStore>,
}

impl AppState {
    /// Releases the open store, if any. Close errors are logged: the
    /// connection is gone either way.
    pub fn close_store(&mut self) {
        if let Some(store) = self.store.take() {
            if let Err(e) = store.close() {
                tracing::warn!(error = %e, "failed to close grade store cleanly");
            }
        }
    }
}
