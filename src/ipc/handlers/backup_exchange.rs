use crate::backup;
use crate::ipc::error::{err, grade_err, ok};
use crate::ipc::helpers::{required_path, store_ref, workspace_path};
use crate::ipc::types::{AppState, Request};
use crate::store::{GradeRecord, GradeStore};
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn grades_csv(records: &[GradeRecord]) -> String {
    let mut csv = String::from("id,name,subject,grade\n");
    for r in records {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            r.id,
            csv_quote(&r.name),
            csv_quote(&r.subject),
            r.grade
        ));
    }
    csv
}

fn write_file(out: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    std::fs::write(out, contents)
        .with_context(|| format!("failed to write {}", out.to_string_lossy()))
}

fn handle_backup_export_workspace_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_path(req, "outPath") {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let workspace_path = match workspace_path(state, req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    if let Some(store) = state.store.as_ref() {
        let _ = store.connection().execute_batch("PRAGMA wal_checkpoint(FULL)");
    }

    let export = match backup::export_workspace_bundle(&workspace_path, &out_path) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path.to_string_lossy() })),
            )
        }
    };

    ok(
        &req.id,
        json!({
            "path": out_path.to_string_lossy(),
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "dbSha256": export.db_sha256,
        }),
    )
}

fn reopen(state: &mut AppState, workspace: PathBuf) {
    match GradeStore::open(&workspace) {
        Ok(store) => {
            state.workspace = Some(workspace);
            state.store = Some(store);
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to reopen grade store after rejected import");
        }
    }
}

fn handle_backup_import_workspace_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let src = match required_path(req, "inPath") {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let workspace_path = match workspace_path(state, req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": src.to_string_lossy() })),
        );
    }

    // Release the open handle before the database file is replaced.
    let had_store = state.store.is_some();
    state.close_store();
    let previous = state.workspace.take();

    let import = match backup::import_workspace_bundle(&src, &workspace_path) {
        Ok(v) => v,
        Err(e) => {
            // A rejected import leaves the database file alone, so the
            // session goes back to the store it had.
            match previous {
                Some(prev) if had_store => reopen(state, prev),
                prev => state.workspace = prev,
            }
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": src.to_string_lossy() })),
            );
        }
    };

    match GradeStore::open(&workspace_path) {
        Ok(store) => {
            state.workspace = Some(workspace_path.clone());
            state.store = Some(store);
            ok(
                &req.id,
                json!({
                    "workspacePath": workspace_path.to_string_lossy(),
                    "bundleFormatDetected": import.bundle_format_detected
                }),
            )
        }
        Err(e) => grade_err(&req.id, &e),
    }
}

fn handle_exchange_export_grades_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let out_path = match required_path(req, "outPath") {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let records = match store.all_grades() {
        Ok(v) => v,
        Err(e) => return grade_err(&req.id, &e),
    };

    if let Err(e) = write_file(&out_path, &grades_csv(&records)) {
        return err(
            &req.id,
            "io_failed",
            format!("{e:#}"),
            Some(json!({ "path": out_path.to_string_lossy() })),
        );
    }
    tracing::info!(rows = records.len(), out = %out_path.display(), "grades exported");

    ok(
        &req.id,
        json!({
            "path": out_path.to_string_lossy(),
            "rowsExported": records.len()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportWorkspaceBundle" => Some(handle_backup_export_workspace_bundle(state, req)),
        "backup.importWorkspaceBundle" => Some(handle_backup_import_workspace_bundle(state, req)),
        "exchange.exportGradesCsv" => Some(handle_exchange_export_grades_csv(state, req)),
        _ => None,
    }
}
