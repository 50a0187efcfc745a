use crate::form::{EntryRow, GradeForm, GradeInput};
use crate::ipc::error::{err, grade_err, ok};
use crate::ipc::helpers::store_ref;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn parse_grade_input(v: Option<&serde_json::Value>) -> GradeInput {
    match v {
        Some(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(f) => GradeInput::Number(f),
            None => GradeInput::Text(n.to_string()),
        },
        Some(serde_json::Value::String(s)) => GradeInput::Text(s.clone()),
        // Anything else cannot parse as a grade; validation reports it.
        _ => GradeInput::Text(String::new()),
    }
}

fn str_param(v: &serde_json::Value, key: &str) -> String {
    v.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn entry_row(v: &serde_json::Value) -> EntryRow {
    EntryRow {
        subject: str_param(v, "subject"),
        grade: parse_grade_input(v.get("grade")),
    }
}

fn submit(state: &AppState, req: &Request, form: GradeForm) -> Result<Vec<i64>, serde_json::Value> {
    let store = store_ref(state, req)?;
    form.submit(store).map_err(|e| grade_err(&req.id, &e))
}

fn handle_grades_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let form = GradeForm {
        name: str_param(&req.params, "name"),
        rows: vec![entry_row(&req.params)],
    };
    match submit(state, req, form) {
        Ok(ids) => ok(&req.id, json!({ "id": ids.first() })),
        Err(resp) => resp,
    }
}

fn handle_grades_add_many(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(entries) = req.params.get("entries").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing entries", None);
    };
    let form = GradeForm {
        name: str_param(&req.params, "name"),
        rows: entries.iter().map(entry_row).collect(),
    };
    match submit(state, req, form) {
        Ok(ids) => ok(&req.id, json!({ "ids": ids, "added": ids.len() })),
        Err(resp) => resp,
    }
}

fn handle_grades_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.all_grades() {
        Ok(grades) => ok(&req.id, json!({ "grades": grades })),
        Err(e) => grade_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.add" => Some(handle_grades_add(state, req)),
        "grades.addMany" => Some(handle_grades_add_many(state, req)),
        "grades.list" => Some(handle_grades_list(state, req)),
        _ => None,
    }
}
