use crate::calc;
use crate::ipc::error::{grade_err, ok};
use crate::ipc::helpers::store_ref;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_report_build(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let summaries = match store.student_summaries() {
        Ok(v) => v,
        Err(e) => return grade_err(&req.id, &e),
    };
    let text = calc::render_report(&summaries);
    ok(
        &req.id,
        json!({
            "text": text,
            "empty": text.is_empty(),
            "studentCount": summaries.len(),
        }),
    )
}

fn handle_report_students(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.student_summaries() {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => grade_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "report.build" => Some(handle_report_build(state, req)),
        "report.students" => Some(handle_report_students(state, req)),
        _ => None,
    }
}
