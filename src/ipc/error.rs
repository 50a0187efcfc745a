use crate::error::GradeError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Reply for a line that did not parse as a request, so there is no id.
pub fn bad_json(message: impl Into<String>) -> serde_json::Value {
    json!({
        "ok": false,
        "error": {
            "code": "bad_json",
            "message": message.into(),
        }
    })
}

pub fn grade_err(id: &str, e: &GradeError) -> serde_json::Value {
    tracing::warn!(code = e.code(), error = %e, "request failed");
    let details = match e {
        GradeError::StorageUnavailable { path, .. } => {
            Some(json!({ "path": path.to_string_lossy() }))
        }
        _ => None,
    };
    err(id, e.code(), e.to_string(), details)
}
