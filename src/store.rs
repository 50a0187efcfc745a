use crate::calc::{self, StudentSummary};
use crate::db;
use crate::error::{GradeError, GradeResult};
use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub grade: f64,
}

/// Append-only grade table inside a workspace directory.
///
/// The connection is held for the lifetime of the store. Call [`close`]
/// to release it and observe close errors; dropping the store releases it
/// as well.
///
/// [`close`]: GradeStore::close
pub struct GradeStore {
    path: PathBuf,
    conn: Connection,
}

impl GradeStore {
    pub fn open(workspace: &Path) -> GradeResult<Self> {
        let path = db::db_path(workspace);
        let conn =
            db::open_db(workspace).map_err(|e| GradeError::unavailable(path.clone(), e))?;
        tracing::info!(path = %path.display(), "grade store opened");
        Ok(Self { path, conn })
    }

    /// In-memory store, used by tests and previews.
    pub fn open_in_memory() -> GradeResult<Self> {
        let path = PathBuf::from(":memory:");
        let conn =
            Connection::open_in_memory().map_err(|e| GradeError::unavailable(path.clone(), e))?;
        let store = Self { path, conn };
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn initialize(&self) -> GradeResult<()> {
        db::ensure_schema(&self.conn).map_err(|e| GradeError::unavailable(self.path.clone(), e))
    }

    /// Inserts one record and returns its id. The insert is committed before
    /// returning. Callers are expected to have validated the fields.
    pub fn add_grade(&self, name: &str, subject: &str, grade: f64) -> GradeResult<i64> {
        self.conn
            .execute(
                "INSERT INTO grades(name, subject, grade) VALUES(?, ?, ?)",
                (name, subject, grade),
            )
            .map_err(GradeError::Persistence)?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, student = name, subject, grade, "grade added");
        Ok(id)
    }

    pub fn all_grades(&self) -> GradeResult<Vec<GradeRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, subject, grade FROM grades ORDER BY id")
            .map_err(|e| GradeError::unavailable(self.path.clone(), e))?;
        let rows = stmt
            .query_map([], |r| {
                Ok(GradeRecord {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    subject: r.get(2)?,
                    grade: r.get(3)?,
                })
            })
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(|e| GradeError::unavailable(self.path.clone(), e))?;
        Ok(rows)
    }

    pub fn record_count(&self) -> GradeResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM grades", [], |r| r.get(0))
            .map_err(|e| GradeError::unavailable(self.path.clone(), e))
    }

    pub fn student_summaries(&self) -> GradeResult<Vec<StudentSummary>> {
        let records = self.all_grades()?;
        Ok(calc::summarize(&records))
    }

    pub fn build_report(&self) -> GradeResult<String> {
        let summaries = self.student_summaries()?;
        tracing::debug!(students = summaries.len(), "report built");
        Ok(calc::render_report(&summaries))
    }

    /// Borrow the raw connection, e.g. to checkpoint before copying the file.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) -> GradeResult<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, e)| GradeError::unavailable(path.clone(), e))?;
        tracing::info!(path = %path.display(), "grade store closed");
        Ok(())
    }
}
