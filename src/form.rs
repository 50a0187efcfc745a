use crate::error::{GradeError, GradeResult};
use crate::store::GradeStore;

pub const INVALID_GRADES_MESSAGE: &str = "Please enter valid grades.";
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill all fields.";
pub const NO_ENTRIES_MESSAGE: &str = "Please add at least one subject.";

#[derive(Debug, Clone, PartialEq)]
pub enum GradeInput {
    Number(f64),
    Text(String),
}

impl GradeInput {
    fn parse(&self) -> Option<f64> {
        match self {
            GradeInput::Number(v) => Some(*v),
            GradeInput::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryRow {
    pub subject: String,
    pub grade: GradeInput,
}

/// One submission of the add-grade screen: a student name and its
/// subject/grade rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeForm {
    pub name: String,
    pub rows: Vec<EntryRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGrade {
    pub name: String,
    pub subject: String,
    pub grade: f64,
}

impl GradeForm {
    /// Grade parsing is checked across all rows before the required fields,
    /// so a bad number is reported even when a field is also blank.
    pub fn validate(&self) -> GradeResult<Vec<NewGrade>> {
        if self.rows.is_empty() {
            return Err(GradeError::validation(NO_ENTRIES_MESSAGE));
        }

        let mut grades = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            // SQLite stores NaN as NULL, which the NOT NULL column rejects.
            match row.grade.parse() {
                Some(v) if !v.is_nan() => grades.push(v),
                _ => return Err(GradeError::validation(INVALID_GRADES_MESSAGE)),
            }
        }

        if self.name.is_empty() || self.rows.iter().any(|r| r.subject.is_empty()) {
            return Err(GradeError::validation(MISSING_FIELDS_MESSAGE));
        }

        Ok(self
            .rows
            .iter()
            .zip(grades)
            .map(|(row, grade)| NewGrade {
                name: self.name.clone(),
                subject: row.subject.clone(),
                grade,
            })
            .collect())
    }

    /// Validates, then inserts each row with its own commit.
    pub fn submit(&self, store: &GradeStore) -> GradeResult<Vec<i64>> {
        let new_grades = self.validate()?;
        let mut ids = Vec::with_capacity(new_grades.len());
        for g in &new_grades {
            ids.push(store.add_grade(&g.name, &g.subject, g.grade)?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subject: &str, grade: &str) -> EntryRow {
        EntryRow {
            subject: subject.to_string(),
            grade: GradeInput::Text(grade.to_string()),
        }
    }

    fn validation_message(res: GradeResult<Vec<NewGrade>>) -> String {
        match res {
            Err(GradeError::Validation(m)) => m,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_three_major_rows() {
        let form = GradeForm {
            name: "Alice".into(),
            rows: vec![row("Math", "95"), row("Science", " 85.5 "), row("Art", "-1e1")],
        };
        let out = form.validate().expect("valid form");
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].subject, "Science");
        assert_eq!(out[1].grade, 85.5);
        assert_eq!(out[2].grade, -10.0);
        assert!(out.iter().all(|g| g.name == "Alice"));
    }

    #[test]
    fn non_numeric_grade_is_rejected_before_blank_fields() {
        let form = GradeForm {
            name: String::new(),
            rows: vec![row("", "ninety"), row("Math", "90")],
        };
        assert_eq!(validation_message(form.validate()), INVALID_GRADES_MESSAGE);
    }

    #[test]
    fn blank_name_or_subject_is_rejected() {
        let blank_name = GradeForm {
            name: String::new(),
            rows: vec![row("Math", "90")],
        };
        assert_eq!(validation_message(blank_name.validate()), MISSING_FIELDS_MESSAGE);

        let blank_subject = GradeForm {
            name: "Bob".into(),
            rows: vec![row("Math", "90"), row("", "70")],
        };
        assert_eq!(
            validation_message(blank_subject.validate()),
            MISSING_FIELDS_MESSAGE
        );
    }

    #[test]
    fn empty_and_nan_grades_are_invalid() {
        let empty = GradeForm {
            name: "Bob".into(),
            rows: vec![row("Math", "")],
        };
        assert_eq!(validation_message(empty.validate()), INVALID_GRADES_MESSAGE);

        let nan = GradeForm {
            name: "Bob".into(),
            rows: vec![row("Math", "NaN")],
        };
        assert_eq!(validation_message(nan.validate()), INVALID_GRADES_MESSAGE);
    }

    #[test]
    fn no_rows_is_rejected() {
        let form = GradeForm {
            name: "Bob".into(),
            rows: vec![],
        };
        assert_eq!(validation_message(form.validate()), NO_ENTRIES_MESSAGE);
    }

    #[test]
    fn submit_writes_every_row() {
        let store = GradeStore::open_in_memory().expect("store");
        let form = GradeForm {
            name: "Dana".into(),
            rows: vec![row("Math", "80"), row("Math", "60")],
        };
        let ids = form.submit(&store).expect("submit");
        assert_eq!(ids.len(), 2);
        assert!(ids[0] < ids[1]);
        let report = store.build_report().expect("report");
        assert!(report.contains("Math: 60.0\n"));
        assert!(report.contains("Average: 70.00\n"));
    }
}
