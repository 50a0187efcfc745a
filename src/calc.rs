use crate::store::GradeRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const REPORT_SEPARATOR: &str = "------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds are inclusive: exactly 80 is a B. NaN falls through to F.
pub fn letter_grade(average: f64) -> LetterGrade {
    if average >= 90.0 {
        LetterGrade::A
    } else if average >= 80.0 {
        LetterGrade::B
    } else if average >= 70.0 {
        LetterGrade::C
    } else if average >= 60.0 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

pub fn grade_points(average: f64) -> f64 {
    match letter_grade(average) {
        LetterGrade::A => 4.0,
        LetterGrade::B => 3.0,
        LetterGrade::C => 2.0,
        LetterGrade::D => 1.0,
        LetterGrade::F => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGrade {
    pub subject: String,
    pub grade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub name: String,
    /// Distinct subjects in first-seen order, each holding the last grade
    /// written for it.
    pub subjects: Vec<SubjectGrade>,
    /// Every stored record for this name, duplicates included.
    pub record_count: usize,
    pub average: f64,
    pub letter_grade: LetterGrade,
    pub grade_points: f64,
}

struct StudentAccumulator<'a> {
    name: &'a str,
    subjects: Vec<SubjectGrade>,
    sum: f64,
    count: usize,
}

/// Groups records by exact student name.
///
/// The subject list shown per student is deduplicated (a repeated subject
/// keeps its first position but takes the latest grade), while the average
/// is taken over every raw record for the name. The two views intentionally
/// disagree when a subject was entered more than once.
pub fn summarize(records: &[GradeRecord]) -> Vec<StudentSummary> {
    let mut order: Vec<StudentAccumulator<'_>> = Vec::new();
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();

    for r in records {
        let idx = *index_by_name.entry(r.name.as_str()).or_insert_with(|| {
            order.push(StudentAccumulator {
                name: r.name.as_str(),
                subjects: Vec::new(),
                sum: 0.0,
                count: 0,
            });
            order.len() - 1
        });
        let acc = &mut order[idx];
        acc.sum += r.grade;
        acc.count += 1;
        match acc.subjects.iter_mut().find(|s| s.subject == r.subject) {
            Some(existing) => existing.grade = r.grade,
            None => acc.subjects.push(SubjectGrade {
                subject: r.subject.clone(),
                grade: r.grade,
            }),
        }
    }

    order
        .into_iter()
        .map(|acc| {
            // Grouping guarantees count >= 1.
            let average = acc.sum / (acc.count as f64);
            StudentSummary {
                name: acc.name.to_string(),
                subjects: acc.subjects,
                record_count: acc.count,
                average,
                letter_grade: letter_grade(average),
                grade_points: grade_points(average),
            }
        })
        .collect()
}

/// Formats a stored grade the way the report has always shown it: the
/// shortest digits that round-trip, whole numbers with a trailing `.0`, and
/// exponent form (`1e+16`, `1.5e-05`) once the decimal exponent is at least
/// 16 or below -4.
pub fn format_stored_grade(grade: f64) -> String {
    if grade.is_nan() {
        return "nan".to_string();
    }
    if grade.is_infinite() {
        return if grade > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", grade);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else if grade.fract() == 0.0 {
        format!("{:.1}", grade)
    } else {
        grade.to_string()
    }
}

pub fn render_student(out: &mut String, s: &StudentSummary) {
    out.push_str(&format!("Student: {}\n", s.name));
    for sg in &s.subjects {
        out.push_str(&format!("{}: {}\n", sg.subject, format_stored_grade(sg.grade)));
    }
    out.push_str(&format!("Average: {:.2}\n", s.average));
    out.push_str(&format!("Letter Grade: {}\n", s.letter_grade));
    out.push_str(&format!("CGPA: {:.2}\n", s.grade_points));
    out.push_str(REPORT_SEPARATOR);
    out.push('\n');
}

pub fn render_report(summaries: &[StudentSummary]) -> String {
    let mut out = String::new();
    for s in summaries {
        render_student(&mut out, s);
    }
    out
}

pub fn build_report(records: &[GradeRecord]) -> String {
    render_report(&summarize(records))
}
