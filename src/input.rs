use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use crate::models::{CourseResult, GradeRow};

pub fn read_rows<R: Read>(reader: R) -> anyhow::Result<Vec<GradeRow>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in reader.deserialize::<GradeRow>().enumerate() {
        // Header is line 1.
        let row = record.with_context(|| format!("malformed grade row on line {}", index + 2))?;
        rows.push(row);
    }

    debug!(rows = rows.len(), "read grade rows");
    Ok(rows)
}

pub fn read_rows_from_path(path: &Path) -> anyhow::Result<Vec<GradeRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_rows(file)
}

/// Validates every row; the first row with bad weights or scores aborts the load.
pub fn into_results(rows: Vec<GradeRow>) -> anyhow::Result<Vec<CourseResult>> {
    rows.into_iter()
        .map(|row| {
            let label = format!("student {} in {}", row.student_id, row.course_name);
            CourseResult::from_row(row).map_err(|err| {
                warn!(%err, row = %label, "rejected grade row");
                anyhow::Error::new(err).context(format!("invalid grade row for {label}"))
            })
        })
        .collect()
}

pub fn for_course(rows: Vec<GradeRow>, course_name: &str) -> Vec<GradeRow> {
    rows.into_iter()
        .filter(|row| row.course_name == course_name)
        .collect()
}

pub fn for_student(rows: Vec<GradeRow>, student_id: i32) -> Vec<GradeRow> {
    rows.into_iter()
        .filter(|row| row.student_id == student_id)
        .collect()
}
