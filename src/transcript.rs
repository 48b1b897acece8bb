use tracing::debug;

use crate::error::{GradingError, GradingResult};
use crate::models::{CourseResult, Transcript, TranscriptEntry};

/// Accumulates one student's course results in the order they are supplied.
#[derive(Debug)]
pub struct TranscriptBuilder {
    student_id: i32,
    student_name: String,
    entries: Vec<TranscriptEntry>,
    total_credit_hours: u32,
    total_quality_points: f64,
}

impl TranscriptBuilder {
    pub fn new(student_id: i32, student_name: impl Into<String>) -> Self {
        Self {
            student_id,
            student_name: student_name.into(),
            entries: Vec::new(),
            total_credit_hours: 0,
            total_quality_points: 0.0,
        }
    }

    pub fn push(&mut self, result: CourseResult) -> &mut Self {
        let quality_points = result.grade().grade_point * f64::from(result.credit_hours);
        self.total_credit_hours += result.credit_hours;
        self.total_quality_points += quality_points;
        self.entries.push(TranscriptEntry {
            result,
            quality_points,
        });
        self
    }

    pub fn build(self) -> Transcript {
        let gpa = if self.total_credit_hours > 0 {
            self.total_quality_points / f64::from(self.total_credit_hours)
        } else {
            0.0
        };

        debug!(
            student_id = self.student_id,
            courses = self.entries.len(),
            credits = self.total_credit_hours,
            gpa,
            "built transcript"
        );

        Transcript {
            student_id: self.student_id,
            student_name: self.student_name,
            total_courses: self.entries.len(),
            entries: self.entries,
            total_credit_hours: self.total_credit_hours,
            total_quality_points: self.total_quality_points,
            gpa,
        }
    }
}

/// Builds a transcript from rows already filtered to one student.
pub fn build_transcript(student_id: i32, results: Vec<CourseResult>) -> GradingResult<Transcript> {
    let student_name = match results.first() {
        Some(first) => first.student_name.clone(),
        None => return Err(GradingError::EmptyInput(format!("student {student_id}"))),
    };

    let mut builder = TranscriptBuilder::new(student_id, student_name);
    for result in results {
        builder.push(result);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreSet;
    use crate::policy::WeightPolicy;

    fn course(name: &str, credit_hours: u32, score: i32) -> CourseResult {
        CourseResult::new(
            11,
            "Jules Moreno",
            name,
            Some("Dr. Patel".to_string()),
            credit_hours,
            WeightPolicy::new(100, 0, 0).unwrap(),
            ScoreSet::new(Some(score), Some(0), Some(0)).unwrap(),
        )
    }

    #[test]
    fn gpa_weights_grade_points_by_credit_hours() {
        let transcript =
            build_transcript(11, vec![course("Algebra", 3, 92), course("Biology", 4, 58)]).unwrap();

        assert_eq!(transcript.entries[0].result.grade().grade_point, 4.51);
        assert_eq!(transcript.entries[1].result.grade().grade_point, 0.0);
        assert_eq!(transcript.total_credit_hours, 7);
        assert_eq!(transcript.total_courses, 2);
        assert!((transcript.gpa - (4.51 * 3.0) / 7.0).abs() < 1e-9);
        assert!((transcript.gpa - 1.933).abs() < 0.001);
    }

    #[test]
    fn zero_credit_hours_do_not_divide() {
        let transcript = build_transcript(11, vec![course("Seminar", 0, 99)]).unwrap();
        assert_eq!(transcript.gpa, 0.0);
        assert_eq!(transcript.total_courses, 1);
        assert_eq!(transcript.entries[0].quality_points, 0.0);
    }

    #[test]
    fn entries_keep_supply_order() {
        let transcript = build_transcript(
            11,
            vec![course("Zoology", 3, 70), course("Art", 2, 95), course("Music", 1, 80)],
        )
        .unwrap();

        let names: Vec<&str> = transcript
            .entries
            .iter()
            .map(|entry| entry.result.course_name.as_str())
            .collect();
        assert_eq!(names, ["Zoology", "Art", "Music"]);
    }

    #[test]
    fn no_rows_is_an_empty_input_error() {
        assert_eq!(
            build_transcript(11, Vec::new()),
            Err(GradingError::EmptyInput("student 11".to_string()))
        );
    }

    #[test]
    fn builder_without_entries_reports_zero_gpa() {
        let transcript = TranscriptBuilder::new(3, "Kiara Patel").build();
        assert_eq!(transcript.gpa, 0.0);
        assert!(transcript.entries.is_empty());
    }
}
