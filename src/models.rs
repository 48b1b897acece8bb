use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GradingError, GradingResult};
use crate::grading;
use crate::policy::WeightPolicy;

/// One enrollment row as handed over by the CSV reader or the database.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradeRow {
    pub student_id: i32,
    pub student_name: String,
    pub course_name: String,
    pub credit_hours: u32,
    pub instructor_name: Option<String>,
    pub assignment_weight: i32,
    pub quiz_weight: i32,
    pub exam_weight: i32,
    pub assignment_score: Option<i32>,
    pub quiz_score: Option<i32>,
    pub exam_score: Option<i32>,
}

/// Raw component scores. `None` means "not entered", which is not the same as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSet {
    pub assignment: Option<i32>,
    pub quiz: Option<i32>,
    pub exam: Option<i32>,
}

impl ScoreSet {
    pub fn new(
        assignment: Option<i32>,
        quiz: Option<i32>,
        exam: Option<i32>,
    ) -> GradingResult<Self> {
        for (component, value) in [("assignment", assignment), ("quiz", quiz), ("exam", exam)] {
            if let Some(value) = value {
                if !(0..=100).contains(&value) {
                    return Err(GradingError::InvalidScore { component, value });
                }
            }
        }

        Ok(Self {
            assignment,
            quiz,
            exam,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.assignment.is_some() && self.quiz.is_some() && self.exam.is_some()
    }

    /// Passing needs every component entered and at least 50.
    pub fn passes(&self) -> bool {
        [self.assignment, self.quiz, self.exam]
            .iter()
            .all(|score| matches!(score, Some(value) if *value >= grading::PASS_MARK))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "D+")]
    DPlus,
    D,
    F,
}

impl LetterGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalGrade {
    pub percentage: f64,
    pub letter: LetterGrade,
    pub grade_point: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseResult {
    pub student_id: i32,
    pub student_name: String,
    pub course_name: String,
    pub instructor_name: Option<String>,
    pub credit_hours: u32,
    policy: WeightPolicy,
    scores: ScoreSet,
    grade: FinalGrade,
}

impl CourseResult {
    pub fn new(
        student_id: i32,
        student_name: impl Into<String>,
        course_name: impl Into<String>,
        instructor_name: Option<String>,
        credit_hours: u32,
        policy: WeightPolicy,
        scores: ScoreSet,
    ) -> Self {
        Self {
            student_id,
            student_name: student_name.into(),
            course_name: course_name.into(),
            instructor_name,
            credit_hours,
            policy,
            scores,
            grade: grading::final_grade(&scores, &policy),
        }
    }

    pub fn from_row(row: GradeRow) -> GradingResult<Self> {
        let policy = WeightPolicy::new(row.assignment_weight, row.quiz_weight, row.exam_weight)?;
        let scores = ScoreSet::new(row.assignment_score, row.quiz_score, row.exam_score)?;

        Ok(Self::new(
            row.student_id,
            row.student_name,
            row.course_name,
            row.instructor_name.filter(|name| !name.trim().is_empty()),
            row.credit_hours,
            policy,
            scores,
        ))
    }

    pub fn policy(&self) -> &WeightPolicy {
        &self.policy
    }

    pub fn scores(&self) -> &ScoreSet {
        &self.scores
    }

    /// Fixed at construction; scores and policy cannot change afterwards.
    pub fn grade(&self) -> &FinalGrade {
        &self.grade
    }

    pub fn instructor_label(&self) -> &str {
        self.instructor_name.as_deref().unwrap_or(UNASSIGNED_INSTRUCTOR)
    }
}

pub const UNASSIGNED_INSTRUCTOR: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub course_name: String,
    pub sections: usize,
    pub total_students: usize,
    pub avg_assignment: f64,
    pub avg_quiz: f64,
    pub avg_exam: f64,
    pub avg_final_grade: f64,
    pub total_passed: usize,
    pub total_failed: usize,
}

impl CourseSummary {
    pub fn is_empty(&self) -> bool {
        self.total_students == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructorPerformance {
    pub course_name: String,
    pub instructor_name: String,
    pub avg_assignment: f64,
    pub avg_quiz: f64,
    pub avg_exam: f64,
    pub avg_final_grade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub result: CourseResult,
    pub quality_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub student_id: i32,
    pub student_name: String,
    pub entries: Vec<TranscriptEntry>,
    pub total_courses: usize,
    pub total_credit_hours: u32,
    pub total_quality_points: f64,
    pub gpa: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> GradeRow {
        GradeRow {
            student_id: 7,
            student_name: "Avery Lee".to_string(),
            course_name: "Physics".to_string(),
            credit_hours: 3,
            instructor_name: Some("  ".to_string()),
            assignment_weight: 30,
            quiz_weight: 20,
            exam_weight: 50,
            assignment_score: Some(80),
            quiz_score: Some(90),
            exam_score: None,
        }
    }

    #[test]
    fn score_set_rejects_out_of_range_values() {
        assert_eq!(
            ScoreSet::new(Some(101), Some(50), Some(50)),
            Err(GradingError::InvalidScore {
                component: "assignment",
                value: 101
            })
        );
        assert!(ScoreSet::new(Some(50), Some(-1), None).is_err());
        assert!(ScoreSet::new(None, None, None).is_ok());
    }

    #[test]
    fn pass_requires_every_component_at_fifty() {
        assert!(ScoreSet::new(Some(50), Some(50), Some(50)).unwrap().passes());
        assert!(!ScoreSet::new(Some(49), Some(100), Some(100)).unwrap().passes());
        assert!(!ScoreSet::new(Some(90), None, Some(90)).unwrap().passes());
    }

    #[test]
    fn from_row_validates_and_computes_grade() {
        let result = CourseResult::from_row(row()).unwrap();
        assert!((result.grade().percentage - 42.0).abs() < 1e-9);
        assert_eq!(result.grade().letter, LetterGrade::F);
        assert_eq!(result.instructor_label(), UNASSIGNED_INSTRUCTOR);
        assert!(!result.scores().is_complete());
    }

    #[test]
    fn grade_agrees_with_scores_and_policy() {
        let result = CourseResult::from_row(GradeRow {
            exam_score: Some(60),
            ..row()
        })
        .unwrap();
        assert_eq!(
            *result.grade(),
            grading::final_grade(result.scores(), result.policy())
        );
        assert_eq!(result.grade().percentage, 72.0);
    }

    #[test]
    fn from_row_surfaces_bad_weights() {
        let mut bad = row();
        bad.exam_weight = 10;
        assert!(matches!(
            CourseResult::from_row(bad),
            Err(GradingError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn letter_display_honours_padding() {
        assert_eq!(format!("{:<4}|", LetterGrade::BPlus), "B+  |");
    }
}
