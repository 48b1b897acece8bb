use std::collections::HashSet;

use tracing::debug;

use crate::error::{GradingError, GradingResult};
use crate::grading;
use crate::models::{CourseResult, CourseSummary, InstructorPerformance};

#[derive(Debug, Default)]
struct Averages {
    assignment: (i64, usize),
    quiz: (i64, usize),
    exam: (i64, usize),
    final_grade: (i64, usize),
}

impl Averages {
    fn add(&mut self, result: &CourseResult) {
        for (slot, score) in [
            (&mut self.assignment, result.scores().assignment),
            (&mut self.quiz, result.scores().quiz),
            (&mut self.exam, result.scores().exam),
        ] {
            if let Some(value) = score {
                slot.0 += i64::from(value);
                slot.1 += 1;
            }
        }

        // A row with a missing component has no weighted average to contribute.
        if result.scores().is_complete() {
            self.final_grade.0 += grading::weighted_hundredths(result.scores(), result.policy());
            self.final_grade.1 += 1;
        }
    }

    fn mean(total: i64, count: usize) -> f64 {
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    fn assignment(&self) -> f64 {
        Self::mean(self.assignment.0, self.assignment.1)
    }

    fn quiz(&self) -> f64 {
        Self::mean(self.quiz.0, self.quiz.1)
    }

    fn exam(&self) -> f64 {
        Self::mean(self.exam.0, self.exam.1)
    }

    fn final_grade(&self) -> f64 {
        grading::mean_of_hundredths(self.final_grade.0, self.final_grade.1)
    }
}

/// Summarizes every result for one course. `sections` comes from outside the
/// grade rows (the number of teaching assignments on record).
pub fn summarize_course(course_name: &str, sections: usize, results: &[CourseResult]) -> CourseSummary {
    let mut averages = Averages::default();
    let mut students = HashSet::new();
    let mut total_passed = 0usize;
    let mut total_failed = 0usize;

    for result in results {
        students.insert(result.student_id);
        averages.add(result);

        if result.scores().passes() {
            total_passed += 1;
        } else {
            total_failed += 1;
        }
    }

    debug!(
        course = course_name,
        rows = results.len(),
        total_passed,
        total_failed,
        "summarized course"
    );

    CourseSummary {
        course_name: course_name.to_string(),
        sections,
        total_students: students.len(),
        avg_assignment: averages.assignment(),
        avg_quiz: averages.quiz(),
        avg_exam: averages.exam(),
        avg_final_grade: averages.final_grade(),
        total_passed,
        total_failed,
    }
}

/// Per-instructor averages in the order each instructor first appears.
pub fn performance_by_instructor(course_name: &str, results: &[CourseResult]) -> Vec<InstructorPerformance> {
    let mut groups: Vec<(String, Averages)> = Vec::new();

    for result in results {
        let instructor = result.instructor_label();
        let index = match groups.iter().position(|(name, _)| name == instructor) {
            Some(index) => index,
            None => {
                groups.push((instructor.to_string(), Averages::default()));
                groups.len() - 1
            }
        };
        groups[index].1.add(result);
    }

    groups
        .into_iter()
        .map(|(instructor_name, averages)| InstructorPerformance {
            course_name: course_name.to_string(),
            instructor_name,
            avg_assignment: averages.assignment(),
            avg_quiz: averages.quiz(),
            avg_exam: averages.exam(),
            avg_final_grade: averages.final_grade(),
        })
        .collect()
}

/// Summary and instructor breakdown for one course, or `EmptyInput` when the
/// course has no grade rows.
pub fn course_statistics(
    course_name: &str,
    sections: usize,
    results: &[CourseResult],
) -> GradingResult<(CourseSummary, Vec<InstructorPerformance>)> {
    let summary = summarize_course(course_name, sections, results);
    if summary.is_empty() {
        return Err(GradingError::EmptyInput(format!("course {course_name}")));
    }
    Ok((summary, performance_by_instructor(course_name, results)))
}
