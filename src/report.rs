use std::fmt::Write;

use chrono::NaiveDate;
use clap::ValueEnum;

use crate::error::GradingResult;
use crate::grading;
use crate::models::{CourseResult, CourseSummary, InstructorPerformance, Transcript};
use crate::stats;

const RULE_WIDTH: usize = 56;
const MISSING_SCORE: &str = "-";

/// How the gradebook shows each student's final grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GradingScale {
    Percentage,
    Letter,
}

fn rule(output: &mut String) {
    let _ = writeln!(output, "{}", "-".repeat(RULE_WIDTH));
}

fn title(output: &mut String, text: &str) {
    let pad = RULE_WIDTH.saturating_sub(text.chars().count()) / 2;
    rule(output);
    let _ = writeln!(output, "{}{}", " ".repeat(pad), text);
    rule(output);
}

fn date_of_issue(output: &mut String, issued_on: NaiveDate) {
    rule(output);
    let _ = writeln!(output, "Date of Issue: {}", issued_on.format("%Y-%m-%d"));
}

fn score_cell(score: Option<i32>) -> String {
    score.map_or_else(|| MISSING_SCORE.to_string(), |value| value.to_string())
}

pub fn build_course_report(
    summary: &CourseSummary,
    performance: &[InstructorPerformance],
    issued_on: NaiveDate,
) -> String {
    let mut output = String::new();

    title(&mut output, "COURSE PERFORMANCE REPORT");
    let _ = writeln!(output, "Course Name: {}", summary.course_name);
    let _ = writeln!(output, "Number of Sections: {}", summary.sections);
    let _ = writeln!(output, "Total Students: {}", summary.total_students);
    let _ = writeln!(output);

    rule(&mut output);
    let _ = writeln!(output, "Overall Statistics:");
    let _ = writeln!(output, "• Average Assignment Score: {:.2}%", summary.avg_assignment);
    let _ = writeln!(output, "• Average Quiz Score: {:.2}%", summary.avg_quiz);
    let _ = writeln!(output, "• Average Exam Score: {:.2}%", summary.avg_exam);
    let _ = writeln!(
        output,
        "• Overall Average Final Grade: {:.2}%",
        summary.avg_final_grade
    );
    let _ = writeln!(
        output,
        "• Pass/Fail Ratio: {} Passed / {} Failed",
        summary.total_passed, summary.total_failed
    );
    let _ = writeln!(output);

    rule(&mut output);
    let _ = writeln!(output, "Class-Level Performance:");
    rule(&mut output);
    let _ = writeln!(
        output,
        "| Course Name  | Instructor   | Avg Assignment | Avg Quiz | Avg Exam | Final Grade |"
    );
    let _ = writeln!(
        output,
        "|--------------|--------------|----------------|----------|----------|-------------|"
    );
    for row in performance {
        let _ = writeln!(
            output,
            "| {:<12} | {:<12} | {:<14.2} | {:<8.2} | {:<8.2} | {:<11.2} |",
            row.course_name,
            row.instructor_name,
            row.avg_assignment,
            row.avg_quiz,
            row.avg_exam,
            row.avg_final_grade
        );
    }

    date_of_issue(&mut output, issued_on);
    output
}

pub fn build_transcript_report(transcript: &Transcript, issued_on: NaiveDate) -> String {
    let mut output = String::new();

    title(&mut output, "STUDENT TRANSCRIPT");
    let _ = writeln!(output, "Student ID: {}", transcript.student_id);
    let _ = writeln!(output, "Student Name: {}", transcript.student_name);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "| Course Name   | Credit Hours | Instructor   | Assignment | Quiz | Exam | Final Grade |"
    );
    rule(&mut output);

    for entry in &transcript.entries {
        let result = &entry.result;
        let _ = writeln!(
            output,
            "| {:<13} | {:<12} | {:<12} | {:<10} | {:<4} | {:<4} | {:<11} |",
            result.course_name,
            result.credit_hours,
            result.instructor_label(),
            score_cell(result.scores().assignment),
            score_cell(result.scores().quiz),
            score_cell(result.scores().exam),
            result.grade().letter
        );
    }

    rule(&mut output);
    let _ = writeln!(output, "Academic Summary:");
    let _ = writeln!(output, "• Total Courses: {}", transcript.total_courses);
    let _ = writeln!(output, "• GPA: {:.2}", transcript.gpa);
    let _ = writeln!(output, "• Total Credits: {}", transcript.total_credit_hours);
    let _ = writeln!(output, "• Status: Active");
    date_of_issue(&mut output, issued_on);
    output
}

/// Runs statistics and formatting for one course; refuses to render a report
/// for a course with no grade rows.
pub fn course_report(
    course_name: &str,
    sections: usize,
    results: &[CourseResult],
    issued_on: NaiveDate,
) -> GradingResult<String> {
    let (summary, performance) = stats::course_statistics(course_name, sections, results)?;
    Ok(build_course_report(&summary, &performance, issued_on))
}

pub fn build_gradebook(course_name: &str, results: &[CourseResult], scale: GradingScale) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Gradebook: {course_name}");
    let _ = writeln!(
        output,
        "| Student ID | Student Name         | Assignment | Quiz | Exam | Final Grade |"
    );
    let _ = writeln!(
        output,
        "|------------|----------------------|------------|------|------|-------------|"
    );

    if results.is_empty() {
        let _ = writeln!(output, "No students enrolled in this course.");
        return output;
    }

    for result in results {
        let final_grade = match scale {
            GradingScale::Percentage => format!("{:.2}%", result.grade().percentage),
            GradingScale::Letter => result.grade().letter.to_string(),
        };
        let _ = writeln!(
            output,
            "| {:<10} | {:<20} | {:<10} | {:<4} | {:<4} | {:<11} |",
            result.student_id,
            result.student_name,
            score_cell(result.scores().assignment),
            score_cell(result.scores().quiz),
            score_cell(result.scores().exam),
            final_grade
        );
    }

    output
}

/// The student's own view: letters come from the truncated integer grade.
pub fn build_grade_sheet(results: &[CourseResult]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Your Courses and Grades:");
    if results.is_empty() {
        let _ = writeln!(output, "No courses found.");
        return output;
    }

    for result in results {
        let truncated = grading::truncated_final_grade(result.scores(), result.policy());
        let _ = writeln!(
            output,
            "- {}: assignment {}, quiz {}, exam {} -> {} ({})",
            result.course_name,
            score_cell(result.scores().assignment),
            score_cell(result.scores().quiz),
            score_cell(result.scores().exam),
            grading::letter_grade(f64::from(truncated)),
            truncated
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GradingError;
    use crate::models::ScoreSet;
    use crate::policy::WeightPolicy;
    use crate::transcript;

    fn issued_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn result(student_id: i32, course: &str, instructor: Option<&str>, scores: [Option<i32>; 3]) -> CourseResult {
        CourseResult::new(
            student_id,
            format!("Student {student_id}"),
            course,
            instructor.map(str::to_string),
            3,
            WeightPolicy::new(30, 20, 50).unwrap(),
            ScoreSet::new(scores[0], scores[1], scores[2]).unwrap(),
        )
    }

    fn physics() -> Vec<CourseResult> {
        vec![
            result(1, "Physics", Some("Dr. Okafor"), [Some(80), Some(90), Some(70)]),
            result(2, "Physics", Some("Dr. Okafor"), [Some(49), Some(100), Some(100)]),
        ]
    }

    #[test]
    fn course_report_matches_layout() {
        let report = course_report("Physics", 2, &physics(), issued_on()).unwrap();
        let rule = "-".repeat(56);
        let expected = format!(
            "{rule}\n               COURSE PERFORMANCE REPORT\n{rule}\n\
             Course Name: Physics\n\
             Number of Sections: 2\n\
             Total Students: 2\n\
             \n{rule}\n\
             Overall Statistics:\n\
             • Average Assignment Score: 64.50%\n\
             • Average Quiz Score: 95.00%\n\
             • Average Exam Score: 85.00%\n\
             • Overall Average Final Grade: 80.85%\n\
             • Pass/Fail Ratio: 1 Passed / 1 Failed\n\
             \n{rule}\n\
             Class-Level Performance:\n{rule}\n\
             | Course Name  | Instructor   | Avg Assignment | Avg Quiz | Avg Exam | Final Grade |\n\
             |--------------|--------------|----------------|----------|----------|-------------|\n\
             | Physics      | Dr. Okafor   | 64.50          | 95.00    | 85.00    | 80.85       |\n\
             {rule}\n\
             Date of Issue: 2026-03-14\n"
        );
        assert_eq!(report, expected);
    }

    #[test]
    fn formatting_is_repeatable_for_a_fixed_date() {
        let results = physics();
        let summary = stats::summarize_course("Physics", 2, &results);
        let performance = stats::performance_by_instructor("Physics", &results);
        assert_eq!(
            build_course_report(&summary, &performance, issued_on()),
            build_course_report(&summary, &performance, issued_on())
        );
    }

    #[test]
    fn empty_course_is_reported_as_empty_input() {
        assert_eq!(
            course_report("Physics", 1, &[], issued_on()),
            Err(GradingError::EmptyInput("course Physics".to_string()))
        );
    }

    #[test]
    fn transcript_report_lists_courses_and_summary() {
        let results = vec![
            result(5, "Physics", Some("Dr. Okafor"), [Some(95), Some(95), Some(95)]),
            result(5, "History", None, [Some(60), None, Some(40)]),
        ];
        let transcript = transcript::build_transcript(5, results).unwrap();
        let report = build_transcript_report(&transcript, issued_on());

        assert!(report.starts_with(&format!("{}\n                   STUDENT TRANSCRIPT\n", "-".repeat(56))));
        assert!(report.contains("Student ID: 5\n"));
        assert!(report.contains(
            "| Physics       | 3            | Dr. Okafor   | 95         | 95   | 95   | A+          |\n"
        ));
        assert!(report.contains(
            "| History       | 3            | Unassigned   | 60         | -    | 40   | F           |\n"
        ));
        assert!(report.contains("• Total Courses: 2\n"));
        assert!(report.contains("• GPA: 2.50\n"));
        assert!(report.contains("• Total Credits: 6\n"));
        assert!(report.ends_with("Date of Issue: 2026-03-14\n"));
    }

    #[test]
    fn gradebook_uses_selected_scale() {
        let results = physics();
        let by_percentage = build_gradebook("Physics", &results, GradingScale::Percentage);
        assert!(by_percentage.contains("| 1          | Student 1            | 80         | 90   | 70   | 77.00%      |"));

        let by_letter = build_gradebook("Physics", &results, GradingScale::Letter);
        assert!(by_letter.contains("| 2          | Student 2            | 49         | 100  | 100  | B           |"));
    }

    #[test]
    fn grade_sheet_letters_follow_truncated_grade() {
        // 89.9 truncates to 89, which is a B+ rather than an A
        let results = vec![CourseResult::new(
            9,
            "Student 9",
            "Statistics",
            None,
            3,
            WeightPolicy::new(10, 0, 90).unwrap(),
            ScoreSet::new(Some(89), Some(0), Some(90)).unwrap(),
        )];
        let sheet = build_grade_sheet(&results);
        assert!(sheet.contains("- Statistics: assignment 89, quiz 0, exam 90 -> B+ (89)"));
    }
}
