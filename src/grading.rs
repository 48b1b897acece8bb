use crate::models::{FinalGrade, LetterGrade, ScoreSet};
use crate::policy::WeightPolicy;

pub const PASS_MARK: i32 = 50;

/// Lower bounds checked top-down; the first bound the percentage reaches wins.
const LETTER_SCALE: [(f64, LetterGrade); 8] = [
    (95.0, LetterGrade::APlus),
    (90.0, LetterGrade::A),
    (85.0, LetterGrade::BPlus),
    (80.0, LetterGrade::B),
    (75.0, LetterGrade::CPlus),
    (70.0, LetterGrade::C),
    (65.0, LetterGrade::DPlus),
    (60.0, LetterGrade::D),
];

// Kept apart from LETTER_SCALE: the point values are not a function of the letter.
const GRADE_POINT_SCALE: [(f64, f64); 8] = [
    (95.0, 5.0),
    (90.0, 4.51),
    (85.0, 4.01),
    (80.0, 3.51),
    (75.0, 3.01),
    (70.0, 2.51),
    (65.0, 2.01),
    (60.0, 1.01),
];

fn lookup<T: Copy>(scale: &[(f64, T)], percentage: f64, fallback: T) -> T {
    scale
        .iter()
        .find(|(floor, _)| percentage >= *floor)
        .map(|(_, value)| *value)
        .unwrap_or(fallback)
}

/// Weighted sum in hundredths of a percent: `a*wa + q*wq + e*we`, exact in integers.
/// Components that were never entered count as 0.
pub fn weighted_hundredths(scores: &ScoreSet, policy: &WeightPolicy) -> i64 {
    [
        (scores.assignment, policy.assignment()),
        (scores.quiz, policy.quiz()),
        (scores.exam, policy.exam()),
    ]
    .iter()
    .map(|(score, weight)| i64::from(score.unwrap_or(0)) * i64::from(*weight))
    .sum()
}

/// Weighted final percentage, divided once so exact threshold values stay exact.
pub fn final_percentage(scores: &ScoreSet, policy: &WeightPolicy) -> f64 {
    weighted_hundredths(scores, policy) as f64 / 100.0
}

/// Integer final grade, truncated toward zero. Only the student grade sheet shows this.
pub fn truncated_final_grade(scores: &ScoreSet, policy: &WeightPolicy) -> i32 {
    // Scores and weights are non-negative and at most 100, so this is 0..=100.
    (weighted_hundredths(scores, policy) / 100) as i32
}

pub fn letter_grade(percentage: f64) -> LetterGrade {
    lookup(&LETTER_SCALE, percentage, LetterGrade::F)
}

pub fn grade_point(percentage: f64) -> f64 {
    lookup(&GRADE_POINT_SCALE, percentage, 0.0)
}

pub fn final_grade(scores: &ScoreSet, policy: &WeightPolicy) -> FinalGrade {
    let percentage = final_percentage(scores, policy);
    FinalGrade {
        percentage,
        letter: letter_grade(percentage),
        grade_point: grade_point(percentage),
    }
}

/// Mean of `count` values given as a total in hundredths, rounded half away from
/// zero to two decimals on the exact fraction. Returns 0 for an empty set.
pub fn mean_of_hundredths(total: i64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let count = count as i64;
    let rounded = (2 * total.abs() + count) / (2 * count);
    (total.signum() * rounded) as f64 / 100.0
}
