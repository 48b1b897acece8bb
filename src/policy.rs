use serde::Serialize;

use crate::error::{GradingError, GradingResult};

/// A course's assignment/quiz/exam split. Only constructible through
/// [`WeightPolicy::new`], so every value in circulation sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeightPolicy {
    assignment: i32,
    quiz: i32,
    exam: i32,
}

impl WeightPolicy {
    pub fn new(assignment: i32, quiz: i32, exam: i32) -> GradingResult<Self> {
        let invalid = |reason| GradingError::InvalidWeights {
            assignment,
            quiz,
            exam,
            reason,
        };

        if [assignment, quiz, exam]
            .iter()
            .any(|weight| !(0..=100).contains(weight))
        {
            return Err(invalid("each weight must be between 0 and 100"));
        }
        if assignment + quiz + exam != 100 {
            return Err(invalid("the total weight must equal 100"));
        }

        Ok(Self {
            assignment,
            quiz,
            exam,
        })
    }

    pub fn assignment(&self) -> i32 {
        self.assignment
    }

    pub fn quiz(&self) -> i32 {
        self.quiz
    }

    pub fn exam(&self) -> i32 {
        self.exam
    }
}
