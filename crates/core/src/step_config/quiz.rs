//! `quiz` step: multiple-choice questions scored by points.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{move_item, new_item_id, remove_at};

/// Number of blank options a freshly added question starts with.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Points awarded by a freshly added question.
pub const DEFAULT_QUESTION_POINTS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_correct_index"))]
pub struct QuizQuestion {
    pub id: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub question: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_index: usize,
    #[serde(default = "default_points")]
    #[validate(range(max = 1000))]
    pub points: u32,
}

fn default_points() -> u32 {
    DEFAULT_QUESTION_POINTS
}

fn validate_correct_index(q: &QuizQuestion) -> Result<(), ValidationError> {
    if q.options.is_empty() || q.correct_index < q.options.len() {
        Ok(())
    } else {
        Err(ValidationError::new("correct_index_out_of_range"))
    }
}

impl QuizQuestion {
    /// A blank question with [`DEFAULT_OPTION_COUNT`] empty options.
    pub fn new() -> Self {
        Self {
            id: new_item_id(),
            question: String::new(),
            options: vec![String::new(); DEFAULT_OPTION_COUNT],
            correct_index: 0,
            points: DEFAULT_QUESTION_POINTS,
        }
    }

    pub fn add_option(&mut self, text: impl Into<String>) {
        self.options.push(text.into());
    }

    /// Remove an option, keeping `correct_index` pointing at the same answer.
    ///
    /// Removing the correct option itself resets the answer to the first one.
    pub fn remove_option(&mut self, index: usize) -> Option<String> {
        let removed = remove_at(&mut self.options, index)?;
        if index < self.correct_index {
            self.correct_index -= 1;
        } else if index == self.correct_index {
            self.correct_index = 0;
        }
        Some(removed)
    }
}

impl Default for QuizQuestion {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizConfig {
    #[validate(nested)]
    pub questions: Vec<QuizQuestion>,
    pub shuffle_questions: bool,
    pub show_feedback: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            shuffle_questions: false,
            show_feedback: true,
        }
    }
}

impl QuizConfig {
    /// Append a blank question and return its id.
    pub fn add_question(&mut self) -> String {
        let question = QuizQuestion::new();
        let id = question.id.clone();
        self.questions.push(question);
        id
    }

    pub fn remove_question(&mut self, index: usize) -> Option<QuizQuestion> {
        remove_at(&mut self.questions, index)
    }

    pub fn question_mut(&mut self, index: usize) -> Option<&mut QuizQuestion> {
        self.questions.get_mut(index)
    }

    pub fn move_question(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.questions, from, to)
    }

    /// Sum of the points of all questions.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    pub fn is_complete(&self) -> bool {
        !self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_is_camel_case() {
        let mut quiz = QuizConfig::default();
        quiz.add_question();
        let value = serde_json::to_value(&quiz).unwrap();
        assert_eq!(value["showFeedback"], true);
        assert_eq!(value["shuffleQuestions"], false);
        assert_eq!(value["questions"][0]["correctIndex"], 0);
        assert_eq!(value["questions"][0]["points"], 10);
    }

    #[test]
    fn decodes_partial_question() {
        let quiz: QuizConfig = serde_json::from_value(json!({
            "questions": [{"id": "q1", "question": "2+2?", "options": ["3", "4"], "correctIndex": 1}]
        }))
        .unwrap();
        assert_eq!(quiz.questions[0].points, DEFAULT_QUESTION_POINTS);
        assert!(quiz.show_feedback);
        assert!(quiz.validate().is_ok());
    }

    #[test]
    fn correct_index_must_reference_an_option() {
        let mut quiz = QuizConfig::default();
        quiz.add_question();
        quiz.questions[0].correct_index = 7;
        assert!(quiz.validate().is_err());
    }

    #[test]
    fn remove_option_before_answer_shifts_index() {
        let mut q = QuizQuestion::new();
        q.correct_index = 2;
        q.remove_option(0);
        assert_eq!(q.correct_index, 1);
        assert_eq!(q.options.len(), DEFAULT_OPTION_COUNT - 1);
    }

    #[test]
    fn remove_correct_option_resets_answer() {
        let mut q = QuizQuestion::new();
        q.correct_index = 2;
        q.remove_option(2);
        assert_eq!(q.correct_index, 0);
    }

    #[test]
    fn remove_question_keeps_remaining_fields() {
        let mut quiz = QuizConfig::default();
        quiz.add_question();
        quiz.add_question();
        quiz.questions[1].correct_index = 3;
        let kept = quiz.questions[1].clone();
        quiz.remove_question(0);
        assert_eq!(quiz.questions, vec![kept]);
    }

    #[test]
    fn total_points_sums_questions() {
        let mut quiz = QuizConfig::default();
        quiz.add_question();
        quiz.add_question();
        quiz.questions[0].points = 5;
        assert_eq!(quiz.total_points(), 15);
        assert!(quiz.is_complete());
    }
}
