//! `validation` step: a checkpoint assessment in one of four formats.
//!
//! Only the list matching `validation_type` is presented; the other lists
//! are kept so switching formats back and forth loses nothing.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{move_item, new_item_id, remove_at};

pub const DEFAULT_MIN_PASSING_SCORE: i32 = 70;
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    #[default]
    Quiz,
    Scenario,
    SelfAssessment,
    Game,
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_question_answer"))]
pub struct ValidationQuizQuestion {
    pub id: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub question: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn validate_question_answer(q: &ValidationQuizQuestion) -> Result<(), ValidationError> {
    if q.options.is_empty() || q.correct_index < q.options.len() {
        Ok(())
    } else {
        Err(ValidationError::new("correct_index_out_of_range"))
    }
}

impl ValidationQuizQuestion {
    pub fn new() -> Self {
        Self {
            id: new_item_id(),
            question: String::new(),
            options: vec![String::new(); 4],
            correct_index: 0,
            explanation: None,
        }
    }
}

impl Default for ValidationQuizQuestion {
    fn default() -> Self {
        Self::new()
    }
}

/// One possible answer to a scenario prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScenarioOption {
    pub id: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
}

impl ScenarioOption {
    pub fn new() -> Self {
        Self {
            id: new_item_id(),
            text: String::new(),
            is_correct: false,
            feedback: None,
            score: 0,
        }
    }
}

impl Default for ScenarioOption {
    fn default() -> Self {
        Self::new()
    }
}

/// A criterion the learner rates themselves against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SelfAssessmentCriterion {
    pub id: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub criterion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_max_rating")]
    #[validate(range(min = 2, max = 10))]
    pub max_rating: i32,
}

fn default_max_rating() -> i32 {
    5
}

impl SelfAssessmentCriterion {
    pub fn new() -> Self {
        Self {
            id: new_item_id(),
            criterion: String::new(),
            description: None,
            max_rating: default_max_rating(),
        }
    }
}

impl Default for SelfAssessmentCriterion {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ValidationConfig {
    pub validation_type: ValidationType,
    /// Situation presented before the scenario options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_description: Option<String>,
    #[validate(nested)]
    pub quiz_questions: Vec<ValidationQuizQuestion>,
    #[validate(nested)]
    pub scenario_options: Vec<ScenarioOption>,
    #[validate(nested)]
    pub self_assessment_criteria: Vec<SelfAssessmentCriterion>,
    /// Game identifier for `game` validations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_type: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub min_passing_score: i32,
    pub allow_retry: bool,
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validation_type: ValidationType::Quiz,
            scenario_description: None,
            quiz_questions: Vec::new(),
            scenario_options: Vec::new(),
            self_assessment_criteria: Vec::new(),
            game_type: None,
            min_passing_score: DEFAULT_MIN_PASSING_SCORE,
            allow_retry: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ValidationConfig {
    // -- quiz questions --

    pub fn add_quiz_question(&mut self) -> String {
        let question = ValidationQuizQuestion::new();
        let id = question.id.clone();
        self.quiz_questions.push(question);
        id
    }

    pub fn remove_quiz_question(&mut self, index: usize) -> Option<ValidationQuizQuestion> {
        remove_at(&mut self.quiz_questions, index)
    }

    pub fn quiz_question_mut(&mut self, index: usize) -> Option<&mut ValidationQuizQuestion> {
        self.quiz_questions.get_mut(index)
    }

    pub fn move_quiz_question(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.quiz_questions, from, to)
    }

    // -- scenario options --

    pub fn add_scenario_option(&mut self) -> String {
        let option = ScenarioOption::new();
        let id = option.id.clone();
        self.scenario_options.push(option);
        id
    }

    pub fn remove_scenario_option(&mut self, index: usize) -> Option<ScenarioOption> {
        remove_at(&mut self.scenario_options, index)
    }

    pub fn scenario_option_mut(&mut self, index: usize) -> Option<&mut ScenarioOption> {
        self.scenario_options.get_mut(index)
    }

    // -- self-assessment criteria --

    pub fn add_criterion(&mut self) -> String {
        let criterion = SelfAssessmentCriterion::new();
        let id = criterion.id.clone();
        self.self_assessment_criteria.push(criterion);
        id
    }

    pub fn remove_criterion(&mut self, index: usize) -> Option<SelfAssessmentCriterion> {
        remove_at(&mut self.self_assessment_criteria, index)
    }

    pub fn criterion_mut(&mut self, index: usize) -> Option<&mut SelfAssessmentCriterion> {
        self.self_assessment_criteria.get_mut(index)
    }

    /// Whether the list for the selected `validation_type` has content.
    pub fn is_complete(&self) -> bool {
        match self.validation_type {
            ValidationType::Quiz => !self.quiz_questions.is_empty(),
            ValidationType::Scenario => {
                self.scenario_options.len() >= 2
                    && self.scenario_options.iter().any(|o| o.is_correct)
            }
            ValidationType::SelfAssessment => !self.self_assessment_criteria.is_empty(),
            ValidationType::Game => self.game_type.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(text: &str, correct_index: usize) -> ValidationQuizQuestion {
        ValidationQuizQuestion {
            id: text.to_lowercase(),
            question: text.to_string(),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_index,
            explanation: None,
        }
    }

    #[test]
    fn removing_first_question_keeps_second_answer() {
        let mut config = ValidationConfig {
            validation_type: ValidationType::Quiz,
            quiz_questions: vec![question("First", 0), question("Second", 1)],
            ..Default::default()
        };

        let removed = config.remove_quiz_question(0).unwrap();

        assert_eq!(removed.question, "First");
        assert_eq!(config.quiz_questions.len(), 1);
        assert_eq!(config.quiz_questions[0].question, "Second");
        assert_eq!(config.quiz_questions[0].correct_index, 1);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut config = ValidationConfig::default();
        config.add_quiz_question();
        assert!(config.remove_quiz_question(3).is_none());
        assert_eq!(config.quiz_questions.len(), 1);
    }

    #[test]
    fn snake_case_wire_format() {
        let mut config = ValidationConfig::default();
        config.add_quiz_question();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["validation_type"], "quiz");
        assert_eq!(value["quiz_questions"][0]["correct_index"], 0);
        assert_eq!(value["min_passing_score"], 70);
    }

    #[test]
    fn scenario_completeness_requires_a_correct_option() {
        let mut config = ValidationConfig {
            validation_type: ValidationType::Scenario,
            ..Default::default()
        };
        config.add_scenario_option();
        config.add_scenario_option();
        assert!(!config.is_complete());
        config.scenario_option_mut(1).unwrap().is_correct = true;
        assert!(config.is_complete());
    }

    #[test]
    fn self_assessment_decodes_with_default_rating() {
        let config: ValidationConfig = serde_json::from_value(json!({
            "validation_type": "self_assessment",
            "self_assessment_criteria": [{"id": "c1", "criterion": "Listens actively"}]
        }))
        .unwrap();
        assert_eq!(config.self_assessment_criteria[0].max_rating, 5);
        assert!(config.is_complete());
    }

    #[test]
    fn bounds_are_enforced() {
        let mut config = ValidationConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = ValidationConfig::default();
        config.min_passing_score = 120;
        assert!(config.validate().is_err());

        let mut config = ValidationConfig::default();
        config.add_scenario_option();
        config.scenario_options[0].score = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn nested_question_answer_is_checked() {
        let mut config = ValidationConfig::default();
        config.quiz_questions.push(question("Q", 9));
        assert!(config.validate().is_err());
    }
}
