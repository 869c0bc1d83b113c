//! `ai_reflection` step: the learner answers reflection prompts and an AI
//! tutor probes comprehension with follow-up questions.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{move_item, remove_at};

pub const DEFAULT_MIN_RESPONSE_CHARACTERS: i32 = 200;
pub const DEFAULT_COMPREHENSION_THRESHOLD: i32 = 70;
pub const DEFAULT_MAX_AI_QUESTIONS: i32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AiReflectionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub chapter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub learning_objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub context_why_matters: Option<String>,
    #[validate(length(max = 20))]
    pub reflection_prompts: Vec<String>,
    #[validate(range(min = 0, max = 10000))]
    pub min_response_characters: i32,
    /// Percentage the AI evaluation must reach for the step to count as passed.
    #[validate(range(min = 0, max = 100))]
    pub comprehension_threshold: i32,
    #[validate(range(min = 1, max = 10))]
    pub max_ai_questions: i32,
    pub require_practical_example: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdi_goal_context: Option<String>,
}

impl Default for AiReflectionConfig {
    fn default() -> Self {
        Self {
            chapter_title: None,
            chapter_content: None,
            learning_objective: None,
            context_why_matters: None,
            reflection_prompts: Vec::new(),
            min_response_characters: DEFAULT_MIN_RESPONSE_CHARACTERS,
            comprehension_threshold: DEFAULT_COMPREHENSION_THRESHOLD,
            max_ai_questions: DEFAULT_MAX_AI_QUESTIONS,
            require_practical_example: true,
            skill_name: None,
            pdi_goal_context: None,
        }
    }
}

impl AiReflectionConfig {
    pub fn add_prompt(&mut self, prompt: impl Into<String>) {
        self.reflection_prompts.push(prompt.into());
    }

    pub fn remove_prompt(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.reflection_prompts, index)
    }

    /// Replace the prompt at `index`. Returns `false` if out of range.
    pub fn update_prompt(&mut self, index: usize, prompt: impl Into<String>) -> bool {
        match self.reflection_prompts.get_mut(index) {
            Some(slot) => {
                *slot = prompt.into();
                true
            }
            None => false,
        }
    }

    pub fn move_prompt(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.reflection_prompts, from, to)
    }

    pub fn is_complete(&self) -> bool {
        self.chapter_content
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
            && self.reflection_prompts.iter().any(|p| !p.trim().is_empty())
    }
}
