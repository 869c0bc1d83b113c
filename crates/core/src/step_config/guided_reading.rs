//! `guided_reading` step: a book chapter excerpt or summary with framing.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GuidedReadingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub chapter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub learning_objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub context_why_matters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 240))]
    pub estimated_reading_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdi_goal_name: Option<String>,
}

impl GuidedReadingConfig {
    /// A chapter title plus either an excerpt or a summary.
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.chapter_title) && (filled(&self.excerpt_text) || filled(&self.summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_enough_reading_material() {
        let config = GuidedReadingConfig {
            chapter_title: Some("Chapter 3".into()),
            summary: Some("Habits compound.".into()),
            ..Default::default()
        };
        assert!(config.is_complete());
    }

    #[test]
    fn title_alone_is_incomplete() {
        let config = GuidedReadingConfig {
            chapter_title: Some("Chapter 3".into()),
            excerpt_text: Some("   ".into()),
            ..Default::default()
        };
        assert!(!config.is_complete());
    }

    #[test]
    fn reading_minutes_bounds() {
        let config = GuidedReadingConfig {
            estimated_reading_minutes: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
