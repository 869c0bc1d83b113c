//! `routine_application` step: a real-world action the learner commits to
//! and proves with evidence before a deadline.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_DEADLINE_DAYS: i32 = 7;

/// How the learner proves the action was carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    #[default]
    Checkin,
    Text,
    File,
    Link,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RoutineApplicationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub action_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub expected_impact: Option<String>,
    #[validate(range(min = 1, max = 365))]
    pub deadline_days: i32,
    pub evidence_type: EvidenceType,
    pub is_real_commitment: bool,
    pub auto_reminders: bool,
    pub notify_manager: bool,
    pub can_generate_daily_mission: bool,
    pub can_generate_challenge: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdi_goal_name: Option<String>,
}

impl Default for RoutineApplicationConfig {
    fn default() -> Self {
        Self {
            action_description: None,
            expected_impact: None,
            deadline_days: DEFAULT_DEADLINE_DAYS,
            evidence_type: EvidenceType::Checkin,
            is_real_commitment: true,
            auto_reminders: true,
            notify_manager: false,
            can_generate_daily_mission: false,
            can_generate_challenge: false,
            skill_name: None,
            pdi_goal_name: None,
        }
    }
}

impl RoutineApplicationConfig {
    pub fn is_complete(&self) -> bool {
        self.action_description
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deadline_bounds() {
        let mut config = RoutineApplicationConfig::default();
        assert!(config.validate().is_ok());
        config.deadline_days = 0;
        assert!(config.validate().is_err());
        config.deadline_days = 366;
        assert!(config.validate().is_err());
    }

    #[test]
    fn evidence_type_rejects_unknown_value() {
        let result: Result<RoutineApplicationConfig, _> =
            serde_json::from_value(json!({"evidence_type": "photo"}));
        assert!(result.is_err());
    }

    #[test]
    fn complete_when_action_described() {
        let config = RoutineApplicationConfig {
            action_description: Some("Run a 15-minute standup daily".into()),
            ..Default::default()
        };
        assert!(config.is_complete());
    }
}
