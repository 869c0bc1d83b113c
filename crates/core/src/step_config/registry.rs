//! Step type registry: descriptors, default payload factories, and the
//! shallow-merge used for every partial configuration edit.

use serde::Serialize;

use super::{
    AiReflectionConfig, ArenaGameConfig, ContentConfig, GuidedReadingConfig, QuizConfig,
    RoutineApplicationConfig, StepPayload, StepType, ValidationConfig,
};
use crate::error::CoreError;

/// Editor-facing description of a step type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepTypeDescriptor {
    pub step_type: StepType,
    pub label: &'static str,
    pub description: &'static str,
    /// `false` for tags that only carry a pass-through placeholder object.
    pub structured: bool,
}

const DESCRIPTORS: [StepTypeDescriptor; 12] = [
    StepTypeDescriptor {
        step_type: StepType::Content,
        label: "Content",
        description: "Text, video, PDF or external link",
        structured: true,
    },
    StepTypeDescriptor {
        step_type: StepType::Quiz,
        label: "Quiz",
        description: "Multiple-choice questions worth points",
        structured: true,
    },
    StepTypeDescriptor {
        step_type: StepType::ArenaGame,
        label: "Arena Game",
        description: "Mini-game with a minimum score to pass",
        structured: true,
    },
    StepTypeDescriptor {
        step_type: StepType::GuidedReading,
        label: "Guided Reading",
        description: "Chapter excerpt or summary with learning objective",
        structured: true,
    },
    StepTypeDescriptor {
        step_type: StepType::AiReflection,
        label: "AI Reflection",
        description: "Written reflection evaluated by an AI tutor",
        structured: true,
    },
    StepTypeDescriptor {
        step_type: StepType::RoutineApplication,
        label: "Routine Application",
        description: "Real-world action with evidence and deadline",
        structured: true,
    },
    StepTypeDescriptor {
        step_type: StepType::Validation,
        label: "Validation",
        description: "Quiz, scenario, self-assessment or game checkpoint",
        structured: true,
    },
    StepTypeDescriptor {
        step_type: StepType::CognitiveTest,
        label: "Cognitive Test",
        description: "Cognitive assessment",
        structured: false,
    },
    StepTypeDescriptor {
        step_type: StepType::Simulation,
        label: "Simulation",
        description: "Interactive simulation",
        structured: false,
    },
    StepTypeDescriptor {
        step_type: StepType::PracticalChallenge,
        label: "Practical Challenge",
        description: "Hands-on challenge",
        structured: false,
    },
    StepTypeDescriptor {
        step_type: StepType::Commitment,
        label: "Commitment",
        description: "Personal commitment",
        structured: false,
    },
    StepTypeDescriptor {
        step_type: StepType::Reflection,
        label: "Reflection",
        description: "Free-form reflection",
        structured: false,
    },
];

/// All descriptors, in [`StepType::ALL`] order.
pub fn descriptors() -> &'static [StepTypeDescriptor] {
    &DESCRIPTORS
}

pub fn descriptor(step_type: StepType) -> &'static StepTypeDescriptor {
    DESCRIPTORS
        .iter()
        .find(|d| d.step_type == step_type)
        .unwrap_or(&DESCRIPTORS[0])
}

/// Payload a module receives the first time it selects `step_type`.
pub fn default_payload(step_type: StepType) -> StepPayload {
    match step_type {
        StepType::Content => StepPayload::Content(ContentConfig::default()),
        StepType::Quiz => StepPayload::Quiz(QuizConfig::default()),
        StepType::ArenaGame => StepPayload::ArenaGame(ArenaGameConfig::default()),
        StepType::GuidedReading => StepPayload::GuidedReading(GuidedReadingConfig::default()),
        StepType::AiReflection => StepPayload::AiReflection(AiReflectionConfig::default()),
        StepType::RoutineApplication => {
            StepPayload::RoutineApplication(RoutineApplicationConfig::default())
        }
        StepType::Validation => StepPayload::Validation(ValidationConfig::default()),
        StepType::CognitiveTest
        | StepType::Simulation
        | StepType::PracticalChallenge
        | StepType::Commitment
        | StepType::Reflection => StepPayload::Placeholder(serde_json::Map::new()),
    }
}

/// Shallow-merge `updates` over `existing` (or the tag's default payload).
///
/// Top-level keys of `updates` replace the corresponding keys of the
/// existing object; nested objects and lists are replaced wholesale. Keys
/// absent from `updates` are kept. The merged object is decoded into the
/// tag's payload type and validated before being returned.
pub fn merge(
    step_type: StepType,
    existing: Option<&StepPayload>,
    updates: &serde_json::Value,
) -> Result<StepPayload, CoreError> {
    let updates = updates.as_object().ok_or_else(|| {
        CoreError::Validation(format!(
            "{step_type} configuration updates must be a JSON object"
        ))
    })?;

    let base = match existing {
        Some(payload) if payload.matches(step_type) => payload.to_value(),
        _ => default_payload(step_type).to_value(),
    };
    let mut merged = match base {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    for (key, value) in updates {
        merged.insert(key.clone(), value.clone());
    }

    let payload = StepPayload::from_value(step_type, serde_json::Value::Object(merged))?;
    payload.validate()?;
    Ok(payload)
}

/// Decode a payload loaded from storage, falling back to the default payload
/// when the stored object no longer fits the tag's shape.
pub fn normalize(step_type: StepType, raw: serde_json::Value) -> StepPayload {
    match StepPayload::from_value(step_type, raw) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(%step_type, error = %e, "Discarding malformed step configuration");
            default_payload(step_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_descriptor_per_step_type() {
        assert_eq!(descriptors().len(), StepType::ALL.len());
        for t in StepType::ALL {
            let d = descriptor(t);
            assert_eq!(d.step_type, t);
            assert_eq!(d.structured, t.has_structured_shape());
            assert!(!d.label.is_empty());
        }
    }

    #[test]
    fn default_payload_matches_its_tag() {
        for t in StepType::ALL {
            let payload = default_payload(t);
            assert!(payload.matches(t), "default for {t} should match");
            assert!(payload.validate().is_ok(), "default for {t} should validate");
        }
    }

    #[test]
    fn merge_keeps_untouched_keys() {
        let existing = merge(
            StepType::GuidedReading,
            None,
            &json!({"chapter_title": "Ch. 1", "summary": "Short"}),
        )
        .unwrap();

        let merged = merge(
            StepType::GuidedReading,
            Some(&existing),
            &json!({"summary": "Longer summary"}),
        )
        .unwrap();

        let value = merged.to_value();
        assert_eq!(value["chapter_title"], "Ch. 1");
        assert_eq!(value["summary"], "Longer summary");
    }

    #[test]
    fn merge_is_shallow_for_nested_objects() {
        let existing = merge(
            StepType::Content,
            None,
            &json!({"content_data": {"text": "Hello", "link_title": "Docs"}}),
        )
        .unwrap();

        let merged = merge(
            StepType::Content,
            Some(&existing),
            &json!({"content_data": {"text": "Bye"}}),
        )
        .unwrap();

        let value = merged.to_value();
        assert_eq!(value["content_data"]["text"], "Bye");
        assert!(value["content_data"].get("link_title").is_none());
    }

    #[test]
    fn merge_null_clears_optional_field() {
        let existing =
            merge(StepType::ArenaGame, None, &json!({"game_type": "memory"})).unwrap();
        let merged = merge(StepType::ArenaGame, Some(&existing), &json!({"game_type": null}))
            .unwrap();
        assert!(merged.to_value().get("game_type").is_none());
    }

    #[test]
    fn merge_rejects_out_of_bounds_value() {
        let err = merge(StepType::Validation, None, &json!({"max_attempts": 0})).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn merge_rejects_non_object_updates() {
        assert!(merge(StepType::Quiz, None, &json!("questions")).is_err());
    }

    #[test]
    fn merge_ignores_mismatched_existing_payload() {
        let quiz = default_payload(StepType::Quiz);
        let merged = merge(StepType::Content, Some(&quiz), &json!({})).unwrap();
        assert!(merged.matches(StepType::Content));
    }

    #[test]
    fn merge_placeholder_passes_fields_through() {
        let existing = merge(StepType::Commitment, None, &json!({"pledge": "daily"})).unwrap();
        let merged = merge(StepType::Commitment, Some(&existing), &json!({"witness": true}))
            .unwrap();
        assert_eq!(merged.to_value(), json!({"pledge": "daily", "witness": true}));
    }

    #[test]
    fn normalize_falls_back_to_default() {
        let payload = normalize(StepType::Quiz, json!({"questions": "not a list"}));
        assert_eq!(payload, default_payload(StepType::Quiz));
    }
}
