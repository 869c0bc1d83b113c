//! Step configuration: the per-`step_type` payload a module carries.
//!
//! Each step type has its own typed payload (see the submodules). A module
//! keeps one payload per step type it has ever used inside a [`StepConfig`]
//! container, and its `step_type` selects the active one. Switching the step
//! type therefore never discards previously authored configuration: the
//! other payloads stay inert until their tag is selected again.
//!
//! Partial edits arrive as JSON objects and are shallow-merged into the
//! active payload through [`registry::merge`], which also runs the payload's
//! field-level validation.

pub mod ai_reflection;
pub mod arena_game;
pub mod content;
pub mod guided_reading;
pub mod quiz;
pub mod registry;
pub mod routine_application;
pub mod validation;

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::Validate;

use crate::error::CoreError;

pub use ai_reflection::AiReflectionConfig;
pub use arena_game::{ArenaGameConfig, GameDifficulty};
pub use content::{ContentConfig, ContentData, ContentType};
pub use guided_reading::GuidedReadingConfig;
pub use quiz::{QuizConfig, QuizQuestion};
pub use routine_application::{EvidenceType, RoutineApplicationConfig};
pub use validation::{
    ScenarioOption, SelfAssessmentCriterion, ValidationConfig, ValidationQuizQuestion,
    ValidationType,
};

// ---------------------------------------------------------------------------
// Step type tag
// ---------------------------------------------------------------------------

/// The tag selecting which configuration schema a module's step config follows.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    #[default]
    Content,
    Quiz,
    ArenaGame,
    GuidedReading,
    AiReflection,
    RoutineApplication,
    Validation,
    CognitiveTest,
    Simulation,
    PracticalChallenge,
    Commitment,
    Reflection,
}

impl StepType {
    /// Every known step type, in the order the editor lists them.
    pub const ALL: [StepType; 12] = [
        StepType::Content,
        StepType::Quiz,
        StepType::ArenaGame,
        StepType::GuidedReading,
        StepType::AiReflection,
        StepType::RoutineApplication,
        StepType::Validation,
        StepType::CognitiveTest,
        StepType::Simulation,
        StepType::PracticalChallenge,
        StepType::Commitment,
        StepType::Reflection,
    ];

    /// Parse a step type tag as stored in the database or sent by a client.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid step_type '{s}'. Must be one of: {}",
                    Self::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }

    /// Wire/database representation of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Quiz => "quiz",
            Self::ArenaGame => "arena_game",
            Self::GuidedReading => "guided_reading",
            Self::AiReflection => "ai_reflection",
            Self::RoutineApplication => "routine_application",
            Self::Validation => "validation",
            Self::CognitiveTest => "cognitive_test",
            Self::Simulation => "simulation",
            Self::PracticalChallenge => "practical_challenge",
            Self::Commitment => "commitment",
            Self::Reflection => "reflection",
        }
    }

    /// Whether this tag has a structured payload shape. Tags without one
    /// carry an opaque pass-through object.
    pub fn has_structured_shape(self) -> bool {
        !matches!(
            self,
            Self::CognitiveTest
                | Self::Simulation
                | Self::PracticalChallenge
                | Self::Commitment
                | Self::Reflection
        )
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payload union
// ---------------------------------------------------------------------------

/// The configuration payload of a single step type.
///
/// Serializes as the bare inner object; the tag lives outside (as the key in
/// [`StepConfig`]), so deserialization always goes through
/// [`StepPayload::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepPayload {
    Content(ContentConfig),
    Quiz(QuizConfig),
    ArenaGame(ArenaGameConfig),
    GuidedReading(GuidedReadingConfig),
    AiReflection(AiReflectionConfig),
    RoutineApplication(RoutineApplicationConfig),
    Validation(ValidationConfig),
    /// Step types with no structured shape yet keep whatever object they were
    /// given, untouched.
    Placeholder(serde_json::Map<String, serde_json::Value>),
}

impl StepPayload {
    /// Decode a payload object for the given tag.
    pub fn from_value(step_type: StepType, value: serde_json::Value) -> Result<Self, CoreError> {
        let invalid = |e: serde_json::Error| {
            CoreError::Validation(format!("Invalid {step_type} configuration: {e}"))
        };
        let payload = match step_type {
            StepType::Content => Self::Content(serde_json::from_value(value).map_err(invalid)?),
            StepType::Quiz => Self::Quiz(serde_json::from_value(value).map_err(invalid)?),
            StepType::ArenaGame => {
                Self::ArenaGame(serde_json::from_value(value).map_err(invalid)?)
            }
            StepType::GuidedReading => {
                Self::GuidedReading(serde_json::from_value(value).map_err(invalid)?)
            }
            StepType::AiReflection => {
                Self::AiReflection(serde_json::from_value(value).map_err(invalid)?)
            }
            StepType::RoutineApplication => {
                Self::RoutineApplication(serde_json::from_value(value).map_err(invalid)?)
            }
            StepType::Validation => {
                Self::Validation(serde_json::from_value(value).map_err(invalid)?)
            }
            StepType::CognitiveTest
            | StepType::Simulation
            | StepType::PracticalChallenge
            | StepType::Commitment
            | StepType::Reflection => match value {
                serde_json::Value::Object(map) => Self::Placeholder(map),
                serde_json::Value::Null => Self::Placeholder(serde_json::Map::new()),
                other => {
                    return Err(CoreError::Validation(format!(
                        "{step_type} configuration must be a JSON object, got {other}"
                    )))
                }
            },
        };
        Ok(payload)
    }

    /// Encode the payload as a JSON value (always an object).
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    /// Whether this payload is the right variant for `step_type`.
    pub fn matches(&self, step_type: StepType) -> bool {
        match (self, step_type) {
            (Self::Content(_), StepType::Content)
            | (Self::Quiz(_), StepType::Quiz)
            | (Self::ArenaGame(_), StepType::ArenaGame)
            | (Self::GuidedReading(_), StepType::GuidedReading)
            | (Self::AiReflection(_), StepType::AiReflection)
            | (Self::RoutineApplication(_), StepType::RoutineApplication)
            | (Self::Validation(_), StepType::Validation) => true,
            (Self::Placeholder(_), t) => !t.has_structured_shape(),
            _ => false,
        }
    }

    /// Run the field-level validation rules of the payload.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Content(c) => c.validate()?,
            Self::Quiz(c) => c.validate()?,
            Self::ArenaGame(c) => c.validate()?,
            Self::GuidedReading(c) => c.validate()?,
            Self::AiReflection(c) => c.validate()?,
            Self::RoutineApplication(c) => c.validate()?,
            Self::Validation(c) => c.validate()?,
            Self::Placeholder(_) => {}
        }
        Ok(())
    }

    /// Whether the payload carries the minimum authored content for its type.
    ///
    /// Display-only readiness hint; never used to block a save.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Content(c) => c.is_complete(),
            Self::Quiz(c) => c.is_complete(),
            Self::ArenaGame(c) => c.is_complete(),
            Self::GuidedReading(c) => c.is_complete(),
            Self::AiReflection(c) => c.is_complete(),
            Self::RoutineApplication(c) => c.is_complete(),
            Self::Validation(c) => c.is_complete(),
            Self::Placeholder(_) => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-module container
// ---------------------------------------------------------------------------

/// All step payloads a module has accumulated, keyed by step type.
///
/// Serialized as a JSON object keyed by tag, e.g.
/// `{"content": {...}, "quiz": {...}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepConfig {
    payloads: BTreeMap<StepType, StepPayload>,
}

impl StepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A container holding only the default payload for `step_type`.
    pub fn for_step_type(step_type: StepType) -> Self {
        let mut config = Self::new();
        config.ensure(step_type);
        config
    }

    pub fn get(&self, step_type: StepType) -> Option<&StepPayload> {
        self.payloads.get(&step_type)
    }

    pub fn get_mut(&mut self, step_type: StepType) -> Option<&mut StepPayload> {
        self.payloads.get_mut(&step_type)
    }

    /// Return the payload for `step_type`, inserting its default if absent.
    pub fn ensure(&mut self, step_type: StepType) -> &mut StepPayload {
        self.payloads
            .entry(step_type)
            .or_insert_with(|| registry::default_payload(step_type))
    }

    /// Store a payload under `step_type`, returning the previous one.
    ///
    /// Rejects payloads whose variant does not belong to the tag.
    pub fn insert(
        &mut self,
        step_type: StepType,
        payload: StepPayload,
    ) -> Result<Option<StepPayload>, CoreError> {
        if !payload.matches(step_type) {
            return Err(CoreError::Validation(format!(
                "Payload does not match step_type '{step_type}'"
            )));
        }
        Ok(self.payloads.insert(step_type, payload))
    }

    /// Shallow-merge `updates` into the payload for `step_type`.
    ///
    /// The container is only modified if the merged payload decodes and
    /// validates; on error it is left exactly as it was.
    pub fn merge(
        &mut self,
        step_type: StepType,
        updates: &serde_json::Value,
    ) -> Result<(), CoreError> {
        let merged = registry::merge(step_type, self.payloads.get(&step_type), updates)?;
        self.payloads.insert(step_type, merged);
        Ok(())
    }

    /// Step types that currently hold a payload.
    pub fn step_types(&self) -> impl Iterator<Item = StepType> + '_ {
        self.payloads.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Encode as the tag-keyed JSON object stored by the content store.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.payloads
                .iter()
                .map(|(tag, payload)| (tag.as_str().to_string(), payload.to_value()))
                .collect(),
        )
    }

    /// Decode the tag-keyed JSON object. `null` decodes to an empty container.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        let map = match value {
            serde_json::Value::Null => return Ok(Self::new()),
            serde_json::Value::Object(map) => map,
            other => {
                return Err(CoreError::Validation(format!(
                    "step_config must be a JSON object, got {other}"
                )))
            }
        };
        let mut payloads = BTreeMap::new();
        for (tag, raw) in map {
            let step_type = StepType::parse(&tag)?;
            payloads.insert(step_type, StepPayload::from_value(step_type, raw)?);
        }
        Ok(Self { payloads })
    }

    /// Lenient decode for rows loaded from storage: unknown tags are dropped
    /// and malformed payloads fall back to their defaults.
    pub fn normalize(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(map) = value else {
            return Self::new();
        };
        let mut payloads = BTreeMap::new();
        for (tag, raw) in map {
            match StepType::parse(&tag) {
                Ok(step_type) => {
                    payloads.insert(step_type, registry::normalize(step_type, raw));
                }
                Err(_) => tracing::warn!(tag = %tag, "Dropping unknown step_config tag"),
            }
        }
        Self { payloads }
    }
}

impl Serialize for StepConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StepConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// List editing helpers
// ---------------------------------------------------------------------------

/// Generate an identifier for a list item (question, option, criterion).
pub(crate) fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Remove the item at `index`. Out-of-range indices are a no-op.
pub(crate) fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}

/// Move the item at `from` to position `to`. Returns `false` (and changes
/// nothing) if either index is out of range.
pub(crate) fn move_item<T>(items: &mut [T], from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from < to {
        items[from..=to].rotate_left(1);
    } else {
        items[to..=from].rotate_right(1);
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
