/// Identifier of a module node within a training's content tree.
pub type ModuleId = uuid::Uuid;

/// Identifier of a training (the aggregate root that owns a module tree).
pub type TrainingId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
