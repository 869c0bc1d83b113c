use questline_core::error::CoreError;
use questline_core::types::TrainingId;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A second save was requested while one is still outstanding.
    #[error("A save is already in progress for training {0}")]
    SaveInProgress(TrainingId),

    /// The controller has not loaded a training yet.
    #[error("No training is loaded in this session")]
    NoSession,
}

pub type EditorResult<T> = Result<T, EditorError>;
