//! Async controllers around the pure editor state in `questline-core`.
//!
//! - [`SessionController`]: one open training; loads from and saves to a
//!   [`ContentStore`](questline_core::store::ContentStore), rejects
//!   overlapping saves and publishes state-change events.
//! - [`WizardController`]: one creation wizard; handles asset uploads and
//!   materializes the draft on submit.

pub mod error;
pub mod session;
pub mod wizard;

pub use error::{EditorError, EditorResult};
pub use session::{ModuleView, SaveOutcome, SessionController, SessionView};
pub use wizard::WizardController;
