//! Dot-separated event type names published on the bus.

pub const SESSION_LOADED: &str = "session.loaded";
pub const SESSION_MUTATED: &str = "session.mutated";
pub const SESSION_SAVED: &str = "session.saved";
pub const SESSION_SAVE_FAILED: &str = "session.save_failed";
pub const SESSION_DISCARDED: &str = "session.discarded";

pub const WIZARD_SUBMITTED: &str = "wizard.submitted";
pub const WIZARD_CANCELLED: &str = "wizard.cancelled";

pub const ASSET_UPLOADED: &str = "asset.uploaded";
