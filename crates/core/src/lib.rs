pub mod catalog;
pub mod delta;
pub mod error;
pub mod module;
pub mod reorder;
pub mod session;
pub mod step_config;
pub mod store;
pub mod training;
pub mod tree;
pub mod types;
pub mod wizard;
