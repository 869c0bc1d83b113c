//! Row types for the questline tables and their conversions into domain types.

pub mod catalog;
pub mod module;
pub mod training;
