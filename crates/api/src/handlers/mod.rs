pub mod reference;
pub mod sessions;
pub mod wizards;
