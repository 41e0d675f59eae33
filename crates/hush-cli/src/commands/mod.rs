pub mod common;
pub mod edit;
pub mod image;
pub mod open;
pub mod write;
