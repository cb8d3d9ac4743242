//! CLI command implementations.

pub mod common;
pub mod doctor;
pub mod layout;
pub mod render;
pub mod tex;
pub mod version;
