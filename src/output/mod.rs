//! Report rendering: terminal text and JSON.

pub mod json;
pub mod terminal;
