//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! `history` and `diagnosis` are pure normalization stages; `chat` and
//! `analyze` wire them around a single completion gateway call so route
//! handlers stay focused on protocol translation.

pub mod analyze;
pub mod chat;
pub mod diagnosis;
pub mod history;
pub mod prompts;
