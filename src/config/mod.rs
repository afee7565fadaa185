//! Configuration module for Pensum.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{CompletionSettings, SearchSettings, SessionSettings, Settings};
