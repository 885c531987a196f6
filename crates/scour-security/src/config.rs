//! Sanitizer Configuration

use serde::{Deserialize, Serialize};

/// Sanitizer configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Inputs longer than this (bytes) are refused
    pub max_input_bytes: usize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 1024 * 1024, // 1MB
        }
    }
}
