//! XSS pattern detector
//!
//! Heuristic scan of raw input for logging and alerting. It never changes
//! its input and is not a substitute for sanitization.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// The rule that flagged an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    ScriptTag,
    IframeTag,
    EmbeddedObject,
    EventHandler,
    ScriptUrl,
    StyleOrLink,
}

impl fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ScriptTag => "script tag",
            Self::IframeTag => "iframe tag",
            Self::EmbeddedObject => "object/embed tag",
            Self::EventHandler => "event handler attribute",
            Self::ScriptUrl => "script URL",
            Self::StyleOrLink => "style/link tag",
        };
        f.write_str(name)
    }
}

static RULES: LazyLock<Vec<(ThreatKind, Regex)>> = LazyLock::new(|| {
    [
        (ThreatKind::ScriptTag, r"(?i)<script\b"),
        (ThreatKind::IframeTag, r"(?i)<iframe\b"),
        (ThreatKind::EmbeddedObject, r"(?i)<(?:object|embed)\b"),
        (ThreatKind::EventHandler, r"(?i)\bon[a-z]+\s*="),
        (ThreatKind::ScriptUrl, r"(?i)(?:javascript|vbscript)\s*:"),
        (ThreatKind::StyleOrLink, r"(?i)<(?:style|link)\b"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("invalid threat regex")))
    .collect()
});

/// XSS pattern detector
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreatDetector;

impl ThreatDetector {
    pub fn new() -> Self {
        Self
    }

    /// First rule, in order, that matches the input
    pub fn detect(&self, input: &str) -> Option<ThreatKind> {
        RULES
            .iter()
            .find(|(_, regex)| regex.is_match(input))
            .map(|(kind, _)| *kind)
    }

    /// Whether any rule matches the input
    pub fn is_suspicious(&self, input: &str) -> bool {
        self.detect(input).is_some()
    }
}
