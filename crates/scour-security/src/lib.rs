//! scour Security
//!
//! Whitelist-based sanitizer for untrusted HTML and SVG.
//!
//! Features:
//! - Tag and attribute allow-lists per profile (HTML, SVG)
//! - URL policy for `href`/`src`/`xlink:href`
//! - Link hardening
//! - Textual purge of dangerous markers after serialization
//! - Heuristic XSS detection for logging

pub mod config;
pub mod detector;
pub mod pipeline;
pub mod policy;
pub mod purge;
pub mod url_policy;

pub use config::SanitizerConfig;
pub use detector::{ThreatDetector, ThreatKind};
pub use pipeline::{SanitizeStats, Sanitized, sanitize, sanitize_with_stats};
pub use policy::{
    ALLOWED_HTML_ATTRIBUTES, ALLOWED_HTML_TAGS, ALLOWED_SVG_ATTRIBUTES, ALLOWED_SVG_TAGS,
    DANGEROUS_TAGS, FORBIDDEN_ATTRIBUTES, Mode, Policy, Profile, TagDecision, WILDCARD,
};
pub use purge::purge_dangerous_markers;
pub use url_policy::is_safe_url;

use std::sync::LazyLock;

use scour_html::ParseError;
use serde::{Deserialize, Serialize};

static DEFAULT_SANITIZER: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::default);

/// Sanitization error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Input too large: {len} bytes (limit {limit})")]
    InputTooLarge { len: usize, limit: usize },
}

/// Options for [`sanitize_content`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentOptions {
    /// Keep inline SVG under the SVG profile instead of unwrapping it
    pub allow_svg: bool,
}

impl ContentOptions {
    fn mode(self) -> Mode {
        if self.allow_svg { Mode::Mixed } else { Mode::Html }
    }
}

/// A policy plus its limits
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    policy: Policy,
    config: SanitizerConfig,
}

impl Sanitizer {
    pub fn new(policy: Policy, config: SanitizerConfig) -> Self {
        Self { policy, config }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Sanitize, surfacing failures instead of falling back
    pub fn try_sanitize(&self, raw: &str, mode: Mode) -> Result<Sanitized, SanitizeError> {
        let limit = self.config.max_input_bytes;
        if raw.len() > limit {
            return Err(SanitizeError::InputTooLarge { len: raw.len(), limit });
        }
        Ok(pipeline::sanitize_with_stats(&self.policy, raw, mode)?)
    }

    /// Sanitize; on any failure the result is the empty string
    pub fn sanitize(&self, raw: &str, mode: Mode) -> String {
        match self.try_sanitize(raw, mode) {
            Ok(sanitized) => sanitized.html,
            Err(err) => {
                tracing::warn!("Sanitization failed, returning empty output: {}", err);
                String::new()
            }
        }
    }

    pub fn sanitize_content(&self, raw: &str, options: ContentOptions) -> String {
        self.sanitize(raw, options.mode())
    }

    pub fn sanitize_diagram(&self, raw_svg: &str) -> String {
        self.sanitize(raw_svg, Mode::Svg)
    }
}

/// Sanitize user-generated HTML with the built-in policy
pub fn sanitize_content(raw: &str, options: ContentOptions) -> String {
    DEFAULT_SANITIZER.sanitize_content(raw, options)
}

/// Sanitize a stand-alone SVG diagram with the built-in policy
pub fn sanitize_diagram(raw_svg: &str) -> String {
    DEFAULT_SANITIZER.sanitize_diagram(raw_svg)
}

/// Whether raw input looks like an XSS attempt. Never modifies anything.
pub fn is_suspicious(raw: &str) -> bool {
    ThreatDetector::new().is_suspicious(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_options_select_mode() {
        assert_eq!(ContentOptions::default().mode(), Mode::Html);
        assert_eq!(ContentOptions { allow_svg: true }.mode(), Mode::Mixed);
    }

    #[test]
    fn test_oversize_input_is_refused() {
        let sanitizer = Sanitizer::new(Policy::standard(), SanitizerConfig { max_input_bytes: 8 });
        let err = sanitizer.try_sanitize("<p>long enough</p>", Mode::Html).unwrap_err();
        assert_eq!(err, SanitizeError::InputTooLarge { len: 18, limit: 8 });
        assert_eq!(sanitizer.sanitize("<p>long enough</p>", Mode::Html), "");
    }

    #[test]
    fn test_custom_policy_threads_through() {
        let policy = Policy::standard().with_extra_tag(Profile::Html, "section");
        let sanitizer = Sanitizer::new(policy, SanitizerConfig::default());
        assert_eq!(
            sanitizer.sanitize_content("<section><p>x</p></section>", ContentOptions::default()),
            "<section><p>x</p></section>"
        );
        assert_eq!(
            sanitize_content("<section><p>x</p></section>", ContentOptions::default()),
            "<p>x</p>"
        );
    }

    #[test]
    fn test_sanitizer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Sanitizer>();
        assert_send_sync::<Policy>();
        assert_send_sync::<ThreatDetector>();
    }

    #[test]
    fn test_error_messages() {
        let err = SanitizeError::InputTooLarge { len: 10, limit: 4 };
        assert_eq!(err.to_string(), "Input too large: 10 bytes (limit 4)");
    }
}
