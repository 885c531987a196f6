//! URL policy for link and resource attributes

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Attributes whose values are navigated to or loaded
pub const URL_ATTRIBUTES: &[&str] = &["href", "src", "xlink:href"];

/// Schemes an absolute URL may use
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// `data:` image subtypes accepted when base64-encoded
pub const SAFE_DATA_IMAGE_TYPES: &[&str] = &["png", "jpeg", "gif", "webp", "svg+xml"];

static SCRIPT_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:javascript|vbscript):").expect("invalid script scheme regex")
});

static SAFE_DATA_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    let types: Vec<String> = SAFE_DATA_IMAGE_TYPES.iter().map(|t| regex::escape(t)).collect();
    let pattern = format!(r"(?i)^data:image/(?:{});base64,", types.join("|"));
    Regex::new(&pattern).expect("invalid data image regex")
});

/// Check whether an attribute carries a URL
pub fn is_url_attribute(name: &str) -> bool {
    URL_ATTRIBUTES.iter().any(|attr| attr.eq_ignore_ascii_case(name))
}

/// Validate an attribute value against the URL policy.
///
/// Attributes that do not carry URLs always pass. Script schemes are matched
/// on the collapsed value; `data:` images must match on the trimmed value,
/// so whitespace inside the media type is never collapsed into a safe one.
pub fn is_safe_url(attribute: &str, raw_value: &str) -> bool {
    if !is_url_attribute(attribute) {
        return true;
    }

    let normalized = normalize_url(raw_value);

    if SCRIPT_SCHEME.is_match(&normalized) {
        return false;
    }

    if normalized.starts_with("data:") {
        return SAFE_DATA_IMAGE.is_match(raw_value.trim());
    }

    match Url::parse(&normalized) {
        Ok(url) => ALLOWED_SCHEMES.contains(&url.scheme()),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Lowercase and strip whitespace and control characters.
///
/// Browsers ignore tabs and newlines inside a scheme, so `java\tscript:`
/// has to be caught in its collapsed form.
fn normalize_url(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_schemes_rejected() {
        assert!(!is_safe_url("href", "javascript:alert(1)"));
        assert!(!is_safe_url("href", "  JavaScript:alert(1)"));
        assert!(!is_safe_url("src", "vbscript:msgbox"));
        assert!(!is_safe_url("xlink:href", "java\tscript:alert(1)"));
        assert!(!is_safe_url("href", "java\nscript:alert(1)"));
        assert!(!is_safe_url("href", "\u{0001}javascript:alert(1)"));
    }

    #[test]
    fn test_allowed_schemes() {
        assert!(is_safe_url("href", "https://example.com/a?b=c"));
        assert!(is_safe_url("href", "HTTP://EXAMPLE.COM"));
        assert!(is_safe_url("href", "mailto:someone@example.com"));
        assert!(!is_safe_url("href", "ftp://example.com"));
        assert!(!is_safe_url("href", "file:///etc/passwd"));
        assert!(!is_safe_url("src", "blob:https://example.com/uuid"));
    }

    #[test]
    fn test_relative_references() {
        assert!(is_safe_url("href", "/docs/page"));
        assert!(is_safe_url("href", "#section-2"));
        assert!(is_safe_url("href", "?page=2"));
        assert!(is_safe_url("href", "images/cat.png"));
        assert!(is_safe_url("href", "//cdn.example.com/x.png"));
        assert!(is_safe_url("href", ""));
    }

    #[test]
    fn test_data_urls() {
        assert!(is_safe_url("src", "data:image/png;base64,iVBORw0KGgo="));
        assert!(is_safe_url("src", "DATA:IMAGE/SVG+XML;BASE64,PHN2Zz4="));
        assert!(is_safe_url("href", "data:image/webp;base64,UklGR"));
        assert!(!is_safe_url("src", "data:image/png,rawbytes"));
        assert!(!is_safe_url("src", "data:image/svg+xml,<svg onload=alert(1)>"));
        assert!(!is_safe_url("href", "data:text/html;base64,PHNjcmlwdD4="));
        assert!(!is_safe_url("src", "data:image/bmp;base64,Qk0="));
    }

    #[test]
    fn test_data_urls_with_inner_whitespace_rejected() {
        assert!(is_safe_url("src", "  data:image/png;base64,AAAA  "));
        assert!(!is_safe_url("src", "data:image/png ;base64,AAAA"));
        assert!(!is_safe_url("src", "data:image/png;\tbase64,AAAA"));
        assert!(!is_safe_url("src", "data: image/png;base64,AAAA"));
        assert!(!is_safe_url("src", "data:image/png\u{3000};base64,AAAA"));
        assert!(!is_safe_url("href", "da\nta:text/html;base64,PHNjcmlwdD4="));
    }

    #[test]
    fn test_non_url_attributes_pass() {
        assert!(is_safe_url("title", "javascript:alert(1)"));
        assert!(is_url_attribute("XLINK:HREF"));
        assert!(!is_url_attribute("alt"));
    }
}
