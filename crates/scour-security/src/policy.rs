//! Tag and attribute policy
//!
//! Allow-lists for the HTML and SVG profiles, the forbidden-attribute
//! denylist and the set of tags whose content is discarded outright.
//! A `Policy` is built once and only ever read afterwards.

use std::collections::{BTreeSet, HashMap, HashSet};

use scour_dom::Namespace;
use serde::{Deserialize, Serialize};

/// Attribute-map key that applies to every tag of a profile
pub const WILDCARD: &str = "*";

/// Tags kept in HTML content
pub const ALLOWED_HTML_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "blockquote", "br", "caption", "cite", "code",
    "col", "colgroup", "dd", "del", "details", "dfn", "div", "dl", "dt", "em",
    "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img",
    "ins", "kbd", "li", "mark", "ol", "p", "pre", "q", "rp", "rt", "ruby", "s",
    "samp", "small", "span", "strong", "sub", "summary", "sup", "table", "tbody",
    "td", "tfoot", "th", "thead", "time", "tr", "u", "ul", "var", "wbr",
];

/// Tags kept in SVG content (lowercased; the parser restores camelCase)
pub const ALLOWED_SVG_TAGS: &[&str] = &[
    // structure
    "svg", "g", "defs", "symbol", "use", "title", "desc",
    // shapes
    "path", "rect", "circle", "ellipse", "line", "polyline", "polygon",
    // text
    "text", "tspan", "textpath",
    // paint servers
    "lineargradient", "radialgradient", "stop", "pattern",
    // clipping, masking, markers
    "clippath", "mask", "marker",
    // filters
    "filter", "feblend", "fecolormatrix", "fecomposite", "fedropshadow", "feflood",
    "fegaussianblur", "femerge", "femergenode", "femorphology", "feoffset",
];

/// Attributes allowed per tag in HTML content
pub const ALLOWED_HTML_ATTRIBUTES: &[(&str, &[&str])] = &[
    (WILDCARD, &[
        "class", "id", "title", "lang", "dir", "role",
        "aria-label", "aria-labelledby", "aria-describedby", "aria-hidden",
    ]),
    ("a", &["href", "target", "rel"]),
    ("img", &["src", "alt", "width", "height", "loading"]),
    ("td", &["colspan", "rowspan", "align"]),
    ("th", &["colspan", "rowspan", "align", "scope"]),
    ("col", &["span"]),
    ("colgroup", &["span"]),
    ("ol", &["start", "type", "reversed"]),
    ("li", &["value"]),
    ("details", &["open"]),
    ("time", &["datetime"]),
];

const FILTER_PRIMITIVE_ATTRIBUTES: &[&str] = &[
    "in", "in2", "result", "stddeviation", "dx", "dy", "mode", "type", "values",
    "operator", "k1", "k2", "k3", "k4", "radius", "flood-color", "flood-opacity",
];

/// Attributes allowed per tag in SVG content (presentation and geometry)
pub const ALLOWED_SVG_ATTRIBUTES: &[(&str, &[&str])] = &[
    (WILDCARD, &[
        "id", "class", "transform", "x", "y", "width", "height",
        "fill", "fill-opacity", "fill-rule", "stroke", "stroke-width", "stroke-opacity",
        "stroke-dasharray", "stroke-dashoffset", "stroke-linecap", "stroke-linejoin",
        "stroke-miterlimit", "opacity", "color", "display", "visibility",
        "clip-path", "clip-rule", "mask", "filter", "marker-start", "marker-mid", "marker-end",
        "font-family", "font-size", "font-weight", "font-style", "text-anchor",
        "dominant-baseline", "alignment-baseline", "letter-spacing", "role", "aria-label",
    ]),
    ("svg", &["viewbox", "preserveaspectratio", "xmlns", "xmlns:xlink", "version"]),
    ("symbol", &["viewbox", "preserveaspectratio"]),
    ("use", &["href", "xlink:href"]),
    ("path", &["d", "pathlength"]),
    ("rect", &["rx", "ry"]),
    ("circle", &["cx", "cy", "r"]),
    ("ellipse", &["cx", "cy", "rx", "ry"]),
    ("line", &["x1", "y1", "x2", "y2"]),
    ("polyline", &["points"]),
    ("polygon", &["points"]),
    ("text", &["dx", "dy", "rotate", "textlength", "lengthadjust"]),
    ("tspan", &["dx", "dy", "rotate", "textlength", "lengthadjust"]),
    ("textpath", &["href", "xlink:href", "startoffset"]),
    ("lineargradient", &[
        "x1", "y1", "x2", "y2", "gradientunits", "gradienttransform", "spreadmethod",
        "href", "xlink:href",
    ]),
    ("radialgradient", &[
        "cx", "cy", "r", "fx", "fy", "fr", "gradientunits", "gradienttransform",
        "spreadmethod", "href", "xlink:href",
    ]),
    ("stop", &["offset", "stop-color", "stop-opacity"]),
    ("pattern", &[
        "patternunits", "patterncontentunits", "patterntransform", "viewbox",
        "preserveaspectratio",
    ]),
    ("clippath", &["clippathunits"]),
    ("mask", &["maskunits", "maskcontentunits"]),
    ("marker", &[
        "viewbox", "refx", "refy", "markerwidth", "markerheight", "markerunits",
        "orient", "preserveaspectratio",
    ]),
    ("filter", &["filterunits", "primitiveunits"]),
    ("feblend", FILTER_PRIMITIVE_ATTRIBUTES),
    ("fecolormatrix", FILTER_PRIMITIVE_ATTRIBUTES),
    ("fecomposite", FILTER_PRIMITIVE_ATTRIBUTES),
    ("fedropshadow", FILTER_PRIMITIVE_ATTRIBUTES),
    ("feflood", FILTER_PRIMITIVE_ATTRIBUTES),
    ("fegaussianblur", FILTER_PRIMITIVE_ATTRIBUTES),
    ("femerge", FILTER_PRIMITIVE_ATTRIBUTES),
    ("femergenode", FILTER_PRIMITIVE_ATTRIBUTES),
    ("femorphology", FILTER_PRIMITIVE_ATTRIBUTES),
    ("feoffset", FILTER_PRIMITIVE_ATTRIBUTES),
];

/// Attributes that are never kept, whatever an allow-list says.
///
/// Every name starting with `on` is forbidden as well; the handlers listed
/// here are the common ones, spelled out for introspection.
pub const FORBIDDEN_ATTRIBUTES: &[&str] = &[
    "onabort", "onanimationend", "onanimationstart", "onbegin", "onblur", "onchange",
    "onclick", "oncontextmenu", "oncopy", "oncut", "ondblclick", "ondrag", "ondrop",
    "onend", "onerror", "onfocus", "onfocusin", "oninput", "onkeydown", "onkeypress",
    "onkeyup", "onload", "onmousedown", "onmouseenter", "onmouseleave", "onmousemove",
    "onmouseout", "onmouseover", "onmouseup", "onpaste", "onpointerdown", "onrepeat",
    "onreset", "onresize", "onscroll", "onsubmit", "ontoggle", "ontransitionend",
    "onunload", "onwheel",
    "style", "formaction", "action", "srcdoc", "background", "ping", "xml:base",
];

/// Tags removed together with everything inside them (lowercased)
pub const DANGEROUS_TAGS: &[&str] = &[
    "script", "iframe", "object", "embed", "style", "link", "meta", "base", "form",
    "input", "textarea", "select", "button", "frame", "frameset",
    // SVG
    "foreignobject", "animate", "animatemotion", "animatetransform", "animatecolor", "set",
];

/// Which markup is being sanitized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// HTML only; SVG elements are unwrapped
    Html,
    /// HTML with inline SVG (both profiles apply, each to its namespace)
    Mixed,
    /// Stand-alone SVG diagram
    Svg,
}

/// An allow-list profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Html,
    Svg,
}

/// What happens to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDecision {
    /// Element survives; its attributes are checked against `Profile`
    Keep(Profile),
    /// Element is removed, its children take its place
    Unwrap,
    /// Element and all descendants are removed
    Discard,
}

#[derive(Debug, Clone, Default)]
struct ProfileRules {
    tags: HashSet<String>,
    attributes: HashMap<String, HashSet<String>>,
}

impl ProfileRules {
    fn from_tables(tags: &[&str], attributes: &[(&str, &[&str])]) -> Self {
        let mut rules = Self::default();
        for tag in tags {
            rules.tags.insert(tag.to_string());
        }
        for (tag, names) in attributes {
            let entry = rules.attributes.entry(tag.to_string()).or_default();
            entry.extend(names.iter().map(|name| name.to_string()));
        }
        rules
    }
}

/// Sanitization policy
#[derive(Debug, Clone)]
pub struct Policy {
    html: ProfileRules,
    svg: ProfileRules,
    forbidden_attributes: HashSet<String>,
    dangerous_tags: HashSet<String>,
}

impl Policy {
    /// The built-in policy
    pub fn standard() -> Self {
        Self {
            html: ProfileRules::from_tables(ALLOWED_HTML_TAGS, ALLOWED_HTML_ATTRIBUTES),
            svg: ProfileRules::from_tables(ALLOWED_SVG_TAGS, ALLOWED_SVG_ATTRIBUTES),
            forbidden_attributes: FORBIDDEN_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            dangerous_tags: DANGEROUS_TAGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Allow an additional tag in a profile
    pub fn with_extra_tag(mut self, profile: Profile, tag: &str) -> Self {
        self.rules_mut(profile).tags.insert(tag.to_ascii_lowercase());
        self
    }

    /// Allow an additional attribute on a tag (or `WILDCARD`) in a profile
    pub fn with_extra_attribute(mut self, profile: Profile, tag: &str, attr: &str) -> Self {
        self.rules_mut(profile)
            .attributes
            .entry(tag.to_ascii_lowercase())
            .or_default()
            .insert(attr.to_ascii_lowercase());
        self
    }

    fn rules(&self, profile: Profile) -> &ProfileRules {
        match profile {
            Profile::Html => &self.html,
            Profile::Svg => &self.svg,
        }
    }

    fn rules_mut(&mut self, profile: Profile) -> &mut ProfileRules {
        match profile {
            Profile::Html => &mut self.html,
            Profile::Svg => &mut self.svg,
        }
    }

    /// The profile that governs elements of `namespace` in `mode`, if any
    pub fn profile_for(mode: Mode, namespace: Namespace) -> Option<Profile> {
        match (mode, namespace) {
            (Mode::Html | Mode::Mixed, Namespace::Html) => Some(Profile::Html),
            (Mode::Mixed | Mode::Svg, Namespace::Svg) => Some(Profile::Svg),
            _ => None,
        }
    }

    /// Decide the fate of an element.
    ///
    /// Dangerous tags are discarded even if an allow-list names them.
    pub fn decide(&self, mode: Mode, namespace: Namespace, tag: &str) -> TagDecision {
        let tag = tag.to_ascii_lowercase();
        if self.is_dangerous_tag(&tag) {
            return TagDecision::Discard;
        }
        match Self::profile_for(mode, namespace) {
            Some(profile) if self.allows_tag(profile, &tag) => TagDecision::Keep(profile),
            _ => TagDecision::Unwrap,
        }
    }

    /// Check a (lowercase) tag against a profile's whitelist
    pub fn allows_tag(&self, profile: Profile, tag: &str) -> bool {
        self.rules(profile).tags.contains(tag)
    }

    /// Check a tag against the dangerous set
    pub fn is_dangerous_tag(&self, tag: &str) -> bool {
        self.dangerous_tags.contains(&tag.to_ascii_lowercase())
    }

    /// Check an attribute name against the denylist
    pub fn is_forbidden_attribute(&self, attr: &str) -> bool {
        let attr = attr.to_ascii_lowercase();
        attr.starts_with("on") || self.forbidden_attributes.contains(&attr)
    }

    /// Attributes a tag may keep: (wildcard ∪ tag-specific) − forbidden
    pub fn allowed_attributes(&self, profile: Profile, tag: &str) -> BTreeSet<&str> {
        let rules = self.rules(profile);
        let tag = tag.to_ascii_lowercase();

        let mut allowed: BTreeSet<&str> = BTreeSet::new();
        for key in [WILDCARD, tag.as_str()] {
            if let Some(names) = rules.attributes.get(key) {
                allowed.extend(names.iter().map(String::as_str));
            }
        }
        allowed.retain(|name| !self.is_forbidden_attribute(name));
        allowed
    }

    /// Check a single attribute on a tag
    pub fn allows_attribute(&self, profile: Profile, tag: &str, attr: &str) -> bool {
        self.allowed_attributes(profile, tag)
            .contains(attr.to_ascii_lowercase().as_str())
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::standard()
    }
}
