use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One node of a device UI hierarchy.
///
/// Every attribute is resolved once when the document is parsed; absent
/// string attributes are empty, absent flags take the UiAutomator defaults
/// (`enabled` and `displayed` true, everything else false).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiNode {
    pub text: String,
    pub class_name: String,
    /// Raw `"[x1,y1][x2,y2]"` string as reported by the driver.
    pub bounds: String,
    pub resource_id: String,
    pub content_desc: String,
    pub clickable: bool,
    pub enabled: bool,
    pub focusable: bool,
    pub focused: bool,
    pub checked: bool,
    pub selected: bool,
    pub displayed: bool,
    pub children: Vec<UiNode>,
}

impl Default for UiNode {
    fn default() -> Self {
        Self {
            text: String::new(),
            class_name: String::new(),
            bounds: String::new(),
            resource_id: String::new(),
            content_desc: String::new(),
            clickable: false,
            enabled: true,
            focusable: false,
            focused: false,
            checked: false,
            selected: false,
            displayed: true,
            children: Vec::new(),
        }
    }
}

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid integer regex"));

/// Pixel rectangle parsed from a bounds string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Bounds {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Scan `raw` for integer runs and take the first four as `(x1, y1, x2, y2)`.
    ///
    /// Returns `None` when fewer than four integers are present; callers treat
    /// that as the degenerate `(0,0,0,0)` rectangle, which is never emitted.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut nums = INTEGER_RE
            .find_iter(raw)
            .map(|m| m.as_str().parse::<i32>().ok());
        let x1 = nums.next()??;
        let y1 = nums.next()??;
        let x2 = nums.next()??;
        let y2 = nums.next()??;
        Some(Self { x1, y1, x2, y2 })
    }

    /// Centre point using integer division. Summed in `i64`; the midpoint of
    /// two `i32`s always fits back into `i32`.
    pub fn center(&self) -> (i32, i32) {
        (midpoint(self.x1, self.x2), midpoint(self.y1, self.y2))
    }
}

fn midpoint(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)) / 2) as i32
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}][{},{}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A flattened, addressable element from one extraction pass.
///
/// Empty string fields and a false `clickable` are dropped when serialised;
/// `index` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenElement {
    pub index: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bounds: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_desc: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clickable: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
}

impl ScreenElement {
    /// Centre of the element's canonical bounds.
    pub fn center(&self) -> Option<(i32, i32)> {
        Bounds::parse(&self.bounds).map(|b| b.center())
    }
}

/// Exclusion filters in the caller-owned `{ "filter": [...], "class_filter": [...] }` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Exact (trimmed) text values to skip.
    #[serde(default)]
    pub filter: HashSet<String>,
    /// Exact class names to skip.
    #[serde(default)]
    pub class_filter: HashSet<String>,
}

impl FilterConfig {
    pub fn is_empty(&self) -> bool {
        self.filter.is_empty() && self.class_filter.is_empty()
    }

    pub fn excludes(&self, trimmed_text: &str, class_name: &str) -> bool {
        self.filter.contains(trimmed_text) || self.class_filter.contains(class_name)
    }

    /// Union of two filter sets.
    pub fn merge(mut self, other: FilterConfig) -> Self {
        self.filter.extend(other.filter);
        self.class_filter.extend(other.class_filter);
        self
    }
}
