/// Screen element extraction.
///
/// Walks a [`UiNode`] tree depth-first (pre-order) and emits every on-screen
/// node that survives the filters and the inclusion policy, numbering the
/// emitted nodes in visitation order.
///
/// Indices are only meaningful inside the [`ExtractionSession`] that produced
/// them. Any tap, scroll, typing or navigation changes the tree, so callers
/// must extract again before acting on an index.
use crate::errors::{GridTapError, GridTapResult};
use crate::perception::hierarchy::parse_hierarchy;
use crate::perception::types::{Bounds, FilterConfig, ScreenElement, UiNode};

/// Class-name suffix that marks a text input widget.
const TEXT_INPUT_MARKER: &str = "EditText";

/// Per-call extraction settings.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub filters: FilterConfig,
    /// Emit every on-screen node, not just interactive or labelled ones.
    pub include_all: bool,
}

/// Elements from a single snapshot, with the screen size they were checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSession {
    elements: Vec<ScreenElement>,
    screen_width: u32,
    screen_height: u32,
}

impl ExtractionSession {
    pub fn elements(&self) -> &[ScreenElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<ScreenElement> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    /// Indices are dense, so the index doubles as the position.
    pub fn get(&self, index: usize) -> Option<&ScreenElement> {
        self.elements.get(index).filter(|e| e.index == index)
    }

    /// Tap point for `index` in this snapshot.
    pub fn center_of(&self, index: usize) -> GridTapResult<(i32, i32)> {
        self.get(index)
            .and_then(ScreenElement::center)
            .ok_or(GridTapError::ElementNotFound { index })
    }

    /// Elements whose text or content description matches `query`.
    ///
    /// Exact mode compares trimmed strings; partial mode is a
    /// case-insensitive substring match.
    pub fn find_text(&self, query: &str, partial: bool) -> Vec<&ScreenElement> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.elements
            .iter()
            .filter(|e| {
                [e.text.as_str(), e.content_desc.as_str()].iter().any(|s| {
                    if partial {
                        s.to_lowercase().contains(&needle)
                    } else {
                        *s == query
                    }
                })
            })
            .collect()
    }
}

/// Flatten `root` into an indexed element list for a `screen_width` x `screen_height` display.
pub fn extract(
    root: &UiNode,
    screen_width: u32,
    screen_height: u32,
    options: &ExtractOptions,
) -> ExtractionSession {
    let mut walker = Walker {
        screen_width: i64::from(screen_width),
        screen_height: i64::from(screen_height),
        options,
        next_index: 0,
        out: Vec::new(),
    };
    walker.visit(root);

    tracing::debug!(
        count = walker.out.len(),
        include_all = options.include_all,
        "screen elements extracted"
    );

    ExtractionSession {
        elements: walker.out,
        screen_width,
        screen_height,
    }
}

/// Parse `page_source` and extract in one step. Malformed markup yields no
/// partial result.
pub fn extract_from_source(
    page_source: &str,
    screen_width: u32,
    screen_height: u32,
    options: &ExtractOptions,
) -> GridTapResult<ExtractionSession> {
    let root = parse_hierarchy(page_source)?;
    Ok(extract(&root, screen_width, screen_height, options))
}

struct Walker<'a> {
    screen_width: i64,
    screen_height: i64,
    options: &'a ExtractOptions,
    next_index: usize,
    out: Vec<ScreenElement>,
}

impl Walker<'_> {
    fn visit(&mut self, node: &UiNode) {
        if let Some(element) = self.evaluate(node) {
            self.out.push(element);
            self.next_index += 1;
        }
        // Filtering only stops emission; children are always walked.
        for child in &node.children {
            self.visit(child);
        }
    }

    fn evaluate(&self, node: &UiNode) -> Option<ScreenElement> {
        let text = node.text.trim();
        if self.options.filters.excludes(text, &node.class_name) {
            tracing::trace!(text, class = %node.class_name, "node filtered");
            return None;
        }

        let Some(bounds) = Bounds::parse(&node.bounds) else {
            tracing::trace!(bounds = %node.bounds, "degenerate bounds; node skipped");
            return None;
        };
        if !self.on_screen(bounds) {
            return None;
        }

        let content_desc = node.content_desc.trim();
        if !self.options.include_all {
            let interactive = node.clickable
                || node.focusable
                || node.class_name.ends_with(TEXT_INPUT_MARKER);
            let has_content = !text.is_empty() || !content_desc.is_empty();
            if !(interactive && node.enabled) && !has_content {
                return None;
            }
        }

        Some(ScreenElement {
            index: self.next_index,
            text: text.to_string(),
            class: last_segment(&node.class_name, '.').to_string(),
            bounds: bounds.to_string(),
            content_desc: content_desc.to_string(),
            clickable: node.clickable,
            resource_id: last_segment(&node.resource_id, '/').to_string(),
        })
    }

    /// Half-open test on the integer centre.
    fn on_screen(&self, bounds: Bounds) -> bool {
        let (cx, cy) = bounds.center();
        let (cx, cy) = (i64::from(cx), i64::from(cy));
        (0..self.screen_width).contains(&cx) && (0..self.screen_height).contains(&cy)
    }
}

fn last_segment(value: &str, sep: char) -> &str {
    value.rsplit(sep).next().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(text: &str, class: &str, bounds: &str) -> UiNode {
        UiNode {
            text: text.into(),
            class_name: class.into(),
            bounds: bounds.into(),
            ..UiNode::default()
        }
    }

    fn opts() -> ExtractOptions {
        ExtractOptions::default()
    }

    #[test]
    fn text_node_emitted_without_interactivity() {
        let root = node("OK", "android.widget.TextView", "[100,200][300,400]");
        let session = extract(&root, 1080, 2400, &opts());
        assert_eq!(session.len(), 1);
        let el = &session.elements()[0];
        assert_eq!(el.index, 0);
        assert_eq!(el.text, "OK");
        assert_eq!(el.class, "TextView");
        assert_eq!(el.bounds, "[100,200][300,400]");
        assert_eq!(session.center_of(0).unwrap(), (200, 300));
    }

    #[test]
    fn center_on_right_or_bottom_edge_is_off_screen() {
        let mut root = node("", "Frame", "[0,0][0,0]");
        root.children = vec![
            node("right", "T", "[1080,0][1080,10]"),
            node("bottom", "T", "[0,2400][10,2400]"),
            node("inside", "T", "[1078,2398][1080,2400]"),
        ];
        let session = extract(&root, 1080, 2400, &opts());
        let texts: Vec<_> = session.elements().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["inside"]);
    }

    #[test]
    fn huge_coordinates_are_off_screen_not_a_panic() {
        let mut root = node("Huge", "T", "[2000000000,0][2000000000,10]");
        root.children = vec![node("Small", "T", "[0,0][20,20]")];
        let session = extract(&root, 1080, 2400, &opts());
        let texts: Vec<_> = session.elements().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Small"]);
    }

    #[test]
    fn degenerate_bounds_never_emitted_but_children_walked() {
        let mut root = node("Broken", "T", "[10,10]");
        root.children = vec![node("Child", "T", "[0,0][20,20]")];
        let session = extract(&root, 1080, 2400, &ExtractOptions {
            include_all: true,
            ..opts()
        });
        assert_eq!(session.len(), 1);
        assert_eq!(session.elements()[0].text, "Child");
    }

    #[test]
    fn genuine_origin_element_is_kept() {
        let root = node("Corner", "T", "[0,0][0,0]");
        let session = extract(&root, 1080, 2400, &opts());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn decorative_container_dropped_unless_include_all() {
        let root = node("", "android.widget.LinearLayout", "[0,0][100,100]");
        assert!(extract(&root, 1080, 2400, &opts()).is_empty());
        let all = extract(&root, 1080, 2400, &ExtractOptions {
            include_all: true,
            ..opts()
        });
        assert_eq!(all.len(), 1);
        assert_eq!(all.elements()[0].class, "LinearLayout");
    }

    #[test]
    fn disabled_interactive_node_needs_content() {
        let mut button = node("", "android.widget.Button", "[0,0][100,100]");
        button.clickable = true;
        button.enabled = false;
        assert!(extract(&button, 1080, 2400, &opts()).is_empty());

        button.content_desc = "Send".into();
        let session = extract(&button, 1080, 2400, &opts());
        assert_eq!(session.elements()[0].content_desc, "Send");
        assert!(session.elements()[0].clickable);
    }

    #[test]
    fn edit_text_counts_as_interactive() {
        let field = node("", "android.widget.EditText", "[0,0][100,100]");
        assert_eq!(extract(&field, 1080, 2400, &opts()).len(), 1);
    }

    #[test]
    fn resource_id_is_shortened() {
        let mut n = node("Go", "Button", "[0,0][10,10]");
        n.resource_id = "com.example.app:id/go_button".into();
        let session = extract(&n, 1080, 2400, &opts());
        assert_eq!(session.elements()[0].resource_id, "go_button");
    }

    #[test]
    fn find_text_exact_and_partial() {
        let mut root = node("", "Frame", "[0,0][0,0]");
        root.children = vec![
            node("Settings", "T", "[0,0][10,10]"),
            node("Network settings", "T", "[0,20][10,30]"),
        ];
        let session = extract(&root, 1080, 2400, &opts());
        assert_eq!(session.find_text("Settings", false).len(), 1);
        assert_eq!(session.find_text("settings", true).len(), 2);
        assert!(session.find_text("  ", true).is_empty());
    }

    #[test]
    fn unknown_index_is_not_found() {
        let session = extract(&node("A", "T", "[0,0][10,10]"), 1080, 2400, &opts());
        assert!(matches!(
            session.center_of(7),
            Err(GridTapError::ElementNotFound { index: 7 })
        ));
    }
}
