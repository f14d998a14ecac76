/// UI hierarchy parsing.
///
/// Turns a UiAutomator-style XML page source into an owned [`UiNode`] tree.
/// Attribute lookups happen exactly once here, so the extractor works on a
/// fixed record instead of probing loosely-typed nodes.
use crate::errors::{GridTapError, GridTapResult};
use crate::perception::types::UiNode;

/// Parse an XML page source into its root [`UiNode`].
///
/// The document element is the root (UiAutomator's `<hierarchy>`), so the
/// traversal order matches the raw document order.
pub fn parse_hierarchy(xml: &str) -> GridTapResult<UiNode> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| GridTapError::Parse(format!("hierarchy document: {e}")))?;
    let root = convert(doc.root_element());
    tracing::trace!(children = root.children.len(), "hierarchy parsed");
    Ok(root)
}

fn convert(node: roxmltree::Node<'_, '_>) -> UiNode {
    let attr = |name: &str| node.attribute(name).unwrap_or_default().to_string();
    let flag = |name: &str, default: bool| match node.attribute(name) {
        Some(v) => v == "true",
        None => default,
    };

    // UiAutomator2 names each tag after the widget class; fall back to it
    // when the `class` attribute is missing.
    let class_name = match node.attribute("class") {
        Some(c) => c.to_string(),
        None if node.tag_name().name() != "hierarchy" => node.tag_name().name().to_string(),
        None => String::new(),
    };

    UiNode {
        text: attr("text"),
        class_name,
        bounds: attr("bounds"),
        resource_id: attr("resource-id"),
        content_desc: attr("content-desc"),
        clickable: flag("clickable", false),
        enabled: flag("enabled", true),
        focusable: flag("focusable", false),
        focused: flag("focused", false),
        checked: flag("checked", false),
        selected: flag("selected", false),
        displayed: flag("displayed", true),
        children: node
            .children()
            .filter(|c| c.is_element())
            .map(convert)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hierarchy rotation="0">
  <android.widget.FrameLayout class="android.widget.FrameLayout" bounds="[0,0][1080,2400]">
    <android.widget.Button class="android.widget.Button" text="OK" clickable="true"
        resource-id="com.example:id/ok" bounds="[100,200][300,400]" />
    <android.widget.TextView text="Title" enabled="false" bounds="[0,0][10,10]" />
  </android.widget.FrameLayout>
</hierarchy>"#;

    #[test]
    fn builds_tree_with_defaults() {
        let root = parse_hierarchy(SOURCE).unwrap();
        assert_eq!(root.class_name, "");
        assert_eq!(root.children.len(), 1);

        let frame = &root.children[0];
        assert_eq!(frame.class_name, "android.widget.FrameLayout");
        assert!(frame.enabled);
        assert!(!frame.clickable);
        assert_eq!(frame.children.len(), 2);

        let button = &frame.children[0];
        assert_eq!(button.text, "OK");
        assert!(button.clickable);
        assert_eq!(button.resource_id, "com.example:id/ok");

        let label = &frame.children[1];
        assert_eq!(label.class_name, "android.widget.TextView");
        assert!(!label.enabled);
        assert_eq!(label.content_desc, "");
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = parse_hierarchy("<hierarchy><node></hierarchy>").unwrap_err();
        assert!(matches!(err, GridTapError::Parse(_)));
    }
}
