use std::collections::HashSet;

use gridtap_lib::{
    errors::GridTapError,
    perception::{
        extractor::{extract, extract_from_source, ExtractOptions},
        hierarchy::parse_hierarchy,
        types::{FilterConfig, ScreenElement, UiNode},
    },
};

const SETTINGS_PAGE: &str = include_str!("fixtures/settings_page.xml");
const W: u32 = 1080;
const H: u32 = 2400;

fn labels(elements: &[ScreenElement]) -> Vec<String> {
    elements
        .iter()
        .map(|e| {
            if !e.text.is_empty() {
                e.text.clone()
            } else if !e.content_desc.is_empty() {
                e.content_desc.clone()
            } else {
                e.class.clone()
            }
        })
        .collect()
}

fn filters(text: &[&str], class: &[&str]) -> FilterConfig {
    FilterConfig {
        filter: text.iter().map(|s| s.to_string()).collect(),
        class_filter: class.iter().map(|s| s.to_string()).collect(),
    }
}

// =========================================================================
// Default inclusion policy
// =========================================================================

#[test]
fn default_mode_keeps_interactive_and_labelled_nodes() {
    let session = extract_from_source(SETTINGS_PAGE, W, H, &ExtractOptions::default()).unwrap();
    assert_eq!(
        labels(session.elements()),
        vec![
            "Navigate up",
            "Settings",
            "EditText",
            "RecyclerView",
            "Sponsored",
            "Network & internet",
            "Connected devices",
        ]
    );

    let indices: Vec<usize> = session.elements().iter().map(|e| e.index).collect();
    assert_eq!(indices, (0..7).collect::<Vec<_>>(), "Dense pre-order indices");

    let search = &session.elements()[2];
    assert_eq!(search.resource_id, "search_src_text");
    assert_eq!(search.bounds, "[42,290][1038,416]");
    assert!(!search.clickable);
}

#[test]
fn response_json_shape() {
    let session = extract_from_source(SETTINGS_PAGE, W, H, &ExtractOptions::default()).unwrap();
    let json = serde_json::to_value(
        gridtap_lib::executor::responses::ElementsResponse::from(&session),
    )
    .unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["element_count"], 7);
    assert_eq!(
        json["elements"][0],
        serde_json::json!({
            "index": 0,
            "class": "ImageButton",
            "bounds": "[0,80][147,248]",
            "content_desc": "Navigate up",
            "clickable": true
        })
    );
}

// =========================================================================
// Filtering never prunes the subtree
// =========================================================================

#[test]
fn text_filter_keeps_descendants() {
    let options = ExtractOptions {
        filters: filters(&["Sponsored"], &[]),
        include_all: false,
    };
    let session = extract_from_source(SETTINGS_PAGE, W, H, &options).unwrap();
    let got = labels(session.elements());
    assert!(!got.contains(&"Sponsored".to_string()));
    assert!(got.contains(&"Network & internet".to_string()));
    assert_eq!(session.elements()[4].text, "Network & internet");
    assert_eq!(session.elements()[4].index, 4);
}

#[test]
fn class_filter_keeps_descendants() {
    let options = ExtractOptions {
        filters: filters(&[], &["androidx.recyclerview.widget.RecyclerView"]),
        include_all: false,
    };
    let session = extract_from_source(SETTINGS_PAGE, W, H, &options).unwrap();
    assert_eq!(
        labels(session.elements()),
        vec![
            "Navigate up",
            "Settings",
            "EditText",
            "Sponsored",
            "Network & internet",
            "Connected devices",
        ]
    );
}

#[test]
fn filter_matches_trimmed_text() {
    let options = ExtractOptions {
        filters: filters(&["Connected devices"], &[]),
        include_all: false,
    };
    let session = extract_from_source(SETTINGS_PAGE, W, H, &options).unwrap();
    assert!(session.find_text("Connected devices", false).is_empty());
}

// =========================================================================
// include_all and determinism
// =========================================================================

#[test]
fn include_all_is_superset_of_default() {
    let default = extract_from_source(SETTINGS_PAGE, W, H, &ExtractOptions::default()).unwrap();
    let all = extract_from_source(
        SETTINGS_PAGE,
        W,
        H,
        &ExtractOptions {
            include_all: true,
            ..ExtractOptions::default()
        },
    )
    .unwrap();

    let key = |e: &ScreenElement| (e.bounds.clone(), e.text.clone(), e.class.clone());
    let all_keys: HashSet<_> = all.elements().iter().map(key).collect();
    for e in default.elements() {
        assert!(all_keys.contains(&key(e)), "{e:?} missing from include_all output");
    }
    assert_eq!(all.len(), 11);
    // Off-screen and degenerate nodes stay out even in include_all mode.
    assert!(all.find_text("Below the fold", false).is_empty());
    assert!(all.find_text("Broken", false).is_empty());
}

#[test]
fn extraction_is_deterministic() {
    let root = parse_hierarchy(SETTINGS_PAGE).unwrap();
    let first = extract(&root, W, H, &ExtractOptions::default());
    let second = extract(&root, W, H, &ExtractOptions::default());
    assert_eq!(first, second);
}

// =========================================================================
// Bounds edge cases
// =========================================================================

#[test]
fn half_open_screen_test() {
    let mut root = UiNode::default();
    root.children = vec![
        UiNode {
            text: "at width".into(),
            bounds: "[1078,0][1082,10]".into(),
            ..UiNode::default()
        },
        UiNode {
            text: "last column".into(),
            bounds: "[1078,0][1080,10]".into(),
            ..UiNode::default()
        },
        UiNode {
            text: "at height".into(),
            bounds: "[0,2398][10,2402]".into(),
            ..UiNode::default()
        },
    ];
    let session = extract(&root, W, H, &ExtractOptions::default());
    assert_eq!(labels(session.elements()), vec!["last column"]);
}

#[test]
fn ok_text_emitted_regardless_of_flags() {
    let node = UiNode {
        text: "OK".into(),
        bounds: "[100,200][300,400]".into(),
        enabled: false,
        ..UiNode::default()
    };
    let session = extract(&node, W, H, &ExtractOptions::default());
    assert_eq!(session.len(), 1);
    assert_eq!(session.center_of(0).unwrap(), (200, 300));
}

#[test]
fn malformed_document_yields_no_partial_result() {
    let broken = &SETTINGS_PAGE[..SETTINGS_PAGE.len() / 2];
    let err = extract_from_source(broken, W, H, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, GridTapError::Parse(_)));
}
