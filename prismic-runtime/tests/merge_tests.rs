use pretty_assertions::assert_eq;
use prismic_runtime::{merge_preview_data, MergeStrategy};
use proptest::prelude::*;
use serde_json::{json, Value};

// ── Deep merge ───────────────────────────────────────────────────

#[test]
fn same_type_preview_deep_merges() {
    let static_data = json!({"prismicPage": {"foo": "bar", "hello": "world"}});
    let preview = json!({"prismicPage": {"foo": "bar", "hello": "CHANGED"}});

    let merged = merge_preview_data(&static_data, &preview, MergeStrategy::Auto);
    assert_eq!(merged, json!({"prismicPage": {"foo": "bar", "hello": "CHANGED"}}));
}

#[test]
fn deep_merge_keeps_static_only_keys() {
    let static_data = json!({
        "prismicPage": {"data": {"title": "Old", "footer": "Kept"}},
        "site": {"name": "Example"}
    });
    let preview = json!({"prismicPage": {"data": {"title": "New"}}});

    let merged = merge_preview_data(&static_data, &preview, MergeStrategy::DeepMerge);
    assert_eq!(
        merged,
        json!({
            "prismicPage": {"data": {"title": "New", "footer": "Kept"}},
            "site": {"name": "Example"}
        })
    );
}

#[test]
fn arrays_are_replaced_not_concatenated() {
    let static_data = json!({"prismicPage": {"tags": ["a", "b", "c"], "body": [{"x": 1}, {"x": 2}]}});
    let preview = json!({"prismicPage": {"tags": ["z"], "body": [{"y": 3}]}});

    let merged = merge_preview_data(&static_data, &preview, MergeStrategy::Auto);
    assert_eq!(merged["prismicPage"]["tags"], json!(["z"]));
    assert_eq!(merged["prismicPage"]["body"], json!([{"y": 3}]));
}

#[test]
fn null_in_preview_replaces_static_value() {
    let static_data = json!({"prismicPage": {"image": {"url": "a.png"}}});
    let preview = json!({"prismicPage": {"image": null}});

    let merged = merge_preview_data(&static_data, &preview, MergeStrategy::DeepMerge);
    assert_eq!(merged["prismicPage"]["image"], Value::Null);
}

// ── Traverse and replace ─────────────────────────────────────────

fn nested_static() -> Value {
    json!({
        "allPrismicPage": {
            "nodes": [
                {"id": "other", "data": {"title": "Other"}},
                {
                    "id": "wrapper",
                    "data": {
                        "related": {"id": "testId", "uid": "target", "data": {"title": "Old"}}
                    }
                }
            ]
        },
        "site": {"id": "site", "title": "Example"}
    })
}

#[test]
fn cross_type_preview_replaces_matching_object() {
    let preview = json!({"prismicArticle": {"id": "testId", "data": {"title": "New"}}});

    let merged = merge_preview_data(&nested_static(), &preview, MergeStrategy::Auto);

    let mut expected = nested_static();
    expected["allPrismicPage"]["nodes"][1]["data"]["related"]["data"] = json!({"title": "New"});
    assert_eq!(merged, expected);
    assert_eq!(
        merged["allPrismicPage"]["nodes"][1]["data"]["related"]["uid"],
        "target"
    );
}

#[test]
fn previewable_id_wins_over_node_id() {
    let static_data = json!({
        "page": {"id": "node-1", "_previewable": "prismic-1", "data": {"title": "Old"}}
    });
    let preview = json!({
        "prismicPage": {"id": "node-1-preview", "_previewable": "prismic-1", "data": {"title": "New"}}
    });

    let merged = merge_preview_data(&static_data, &preview, MergeStrategy::TraverseAndReplace);
    assert_eq!(merged["page"]["data"]["title"], "New");
    assert_eq!(merged["page"]["id"], "node-1-preview");
}

#[test]
fn every_occurrence_is_replaced() {
    let static_data = json!({
        "a": {"id": "x", "v": 1},
        "b": [{"id": "x", "v": 1}, {"id": "y", "v": 1}]
    });
    let preview = json!({"prismicThing": {"id": "x", "v": 2}});

    let merged = merge_preview_data(&static_data, &preview, MergeStrategy::TraverseAndReplace);
    assert_eq!(merged["a"]["v"], 2);
    assert_eq!(merged["b"][0]["v"], 2);
    assert_eq!(merged["b"][1]["v"], 1);
}

#[test]
fn preview_without_identity_leaves_static_data() {
    let preview = json!({"prismicArticle": {"data": {"title": "New"}}});
    let merged = merge_preview_data(&nested_static(), &preview, MergeStrategy::TraverseAndReplace);
    assert_eq!(merged, nested_static());
}

#[test]
fn bare_document_preview_is_accepted() {
    let preview = json!({"id": "testId", "data": {"title": "Bare"}});
    let merged = merge_preview_data(&nested_static(), &preview, MergeStrategy::TraverseAndReplace);
    assert_eq!(
        merged["allPrismicPage"]["nodes"][1]["data"]["related"]["data"]["title"],
        "Bare"
    );
}

#[test]
fn strategy_deserializes_from_snake_case() {
    let strategy: MergeStrategy = serde_json::from_str("\"traverse_and_replace\"").unwrap();
    assert_eq!(strategy, MergeStrategy::TraverseAndReplace);
    assert_eq!(MergeStrategy::default(), MergeStrategy::Auto);
}

// ── Properties ───────────────────────────────────────────────────

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 20, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..3)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn deep_merge_with_itself_is_identity(value in arb_json()) {
        let merged = merge_preview_data(&value, &value, MergeStrategy::DeepMerge);
        prop_assert_eq!(merged, value);
    }

    #[test]
    fn deep_merge_takes_every_preview_leaf(base in arb_json(), key in "[a-c]", leaf in any::<i32>()) {
        let mut preview = serde_json::Map::new();
        preview.insert(key.clone(), json!(leaf));
        let preview = Value::Object(preview);
        let merged = merge_preview_data(&json!({"root": base}), &preview, MergeStrategy::DeepMerge);
        prop_assert_eq!(&merged[key.as_str()], &json!(leaf));
    }
}
