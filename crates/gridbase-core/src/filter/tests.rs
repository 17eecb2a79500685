use crate::filter::{Conjunction, FilterLeaf, FilterNode, FilterValue, Operator, fingerprint};
use serde_json::json;

fn sample_tree() -> FilterNode {
    FilterNode::and(vec![
        FilterNode::leaf("fldName", Operator::Contains, FilterValue::literal("ann")),
        FilterNode::or(vec![
            FilterNode::leaf("fldAge", Operator::IsGreater, FilterValue::literal(30)),
            FilterNode::leaf("fldAge", Operator::IsLess, FilterValue::field_ref("fldMin")),
        ]),
    ])
}

#[test]
fn filter_tree_decodes_request_json() {
    let decoded: FilterNode = serde_json::from_value(json!({
        "conjunction": "and",
        "children": [
            { "fieldId": "fldName", "operator": "contains", "value": { "literal": "ann" } },
            {
                "conjunction": "or",
                "children": [
                    { "fieldId": "fldAge", "operator": "isGreater", "value": { "literal": 30 } },
                    { "fieldId": "fldAge", "operator": "isLess", "value": { "fieldRef": "fldMin" } }
                ]
            }
        ]
    }))
    .expect("filter json should decode");

    assert_eq!(decoded, sample_tree());
}

#[test]
fn leaf_value_accepts_missing_and_explicit_null() {
    let missing: FilterLeaf =
        serde_json::from_value(json!({ "fieldId": "f", "operator": "isEmpty" }))
            .expect("leaf without value should decode");
    assert_eq!(missing.value, FilterValue::Null);

    let explicit: FilterLeaf =
        serde_json::from_value(json!({ "fieldId": "f", "operator": "is", "value": null }))
            .expect("leaf with null value should decode");
    assert!(explicit.value.is_null());

    let keyed: FilterLeaf = serde_json::from_value(json!({
        "fieldId": "fldAddr", "operator": "is", "value": { "literal": "Oslo" }, "subKey": "city"
    }))
    .expect("leaf with sub-key should decode");
    assert_eq!(keyed.sub_key.as_deref(), Some("city"));
}

#[test]
fn tree_shape_helpers_walk_every_level() {
    let tree = sample_tree();

    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.leaf_count(), 3);
    assert_eq!(
        tree.referenced_field_ids().into_iter().collect::<Vec<_>>(),
        vec!["fldAge", "fldMin", "fldName"]
    );
    assert_eq!(FilterNode::all().depth(), 1);
}

#[test]
fn fingerprint_is_stable_and_structural() {
    let tree = sample_tree();
    assert_eq!(fingerprint(&tree), fingerprint(&tree.clone()));

    let flipped = match tree.clone() {
        FilterNode::Group { children, .. } => FilterNode::Group {
            conjunction: Conjunction::Or,
            children,
        },
        leaf @ FilterNode::Leaf(_) => leaf,
    };
    assert_ne!(fingerprint(&tree), fingerprint(&flipped));

    let literal_ref = FilterNode::leaf("f", Operator::Is, FilterValue::literal("fldMin"));
    let field_ref = FilterNode::leaf("f", Operator::Is, FilterValue::field_ref("fldMin"));
    assert_ne!(fingerprint(&literal_ref), fingerprint(&field_ref));

    assert_eq!(fingerprint(&tree).to_string().len(), 64);
}
