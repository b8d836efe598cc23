use bpscan::document::XmlNode;
use bpscan::document::builder::{element_node, group_node};
use bpscan::extract::{build_element_tree, extract_elements, flatten_element_tree};
use bpscan::model::VboElement;
use std::collections::HashMap;

fn flat(id: &str, name: &str, parent: Option<&str>) -> VboElement {
    VboElement {
        id: id.to_string(),
        name: name.to_string(),
        kind: "Element".to_string(),
        parent_id: parent.map(str::to_string),
        path: name.to_string(),
        attributes: None,
        children: None,
    }
}

fn assert_single_root_with_child(tree: &[VboElement]) {
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].name, "Root");
    let children = tree[0].children.as_ref().expect("Root should have children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "Child");
    assert!(children[0].children.is_none());
}

#[test]
fn test_parent_before_child() {
    let tree = build_element_tree(&[flat("1", "Root", None), flat("2", "Child", Some("1"))]);
    assert_single_root_with_child(&tree);
}

#[test]
fn test_child_before_parent() {
    let tree = build_element_tree(&[flat("2", "Child", Some("1")), flat("1", "Root", None)]);
    assert_single_root_with_child(&tree);
}

#[test]
fn test_unknown_parent_becomes_root() {
    let tree = build_element_tree(&[flat("1", "Root", None), flat("9", "Stray", Some("missing"))]);
    let names: Vec<_> = tree.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Root", "Stray"]);
}

#[test]
fn test_cycles_do_not_lose_elements() {
    let tree = build_element_tree(&[flat("a", "A", Some("b")), flat("b", "B", Some("a"))]);
    assert_eq!(flatten_element_tree(&tree).len(), 2);
}

#[test]
fn test_round_trip_preserves_elements_and_parents() {
    let appdef = XmlNode::new("appdef")
        .with_child(
            element_node("app", "App", "Application")
                .with_child(element_node("w1", "Window", "Window").with_child(element_node("b1", "OK", "Button")))
                .with_child(group_node("g1", "Toolbar").with_child(element_node("b2", "Save", "Button"))),
        )
        .with_child(element_node("app2", "Other App", "Application"));

    let mut elements = extract_elements(&appdef);
    // Scramble the order so children come before parents
    elements.reverse();

    let tree = build_element_tree(&elements);
    let flattened = flatten_element_tree(&tree);

    let mut original_ids: Vec<_> = elements.iter().map(|e| e.id.clone()).collect();
    let mut flat_ids: Vec<_> = flattened.iter().map(|e| e.id.clone()).collect();
    original_ids.sort();
    flat_ids.sort();
    assert_eq!(original_ids, flat_ids);

    // Every recorded parent id matches the node's position in the tree
    let mut parent_in_tree: HashMap<String, Option<String>> = HashMap::new();
    fn walk(nodes: &[VboElement], parent: Option<&str>, out: &mut HashMap<String, Option<String>>) {
        for node in nodes {
            out.insert(node.id.clone(), parent.map(str::to_string));
            if let Some(children) = &node.children {
                walk(children, Some(&node.id), out);
            }
        }
    }
    walk(&tree, None, &mut parent_in_tree);

    for element in &elements {
        assert_eq!(parent_in_tree[&element.id], element.parent_id, "parent of {}", element.id);
    }

    // Flattened copies match the originals apart from ordering
    for element in &flattened {
        assert!(element.children.is_none());
        assert!(elements.contains(element));
    }
}
