use crate::model::VboElement;
use std::collections::HashMap;
use tracing::warn;

/// Rebuilds parent/child links of a flat element list.
///
/// Pass one maps ids to positions and pass two links, so a parent may
/// appear before or after its children. Elements whose parent id is
/// unknown become roots. Elements stuck in a parent cycle are emitted as
/// roots rather than lost.
pub fn build_element_tree(elements: &[VboElement]) -> Vec<VboElement> {
    let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        by_id.entry(element.id.as_str()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); elements.len()];
    let mut roots = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        match element.parent_id.as_deref().and_then(|p| by_id.get(p)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut visited = vec![false; elements.len()];
    let mut tree: Vec<VboElement> = Vec::with_capacity(roots.len());
    for root in roots {
        tree.push(assemble(root, elements, &children, &mut visited));
    }

    for (i, element) in elements.iter().enumerate() {
        if !visited[i] {
            warn!(element_id = %element.id, "Element parent chain is cyclic, promoting to root");
            tree.push(assemble(i, elements, &children, &mut visited));
        }
    }
    tree
}

fn assemble(i: usize, elements: &[VboElement], children: &[Vec<usize>], visited: &mut [bool]) -> VboElement {
    visited[i] = true;
    let mut node = elements[i].clone();

    let mut kids = Vec::with_capacity(children[i].len());
    for &child in &children[i] {
        if !visited[child] {
            kids.push(assemble(child, elements, children, visited));
        }
    }
    node.children = (!kids.is_empty()).then_some(kids);
    node
}

/// Depth-first, pre-order flattening of a tree built by
/// [`build_element_tree`]. The returned elements carry no children.
pub fn flatten_element_tree(roots: &[VboElement]) -> Vec<VboElement> {
    let mut flat = Vec::new();
    for root in roots {
        flatten_into(root, &mut flat);
    }
    flat
}

fn flatten_into(node: &VboElement, flat: &mut Vec<VboElement>) {
    let mut copy = node.clone();
    let children = copy.children.take().unwrap_or_default();
    flat.push(copy);
    for child in &children {
        flatten_into(child, flat);
    }
}
