use crate::document::XmlNode;
use crate::extract::index::ProcessIndex;
use crate::model::{ElementAttribute, Param, Stage, StageKind, VboActionDef, VboElement};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// One action definition per `SubSheetInfo` stage, in document order.
///
/// Parameters come from the stage's own `<inputs>`/`<outputs>`. When they
/// are absent there, the Start and End stages of the action's page are used.
pub fn extract_actions(index: &ProcessIndex) -> Vec<VboActionDef> {
    let actions: Vec<VboActionDef> = index
        .stages
        .iter()
        .filter(|s| s.kind == StageKind::SubSheetInfo)
        .map(|info| {
            let page = info
                .subsheet_id
                .as_deref()
                .map(|id| index.stages_of(id))
                .unwrap_or_default();

            let inputs = if info.inputs.is_empty() {
                collect_params(&page, StageKind::Start, |s| &s.inputs)
            } else {
                info.inputs.clone()
            };
            let outputs = if info.outputs.is_empty() {
                collect_params(&page, StageKind::End, |s| &s.outputs)
            } else {
                info.outputs.clone()
            };

            VboActionDef {
                id: info.id.clone(),
                name: action_name(info, index),
                kind: info.kind.to_string(),
                description: info.narrative.clone(),
                inputs: non_empty(inputs),
                outputs: non_empty(outputs),
            }
        })
        .collect();

    debug!(actions = actions.len(), "Extracted VBO actions");
    actions
}

fn action_name(info: &Stage, index: &ProcessIndex) -> String {
    if !info.name.is_empty() {
        return info.name.clone();
    }
    info.subsheet_id
        .as_deref()
        .and_then(|id| index.subsheets.iter().find(|s| s.id == id))
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "Unknown Action".to_string())
}

/// Params of every `kind` stage on the page, first occurrence of a name wins.
fn collect_params(page: &[&Stage], kind: StageKind, select: impl Fn(&Stage) -> &Vec<Param>) -> Vec<Param> {
    let mut params: Vec<Param> = Vec::new();
    for stage in page.iter().filter(|s| s.kind == kind) {
        for param in select(*stage) {
            if !params.iter().any(|p| p.name == param.name) {
                params.push(param.clone());
            }
        }
    }
    params
}

fn non_empty(params: Vec<Param>) -> Option<Vec<Param>> {
    (!params.is_empty()).then_some(params)
}

/// Flattens the Application Modeller tree under `appdef` in pre-order.
///
/// Nodes without both a name and an id are dropped together with their
/// whole subtree.
pub fn extract_elements(appdef: &XmlNode) -> Vec<VboElement> {
    let mut elements = Vec::new();
    walk_children(appdef, None, None, &mut elements);
    debug!(elements = elements.len(), "Extracted application model elements");
    elements
}

fn walk_children(node: &XmlNode, parent_id: Option<&str>, parent_path: Option<&str>, out: &mut Vec<VboElement>) {
    for child in &node.children {
        if matches!(child.tag.as_str(), "element" | "group") {
            visit(child, parent_id, parent_path, out);
        }
    }
}

fn visit(node: &XmlNode, parent_id: Option<&str>, parent_path: Option<&str>, out: &mut Vec<VboElement>) {
    let (Some(name), Some(id)) = (node.field("name"), node.field("id")) else {
        warn!(
            tag = %node.tag,
            name = ?node.field("name"),
            id = ?node.field("id"),
            parent_id = ?parent_id,
            "Dropping application model node without name or id"
        );
        return;
    };

    let path = match parent_path {
        Some(parent) => format!("{parent} - {name}"),
        None => name.to_string(),
    };
    let kind = if node.tag == "group" {
        VboElement::GROUP.to_string()
    } else {
        node.field("type").unwrap_or("Unknown").to_string()
    };

    out.push(VboElement {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        parent_id: parent_id.map(str::to_string),
        path: path.clone(),
        attributes: read_attributes(node),
        children: None,
    });

    walk_children(node, Some(id), Some(&path), out);
}

fn read_attributes(node: &XmlNode) -> Option<IndexMap<String, ElementAttribute>> {
    let list = node.child("attributes")?;
    let attributes: IndexMap<String, ElementAttribute> = list
        .children_named("attribute")
        .filter_map(|attribute| {
            let name = attribute.field("name")?;
            let value = attribute.children.iter().find(|c| c.attr("datatype").is_some())?;
            Some((
                name.to_string(),
                ElementAttribute {
                    datatype: value.attr("datatype").unwrap_or_default().to_string(),
                    value: value.attr("value").unwrap_or_default().to_string(),
                    inuse: attribute.attr("inuse") == Some("True"),
                },
            ))
        })
        .collect();
    (!attributes.is_empty()).then_some(attributes)
}
