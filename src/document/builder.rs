//! Fluent builders for Blue Prism export trees.
//!
//! They produce the same shapes the exporter writes, so fixtures can be
//! built in code and rendered with [`crate::document::writer::to_xml_string`].

use crate::document::XmlNode;

pub struct ProcessBuilder {
    root: XmlNode,
    subsheets: Vec<XmlNode>,
    pub stages: Vec<XmlNode>, // public so fixtures can tweak raw stages
    appdef: Option<XmlNode>,
}

impl ProcessBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            root: XmlNode::new("process").with_attr("name", name),
            subsheets: Vec::new(),
            stages: Vec::new(),
            appdef: None,
        }
    }

    /// A business object definition (`<process type="object">`).
    pub fn object(name: &str) -> Self {
        let mut builder = Self::new(name);
        builder.root = builder.root.with_attr("type", "object").with_attr("runmode", "Exclusive");
        builder
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.root = self.root.with_attr(key, value);
        self
    }

    pub fn version(self, version: &str) -> Self {
        self.attr("version", version)
    }

    pub fn narrative(self, narrative: &str) -> Self {
        self.attr("narrative", narrative)
    }

    pub fn subsheet(mut self, id: &str, name: &str) -> Self {
        self.subsheets.push(
            XmlNode::new("subsheet")
                .with_attr("subsheetid", id)
                .with_attr("type", "Normal")
                .with_attr("published", "True")
                .with_child(XmlNode::new("name").with_text(name)),
        );
        self
    }

    pub fn stage(self, id: &str, name: &str, kind: &str) -> StageBuilder {
        StageBuilder {
            process_builder: self,
            node: XmlNode::new("stage")
                .with_attr("stageid", id)
                .with_attr("name", name)
                .with_attr("type", kind),
        }
    }

    /// Shortcut for an Action stage calling `object`/`action`.
    pub fn call(self, id: &str, subsheet: Option<&str>, object: &str, action: &str) -> Self {
        let name = format!("{object}::{action}");
        let mut stage = self.stage(id, &name, "Action").resource(object, action);
        if let Some(subsheet_id) = subsheet {
            stage = stage.subsheet(subsheet_id);
        }
        stage.build()
    }

    /// Adds a top-level Application Modeller node under `<appdef>`.
    pub fn element(mut self, node: XmlNode) -> Self {
        self.appdef
            .get_or_insert_with(|| XmlNode::new("appdef"))
            .children
            .push(node);
        self
    }

    pub fn build(self) -> XmlNode {
        let mut root = self.root;
        root.children.extend(self.subsheets);
        root.children.extend(self.stages);
        if let Some(appdef) = self.appdef {
            root.children.push(appdef);
        }
        root
    }
}

pub struct StageBuilder {
    process_builder: ProcessBuilder,
    node: XmlNode,
}

impl StageBuilder {
    pub fn subsheet(mut self, subsheet_id: &str) -> Self {
        self.node.children.push(XmlNode::new("subsheetid").with_text(subsheet_id));
        self
    }

    pub fn resource(mut self, object: &str, action: &str) -> Self {
        self.node.children.push(
            XmlNode::new("resource")
                .with_attr("object", object)
                .with_attr("action", action),
        );
        self
    }

    pub fn narrative(mut self, text: &str) -> Self {
        self.node.children.push(XmlNode::new("narrative").with_text(text));
        self
    }

    pub fn input(self, name: &str, data_type: &str, narrative: &str) -> Self {
        self.param("inputs", "input", name, data_type, narrative)
    }

    pub fn output(self, name: &str, data_type: &str, narrative: &str) -> Self {
        self.param("outputs", "output", name, data_type, narrative)
    }

    fn param(mut self, list: &str, tag: &str, name: &str, data_type: &str, narrative: &str) -> Self {
        let param = XmlNode::new(tag)
            .with_attr("type", data_type)
            .with_attr("name", name)
            .with_attr("narrative", narrative);
        match self.node.children.iter_mut().find(|c| c.tag == list) {
            Some(existing) => existing.children.push(param),
            None => self.node.children.push(XmlNode::new(list).with_child(param)),
        }
        self
    }

    pub fn build(mut self) -> ProcessBuilder {
        self.process_builder.stages.push(self.node);
        self.process_builder
    }
}

/// `<element name=..><id>..</id><type>..</type></element>`
pub fn element_node(id: &str, name: &str, kind: &str) -> XmlNode {
    XmlNode::new("element")
        .with_attr("name", name)
        .with_child(XmlNode::new("id").with_text(id))
        .with_child(XmlNode::new("type").with_text(kind))
}

pub fn group_node(id: &str, name: &str) -> XmlNode {
    XmlNode::new("group")
        .with_attr("name", name)
        .with_child(XmlNode::new("id").with_text(id))
}

/// Appends an application attribute to an element's `<attributes>` list.
pub fn with_app_attribute(mut element: XmlNode, name: &str, datatype: &str, value: &str, inuse: bool) -> XmlNode {
    let attribute = XmlNode::new("attribute")
        .with_attr("name", name)
        .with_attr("inuse", if inuse { "True" } else { "False" })
        .with_child(
            XmlNode::new("ProcessValue")
                .with_attr("datatype", datatype)
                .with_attr("value", value),
        );
    match element.children.iter_mut().find(|c| c.tag == "attributes") {
        Some(list) => list.children.push(attribute),
        None => element.children.push(XmlNode::new("attributes").with_child(attribute)),
    }
    element
}

pub struct ReleaseBuilder {
    root: XmlNode,
    contents: Vec<XmlNode>,
}

impl ReleaseBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            root: XmlNode::new("bpr:release")
                .with_attr("xmlns:bpr", "http://www.blueprism.co.uk/product/release")
                .with_child(XmlNode::new("bpr:name").with_text(name)),
            contents: Vec::new(),
        }
    }

    pub fn meta(mut self, tag: &str, value: &str) -> Self {
        self.root.children.push(XmlNode::new(tag).with_text(value));
        self
    }

    pub fn process(mut self, id: &str, definition: XmlNode) -> Self {
        let name = definition.attr("name").unwrap_or_default().to_string();
        self.contents.push(
            XmlNode::new("process")
                .with_attr("id", id)
                .with_attr("name", name)
                .with_child(definition),
        );
        self
    }

    /// An embedded object, or a by-id reference when `definition` is `None`.
    pub fn object(mut self, id: &str, name: &str, definition: Option<XmlNode>) -> Self {
        let mut entry = XmlNode::new("object").with_attr("id", id).with_attr("name", name);
        if let Some(definition) = definition {
            entry.children.push(definition);
        }
        self.contents.push(entry);
        self
    }

    pub fn item(mut self, tag: &str, name: &str) -> Self {
        self.contents.push(XmlNode::new(tag).with_attr("name", name));
        self
    }

    pub fn build(self) -> XmlNode {
        let contents = XmlNode::new("bpr:contents")
            .with_attr("count", self.contents.len().to_string())
            .with_children(self.contents);
        self.root.with_child(contents)
    }
}
