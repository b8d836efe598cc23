pub mod builder;
pub mod parser;
pub mod writer;

use indexmap::IndexMap;

/// Generic attributed XML element.
///
/// Tag names are kept exactly as written, so `bpr:release` and `release`
/// are different tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlNode>,
    /// Trimmed text content, `None` when the element has no text.
    pub text: Option<String>,
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Tag name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.tag)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First child with exactly this tag.
    pub fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// First child whose local name matches, ignoring any prefix.
    pub fn child_local(&self, local: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.child(tag).and_then(XmlNode::text)
    }

    /// Value stored either as attribute `key` or as the text of child `<key>`.
    ///
    /// Exports from different Blue Prism versions put ids, names and types in
    /// either place. Blank values count as absent.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.attr(key)
            .or_else(|| self.child_text(key))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    // Builder-style helpers, used by `builder` and by hand-rolled fixtures.

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }
}

pub(crate) fn local_part(tag: &str) -> &str {
    tag.rsplit_once(':').map(|(_, local)| local).unwrap_or(tag)
}
