use crate::document::XmlNode;
use crate::error::AnalysisError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parses a complete XML document into an [`XmlNode`] tree.
///
/// The whole document is held in memory. Any well-formedness problem aborts
/// the parse with [`AnalysisError::MalformedXml`]; no partial tree is returned.
pub fn parse_document(input: &str) -> Result<XmlNode, AnalysisError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            AnalysisError::malformed(format!("parse error at position {}: {e}", reader.error_position()))
        })?;

        match event {
            Event::Start(ref e) => {
                ensure_single_root(&root, &stack)?;
                stack.push(open_element(e)?);
            }
            Event::Empty(ref e) => {
                ensure_single_root(&root, &stack)?;
                let node = open_element(e)?;
                attach(node, &mut stack, &mut root);
            }
            Event::End(_) => {
                // quick-xml already rejects mismatched end names
                let node = stack
                    .pop()
                    .ok_or_else(|| AnalysisError::malformed("unexpected closing tag"))?;
                attach(node, &mut stack, &mut root);
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map_err(|e| AnalysisError::malformed(format!("invalid text content: {e}")))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(t) => {
                let raw = t.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&raw))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(AnalysisError::malformed(format!("unclosed tag <{}>", open.tag)));
    }
    root.ok_or_else(|| AnalysisError::malformed("document has no root element"))
}

fn open_element(e: &BytesStart<'_>) -> Result<XmlNode, AnalysisError> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|e| AnalysisError::malformed(format!("invalid attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| AnalysisError::malformed(format!("invalid attribute value for {key}: {e}")))?;
        node.attributes.insert(key, value.into_owned());
    }
    Ok(node)
}

fn attach(node: XmlNode, stack: &mut [XmlNode], root: &mut Option<XmlNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

fn ensure_single_root(root: &Option<XmlNode>, stack: &[XmlNode]) -> Result<(), AnalysisError> {
    if root.is_some() && stack.is_empty() {
        return Err(AnalysisError::malformed("multiple root elements"));
    }
    Ok(())
}

fn push_text(stack: &mut [XmlNode], text: &str) -> Result<(), AnalysisError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(node) => {
            match node.text.as_mut() {
                Some(existing) => existing.push_str(text),
                None => node.text = Some(text.to_string()),
            }
            Ok(())
        }
        None => Err(AnalysisError::malformed("text outside of the root element")),
    }
}
