use crate::document::XmlNode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Designer-canvas stage types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StageKind {
    Start,
    End,
    Action,
    SubSheet,
    SubSheetInfo,
    Decision,
    Calculation,
    MultipleCalculation,
    Data,
    Collection,
    Note,
    Anchor,
    Block,
    Process,
    ChoiceStart,
    ChoiceEnd,
    LoopStart,
    LoopEnd,
    WaitStart,
    WaitEnd,
    Exception,
    Recover,
    Resume,
    Code,
    Navigate,
    Read,
    Write,
    Alert,
    Other(String),
}

impl StageKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Start" => Self::Start,
            "End" => Self::End,
            "Action" => Self::Action,
            "SubSheet" => Self::SubSheet,
            "SubSheetInfo" => Self::SubSheetInfo,
            "Decision" => Self::Decision,
            "Calculation" => Self::Calculation,
            "MultipleCalculation" => Self::MultipleCalculation,
            "Data" => Self::Data,
            "Collection" => Self::Collection,
            "Note" => Self::Note,
            "Anchor" => Self::Anchor,
            "Block" => Self::Block,
            "Process" => Self::Process,
            "ChoiceStart" => Self::ChoiceStart,
            "ChoiceEnd" => Self::ChoiceEnd,
            "LoopStart" => Self::LoopStart,
            "LoopEnd" => Self::LoopEnd,
            "WaitStart" => Self::WaitStart,
            "WaitEnd" => Self::WaitEnd,
            "Exception" => Self::Exception,
            "Recover" => Self::Recover,
            "Resume" => Self::Resume,
            "Code" => Self::Code,
            "Navigate" => Self::Navigate,
            "Read" => Self::Read,
            "Write" => Self::Write,
            "Alert" => Self::Alert,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "Start",
            Self::End => "End",
            Self::Action => "Action",
            Self::SubSheet => "SubSheet",
            Self::SubSheetInfo => "SubSheetInfo",
            Self::Decision => "Decision",
            Self::Calculation => "Calculation",
            Self::MultipleCalculation => "MultipleCalculation",
            Self::Data => "Data",
            Self::Collection => "Collection",
            Self::Note => "Note",
            Self::Anchor => "Anchor",
            Self::Block => "Block",
            Self::Process => "Process",
            Self::ChoiceStart => "ChoiceStart",
            Self::ChoiceEnd => "ChoiceEnd",
            Self::LoopStart => "LoopStart",
            Self::LoopEnd => "LoopEnd",
            Self::WaitStart => "WaitStart",
            Self::WaitEnd => "WaitEnd",
            Self::Exception => "Exception",
            Self::Recover => "Recover",
            Self::Resume => "Resume",
            Self::Code => "Code",
            Self::Navigate => "Navigate",
            Self::Read => "Read",
            Self::Write => "Write",
            Self::Alert => "Alert",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The VBO/action pair an Action stage invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub object: String,
    pub action: String,
}

impl ResourceRef {
    /// Both `object` and `action` must be present, otherwise the descriptor
    /// counts as absent.
    fn from_node(node: &XmlNode) -> Option<Self> {
        Some(Self {
            object: node.field("object")?.to_string(),
            action: node.field("action")?.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Param {
    fn from_node(node: &XmlNode) -> Option<Self> {
        Some(Self {
            name: node.field("name")?.to_string(),
            data_type: node.field("type").unwrap_or("unknown").to_string(),
            description: node.field("narrative").map(str::to_string),
        })
    }
}

/// One stage of a process or object page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub kind: StageKind,
    pub subsheet_id: Option<String>,
    pub resource: Option<ResourceRef>,
    pub narrative: Option<String>,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
}

impl Stage {
    pub fn from_node(node: &XmlNode) -> Self {
        Self {
            id: node.field("stageid").unwrap_or_default().to_string(),
            name: node.field("name").unwrap_or_default().to_string(),
            kind: StageKind::parse(node.field("type").unwrap_or_default()),
            subsheet_id: node.field("subsheetid").map(str::to_string),
            resource: node.child("resource").and_then(ResourceRef::from_node),
            narrative: node.field("narrative").map(str::to_string),
            inputs: params(node, "inputs", "input"),
            outputs: params(node, "outputs", "output"),
        }
    }
}

fn params(node: &XmlNode, list: &str, item: &str) -> Vec<Param> {
    node.child(list)
        .map(|l| l.children_named(item).filter_map(Param::from_node).collect())
        .unwrap_or_default()
}

/// A named page of a process or object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subsheet {
    pub id: String,
    pub name: String,
    pub kind: Option<String>,
    pub published: bool,
}

impl Subsheet {
    pub const UNKNOWN_NAME: &'static str = "Unknown Subsheet";

    pub fn from_node(node: &XmlNode) -> Self {
        Self {
            id: node.field("subsheetid").unwrap_or_default().to_string(),
            name: node.field("name").unwrap_or(Self::UNKNOWN_NAME).to_string(),
            kind: node.attr("type").map(str::to_string),
            published: node.attr("published") == Some("True"),
        }
    }
}
