use crate::model::stage::Param;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Location label for stages that belong to no subsheet.
pub const MAIN_PROCESS: &str = "Main Process";

/// Narrative given to release VBOs that are referenced but not embedded.
pub const NOT_INCLUDED_NARRATIVE: &str = "Referenced VBO (not included in release)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetectionSource {
    /// Named by a `<resource object=.. action=..>` descriptor.
    Resource,
    /// Inferred from the stage's display name.
    NamePattern,
}

/// Aggregated usage of one VBO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VboDependency {
    pub id: String,
    pub name: String,
    pub usage_count: usize,
    pub locations: IndexSet<String>,
    pub actions: Vec<VboAction>,
    pub description: String,
    pub source: DetectionSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VboAction {
    pub id: String,
    pub name: String,
    pub usage_count: usize,
    pub locations: IndexSet<String>,
    pub description: String,
}

/// An externally callable action defined by a business object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VboActionDef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Param>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Param>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementAttribute {
    pub datatype: String,
    pub value: String,
    pub inuse: bool,
}

/// Application Modeller element or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VboElement {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IndexMap<String, ElementAttribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<VboElement>>,
}

impl VboElement {
    pub const GROUP: &'static str = "group";

    pub fn is_group(&self) -> bool {
        self.kind == Self::GROUP
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsheetSummary {
    pub id: String,
    pub name: String,
    pub stage_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAnalysis {
    pub file_name: String,
    pub file_size: u64,
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp_version: Option<String>,
    pub stage_count: usize,
    pub subsheet_count: usize,
    pub stage_types: IndexMap<String, usize>,
    pub subsheets: Vec<SubsheetSummary>,
    pub dependencies: Vec<VboDependency>,
    pub total_vbo_count: usize,
    pub total_action_count: usize,
    pub total_usage_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VboAnalysis {
    pub file_name: String,
    pub file_size: u64,
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_mode: Option<String>,
    pub actions: Vec<VboActionDef>,
    pub elements: Vec<VboElement>,
    pub dependencies: Vec<VboDependency>,
    pub action_count: usize,
    pub element_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseProcess {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub stage_count: usize,
    pub subsheet_count: usize,
    pub dependencies: Vec<VboDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseVbo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    /// `false` for a stub: the release only references this VBO.
    pub included: bool,
    pub action_count: usize,
    pub element_count: usize,
    pub actions: Vec<VboActionDef>,
    pub elements: Vec<VboElement>,
}

impl ReleaseVbo {
    pub fn stub(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: String::new(),
            description: NOT_INCLUDED_NARRATIVE.to_string(),
            included: false,
            action_count: 0,
            element_count: 0,
            actions: Vec::new(),
            elements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseAnalysis {
    pub file_name: String,
    pub file_size: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    pub processes: Vec<ReleaseProcess>,
    pub vbos: Vec<ReleaseVbo>,
    pub other_contents: IndexMap<String, usize>,
    pub total_process_count: usize,
    pub total_vbo_count: usize,
    pub total_dependency_count: usize,
    pub total_action_count: usize,
    pub total_element_count: usize,
}

/// Result of analysing one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Analysis {
    Process(ProcessAnalysis),
    Vbo(VboAnalysis),
    Release(ReleaseAnalysis),
}

impl Analysis {
    pub fn name(&self) -> &str {
        match self {
            Analysis::Process(p) => &p.name,
            Analysis::Vbo(v) => &v.name,
            Analysis::Release(r) => &r.name,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            Analysis::Process(p) => &p.file_name,
            Analysis::Vbo(v) => &v.file_name,
            Analysis::Release(r) => &r.file_name,
        }
    }
}

/// A stored analysis. The id is assigned at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub analysis: Analysis,
}
