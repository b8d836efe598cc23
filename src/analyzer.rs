use crate::document::XmlNode;
use crate::document::parser::parse_document;
use crate::error::AnalysisError;
use crate::extract::{
    DependencyExtractor, PatternSet, ProcessIndex, ReleaseAggregator, extract_actions, extract_elements,
};
use crate::model::{Analysis, ProcessAnalysis, SubsheetSummary, VboAnalysis};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Blue Prism export flavours, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    Process,
    Object,
    Release,
}

impl FileKind {
    pub fn from_file_name(file_name: &str) -> Result<Self, AnalysisError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    /// Case-insensitive, with or without the leading dot.
    pub fn from_extension(extension: &str) -> Result<Self, AnalysisError> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        match extension.as_str() {
            "bpprocess" => Ok(Self::Process),
            "bpobject" => Ok(Self::Object),
            "bprelease" => Ok(Self::Release),
            _ => Err(AnalysisError::UnsupportedExtension(extension)),
        }
    }

    /// Tag the document root must carry.
    pub fn root_tag(&self) -> &'static str {
        match self {
            Self::Process | Self::Object => "process",
            Self::Release => "bpr:release",
        }
    }
}

/// Synchronous extraction pipeline: parse, index, extract, aggregate.
///
/// Holds no per-analysis state, so one analyzer can serve any number of
/// concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    patterns: PatternSet,
}

impl Analyzer {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn analyze_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<Analysis, AnalysisError> {
        let kind = FileKind::from_file_name(file_name)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| AnalysisError::malformed(format!("content is not valid UTF-8: {e}")))?;
        self.analyze_str(kind, file_name, text, bytes.len() as u64)
    }

    pub fn analyze_str(
        &self,
        kind: FileKind,
        file_name: &str,
        text: &str,
        file_size: u64,
    ) -> Result<Analysis, AnalysisError> {
        let root = parse_document(text)?;
        if root.tag != kind.root_tag() {
            return Err(AnalysisError::UnrecognizedFormat {
                expected: kind.root_tag(),
                found: root.tag,
            });
        }

        let analysis = match kind {
            FileKind::Process => Analysis::Process(self.analyze_process(file_name, file_size, &root)),
            FileKind::Object => Analysis::Vbo(self.analyze_object(file_name, file_size, &root)),
            FileKind::Release => {
                Analysis::Release(ReleaseAggregator::new(&self.patterns).aggregate(file_name, file_size, &root))
            }
        };
        info!(file = %file_name, kind = ?kind, name = %analysis.name(), "Analysis complete");
        Ok(analysis)
    }

    pub fn analyze_process(&self, file_name: &str, file_size: u64, root: &XmlNode) -> ProcessAnalysis {
        let index = ProcessIndex::build(root);
        let dependencies = DependencyExtractor::new(&self.patterns).extract(&index);

        let mut stage_types: IndexMap<String, usize> = IndexMap::new();
        for stage in &index.stages {
            *stage_types.entry(stage.kind.to_string()).or_default() += 1;
        }

        let subsheets: Vec<SubsheetSummary> = index
            .distinct_subsheets()
            .into_iter()
            .map(|s| SubsheetSummary {
                id: s.id.clone(),
                name: s.name.clone(),
                stage_count: index.stages_of(&s.id).len(),
            })
            .collect();

        ProcessAnalysis {
            file_name: file_name.to_string(),
            file_size,
            name: root.field("name").unwrap_or("Unknown Process").to_string(),
            version: root.attr("version").unwrap_or("1.0").to_string(),
            description: root.attr("narrative").unwrap_or_default().trim().to_string(),
            bp_version: root.attr("bpversion").map(str::to_string),
            stage_count: index.stages.len(),
            subsheet_count: subsheets.len(),
            stage_types,
            subsheets,
            total_vbo_count: dependencies.len(),
            total_action_count: dependencies.iter().map(|d| d.actions.len()).sum(),
            total_usage_count: dependencies.iter().map(|d| d.usage_count).sum(),
            dependencies,
        }
    }

    pub fn analyze_object(&self, file_name: &str, file_size: u64, root: &XmlNode) -> VboAnalysis {
        let index = ProcessIndex::build(root);
        let actions = extract_actions(&index);
        let elements = root.child("appdef").map(extract_elements).unwrap_or_default();
        let dependencies = DependencyExtractor::new(&self.patterns).extract(&index);

        VboAnalysis {
            file_name: file_name.to_string(),
            file_size,
            name: root.field("name").unwrap_or("Unknown VBO").to_string(),
            version: root.attr("version").unwrap_or("1.0").to_string(),
            description: root.attr("narrative").unwrap_or_default().trim().to_string(),
            run_mode: root.attr("runmode").map(str::to_string),
            action_count: actions.len(),
            element_count: elements.len(),
            actions,
            elements,
            dependencies,
        }
    }
}
