use crate::document::XmlNode;
use crate::extract::dependencies::DependencyExtractor;
use crate::extract::index::ProcessIndex;
use crate::extract::objects::{extract_actions, extract_elements};
use crate::extract::patterns::PatternSet;
use crate::model::{ReleaseAnalysis, ReleaseProcess, ReleaseVbo};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, info};

/// Rolls up the processes and objects contained in a `bpr:release` bundle.
pub struct ReleaseAggregator<'p> {
    patterns: &'p PatternSet,
}

impl<'p> ReleaseAggregator<'p> {
    pub fn new(patterns: &'p PatternSet) -> Self {
        Self { patterns }
    }

    pub fn aggregate(&self, file_name: &str, file_size: u64, root: &XmlNode) -> ReleaseAnalysis {
        let mut processes = Vec::new();
        let mut vbos = Vec::new();
        let mut other_contents: IndexMap<String, usize> = IndexMap::new();

        let entries = root.child_local("contents").map(|c| c.children.as_slice()).unwrap_or_default();
        for entry in entries {
            match entry.local_name() {
                "process" => processes.push(self.release_process(entry, processes.len() + 1)),
                "object" => vbos.push(self.release_vbo(entry, vbos.len() + 1)),
                other => *other_contents.entry(other.to_string()).or_default() += 1,
            }
        }

        add_referenced_stubs(&processes, &mut vbos);

        let total_dependency_count = processes.iter().map(|p| p.dependencies.len()).sum();
        let used_actions: usize = processes
            .iter()
            .flat_map(|p| &p.dependencies)
            .map(|d| d.actions.len())
            .sum();
        let defined_actions: usize = vbos.iter().map(|v| v.action_count).sum();
        let total_element_count = vbos.iter().map(|v| v.element_count).sum();

        let analysis = ReleaseAnalysis {
            file_name: file_name.to_string(),
            file_size,
            name: meta(root, "name")
                .or_else(|| root.field("name"))
                .unwrap_or("Unknown Release")
                .to_string(),
            package_name: meta(root, "package-name").map(str::to_string),
            created: meta(root, "created").map(str::to_string),
            created_by: meta(root, "user-created-by").map(str::to_string),
            release_notes: meta(root, "release-notes").map(str::to_string),
            total_process_count: processes.len(),
            total_vbo_count: vbos.len(),
            total_dependency_count,
            total_action_count: used_actions + defined_actions,
            total_element_count,
            processes,
            vbos,
            other_contents,
        };

        info!(
            release = %analysis.name,
            processes = analysis.total_process_count,
            vbos = analysis.total_vbo_count,
            "Aggregated release"
        );
        analysis
    }

    fn release_process(&self, entry: &XmlNode, position: usize) -> ReleaseProcess {
        let definition = embedded_definition(entry).unwrap_or(entry);
        let index = ProcessIndex::build(definition);
        let dependencies = DependencyExtractor::new(self.patterns).extract(&index);

        ReleaseProcess {
            id: entry
                .field("id")
                .map(str::to_string)
                .unwrap_or_else(|| format!("process-{position}")),
            name: entry
                .field("name")
                .or_else(|| definition.field("name"))
                .unwrap_or("Unknown Process")
                .to_string(),
            version: definition.attr("version").unwrap_or("1.0").to_string(),
            description: definition.attr("narrative").unwrap_or_default().trim().to_string(),
            stage_count: index.stages.len(),
            subsheet_count: index.distinct_subsheets().len(),
            dependencies,
        }
    }

    fn release_vbo(&self, entry: &XmlNode, position: usize) -> ReleaseVbo {
        let id = entry
            .field("id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("object-{position}"));

        let Some(definition) = embedded_definition(entry) else {
            let name = entry.field("name").unwrap_or("Unknown VBO");
            debug!(vbo = %name, "Release references VBO without embedding it");
            return ReleaseVbo::stub(id, name);
        };

        let index = ProcessIndex::build(definition);
        let actions = extract_actions(&index);
        let elements = definition.child_local("appdef").map(extract_elements).unwrap_or_default();

        ReleaseVbo {
            id,
            name: entry
                .field("name")
                .or_else(|| definition.field("name"))
                .unwrap_or("Unknown VBO")
                .to_string(),
            version: definition.attr("version").unwrap_or("1.0").to_string(),
            description: definition.attr("narrative").unwrap_or_default().trim().to_string(),
            included: true,
            action_count: actions.len(),
            element_count: elements.len(),
            actions,
            elements,
        }
    }
}

/// The `<process>` definition wrapped by a release entry.
///
/// Some exports write stages straight into the entry, in which case the
/// entry itself is the definition.
fn embedded_definition(entry: &XmlNode) -> Option<&XmlNode> {
    entry
        .children
        .iter()
        .find(|c| c.local_name() == "process")
        .or_else(|| entry.child("stage").map(|_| entry))
}

fn meta<'a>(root: &'a XmlNode, local: &str) -> Option<&'a str> {
    root.child_local(local)
        .and_then(XmlNode::text)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// VBOs called by release processes that the release neither embeds nor
/// references get a stub, one per name.
fn add_referenced_stubs(processes: &[ReleaseProcess], vbos: &mut Vec<ReleaseVbo>) {
    let mut known: HashSet<String> = vbos.iter().map(|v| v.name.clone()).collect();
    for dependency in processes.iter().flat_map(|p| &p.dependencies) {
        if known.insert(dependency.name.clone()) {
            vbos.push(ReleaseVbo::stub(format!("referenced:{}", dependency.name), dependency.name.clone()));
        }
    }
}
