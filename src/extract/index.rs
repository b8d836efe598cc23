use crate::document::XmlNode;
use crate::model::{MAIN_PROCESS, Stage, Subsheet};
use std::collections::HashSet;
use tracing::debug;

/// Flat stage and subsheet lists of one process or object definition.
///
/// Only direct children of the root are indexed. Nothing is deduplicated or
/// interpreted here.
#[derive(Debug, Clone, Default)]
pub struct ProcessIndex {
    pub stages: Vec<Stage>,
    pub subsheets: Vec<Subsheet>,
    subsheet_ids: HashSet<String>,
}

/// Stages grouped under one location label.
#[derive(Debug)]
pub struct Location<'a> {
    pub label: &'a str,
    pub stages: Vec<&'a Stage>,
}

impl ProcessIndex {
    pub fn build(root: &XmlNode) -> Self {
        let mut index = Self::default();

        for child in &root.children {
            match child.tag.as_str() {
                "stage" => index.stages.push(Stage::from_node(child)),
                "subsheet" => {
                    let subsheet = Subsheet::from_node(child);
                    index.subsheet_ids.insert(subsheet.id.clone());
                    index.subsheets.push(subsheet);
                }
                _ => {}
            }
        }

        debug!(
            stages = index.stages.len(),
            subsheets = index.subsheets.len(),
            "Indexed process definition"
        );
        index
    }

    pub fn stages_of(&self, subsheet_id: &str) -> Vec<&Stage> {
        self.stages
            .iter()
            .filter(|s| s.subsheet_id.as_deref() == Some(subsheet_id))
            .collect()
    }

    /// Stages with no subsheet id, or with one that names no known subsheet.
    pub fn main_stages(&self) -> Vec<&Stage> {
        self.stages
            .iter()
            .filter(|s| match &s.subsheet_id {
                Some(id) => !self.subsheet_ids.contains(id),
                None => true,
            })
            .collect()
    }

    /// Subsheets in document order, keeping only the first of any repeated id.
    pub fn distinct_subsheets(&self) -> Vec<&Subsheet> {
        let mut seen = HashSet::new();
        self.subsheets
            .iter()
            .filter(|subsheet| {
                let first = seen.insert(subsheet.id.as_str());
                if !first {
                    debug!(subsheet_id = %subsheet.id, "Skipping repeated subsheet id");
                }
                first
            })
            .collect()
    }

    /// "Main Process" first, then each distinct subsheet, so no stage is
    /// scanned twice.
    pub fn locations(&self) -> Vec<Location<'_>> {
        let mut locations = vec![Location {
            label: MAIN_PROCESS,
            stages: self.main_stages(),
        }];

        for subsheet in self.distinct_subsheets() {
            locations.push(Location {
                label: &subsheet.name,
                stages: self.stages_of(&subsheet.id),
            });
        }
        locations
    }
}
