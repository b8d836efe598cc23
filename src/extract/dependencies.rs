use crate::extract::index::ProcessIndex;
use crate::extract::patterns::{PatternSet, action_name_from_stage};
use crate::model::{DetectionSource, Stage, StageKind, VboAction, VboDependency};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

/// A stage recognised as a call into a VBO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub vbo: String,
    pub action: String,
    pub description: String,
    pub source: DetectionSource,
}

/// Builds the deduplicated VBO usage model of one process or object.
pub struct DependencyExtractor<'p> {
    patterns: &'p PatternSet,
}

impl<'p> DependencyExtractor<'p> {
    pub fn new(patterns: &'p PatternSet) -> Self {
        Self { patterns }
    }

    /// Scans "Main Process" and then every subsheet, in document order.
    ///
    /// The returned list keeps first-seen order for VBOs and for the actions
    /// inside each VBO.
    pub fn extract(&self, index: &ProcessIndex) -> Vec<VboDependency> {
        let mut acc = DependencyAccumulator::default();

        for location in index.locations() {
            for stage in &location.stages {
                if let Some(invocation) = self.detect(stage) {
                    trace!(stage = %stage.name, vbo = %invocation.vbo, action = %invocation.action, "VBO invocation");
                    acc.record(&invocation, location.label, stage.narrative.as_deref());
                }
            }
        }

        let dependencies = acc.finish();
        debug!(vbos = dependencies.len(), "Extracted VBO dependencies");
        dependencies
    }

    /// Decides whether `stage` calls a VBO.
    ///
    /// A complete resource descriptor is authoritative. Otherwise the name
    /// of an Action stage (or an untyped one, as older exports write them)
    /// is matched against the pattern list. Data items, page references and
    /// action definitions never fall back to the name.
    pub fn detect(&self, stage: &Stage) -> Option<Invocation> {
        let name = stage.name.trim();
        if name.is_empty() {
            return None;
        }

        if let Some(resource) = &stage.resource {
            return Some(Invocation {
                vbo: resource.object.clone(),
                action: resource.action.clone(),
                description: String::new(),
                source: DetectionSource::Resource,
            });
        }

        if !can_invoke_object(&stage.kind) {
            return None;
        }

        self.patterns.classify(name).map(|rule| Invocation {
            vbo: rule.vbo_name.clone(),
            action: action_name_from_stage(name),
            description: rule.description.clone(),
            source: DetectionSource::NamePattern,
        })
    }
}

fn can_invoke_object(kind: &StageKind) -> bool {
    matches!(kind, StageKind::Action | StageKind::Other(_))
}

#[derive(Default)]
struct DependencyAccumulator {
    vbos: IndexMap<String, PendingDependency>,
}

struct PendingDependency {
    usage_count: usize,
    locations: IndexSet<String>,
    actions: IndexMap<String, PendingAction>,
    description: String,
    source: DetectionSource,
}

#[derive(Default)]
struct PendingAction {
    usage_count: usize,
    locations: IndexSet<String>,
    description: String,
}

impl DependencyAccumulator {
    fn record(&mut self, invocation: &Invocation, location: &str, narrative: Option<&str>) {
        let vbo = self
            .vbos
            .entry(invocation.vbo.clone())
            .or_insert_with(|| PendingDependency {
                usage_count: 0,
                locations: IndexSet::new(),
                actions: IndexMap::new(),
                description: invocation.description.clone(),
                source: invocation.source,
            });
        vbo.usage_count += 1;
        vbo.locations.insert(location.to_string());

        let action = vbo.actions.entry(invocation.action.clone()).or_default();
        action.usage_count += 1;
        action.locations.insert(location.to_string());
        if action.description.is_empty() {
            if let Some(text) = narrative {
                action.description = text.to_string();
            }
        }
    }

    fn finish(self) -> Vec<VboDependency> {
        self.vbos
            .into_iter()
            .enumerate()
            .map(|(i, (name, pending))| {
                let id = format!("vbo-{}", i + 1);
                let actions = pending
                    .actions
                    .into_iter()
                    .enumerate()
                    .map(|(j, (action_name, a))| VboAction {
                        id: format!("{id}-action-{}", j + 1),
                        name: action_name,
                        usage_count: a.usage_count,
                        locations: a.locations,
                        description: a.description,
                    })
                    .collect();
                VboDependency {
                    id,
                    name,
                    usage_count: pending.usage_count,
                    locations: pending.locations,
                    actions,
                    description: pending.description,
                    source: pending.source,
                }
            })
            .collect()
    }
}
