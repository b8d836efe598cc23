use crate::analyzer::{Analyzer, FileKind};
use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::extract::PatternSet;
use crate::model::{Analysis, AnalysisRecord};
use crate::storage::AnalysisStore;
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Upload boundary: enforces the size and extension limits, runs the
/// analyzer and persists the result.
pub struct AnalysisService {
    analyzer: Analyzer,
    config: AnalyzerConfig,
    store: Arc<dyn AnalysisStore>,
}

impl AnalysisService {
    /// Fails when `allowed_extensions` names a format the analyzer cannot
    /// read. The list can only narrow the built-in set.
    pub fn new(config: AnalyzerConfig, store: Arc<dyn AnalysisStore>) -> Result<Self, AnalysisError> {
        for extension in &config.allowed_extensions {
            FileKind::from_extension(extension)?;
        }
        let patterns = PatternSet::with_extra(&config.extra_patterns)?;
        Ok(Self {
            analyzer: Analyzer::new(patterns),
            config,
            store,
        })
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn check_upload(&self, file_name: &str, size: u64) -> Result<(), AnalysisError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let allowed = self
            .config
            .allowed_extensions
            .iter()
            .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(&extension));
        if !allowed {
            return Err(AnalysisError::UnsupportedExtension(extension));
        }
        if size > self.config.max_file_size {
            return Err(AnalysisError::FileTooLarge {
                size,
                limit: self.config.max_file_size,
            });
        }
        Ok(())
    }

    pub fn analyze_upload(&self, file_name: &str, bytes: &[u8]) -> Result<Analysis, AnalysisError> {
        self.check_upload(file_name, bytes.len() as u64)?;
        self.analyzer.analyze_bytes(file_name, bytes)
    }

    /// Analyzes an in-memory upload and stores it under a fresh id.
    pub async fn ingest_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<AnalysisRecord> {
        let analysis = self
            .analyze_upload(file_name, bytes)
            .inspect_err(|e| warn!(file = %file_name, error = %e, "Analysis rejected"))?;

        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            analysis,
        };
        self.store
            .save(&record)
            .await
            .with_context(|| format!("Failed to persist analysis of {}", file_name))?;

        info!(id = %record.id, file = %file_name, "Analysis stored");
        Ok(record)
    }

    pub async fn ingest_file(&self, path: &Path) -> Result<AnalysisRecord> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        // Reject oversized files before reading them into memory
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        self.check_upload(&file_name, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.ingest_bytes(&file_name, &bytes).await
    }

    pub async fn fetch(&self, id: Uuid) -> Result<Option<AnalysisRecord>> {
        self.store.get(id).await
    }
}
