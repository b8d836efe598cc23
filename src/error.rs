use thiserror::Error;

/// Terminal failures of a single analysis.
///
/// Everything else (missing names, ids, narratives, malformed elements) is
/// absorbed by the extractors with fallback values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The content is not well-formed XML.
    #[error("Invalid file: content is not well-formed XML ({0})")]
    MalformedXml(String),

    /// The document parsed but is not the kind of Blue Prism file it claims to be.
    #[error("Unrecognized Blue Prism format: expected <{expected}> root, found <{found}>")]
    UnrecognizedFormat { expected: &'static str, found: String },

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("File is too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Invalid VBO name pattern: {0}")]
    InvalidPattern(String),
}

impl AnalysisError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedXml(message.into())
    }
}
