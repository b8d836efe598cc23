//! Metadata extraction for Blue Prism `.bpprocess`, `.bpobject` and
//! `.bprelease` exports.

pub mod analyzer;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod model;
pub mod service;
pub mod storage;

pub use analyzer::{Analyzer, FileKind};
pub use error::AnalysisError;
pub use model::Analysis;
