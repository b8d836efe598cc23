pub mod dependencies;
pub mod index;
pub mod objects;
pub mod patterns;
pub mod release;
pub mod tree;

pub use dependencies::DependencyExtractor;
pub use index::ProcessIndex;
pub use objects::{extract_actions, extract_elements};
pub use patterns::{PatternSet, PatternSpec};
pub use release::ReleaseAggregator;
pub use tree::{build_element_tree, flatten_element_tree};
