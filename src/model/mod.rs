pub mod analysis;
pub mod stage;

pub use analysis::*;
pub use stage::{Param, ResourceRef, Stage, StageKind, Subsheet};
