//! Addressing stages inside a possibly nested query.

use serde::{Deserialize, Serialize};

/// One step into a nested query: the nest field `field_index` of stage
/// `stage_index` in the enclosing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StagePathPart {
    pub field_index: usize,
    pub stage_index: usize,
}

/// Location of a stage. Empty `parts` addresses the top-level pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StagePath {
    pub stage_index: usize,
    #[serde(default)]
    pub parts: Vec<StagePathPart>,
}

impl StagePath {
    /// A stage of the top-level pipeline.
    pub fn root(stage_index: usize) -> Self {
        Self {
            stage_index,
            parts: Vec::new(),
        }
    }

    /// Stage `stage_index` of the nested query at `field_index` of this stage.
    pub fn nested(&self, field_index: usize, stage_index: usize) -> Self {
        let mut parts = self.parts.clone();
        parts.push(StagePathPart {
            field_index,
            stage_index: self.stage_index,
        });
        Self { stage_index, parts }
    }

    /// Another stage of the same pipeline.
    pub fn sibling(&self, stage_index: usize) -> Self {
        Self {
            stage_index,
            parts: self.parts.clone(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parts.is_empty()
    }

    /// Nesting depth (0 for the top-level pipeline).
    pub fn depth(&self) -> usize {
        self.parts.len()
    }
}
