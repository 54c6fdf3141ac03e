use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ComponentId, ProgramId};

/// Stored description of an instrumentation workload.
///
/// Validation happens before a component reaches the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    /// Location of the compiled object file handed to the loader.
    pub binary_path: PathBuf,
    /// Individually attachable program units.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub programs: Vec<Program>,
}

/// One attachable program unit of a component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
}

impl Program {
    pub fn new(id: ProgramId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
