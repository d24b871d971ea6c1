//! Loop file schema definitions.

use dbw_controls::ControllerConfig;
use serde::{Deserialize, Serialize};

/// A set of named control loops for one vehicle or bench setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoopFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub loops: Vec<LoopDef>,
}

/// One controller and the tuning it starts with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoopDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub controller: ControllerConfig,
}

impl LoopFile {
    /// Look up a loop by ID.
    pub fn find_loop(&self, id: &str) -> Option<&LoopDef> {
        self.loops.iter().find(|l| l.id == id)
    }
}
