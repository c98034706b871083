use serde::{Deserialize, Serialize};

/// Capability graph as written to disk
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GraphExport {
    /**Ids of the objects the analysis started from */
    pub targets: Vec<usize>,
    pub objects: Vec<ExportObject>,
    pub connections: Vec<ExportConnection>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExportObject {
    pub id: usize,
    pub dn: String,
    pub name: String,
    pub object_type: String,
    pub sid: Option<String>,
    /**Synthesized for a reference that was not in the loaded data */
    pub placeholder: bool,
    pub protected_user: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExportConnection {
    pub source: usize,
    pub target: usize,
    pub techniques: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExportMetadata {
    pub forward: bool,
    pub max_depth: usize,
    pub rounds: usize,
    pub total_objects: usize,
}
