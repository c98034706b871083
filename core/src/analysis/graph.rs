use crate::{
    directory::{object::ObjectId, store::Objects},
    rules::technique::Technique,
};
use common::analysis::{ExportConnection, ExportMetadata, ExportObject, GraphExport};

/// Source can act on target with every listed technique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: ObjectId,
    pub target: ObjectId,
    pub techniques: Vec<Technique>,
}

/// Result of one expansion. Every list is sorted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityGraph {
    pub targets: Vec<ObjectId>,
    pub implicated: Vec<ObjectId>,
    pub connections: Vec<Connection>,
    /**Rounds that were processed */
    pub rounds: usize,
    pub forward: bool,
    pub max_depth: usize,
}

impl CapabilityGraph {
    pub fn contains(&self, id: ObjectId) -> bool {
        self.implicated.binary_search(&id).is_ok()
    }

    pub fn connection(&self, source: ObjectId, target: ObjectId) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|connection| connection.source == source && connection.target == target)
    }

    /// Serializable form with names, types and SIDs resolved from the store
    pub fn export(&self, objects: &Objects) -> GraphExport {
        let mut exported = Vec::new();
        for id in &self.implicated {
            let object = match objects.get(*id) {
                Some(result) => result,
                None => continue,
            };
            exported.push(ExportObject {
                id: id.0,
                dn: object.dn().to_string(),
                name: object.name().to_string(),
                object_type: object.object_type().to_string(),
                sid: object.sid().map(|sid| sid.to_string()),
                placeholder: object.is_placeholder(),
                protected_user: object.is_protected_user(),
            });
        }

        let connections = self
            .connections
            .iter()
            .map(|connection| ExportConnection {
                source: connection.source.0,
                target: connection.target.0,
                techniques: connection
                    .techniques
                    .iter()
                    .map(|technique| technique.to_string())
                    .collect(),
            })
            .collect();

        GraphExport {
            targets: self.targets.iter().map(|id| id.0).collect(),
            objects: exported,
            connections,
            metadata: ExportMetadata {
                forward: self.forward,
                max_depth: self.max_depth,
                rounds: self.rounds,
                total_objects: objects.len(),
            },
        }
    }
}
