use super::error::AnalysisError;
use crate::{
    directory::{object::ObjectId, store::Objects},
    rules::technique::Technique,
    security::sid::Sid,
    structs::toml::AnalysisOptions,
};
use log::{error, warn};
use std::{collections::HashSet, str::FromStr};

pub const DEFAULT_MAX_DEPTH: usize = 99;

/// How the expansion walks the capability graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandPolicy {
    /**Who can reach the targets (true) or what the targets can reach (false) */
    pub forward: bool,
    /**Keep edges into objects finalized in an earlier round */
    pub include_cross_links: bool,
    /**Always record edges to the attacker, even into earlier rounds */
    pub expand_attacker: bool,
}

impl Default for ExpandPolicy {
    fn default() -> Self {
        ExpandPolicy {
            forward: true,
            include_cross_links: true,
            expand_attacker: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandRequest {
    pub targets: Vec<ObjectId>,
    /**Techniques to follow. Empty follows all */
    pub techniques: HashSet<Technique>,
    pub exclude: HashSet<ObjectId>,
    pub max_depth: usize,
    pub policy: ExpandPolicy,
}

impl ExpandRequest {
    pub fn new(targets: Vec<ObjectId>) -> ExpandRequest {
        ExpandRequest {
            targets,
            techniques: HashSet::new(),
            exclude: HashSet::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            policy: ExpandPolicy::default(),
        }
    }

    pub(crate) fn follows(&self, technique: &Technique) -> bool {
        self.techniques.is_empty() || self.techniques.contains(technique)
    }

    /// Build a request from TOML options, resolving target DNs and SIDs against the store
    pub fn from_options(
        objects: &Objects,
        options: &AnalysisOptions,
    ) -> Result<ExpandRequest, AnalysisError> {
        let mut targets = Vec::new();
        for dn in &options.targets {
            match objects.find(dn) {
                Some(id) => targets.push(id),
                None => {
                    error!("[analysis] Target {dn} is not in the loaded objects");
                    return Err(AnalysisError::UnknownTarget);
                }
            }
        }
        for value in &options.target_sids {
            let id = Sid::from_str(value)
                .ok()
                .and_then(|sid| objects.find_by_sid(&sid));
            match id {
                Some(result) => targets.push(result),
                None => {
                    error!("[analysis] Target SID {value} is not in the loaded objects");
                    return Err(AnalysisError::UnknownTarget);
                }
            }
        }
        if targets.is_empty() {
            return Err(AnalysisError::NoTargets);
        }
        targets.sort();
        targets.dedup();

        let mut techniques = HashSet::new();
        for name in &options.techniques {
            match Technique::from_str(name) {
                Ok(result) => {
                    techniques.insert(result);
                }
                Err(err) => {
                    error!("[analysis] {err}");
                    return Err(AnalysisError::UnknownTechnique);
                }
            }
        }

        let mut exclude = HashSet::new();
        for dn in &options.exclude {
            match objects.find(dn) {
                Some(id) => {
                    exclude.insert(id);
                }
                None => warn!("[analysis] Excluded object {dn} is not in the loaded objects"),
            }
        }

        Ok(ExpandRequest {
            targets,
            techniques,
            exclude,
            max_depth: options.max_depth,
            policy: ExpandPolicy {
                forward: options.forward,
                include_cross_links: options.include_cross_links,
                expand_attacker: options.expand_attacker,
            },
        })
    }
}
