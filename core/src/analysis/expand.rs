/**
 * Round based breadth first expansion over the capability edges of a built store.
 *
 * Every implicated object maps to the round it was processed in (0 while pending). Each round walks
 * the adjacency of the pending objects, records oriented edges and queues unseen counterparties.
 * Deny markers are recorded but never queue anything. Without cross links an edge into an object
 * processed in an earlier round is dropped, except edges to the attacker when the policy says so.
 * Only reads the store, so concurrent expansions over one finalized store are fine
 */
use super::{
    graph::{CapabilityGraph, Connection},
    request::ExpandRequest,
};
use crate::{directory::object::ObjectId, directory::store::Objects, rules::technique::Technique};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

pub fn expand(objects: &Objects, request: &ExpandRequest) -> CapabilityGraph {
    let mut implicated: BTreeMap<ObjectId, usize> = BTreeMap::new();
    for target in &request.targets {
        if objects.get(*target).is_none() {
            warn!("[analysis] Ignoring target {target}, not in the store");
            continue;
        }
        implicated.insert(*target, 0);
    }
    let targets: Vec<ObjectId> = implicated.keys().copied().collect();

    let forward = request.policy.forward;
    let attacker = objects.attacker();
    let mut edges: BTreeMap<(ObjectId, ObjectId), Vec<Technique>> = BTreeMap::new();
    let mut round = 0;

    loop {
        round += 1;
        if round > request.max_depth {
            break;
        }

        let pending: Vec<ObjectId> = implicated
            .iter()
            .filter(|(_, processed)| **processed == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut discovered: BTreeSet<ObjectId> = BTreeSet::new();

        for id in &pending {
            let object = &objects[*id];
            let adjacency = if forward {
                object.acted_on_by()
            } else {
                object.can_act_on()
            };

            for (technique, counterparty) in adjacency {
                if !request.follows(technique) || request.exclude.contains(counterparty) {
                    continue;
                }

                if let Some(processed) = implicated.get(counterparty) {
                    let earlier = *processed != 0 && *processed < round;
                    let keep_attacker =
                        *counterparty == attacker && request.policy.expand_attacker;
                    if earlier && !request.policy.include_cross_links && !keep_attacker {
                        continue;
                    }
                }

                let key = if forward {
                    (*counterparty, *id)
                } else {
                    (*id, *counterparty)
                };
                let techniques = edges.entry(key).or_default();
                if !techniques.contains(technique) {
                    techniques.push(*technique);
                }

                if technique.is_deny_marker() {
                    continue;
                }
                if !implicated.contains_key(counterparty) {
                    discovered.insert(*counterparty);
                }
            }
        }

        for id in pending {
            implicated.insert(id, round);
        }
        debug!(
            "[analysis] Round {round} discovered {} new objects",
            discovered.len()
        );
        if discovered.is_empty() {
            break;
        }
        for id in discovered {
            implicated.insert(id, 0);
        }
    }

    // Deny only discoveries never joined the implicated set
    let mut connections = Vec::new();
    for ((source, target), mut techniques) in edges {
        if !implicated.contains_key(&source) || !implicated.contains_key(&target) {
            continue;
        }
        techniques.sort();
        connections.push(Connection {
            source,
            target,
            techniques,
        });
    }

    CapabilityGraph {
        targets,
        implicated: implicated.into_keys().collect(),
        connections,
        rounds: round.min(request.max_depth),
        forward,
        max_depth: request.max_depth,
    }
}
