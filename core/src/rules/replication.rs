/**
 * Directory replication (DCSync) needs GetChanges together with GetChangesAll or
 * GetChangesInFilteredSet on the same domain object for the same trustee.
 * Grants are collected per (domain, trustee) while the rules run and merged into edges afterwards
 */
use super::{acl::granted, RuleContext, Trustee};
use crate::{
    directory::{object::ObjectId, store::Objects},
    rules::technique::Technique,
    security::{
        guid::Guid,
        rights::{
            extended_right_get_changes, extended_right_get_changes_all,
            extended_right_get_changes_filtered_set, RIGHT_DS_CONTROL_ACCESS,
        },
        sid::Sid,
    },
};
use log::info;
use std::collections::BTreeMap;

const GET_CHANGES: u8 = 0x1;
const GET_CHANGES_ALL: u8 = 0x2;
const GET_CHANGES_FILTERED_SET: u8 = 0x4;

#[derive(Debug, Default)]
pub struct ReplicationRights {
    grants: BTreeMap<(ObjectId, Sid), u8>,
}

impl ReplicationRights {
    pub fn new() -> ReplicationRights {
        ReplicationRights::default()
    }

    /// Record the replication rights granted on `id`
    pub fn record(&mut self, context: &RuleContext<'_>, id: ObjectId) {
        let rights: [(Guid, u8); 3] = [
            (extended_right_get_changes(), GET_CHANGES),
            (extended_right_get_changes_all(), GET_CHANGES_ALL),
            (
                extended_right_get_changes_filtered_set(),
                GET_CHANGES_FILTERED_SET,
            ),
        ];
        for (right, bit) in rights {
            for trustee in granted(context, id, RIGHT_DS_CONTROL_ACCESS, &right) {
                if let Trustee::Sid(sid) = trustee {
                    *self.grants.entry((id, sid)).or_insert(0) |= bit;
                }
            }
        }
    }

    /// Trustees holding a usable combination of rights on `id`
    pub fn can_replicate(&self, id: ObjectId) -> Vec<&Sid> {
        self.grants
            .iter()
            .filter(|((domain, _), bits)| *domain == id && is_usable(**bits))
            .map(|((_, sid), _)| sid)
            .collect()
    }

    /// Add a `DcSync` edge for every usable combination. Returns the number of new edges
    pub fn merge(self, objects: &mut Objects) -> usize {
        let mut added = 0;
        for ((domain, sid), bits) in self.grants {
            if !is_usable(bits) {
                continue;
            }
            let source = objects.find_or_create_by_sid(&sid);
            if objects.add_edge(Technique::DcSync, source, domain) {
                added += 1;
            }
        }
        if added != 0 {
            info!("[rules] Added {added} DCSync edges");
        }
        added
    }
}

fn is_usable(bits: u8) -> bool {
    bits & GET_CHANGES != 0 && bits & (GET_CHANGES_ALL | GET_CHANGES_FILTERED_SET) != 0
}
