use super::{
    attributes::Attribute,
    dn::{first_rdn_value, parent_dn},
    object::{Object, ObjectId, ObjectType},
    schema::Schema,
};
use crate::{
    rules::technique::Technique,
    security::{
        cache::DescriptorCache,
        descriptor::SecurityDescriptor,
        guid::Guid,
        sid::{Sid, RID_PROTECTED_USERS},
    },
    utils::encoding::base64_encode_standard,
};
use log::{debug, info, warn};
use std::{collections::HashMap, ops::Index, sync::Arc};

/// DN of the pseudo object that represents an outside attacker
pub const ATTACKER_DN: &str = "CN=Attacker";

/**
 * Indexed collection of directory objects.
 * Objects live in a `Vec` and are referred to by `ObjectId`. Lookups by lowercase DN, SID and GUID.
 * Mutated only while building. After `finalize` a shared `&Objects` can serve concurrent readers
 */
#[derive(Debug)]
pub struct Objects {
    objects: Vec<Object>,
    by_dn: HashMap<String, ObjectId>,
    by_sid: HashMap<Sid, ObjectId>,
    by_guid: HashMap<Guid, ObjectId>,
    type_counts: HashMap<ObjectType, usize>,
    descriptors: Arc<DescriptorCache>,
    attacker: ObjectId,
}

impl Default for Objects {
    fn default() -> Self {
        Objects::new()
    }
}

impl Objects {
    pub fn new() -> Objects {
        Objects::with_cache(Arc::new(DescriptorCache::new()))
    }

    /// Empty store using an existing descriptor cache
    pub fn with_cache(descriptors: Arc<DescriptorCache>) -> Objects {
        let mut objects = Objects {
            objects: Vec::new(),
            by_dn: HashMap::new(),
            by_sid: HashMap::new(),
            by_guid: HashMap::new(),
            type_counts: HashMap::new(),
            descriptors,
            attacker: ObjectId(0),
        };

        let mut attributes = HashMap::new();
        attributes.insert(Attribute::Name, vec![String::from("Attacker")]);
        let attacker = Object::with_type(ATTACKER_DN, attributes, ObjectType::Attacker);
        objects.attacker = objects.add(attacker);
        objects
    }

    /// Index and store an object. A DN already present returns the existing object
    pub fn add(&mut self, mut object: Object) -> ObjectId {
        let dn_key = object.dn().to_lowercase();
        if let Some(existing) = self.by_dn.get(&dn_key) {
            warn!(
                "[directory] Duplicate DN {}, keeping the first object",
                object.dn()
            );
            return *existing;
        }

        let id = ObjectId(self.objects.len());
        object.id = id;
        self.by_dn.insert(dn_key, id);

        let mut sids = Vec::new();
        if let Some(sid) = object.sid() {
            sids.push(sid.clone());
        }
        sids.append(&mut object.sid_history());
        for sid in sids {
            match self.by_sid.get(&sid) {
                Some(existing) if *existing != id => warn!(
                    "[directory] SID {sid} on {} already belongs to {}, keeping the first object",
                    object.dn(),
                    self.objects[existing.0].dn()
                ),
                Some(_) => {}
                None => {
                    self.by_sid.insert(sid, id);
                }
            }
        }

        if let Some(guid) = object.guid() {
            if self.by_guid.contains_key(guid) {
                warn!(
                    "[directory] GUID {guid} on {} is not unique, keeping the first object",
                    object.dn()
                );
            } else {
                self.by_guid.insert(*guid, id);
            }
        }

        *self.type_counts.entry(object.object_type()).or_insert(0) += 1;
        self.objects.push(object);
        id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Object> {
        self.objects.iter()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0)
    }

    /// Lookup by DN. Case insensitive
    pub fn find(&self, dn: &str) -> Option<ObjectId> {
        self.by_dn.get(&dn.to_lowercase()).copied()
    }

    pub fn find_by_sid(&self, sid: &Sid) -> Option<ObjectId> {
        self.by_sid.get(sid).copied()
    }

    pub fn find_by_guid(&self, guid: &Guid) -> Option<ObjectId> {
        self.by_guid.get(guid).copied()
    }

    /// The attacker pseudo object
    pub fn attacker(&self) -> ObjectId {
        self.attacker
    }

    pub fn type_counts(&self) -> &HashMap<ObjectType, usize> {
        &self.type_counts
    }

    pub fn descriptors(&self) -> &Arc<DescriptorCache> {
        &self.descriptors
    }

    /// Parsed security descriptor of an object
    pub fn security_descriptor(&self, id: ObjectId) -> Option<&SecurityDescriptor> {
        self.get(id)?.security_descriptor(&self.descriptors)
    }

    /// Existing object with `sid`, or a new placeholder named after it
    pub fn find_or_create_by_sid(&mut self, sid: &Sid) -> ObjectId {
        self.find_or_create_by_sid_typed(sid, ObjectType::Other)
    }

    /// Same as `find_or_create_by_sid` but a new placeholder gets `object_type`
    pub fn find_or_create_by_sid_typed(&mut self, sid: &Sid, object_type: ObjectType) -> ObjectId {
        if let Some(existing) = self.find_by_sid(sid) {
            return existing;
        }

        let dn = format!("CN={sid}");
        if let Some(existing) = self.find(&dn) {
            return existing;
        }
        debug!("[directory] Creating placeholder for unknown SID {sid}");

        let mut attributes = HashMap::new();
        attributes.insert(Attribute::Name, vec![sid.to_string()]);
        attributes.insert(
            Attribute::ObjectSid,
            vec![base64_encode_standard(&sid.to_bytes())],
        );
        self.add(Object::placeholder(&dn, attributes, object_type))
    }

    /// Existing object with `dn`, or a new placeholder of `object_type`
    pub fn find_or_create_by_dn(&mut self, dn: &str, object_type: ObjectType) -> ObjectId {
        if let Some(existing) = self.find(dn) {
            return existing;
        }
        debug!("[directory] Creating placeholder for unknown DN {dn}");

        let mut attributes = HashMap::new();
        attributes.insert(Attribute::Name, vec![first_rdn_value(dn).to_string()]);
        self.add(Object::placeholder(dn, attributes, object_type))
    }

    /// New independent store holding copies of the matching objects with its own descriptor cache.
    /// Links are not carried over
    pub fn filter<F>(&self, predicate: F) -> Objects
    where
        F: Fn(&Object) -> bool,
    {
        let mut filtered = Objects::new();
        for object in &self.objects {
            if object.id == self.attacker || !predicate(object) {
                continue;
            }
            let copy = if object.is_placeholder() {
                Object::placeholder(
                    object.dn(),
                    object.attributes().clone(),
                    object.object_type(),
                )
            } else {
                Object::new(object.dn(), object.attributes().clone())
            };
            filtered.add(copy);
        }
        filtered
    }

    /// Ids of the matching objects
    pub fn select<F>(&self, predicate: F) -> Vec<ObjectId>
    where
        F: Fn(&Object) -> bool,
    {
        self.objects
            .iter()
            .filter(|object| predicate(object))
            .map(|object| object.id)
            .collect()
    }

    /// Parent in the DN hierarchy, if it was loaded
    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        let parent = parent_dn(self.get(id)?.dn())?;
        self.find(parent)
    }

    /// Direct children in the DN hierarchy
    pub fn subordinates_of(&self, id: ObjectId) -> Vec<ObjectId> {
        let dn = match self.get(id) {
            Some(object) => object.dn().to_lowercase(),
            None => return Vec::new(),
        };
        self.objects
            .iter()
            .filter(|object| {
                parent_dn(object.dn()).is_some_and(|parent| parent.to_lowercase() == dn)
            })
            .map(|object| object.id)
            .collect()
    }

    /**
     * Link every object to its groups: the primary group (own SID with the RID swapped for
     * `primaryGroupID`), `memberOf` and `member` values. Unknown groups and members become
     * placeholders. Each object is resolved once
     */
    pub fn resolve_memberships(&mut self) {
        let mut index = 0;
        while index < self.objects.len() {
            let id = ObjectId(index);
            index += 1;
            if self.objects[id.0].memberships_resolved {
                continue;
            }
            self.objects[id.0].memberships_resolved = true;

            let object = &self.objects[id.0];
            let primary_group = match (
                object.sid(),
                object
                    .first_value(&Attribute::PrimaryGroupId)
                    .and_then(|value| value.trim().parse::<u32>().ok()),
            ) {
                (Some(sid), Some(rid)) => Some(sid.with_rid(rid)),
                _ => None,
            };
            let member_of = object.values(&Attribute::MemberOf).to_vec();
            let members = object.values(&Attribute::Member).to_vec();

            if let Some(sid) = primary_group {
                let group = self.find_or_create_by_sid_typed(&sid, ObjectType::Group);
                self.link_member(id, group);
            }
            for dn in member_of {
                let group = self.find_or_create_by_dn(&dn, ObjectType::Group);
                self.link_member(id, group);
            }
            for dn in members {
                let member = self.find_or_create_by_dn(&dn, ObjectType::Other);
                self.link_member(member, id);
            }
        }

        let mut protected = Vec::new();
        for object in &self.objects {
            let is_protected = object.member_of.iter().any(|group| {
                self.objects[group.0].sid().is_some_and(|sid| {
                    sid.is_domain_account() && sid.rid() == Some(RID_PROTECTED_USERS)
                })
            });
            if is_protected {
                protected.push(object.id);
            }
        }
        for id in protected {
            self.objects[id.0].protected_user = true;
        }
    }

    fn link_member(&mut self, member: ObjectId, group: ObjectId) {
        if member == group {
            return;
        }
        if !self.objects[member.0].member_of.contains(&group) {
            self.objects[member.0].member_of.push(group);
        }
        if !self.objects[group.0].members.contains(&member) {
            self.objects[group.0].members.push(member);
        }
    }

    /// Record that `source` can act on `target`. Duplicates and self edges are ignored
    pub fn add_edge(&mut self, technique: Technique, source: ObjectId, target: ObjectId) -> bool {
        if source == target || source.0 >= self.objects.len() || target.0 >= self.objects.len() {
            return false;
        }
        if self.objects[source.0]
            .can_act_on
            .contains(&(technique, target))
        {
            return false;
        }
        self.objects[source.0].can_act_on.push((technique, target));
        self.objects[target.0].acted_on_by.push((technique, source));
        true
    }

    /// Compute every lazily derived field so the store can be shared across threads
    pub fn finalize(&self, schema: &Schema) {
        for object in &self.objects {
            object.finalize(schema, &self.descriptors);
        }
        info!(
            "[directory] Finalized {} objects, {} unique security descriptors ({} reused)",
            self.objects.len(),
            self.descriptors.len(),
            self.descriptors.hits()
        );
    }
}

impl Index<ObjectId> for Objects {
    type Output = Object;

    fn index(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::{Objects, ATTACKER_DN};
    use crate::{
        directory::{
            attributes::Attribute,
            object::{Object, ObjectType},
            schema::Schema,
        },
        rules::technique::Technique,
        security::sid::Sid,
        utils::encoding::base64_encode_standard,
    };
    use std::{collections::HashMap, str::FromStr, sync::Arc};

    fn object(dn: &str, attributes: &[(Attribute, &[&str])]) -> Object {
        let mut values = HashMap::new();
        for (attribute, entries) in attributes {
            values.insert(
                attribute.clone(),
                entries.iter().map(|entry| entry.to_string()).collect(),
            );
        }
        Object::new(dn, values)
    }

    fn sid_value(sid: &str) -> String {
        base64_encode_standard(&Sid::from_str(sid).unwrap().to_bytes())
    }

    #[test]
    fn test_add_and_find() {
        let mut objects = Objects::new();
        let alice_sid = sid_value("S-1-5-21-1-2-3-1105");
        let alice = objects.add(object(
            "CN=Alice,CN=Users,DC=corp,DC=local",
            &[
                (Attribute::ObjectSid, &[&alice_sid]),
                (Attribute::ObjectClass, &["top", "person", "user"]),
                (Attribute::ObjectGuid, &["AAECAwQFBgcICQoLDA0ODw=="]),
            ],
        ));

        assert_eq!(objects.find("cn=alice,cn=users,dc=corp,dc=local"), Some(alice));
        assert_eq!(
            objects.find_by_sid(&Sid::from_str("S-1-5-21-1-2-3-1105").unwrap()),
            Some(alice)
        );
        let guid = *objects[alice].guid().unwrap();
        assert_eq!(objects.find_by_guid(&guid), Some(alice));
        assert_eq!(objects.type_counts().get(&ObjectType::User), Some(&1));
        assert_eq!(objects[objects.attacker()].dn(), ATTACKER_DN);
        assert_eq!(objects[objects.attacker()].object_type(), ObjectType::Attacker);
    }

    #[test]
    fn test_sid_collision_keeps_first() {
        let mut objects = Objects::new();
        let sid = sid_value("S-1-5-21-1-2-3-1105");
        let first = objects.add(object("CN=First,DC=corp", &[(Attribute::ObjectSid, &[&sid])]));
        let second = objects.add(object("CN=Second,DC=corp", &[(Attribute::ObjectSid, &[&sid])]));
        assert_ne!(first, second);
        assert_eq!(
            objects.find_by_sid(&Sid::from_str("S-1-5-21-1-2-3-1105").unwrap()),
            Some(first)
        );
    }

    #[test]
    fn test_sid_history_indexed() {
        let mut objects = Objects::new();
        let sid = sid_value("S-1-5-21-1-2-3-1105");
        let old = sid_value("S-1-5-21-9-9-9-1000");
        let migrated = objects.add(object(
            "CN=Migrated,DC=corp",
            &[
                (Attribute::ObjectSid, &[&sid]),
                (Attribute::SidHistory, &[&old]),
            ],
        ));
        assert_eq!(
            objects.find_by_sid(&Sid::from_str("S-1-5-21-9-9-9-1000").unwrap()),
            Some(migrated)
        );
    }

    #[test]
    fn test_duplicate_dn() {
        let mut objects = Objects::new();
        let first = objects.add(object("CN=Same,DC=corp", &[]));
        let second = objects.add(object("cn=same,dc=corp", &[]));
        assert_eq!(first, second);
        assert_eq!(objects.len(), 2);
    }

    #[test]
    fn test_find_or_create_by_sid() {
        let mut objects = Objects::new();
        let everyone = objects.find_or_create_by_sid(&Sid::everyone());
        assert!(objects[everyone].is_placeholder());
        assert_eq!(objects[everyone].dn(), "CN=S-1-1-0");
        assert_eq!(objects[everyone].sid(), Some(&Sid::everyone()));
        assert_eq!(objects.find_or_create_by_sid(&Sid::everyone()), everyone);
    }

    #[test]
    fn test_hierarchy() {
        let mut objects = Objects::new();
        let domain = objects.add(object("DC=corp,DC=local", &[]));
        let users = objects.add(object("CN=Users,DC=corp,DC=local", &[]));
        let smith = objects.add(object("CN=Smith\\, John,CN=Users,DC=corp,DC=local", &[]));
        let nested = objects.add(object("CN=Nested,CN=Smith\\, John,CN=Users,DC=corp,DC=local", &[]));

        assert_eq!(objects.parent_of(users), Some(domain));
        assert_eq!(objects.parent_of(smith), Some(users));
        assert_eq!(objects.parent_of(nested), Some(smith));
        assert_eq!(objects.parent_of(domain), None);
        assert_eq!(objects.subordinates_of(users), vec![smith]);
        assert_eq!(objects.subordinates_of(domain), vec![users]);
    }

    #[test]
    fn test_resolve_memberships() {
        let mut objects = Objects::new();
        let alice_sid = sid_value("S-1-5-21-1-2-3-1105");
        let users_sid = sid_value("S-1-5-21-1-2-3-513");
        let protected_sid = sid_value("S-1-5-21-1-2-3-525");

        let domain_users = objects.add(object(
            "CN=Domain Users,CN=Users,DC=corp",
            &[(Attribute::ObjectSid, &[&users_sid])],
        ));
        let protected = objects.add(object(
            "CN=Protected Users,CN=Users,DC=corp",
            &[
                (Attribute::ObjectSid, &[&protected_sid]),
                (Attribute::Member, &["CN=Alice,CN=Users,DC=corp"]),
            ],
        ));
        let alice = objects.add(object(
            "CN=Alice,CN=Users,DC=corp",
            &[
                (Attribute::ObjectSid, &[&alice_sid]),
                (Attribute::PrimaryGroupId, &["513"]),
                (Attribute::MemberOf, &["CN=Missing,CN=Users,DC=corp"]),
            ],
        ));

        objects.resolve_memberships();
        let missing = objects.find("CN=Missing,CN=Users,DC=corp").unwrap();
        assert!(objects[missing].is_placeholder());
        assert_eq!(objects[missing].object_type(), ObjectType::Group);

        let member_of = objects[alice].member_of();
        assert!(member_of.contains(&domain_users));
        assert!(member_of.contains(&protected));
        assert!(member_of.contains(&missing));
        assert_eq!(objects[domain_users].members(), &[alice]);
        assert!(objects[alice].is_protected_user());

        // Second pass changes nothing
        objects.resolve_memberships();
        assert_eq!(objects[alice].member_of().len(), 3);
    }

    #[test]
    fn test_resolve_missing_primary_group() {
        let mut objects = Objects::new();
        let alice_sid = sid_value("S-1-5-21-1-2-3-1105");
        let alice = objects.add(object(
            "CN=Alice,CN=Users,DC=corp",
            &[
                (Attribute::ObjectSid, &[&alice_sid]),
                (Attribute::PrimaryGroupId, &["513"]),
            ],
        ));

        objects.resolve_memberships();
        let users = objects
            .find_by_sid(&Sid::from_str("S-1-5-21-1-2-3-513").unwrap())
            .unwrap();
        assert!(objects[users].is_placeholder());
        assert_eq!(objects[users].object_type(), ObjectType::Group);
        assert_eq!(objects[alice].member_of(), &[users]);
        assert_eq!(objects[users].members(), &[alice]);
    }

    #[test]
    fn test_add_edge() {
        let mut objects = Objects::new();
        let a = objects.add(object("CN=A,DC=corp", &[]));
        let b = objects.add(object("CN=B,DC=corp", &[]));
        assert!(objects.add_edge(Technique::ResetPassword, a, b));
        assert!(!objects.add_edge(Technique::ResetPassword, a, b));
        assert!(!objects.add_edge(Technique::GenericAll, a, a));
        assert!(objects.add_edge(Technique::GenericAll, a, b));
        assert_eq!(objects[a].can_act_on().len(), 2);
        assert_eq!(
            objects[b].acted_on_by(),
            &[(Technique::ResetPassword, a), (Technique::GenericAll, a)]
        );
    }

    #[test]
    fn test_filter_and_select() {
        let mut objects = Objects::new();
        let a = objects.add(object("CN=A,DC=corp", &[(Attribute::ObjectClass, &["user"])]));
        let b = objects.add(object("CN=B,DC=corp", &[(Attribute::ObjectClass, &["group"])]));
        objects.add_edge(Technique::GenericAll, a, b);

        let users = objects.filter(|object| object.object_type() == ObjectType::User);
        assert_eq!(users.len(), 2);
        let copied = users.find("CN=A,DC=corp").unwrap();
        assert!(users[copied].can_act_on().is_empty());
        assert!(users.find("CN=B,DC=corp").is_none());
        assert!(!Arc::ptr_eq(users.descriptors(), objects.descriptors()));

        assert_eq!(
            objects.select(|object| object.object_type() == ObjectType::Group),
            vec![b]
        );
    }

    #[test]
    fn test_finalize() {
        let mut objects = Objects::new();
        objects.add(object(
            "CN=A,DC=corp",
            &[(Attribute::ObjectClass, &["top", "user"])],
        ));
        let schema = Schema::with_defaults();
        objects.finalize(&schema);
        let shared = &objects;
        std::thread::scope(|scope| {
            for _ in 0..2 {
                scope.spawn(|| {
                    for object in shared.iter() {
                        let _ = object.class_guids(&schema);
                    }
                });
            }
        });
    }
}
