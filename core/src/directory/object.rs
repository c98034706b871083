use super::{attributes::Attribute, dn::first_rdn_value, schema::Schema};
use crate::{
    rules::technique::Technique,
    security::{cache::DescriptorCache, descriptor::SecurityDescriptor, guid::Guid, sid::Sid},
    utils::encoding::base64_decode_standard,
};
use log::{error, warn};
use serde::Serialize;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock},
};

/// Position of an object inside its `Objects` store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ObjectType {
    User,
    Group,
    Computer,
    ManagedServiceAccount,
    GroupPolicyContainer,
    OrganizationalUnit,
    Container,
    DomainDns,
    ForeignSecurityPrincipal,
    AttributeSchema,
    ClassSchema,
    ControlAccessRight,
    Attacker,
    Other,
}

impl ObjectType {
    /// Classify from the first RDN value of `objectCategory`
    fn from_category(category: &str) -> Option<ObjectType> {
        let object_type = match category.to_lowercase().as_str() {
            "person" => ObjectType::User,
            "computer" => ObjectType::Computer,
            "group" => ObjectType::Group,
            "ms-ds-group-managed-service-account" | "ms-ds-managed-service-account" => {
                ObjectType::ManagedServiceAccount
            }
            "group-policy-container" => ObjectType::GroupPolicyContainer,
            "organizational-unit" => ObjectType::OrganizationalUnit,
            "container" => ObjectType::Container,
            "domain-dns" => ObjectType::DomainDns,
            "foreign-security-principal" => ObjectType::ForeignSecurityPrincipal,
            "attribute-schema" => ObjectType::AttributeSchema,
            "class-schema" => ObjectType::ClassSchema,
            "control-access-right" => ObjectType::ControlAccessRight,
            _ => return None,
        };
        Some(object_type)
    }

    /// Classify from an `objectClass` value
    fn from_class(class: &str) -> Option<ObjectType> {
        let object_type = match class.to_lowercase().as_str() {
            "user" | "person" | "inetorgperson" => ObjectType::User,
            "computer" => ObjectType::Computer,
            "group" => ObjectType::Group,
            "msds-groupmanagedserviceaccount" | "msds-managedserviceaccount" => {
                ObjectType::ManagedServiceAccount
            }
            "grouppolicycontainer" => ObjectType::GroupPolicyContainer,
            "organizationalunit" => ObjectType::OrganizationalUnit,
            "container" => ObjectType::Container,
            "domaindns" => ObjectType::DomainDns,
            "foreignsecurityprincipal" => ObjectType::ForeignSecurityPrincipal,
            "attributeschema" => ObjectType::AttributeSchema,
            "classschema" => ObjectType::ClassSchema,
            "controlaccessright" => ObjectType::ControlAccessRight,
            _ => return None,
        };
        Some(object_type)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::User => "User",
            ObjectType::Group => "Group",
            ObjectType::Computer => "Computer",
            ObjectType::ManagedServiceAccount => "ManagedServiceAccount",
            ObjectType::GroupPolicyContainer => "GroupPolicyContainer",
            ObjectType::OrganizationalUnit => "OrganizationalUnit",
            ObjectType::Container => "Container",
            ObjectType::DomainDns => "DomainDns",
            ObjectType::ForeignSecurityPrincipal => "ForeignSecurityPrincipal",
            ObjectType::AttributeSchema => "AttributeSchema",
            ObjectType::ClassSchema => "ClassSchema",
            ObjectType::ControlAccessRight => "ControlAccessRight",
            ObjectType::Attacker => "Attacker",
            ObjectType::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/**
 * A directory object: its DN, raw attribute values and everything derived from them.
 * Derived fields are computed once (`OnceLock`) so concurrent readers never race.
 * Membership and capability links are only written while the store is being built
 */
#[derive(Debug)]
pub struct Object {
    pub(crate) id: ObjectId,
    dn: String,
    attributes: HashMap<Attribute, Vec<String>>,
    object_type: OnceLock<ObjectType>,
    sid: OnceLock<Option<Sid>>,
    guid: OnceLock<Option<Guid>>,
    class_guids: OnceLock<Vec<Guid>>,
    descriptor: OnceLock<Option<Arc<SecurityDescriptor>>>,
    gmsa_descriptor: OnceLock<Option<Arc<SecurityDescriptor>>>,
    pub(crate) member_of: Vec<ObjectId>,
    pub(crate) members: Vec<ObjectId>,
    pub(crate) memberships_resolved: bool,
    pub(crate) can_act_on: Vec<(Technique, ObjectId)>,
    pub(crate) acted_on_by: Vec<(Technique, ObjectId)>,
    pub(crate) protected_user: bool,
    pub(crate) placeholder: bool,
}

impl Object {
    pub fn new(dn: &str, attributes: HashMap<Attribute, Vec<String>>) -> Object {
        Object {
            id: ObjectId(0),
            dn: dn.to_string(),
            attributes,
            object_type: OnceLock::new(),
            sid: OnceLock::new(),
            guid: OnceLock::new(),
            class_guids: OnceLock::new(),
            descriptor: OnceLock::new(),
            gmsa_descriptor: OnceLock::new(),
            member_of: Vec::new(),
            members: Vec::new(),
            memberships_resolved: false,
            can_act_on: Vec::new(),
            acted_on_by: Vec::new(),
            protected_user: false,
            placeholder: false,
        }
    }

    /// Object with a fixed type instead of one classified from its attributes
    pub(crate) fn with_type(
        dn: &str,
        attributes: HashMap<Attribute, Vec<String>>,
        object_type: ObjectType,
    ) -> Object {
        let object = Object::new(dn, attributes);
        let _ = object.object_type.set(object_type);
        object
    }

    /// Synthetic object standing in for a reference that resolved to nothing
    pub(crate) fn placeholder(
        dn: &str,
        attributes: HashMap<Attribute, Vec<String>>,
        object_type: ObjectType,
    ) -> Object {
        let mut object = Object::with_type(dn, attributes, object_type);
        object.placeholder = true;
        object
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn attributes(&self) -> &HashMap<Attribute, Vec<String>> {
        &self.attributes
    }

    /// All values of an attribute. Empty if the attribute is missing
    pub fn values(&self, attribute: &Attribute) -> &[String] {
        match self.attributes.get(attribute) {
            Some(values) => values,
            None => &[],
        }
    }

    pub fn first_value(&self, attribute: &Attribute) -> Option<&str> {
        self.values(attribute).first().map(|value| value.as_str())
    }

    /// Display name: `name`, falling back to the first RDN value
    pub fn name(&self) -> &str {
        match self.first_value(&Attribute::Name) {
            Some(name) => name,
            None => first_rdn_value(&self.dn),
        }
    }

    /// Decode every value of a base64 carried binary attribute. Bad values are logged and skipped
    pub(crate) fn binary_values(&self, attribute: &Attribute) -> Vec<Vec<u8>> {
        let mut decoded = Vec::new();
        for value in self.values(attribute) {
            match base64_decode_standard(value) {
                Ok(result) => decoded.push(result),
                Err(err) => {
                    error!(
                        "[directory] Could not base64 decode {} on {}: {err:?}",
                        attribute.name(),
                        self.dn
                    );
                }
            }
        }
        decoded
    }

    pub(crate) fn binary_value(&self, attribute: &Attribute) -> Option<Vec<u8>> {
        self.binary_values(attribute).into_iter().next()
    }

    pub fn object_type(&self) -> ObjectType {
        *self.object_type.get_or_init(|| {
            let class_fallback = || {
                self.values(&Attribute::ObjectClass)
                    .iter()
                    .rev()
                    .find_map(|class| ObjectType::from_class(class))
            };

            let category = self
                .first_value(&Attribute::ObjectCategory)
                .and_then(|category| ObjectType::from_category(first_rdn_value(category)));
            match category {
                // Computers are filed under the person category too
                Some(ObjectType::User) => match class_fallback() {
                    Some(ObjectType::Computer) => ObjectType::Computer,
                    _ => ObjectType::User,
                },
                Some(result) => result,
                None => class_fallback().unwrap_or(ObjectType::Other),
            }
        })
    }

    pub fn sid(&self) -> Option<&Sid> {
        self.sid
            .get_or_init(|| {
                let data = self.binary_value(&Attribute::ObjectSid)?;
                Sid::from_bytes(&data).ok()
            })
            .as_ref()
    }

    /// Previous SIDs of a migrated account
    pub fn sid_history(&self) -> Vec<Sid> {
        self.binary_values(&Attribute::SidHistory)
            .iter()
            .filter_map(|data| Sid::from_bytes(data).ok())
            .collect()
    }

    pub fn guid(&self) -> Option<&Guid> {
        self.guid
            .get_or_init(|| {
                let data = self.binary_value(&Attribute::ObjectGuid)?;
                let guid = Guid::from_ace_slice(&data);
                if guid.is_unknown() {
                    return None;
                }
                Some(guid)
            })
            .as_ref()
    }

    /// Schema GUIDs of every `objectClass` value. Classes missing from the schema are skipped
    pub fn class_guids(&self, schema: &Schema) -> &[Guid] {
        self.class_guids.get_or_init(|| {
            let mut guids = Vec::new();
            for class in self.values(&Attribute::ObjectClass) {
                match schema.class_guid(class) {
                    Some(guid) => guids.push(guid),
                    None => warn!(
                        "[directory] Class {class} on {} has no schema mapping",
                        self.dn
                    ),
                }
            }
            guids
        })
    }

    /// Parsed `nTSecurityDescriptor`. Missing or malformed descriptors give `None`
    pub fn security_descriptor(&self, cache: &DescriptorCache) -> Option<&SecurityDescriptor> {
        self.descriptor
            .get_or_init(|| self.decode_descriptor(&Attribute::SecurityDescriptor, cache))
            .as_deref()
    }

    /// Parsed `msDS-GroupMSAMembership`, the descriptor guarding managed password reads
    pub fn gmsa_descriptor(&self, cache: &DescriptorCache) -> Option<&SecurityDescriptor> {
        self.gmsa_descriptor
            .get_or_init(|| self.decode_descriptor(&Attribute::GmsaMembership, cache))
            .as_deref()
    }

    fn decode_descriptor(
        &self,
        attribute: &Attribute,
        cache: &DescriptorCache,
    ) -> Option<Arc<SecurityDescriptor>> {
        let data = self.binary_value(attribute)?;
        match cache.get_or_parse(&data) {
            Ok(result) => Some(result),
            Err(err) => {
                error!(
                    "[directory] Skipping {} on {}: {err:?}",
                    attribute.name(),
                    self.dn
                );
                None
            }
        }
    }

    pub fn member_of(&self) -> &[ObjectId] {
        &self.member_of
    }

    pub fn members(&self) -> &[ObjectId] {
        &self.members
    }

    /// What this object can do to others
    pub fn can_act_on(&self) -> &[(Technique, ObjectId)] {
        &self.can_act_on
    }

    /// Who can do something to this object
    pub fn acted_on_by(&self) -> &[(Technique, ObjectId)] {
        &self.acted_on_by
    }

    /// Member of Protected Users
    pub fn is_protected_user(&self) -> bool {
        self.protected_user
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Force every lazily derived field
    pub(crate) fn finalize(&self, schema: &Schema, cache: &DescriptorCache) {
        self.object_type();
        self.sid();
        self.guid();
        self.class_guids(schema);
        self.security_descriptor(cache);
        self.gmsa_descriptor(cache);
    }
}
