/**
 * Capability rules. Each rule inspects one object and returns the trustees that can use one
 * technique against it. `apply` runs a registry over the store and turns the results into edges
 */
pub(crate) mod acl;
pub mod replication;
pub(crate) mod state;
pub mod technique;

use crate::{
    directory::{
        object::{ObjectId, ObjectType},
        schema::Schema,
        store::Objects,
    },
    security::sid::Sid,
};
use log::{debug, info};
use replication::ReplicationRights;
use technique::Technique;

/// Read only view handed to every rule
pub struct RuleContext<'a> {
    pub objects: &'a Objects,
    pub schema: &'a Schema,
}

/// Who can act: a SID from a descriptor (resolved to an object later) or a known object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trustee {
    Sid(Sid),
    Object(ObjectId),
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub technique: Technique,
    pub evaluate: fn(&RuleContext<'_>, ObjectId) -> Vec<Trustee>,
}

#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Registry without any rules
    pub fn new() -> RuleRegistry {
        RuleRegistry::default()
    }

    /// The fixed rule table
    pub fn standard() -> RuleRegistry {
        let table: [(Technique, fn(&RuleContext<'_>, ObjectId) -> Vec<Trustee>); 24] = [
            (Technique::AclContainsDeny, state::acl_contains_deny),
            (Technique::Owns, state::owns),
            (Technique::GenericAll, acl::generic_all),
            (Technique::WriteAll, acl::write_all),
            (Technique::WritePropertyAll, acl::write_property_all),
            (Technique::WriteDacl, acl::write_dacl),
            (Technique::TakeOwnership, acl::take_ownership),
            (Technique::AllExtendedRights, acl::all_extended_rights),
            (Technique::ResetPassword, acl::reset_password),
            (Technique::AddMember, acl::add_member),
            (Technique::AddMemberGroupAttr, acl::add_member_group_attr),
            (Technique::AddSelfMember, acl::add_self_member),
            (Technique::WriteSpn, acl::write_spn),
            (
                Technique::WriteAltSecurityIdentities,
                acl::write_alt_security_identities,
            ),
            (Technique::WriteProfilePath, acl::write_profile_path),
            (Technique::WriteScriptPath, acl::write_script_path),
            (Technique::WriteKeyCredentialLink, acl::write_key_credential_link),
            (Technique::WriteAllowedToAct, acl::write_allowed_to_act),
            (Technique::WriteGpLink, acl::write_gp_link),
            (Technique::CreateAnyObject, acl::create_any_object),
            (Technique::CreateComputer, acl::create_computer),
            (Technique::ReadMsaPassword, acl::read_msa_password),
            (Technique::ReadLapsPassword, acl::read_laps_password),
            (Technique::MemberOfGroup, state::member_of_group),
        ];

        let mut registry = RuleRegistry::new();
        for (technique, evaluate) in table {
            registry.register(Rule {
                technique,
                evaluate,
            });
        }
        registry.register(Rule {
            technique: Technique::GpoLinked,
            evaluate: state::gpo_linked,
        });
        registry
    }

    pub fn register(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /**
     * Append the AdminSDHolder rule if any domain in the store has a
     * CN=AdminSDHolder,CN=System container. Returns true if the rule was added
     */
    pub fn register_privileged_container(&mut self, objects: &Objects) -> bool {
        if self.contains(Technique::AdminSdHolderOverwrite) {
            return false;
        }

        let found = objects.iter().any(|object| {
            object.object_type() == ObjectType::DomainDns
                && objects
                    .find(&format!("CN=AdminSDHolder,CN=System,{}", object.dn()))
                    .is_some()
        });
        if !found {
            return false;
        }
        info!("[rules] Found AdminSDHolder container, registering its rule");
        self.register(Rule {
            technique: Technique::AdminSdHolderOverwrite,
            evaluate: state::admin_sd_holder_overwrite,
        });
        true
    }

    pub fn contains(&self, technique: Technique) -> bool {
        self.rules.iter().any(|rule| rule.technique == technique)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/**
 * Run every rule on every object and store the resulting capability edges.
 * Rules only read the store. Trustees are resolved afterwards, creating placeholders for unknown SIDs.
 * Replication grants are merged next, then the attacker is wired to Everyone and Authenticated Users.
 * Returns the number of new edges
 */
pub fn apply(registry: &RuleRegistry, objects: &mut Objects, schema: &Schema) -> usize {
    objects.resolve_memberships();

    let mut found: Vec<(Technique, ObjectId, Vec<Trustee>)> = Vec::new();
    let mut replication = ReplicationRights::new();
    {
        let context = RuleContext {
            objects: &*objects,
            schema,
        };
        for object in objects.iter() {
            let id = object.id();
            if id == objects.attacker() {
                continue;
            }
            for rule in registry.rules() {
                let trustees = (rule.evaluate)(&context, id);
                if !trustees.is_empty() {
                    found.push((rule.technique, id, trustees));
                }
            }
            if object.object_type() == ObjectType::DomainDns {
                replication.record(&context, id);
            }
        }
    }

    let principal_self = Sid::principal_self();
    let mut added = 0;
    for (technique, target, trustees) in found {
        for trustee in trustees {
            let source = match trustee {
                Trustee::Object(source) => source,
                // Self means the object holding the descriptor
                Trustee::Sid(sid) if sid == principal_self => continue,
                Trustee::Sid(sid) => objects.find_or_create_by_sid(&sid),
            };
            if objects.add_edge(technique, source, target) {
                added += 1;
            }
        }
    }
    added += replication.merge(objects);

    let attacker = objects.attacker();
    for sid in [Sid::everyone(), Sid::authenticated_users()] {
        let group = objects.find_or_create_by_sid(&sid);
        if objects.add_edge(Technique::AttackerIsEveryone, attacker, group) {
            added += 1;
        }
    }

    debug!("[rules] Ran {} rules over {} objects", registry.len(), objects.len());
    info!("[rules] Added {added} capability edges");
    added
}

#[cfg(test)]
mod tests {
    use super::{apply, RuleRegistry};
    use crate::{
        directory::{attributes::Attribute, object::Object, schema::Schema, store::Objects},
        rules::technique::Technique,
        security::{
            ace::{Ace, AceType},
            acl::Acl,
            descriptor::{SecurityDescriptor, SE_DACL_PRESENT, SE_SELF_RELATIVE},
            rights::{extended_right_reset_password, RIGHT_DS_CONTROL_ACCESS},
            sid::Sid,
        },
        utils::encoding::base64_encode_standard,
    };
    use std::{collections::HashMap, str::FromStr};

    fn object(dn: &str, attributes: Vec<(Attribute, Vec<String>)>) -> Object {
        Object::new(dn, attributes.into_iter().collect::<HashMap<_, _>>())
    }

    #[test]
    fn test_standard_registry() {
        let registry = RuleRegistry::standard();
        assert_eq!(registry.len(), 25);
        assert!(registry.contains(Technique::ResetPassword));
        assert!(!registry.contains(Technique::AdminSdHolderOverwrite));
        assert!(!registry.contains(Technique::DcSync));
    }

    #[test]
    fn test_register_privileged_container() {
        let mut objects = Objects::new();
        let mut registry = RuleRegistry::standard();
        objects.add(object(
            "DC=corp,DC=local",
            vec![(Attribute::ObjectClass, vec![String::from("domainDNS")])],
        ));
        assert!(!registry.register_privileged_container(&objects));

        objects.add(object(
            "CN=AdminSDHolder,CN=System,DC=corp,DC=local",
            vec![(Attribute::ObjectClass, vec![String::from("container")])],
        ));
        assert!(registry.register_privileged_container(&objects));
        assert!(!registry.register_privileged_container(&objects));
        assert_eq!(registry.len(), 26);
    }

    #[test]
    fn test_apply_reset_password() {
        let a_sid = Sid::from_str("S-1-5-21-1-2-3-1101").unwrap();
        let descriptor = SecurityDescriptor {
            revision: 1,
            control: SE_DACL_PRESENT | SE_SELF_RELATIVE,
            owner: None,
            group: None,
            sacl: None,
            dacl: Some(Acl {
                revision: 4,
                entries: vec![
                    Ace {
                        ace_type: AceType::AccessAllowedObject,
                        flags: 0,
                        mask: RIGHT_DS_CONTROL_ACCESS,
                        object_type: Some(extended_right_reset_password()),
                        inherited_object_type: None,
                        trustee: a_sid.clone(),
                    },
                    Ace {
                        ace_type: AceType::AccessAllowed,
                        flags: 0,
                        mask: RIGHT_DS_CONTROL_ACCESS,
                        object_type: None,
                        inherited_object_type: None,
                        trustee: Sid::principal_self(),
                    },
                ],
            }),
        };

        let mut objects = Objects::new();
        let a = objects.add(object(
            "CN=A,DC=corp",
            vec![
                (Attribute::ObjectClass, vec![String::from("user")]),
                (
                    Attribute::ObjectSid,
                    vec![base64_encode_standard(&a_sid.to_bytes())],
                ),
            ],
        ));
        let b = objects.add(object(
            "CN=B,DC=corp",
            vec![
                (Attribute::ObjectClass, vec![String::from("user")]),
                (
                    Attribute::SecurityDescriptor,
                    vec![base64_encode_standard(&descriptor.to_bytes())],
                ),
            ],
        ));
        let schema = Schema::with_defaults();
        let added = apply(&RuleRegistry::standard(), &mut objects, &schema);

        // ResetPassword from A plus the two attacker edges
        assert_eq!(added, 3);
        assert_eq!(objects[b].acted_on_by(), &[(Technique::ResetPassword, a)]);

        let everyone = objects.find_by_sid(&Sid::everyone()).unwrap();
        assert_eq!(
            objects[objects.attacker()].can_act_on()[0],
            (Technique::AttackerIsEveryone, everyone)
        );

        // Running again adds nothing
        assert_eq!(apply(&RuleRegistry::standard(), &mut objects, &schema), 0);
    }
}
