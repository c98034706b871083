/**
 * Rules that read descriptor or group state directly instead of asking the access evaluator
 */
use super::{RuleContext, Trustee};
use crate::directory::{
    attributes::Attribute,
    object::{ObjectId, ObjectType},
};
use log::debug;

/// Every trustee named by an applicable deny entry. Marks the object, never extends a path
pub(crate) fn acl_contains_deny(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    let dacl = match context
        .objects
        .security_descriptor(id)
        .and_then(|descriptor| descriptor.dacl.as_ref())
    {
        Some(result) => result,
        None => return Vec::new(),
    };

    let mut trustees = Vec::new();
    for entry in &dacl.entries {
        if !entry.ace_type.is_deny() || entry.is_inherit_only() {
            continue;
        }
        let trustee = Trustee::Sid(entry.trustee.clone());
        if !trustees.contains(&trustee) {
            trustees.push(trustee);
        }
    }
    trustees
}

pub(crate) fn owns(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    match context
        .objects
        .security_descriptor(id)
        .and_then(|descriptor| descriptor.owner.as_ref())
    {
        Some(owner) => vec![Trustee::Sid(owner.clone())],
        None => Vec::new(),
    }
}

/// Members act with the rights of their group
pub(crate) fn member_of_group(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    context.objects[id]
        .members()
        .iter()
        .map(|member| Trustee::Object(*member))
        .collect()
}

/// Group policy objects linked to an OU or domain apply to everything below it
pub(crate) fn gpo_linked(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    let object = &context.objects[id];
    if !matches!(
        object.object_type(),
        ObjectType::OrganizationalUnit | ObjectType::DomainDns
    ) {
        return Vec::new();
    }

    let mut trustees = Vec::new();
    for value in object.values(&Attribute::GpLink) {
        for dn in linked_policies(value) {
            match context.objects.find(dn) {
                Some(policy) => {
                    let trustee = Trustee::Object(policy);
                    if !trustees.contains(&trustee) {
                        trustees.push(trustee);
                    }
                }
                None => debug!(
                    "[rules] Linked policy {dn} on {} was not loaded",
                    object.dn()
                ),
            }
        }
    }
    trustees
}

/// DNs in a gPLink value: "[LDAP://cn={GUID},cn=policies,cn=system,DC=corp;0][...]"
fn linked_policies(value: &str) -> Vec<&str> {
    let mut policies = Vec::new();
    for link in value.split('[') {
        let link = link.trim_end_matches(']');
        let path = match link.split_once(';') {
            Some((path, _options)) => path,
            None => link,
        };
        let dn = match path.get(..7) {
            Some(scheme) if scheme.eq_ignore_ascii_case("ldap://") => &path[7..],
            _ => continue,
        };
        if !dn.is_empty() {
            policies.push(dn);
        }
    }
    policies
}

/// Registered only when an AdminSDHolder container exists. Intentionally yields nothing
pub(crate) fn admin_sd_holder_overwrite(_context: &RuleContext<'_>, _id: ObjectId) -> Vec<Trustee> {
    Vec::new()
}
