/**
 * Rules answered by the access evaluator: each one asks the object's DACL which trustees are
 * effectively granted a technique specific mask and object type
 */
use super::{RuleContext, Trustee};
use crate::{
    directory::object::{ObjectId, ObjectType},
    security::{
        guid::Guid,
        rights::{
            attribute_allowed_to_act, attribute_alt_security_identities, attribute_gp_link,
            attribute_key_credential_link, attribute_member, attribute_profile_path,
            attribute_script_path, attribute_service_principal_name, class_computer,
            extended_right_reset_password, property_set_membership, RIGHT_DS_CONTROL_ACCESS,
            RIGHT_DS_CREATE_CHILD, RIGHT_DS_FULL_CONTROL, RIGHT_DS_GENERIC_WRITE,
            RIGHT_DS_WRITE_PROPERTY, RIGHT_DS_WRITE_PROPERTY_EXTENDED, RIGHT_GENERIC_ALL,
            RIGHT_GENERIC_WRITE,
            RIGHT_WRITE_DACL, RIGHT_WRITE_OWNER,
        },
    },
};

/// Attributes holding a local administrator password managed by LAPS
const LAPS_PASSWORD_ATTRIBUTES: [&str; 3] =
    ["ms-Mcs-AdmPwd", "msLAPS-Password", "msLAPS-EncryptedPassword"];

/// Trustees the DACL of `id` effectively grants `mask` on `requested`
pub(crate) fn granted(
    context: &RuleContext<'_>,
    id: ObjectId,
    mask: u32,
    requested: &Guid,
) -> Vec<Trustee> {
    let dacl = match context
        .objects
        .security_descriptor(id)
        .and_then(|descriptor| descriptor.dacl.as_ref())
    {
        Some(result) => result,
        None => return Vec::new(),
    };
    let classes = context.objects[id].class_guids(context.schema);
    dacl.allowed_trustees(Some(classes), mask, requested, context.schema)
        .into_iter()
        .map(Trustee::Sid)
        .collect()
}

fn is_type(context: &RuleContext<'_>, id: ObjectId, types: &[ObjectType]) -> bool {
    types.contains(&context.objects[id].object_type())
}

const ACCOUNTS: [ObjectType; 3] = [
    ObjectType::User,
    ObjectType::Computer,
    ObjectType::ManagedServiceAccount,
];
const CONTAINERS: [ObjectType; 3] = [
    ObjectType::OrganizationalUnit,
    ObjectType::Container,
    ObjectType::DomainDns,
];

pub(crate) fn generic_all(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    let mut trustees = granted(context, id, RIGHT_GENERIC_ALL, &Guid::NULL);
    for trustee in granted(context, id, RIGHT_DS_FULL_CONTROL, &Guid::NULL) {
        if !trustees.contains(&trustee) {
            trustees.push(trustee);
        }
    }
    trustees
}

pub(crate) fn write_all(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    let mut trustees = granted(context, id, RIGHT_GENERIC_WRITE, &Guid::NULL);
    for trustee in granted(context, id, RIGHT_DS_GENERIC_WRITE, &Guid::NULL) {
        if !trustees.contains(&trustee) {
            trustees.push(trustee);
        }
    }
    trustees
}

pub(crate) fn write_property_all(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    granted(context, id, RIGHT_DS_WRITE_PROPERTY, &Guid::NULL)
}

pub(crate) fn write_dacl(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    granted(context, id, RIGHT_WRITE_DACL, &Guid::NULL)
}

pub(crate) fn take_ownership(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    granted(context, id, RIGHT_WRITE_OWNER, &Guid::NULL)
}

pub(crate) fn all_extended_rights(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    granted(context, id, RIGHT_DS_CONTROL_ACCESS, &Guid::NULL)
}

pub(crate) fn reset_password(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &ACCOUNTS) {
        return Vec::new();
    }
    granted(
        context,
        id,
        RIGHT_DS_CONTROL_ACCESS,
        &extended_right_reset_password(),
    )
}

pub(crate) fn add_member(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &[ObjectType::Group]) {
        return Vec::new();
    }
    granted(context, id, RIGHT_DS_WRITE_PROPERTY, &attribute_member())
}

pub(crate) fn add_member_group_attr(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &[ObjectType::Group]) {
        return Vec::new();
    }
    granted(context, id, RIGHT_DS_WRITE_PROPERTY, &property_set_membership())
}

/// Validated write to `member`: the trustee may add itself
pub(crate) fn add_self_member(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &[ObjectType::Group]) {
        return Vec::new();
    }
    granted(
        context,
        id,
        RIGHT_DS_WRITE_PROPERTY_EXTENDED,
        &attribute_member(),
    )
}

pub(crate) fn write_spn(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &ACCOUNTS) {
        return Vec::new();
    }
    granted(
        context,
        id,
        RIGHT_DS_WRITE_PROPERTY,
        &attribute_service_principal_name(),
    )
}

pub(crate) fn write_alt_security_identities(
    context: &RuleContext<'_>,
    id: ObjectId,
) -> Vec<Trustee> {
    if !is_type(context, id, &ACCOUNTS) {
        return Vec::new();
    }
    granted(
        context,
        id,
        RIGHT_DS_WRITE_PROPERTY,
        &attribute_alt_security_identities(),
    )
}

pub(crate) fn write_profile_path(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &[ObjectType::User]) {
        return Vec::new();
    }
    granted(context, id, RIGHT_DS_WRITE_PROPERTY, &attribute_profile_path())
}

pub(crate) fn write_script_path(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &[ObjectType::User]) {
        return Vec::new();
    }
    granted(context, id, RIGHT_DS_WRITE_PROPERTY, &attribute_script_path())
}

pub(crate) fn write_key_credential_link(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &ACCOUNTS) {
        return Vec::new();
    }
    granted(
        context,
        id,
        RIGHT_DS_WRITE_PROPERTY,
        &attribute_key_credential_link(),
    )
}

/// Resource based constrained delegation
pub(crate) fn write_allowed_to_act(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &[ObjectType::Computer]) {
        return Vec::new();
    }
    granted(
        context,
        id,
        RIGHT_DS_WRITE_PROPERTY,
        &attribute_allowed_to_act(),
    )
}

pub(crate) fn write_gp_link(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(
        context,
        id,
        &[ObjectType::OrganizationalUnit, ObjectType::DomainDns],
    ) {
        return Vec::new();
    }
    granted(context, id, RIGHT_DS_WRITE_PROPERTY, &attribute_gp_link())
}

pub(crate) fn create_any_object(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &CONTAINERS) {
        return Vec::new();
    }
    granted(context, id, RIGHT_DS_CREATE_CHILD, &Guid::NULL)
}

pub(crate) fn create_computer(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &CONTAINERS) {
        return Vec::new();
    }
    granted(context, id, RIGHT_DS_CREATE_CHILD, &class_computer())
}

/// Anyone allowed by the `msDS-GroupMSAMembership` descriptor may read the managed password
pub(crate) fn read_msa_password(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    let object = &context.objects[id];
    if object.object_type() != ObjectType::ManagedServiceAccount {
        return Vec::new();
    }
    let dacl = match object
        .gmsa_descriptor(context.objects.descriptors())
        .and_then(|descriptor| descriptor.dacl.as_ref())
    {
        Some(result) => result,
        None => return Vec::new(),
    };
    dacl.allowed_trustees(
        Some(object.class_guids(context.schema)),
        0,
        &Guid::NULL,
        context.schema,
    )
    .into_iter()
    .map(Trustee::Sid)
    .collect()
}

pub(crate) fn read_laps_password(context: &RuleContext<'_>, id: ObjectId) -> Vec<Trustee> {
    if !is_type(context, id, &[ObjectType::Computer]) {
        return Vec::new();
    }
    let mut trustees = Vec::new();
    for name in LAPS_PASSWORD_ATTRIBUTES {
        let attribute = match context.schema.attribute_guid(name) {
            Some(result) => result,
            None => continue,
        };
        for trustee in granted(context, id, RIGHT_DS_CONTROL_ACCESS, &attribute) {
            if !trustees.contains(&trustee) {
                trustees.push(trustee);
            }
        }
    }
    trustees
}

#[cfg(test)]
mod tests {
    use super::{
        add_member, add_member_group_attr, add_self_member, all_extended_rights, create_computer,
        generic_all, read_msa_password, reset_password, write_all, write_dacl, write_property_all,
    };
    use crate::{
        directory::{attributes::Attribute, object::Object, schema::Schema, store::Objects},
        rules::{RuleContext, Trustee},
        security::{
            ace::{Ace, AceType},
            acl::Acl,
            descriptor::{SecurityDescriptor, SE_DACL_PRESENT, SE_SELF_RELATIVE},
            guid::Guid,
            rights::{
                attribute_member, class_computer, extended_right_reset_password,
                property_set_membership, RIGHT_DS_CONTROL_ACCESS, RIGHT_DS_CREATE_CHILD,
                RIGHT_DS_FULL_CONTROL, RIGHT_DS_GENERIC_WRITE, RIGHT_DS_WRITE_PROPERTY,
                RIGHT_DS_WRITE_PROPERTY_EXTENDED, RIGHT_GENERIC_WRITE, RIGHT_WRITE_DACL,
            },
            sid::Sid,
        },
        utils::encoding::base64_encode_standard,
    };
    use std::{collections::HashMap, str::FromStr};

    fn ace(ace_type: AceType, mask: u32, object_type: Option<Guid>, trustee: &str) -> Ace {
        Ace {
            ace_type,
            flags: 0,
            mask,
            object_type,
            inherited_object_type: None,
            trustee: Sid::from_str(trustee).unwrap(),
        }
    }

    fn descriptor(entries: Vec<Ace>) -> String {
        let descriptor = SecurityDescriptor {
            revision: 1,
            control: SE_DACL_PRESENT | SE_SELF_RELATIVE,
            owner: None,
            group: None,
            sacl: None,
            dacl: Some(Acl {
                revision: 4,
                entries,
            }),
        };
        base64_encode_standard(&descriptor.to_bytes())
    }

    fn add(objects: &mut Objects, dn: &str, classes: &[&str], attribute: Attribute, value: String) {
        let mut attributes = HashMap::new();
        attributes.insert(
            Attribute::ObjectClass,
            classes.iter().map(|class| class.to_string()).collect(),
        );
        attributes.insert(attribute, vec![value]);
        objects.add(Object::new(dn, attributes));
    }

    fn trustee(sid: &str) -> Trustee {
        Trustee::Sid(Sid::from_str(sid).unwrap())
    }

    const HELPDESK: &str = "S-1-5-21-1-2-3-1200";
    const ADMIN: &str = "S-1-5-21-1-2-3-500";

    #[test]
    fn test_account_rules() {
        let mut objects = Objects::new();
        let sd = descriptor(vec![
            ace(
                AceType::AccessAllowedObject,
                RIGHT_DS_CONTROL_ACCESS,
                Some(extended_right_reset_password()),
                HELPDESK,
            ),
            ace(AceType::AccessAllowed, RIGHT_DS_FULL_CONTROL, None, ADMIN),
        ]);
        add(
            &mut objects,
            "CN=Alice,DC=corp",
            &["top", "user"],
            Attribute::SecurityDescriptor,
            sd,
        );
        let schema = Schema::with_defaults();
        let context = RuleContext {
            objects: &objects,
            schema: &schema,
        };
        let alice = objects.find("CN=Alice,DC=corp").unwrap();

        assert_eq!(
            reset_password(&context, alice),
            vec![trustee(HELPDESK), trustee(ADMIN)]
        );
        assert_eq!(generic_all(&context, alice), vec![trustee(ADMIN)]);
        assert_eq!(write_dacl(&context, alice), vec![trustee(ADMIN)]);
        assert_eq!(all_extended_rights(&context, alice), vec![trustee(ADMIN)]);
        assert_eq!(write_property_all(&context, alice), vec![trustee(ADMIN)]);
        // Wrong object type
        assert!(add_member(&context, alice).is_empty());
    }

    #[test]
    fn test_write_all() {
        let mut objects = Objects::new();
        let sd = descriptor(vec![
            ace(AceType::AccessAllowed, RIGHT_DS_GENERIC_WRITE, None, HELPDESK),
            ace(AceType::AccessAllowed, RIGHT_GENERIC_WRITE, None, ADMIN),
        ]);
        add(
            &mut objects,
            "CN=Alice,DC=corp",
            &["top", "user"],
            Attribute::SecurityDescriptor,
            sd,
        );
        let schema = Schema::with_defaults();
        let context = RuleContext {
            objects: &objects,
            schema: &schema,
        };
        let alice = objects.find("CN=Alice,DC=corp").unwrap();

        // Stored ACEs carry the mapped mask, raw GENERIC_WRITE is still accepted
        assert_eq!(
            write_all(&context, alice),
            vec![trustee(ADMIN), trustee(HELPDESK)]
        );
        assert!(generic_all(&context, alice).is_empty());
    }

    #[test]
    fn test_group_rules() {
        let mut objects = Objects::new();
        let sd = descriptor(vec![
            ace(
                AceType::AccessAllowedObject,
                RIGHT_DS_WRITE_PROPERTY,
                Some(property_set_membership()),
                HELPDESK,
            ),
            ace(
                AceType::AccessAllowedObject,
                RIGHT_DS_WRITE_PROPERTY_EXTENDED,
                Some(attribute_member()),
                ADMIN,
            ),
            ace(AceType::AccessAllowed, RIGHT_WRITE_DACL, None, ADMIN),
        ]);
        add(
            &mut objects,
            "CN=Ops,DC=corp",
            &["top", "group"],
            Attribute::SecurityDescriptor,
            sd,
        );
        let schema = Schema::with_defaults();
        let context = RuleContext {
            objects: &objects,
            schema: &schema,
        };
        let ops = objects.find("CN=Ops,DC=corp").unwrap();

        // member belongs to the Membership property set
        assert_eq!(add_member(&context, ops), vec![trustee(HELPDESK)]);
        assert_eq!(add_member_group_attr(&context, ops), vec![trustee(HELPDESK)]);
        assert_eq!(add_self_member(&context, ops), vec![trustee(ADMIN)]);
        assert!(reset_password(&context, ops).is_empty());
    }

    #[test]
    fn test_create_computer() {
        let mut objects = Objects::new();
        let sd = descriptor(vec![ace(
            AceType::AccessAllowedObject,
            RIGHT_DS_CREATE_CHILD,
            Some(class_computer()),
            HELPDESK,
        )]);
        add(
            &mut objects,
            "OU=Workstations,DC=corp",
            &["top", "organizationalUnit"],
            Attribute::SecurityDescriptor,
            sd,
        );
        let schema = Schema::with_defaults();
        let context = RuleContext {
            objects: &objects,
            schema: &schema,
        };
        let ou = objects.find("OU=Workstations,DC=corp").unwrap();
        assert_eq!(create_computer(&context, ou), vec![trustee(HELPDESK)]);
    }

    #[test]
    fn test_read_msa_password() {
        let mut objects = Objects::new();
        let sd = descriptor(vec![ace(
            AceType::AccessAllowed,
            RIGHT_DS_FULL_CONTROL,
            None,
            HELPDESK,
        )]);
        add(
            &mut objects,
            "CN=svc_sql,CN=Managed Service Accounts,DC=corp",
            &["top", "msDS-GroupManagedServiceAccount"],
            Attribute::GmsaMembership,
            sd,
        );
        let schema = Schema::with_defaults();
        let context = RuleContext {
            objects: &objects,
            schema: &schema,
        };
        let gmsa = objects
            .find("CN=svc_sql,CN=Managed Service Accounts,DC=corp")
            .unwrap();
        assert_eq!(read_msa_password(&context, gmsa), vec![trustee(HELPDESK)]);
        // No nTSecurityDescriptor, so no ACL based rule fires
        assert!(generic_all(&context, gmsa).is_empty());
    }
}
