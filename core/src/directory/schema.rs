/**
 * Schema lookup tables: extended rights, classes and attributes keyed by GUID.
 * Filled from the well known defaults and any schema objects in the store, then only read.
 * Resolves attribute to property set indirection for the access evaluator
 */
use super::{
    attributes::Attribute,
    object::{Object, ObjectType},
    store::Objects,
};
use crate::security::{
    access::PropertySets,
    guid::{guid, Guid},
    rights::{
        attribute_allowed_to_act, attribute_alt_security_identities, attribute_gp_link,
        attribute_key_credential_link, attribute_member, attribute_profile_path,
        attribute_script_path, attribute_service_principal_name, class_computer, class_container,
        class_domain_dns, class_group, class_group_managed_service_account,
        class_group_policy_container, class_organizational_unit, class_user,
        extended_right_get_changes, extended_right_get_changes_all,
        extended_right_get_changes_filtered_set, extended_right_reset_password,
        property_set_membership, property_set_user_logon,
    },
};
use log::{debug, warn};
use std::{collections::HashMap, str::FromStr};

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAttribute {
    pub name: String,
    /**Property set the attribute belongs to */
    pub security_guid: Option<Guid>,
}

#[derive(Debug, Default)]
pub struct Schema {
    extended_rights: HashMap<Guid, String>,
    classes: HashMap<Guid, String>,
    class_names: HashMap<String, Guid>,
    attributes: HashMap<Guid, SchemaAttribute>,
    attribute_names: HashMap<String, Guid>,
}

impl Schema {
    /// Empty tables
    pub fn new() -> Schema {
        Schema::default()
    }

    /// Tables seeded with the classes, attributes and rights the rules depend on
    pub fn with_defaults() -> Schema {
        let mut schema = Schema::new();

        let classes = [
            ("top", guid("bf967ab7-0de6-11d0-a285-00aa003049e2")),
            ("person", guid("bf967a7f-0de6-11d0-a285-00aa003049e2")),
            (
                "organizationalPerson",
                guid("bf967aa4-0de6-11d0-a285-00aa003049e2"),
            ),
            ("user", class_user()),
            ("computer", class_computer()),
            ("group", class_group()),
            ("organizationalUnit", class_organizational_unit()),
            ("container", class_container()),
            ("domainDNS", class_domain_dns()),
            ("groupPolicyContainer", class_group_policy_container()),
            (
                "msDS-GroupManagedServiceAccount",
                class_group_managed_service_account(),
            ),
        ];
        for (name, class) in classes {
            schema.add_class(class, name);
        }

        let membership = Some(property_set_membership());
        let user_logon = Some(property_set_user_logon());
        let attributes = [
            ("member", attribute_member(), membership),
            ("servicePrincipalName", attribute_service_principal_name(), None),
            (
                "altSecurityIdentities",
                attribute_alt_security_identities(),
                None,
            ),
            ("profilePath", attribute_profile_path(), user_logon),
            ("scriptPath", attribute_script_path(), user_logon),
            ("msDS-KeyCredentialLink", attribute_key_credential_link(), None),
            (
                "msDS-AllowedToActOnBehalfOfOtherIdentity",
                attribute_allowed_to_act(),
                None,
            ),
            ("gPLink", attribute_gp_link(), None),
        ];
        for (name, attribute, security_guid) in attributes {
            schema.add_attribute(attribute, name, security_guid);
        }

        let rights = [
            ("User-Force-Change-Password", extended_right_reset_password()),
            ("DS-Replication-Get-Changes", extended_right_get_changes()),
            ("DS-Replication-Get-Changes-All", extended_right_get_changes_all()),
            (
                "DS-Replication-Get-Changes-In-Filtered-Set",
                extended_right_get_changes_filtered_set(),
            ),
            ("Membership", property_set_membership()),
            ("User-Logon", property_set_user_logon()),
        ];
        for (name, right) in rights {
            schema.extended_rights.insert(right, name.to_string());
        }
        schema
    }

    /// Defaults overlaid with the schema objects present in the store
    pub fn from_objects(objects: &Objects) -> Schema {
        let mut schema = Schema::with_defaults();
        for object in objects.iter() {
            match object.object_type() {
                ObjectType::ControlAccessRight => schema.add_extended_right(object),
                ObjectType::ClassSchema => {
                    if let Some((class, name)) = schema_entry(object) {
                        schema.add_class(class, &name);
                    }
                }
                ObjectType::AttributeSchema => {
                    if let Some((attribute, name)) = schema_entry(object) {
                        let security_guid = object
                            .binary_value(&Attribute::AttributeSecurityGuid)
                            .map(|data| Guid::from_ace_slice(&data))
                            .filter(|value| !value.is_unknown() && !value.is_null());
                        schema.add_attribute(attribute, &name, security_guid);
                    }
                }
                _ => {}
            }
        }
        debug!(
            "[directory] Schema has {} classes, {} attributes, {} extended rights",
            schema.classes.len(),
            schema.attributes.len(),
            schema.extended_rights.len()
        );
        schema
    }

    fn add_class(&mut self, class: Guid, name: &str) {
        self.class_names.insert(name.to_lowercase(), class);
        self.classes.insert(class, name.to_string());
    }

    fn add_attribute(&mut self, attribute: Guid, name: &str, security_guid: Option<Guid>) {
        self.attribute_names.insert(name.to_lowercase(), attribute);
        self.attributes.insert(
            attribute,
            SchemaAttribute {
                name: name.to_string(),
                security_guid,
            },
        );
    }

    fn add_extended_right(&mut self, object: &Object) {
        let value = match object.first_value(&Attribute::RightsGuid) {
            Some(result) => result,
            None => return,
        };
        match Guid::from_str(value) {
            Ok(right) => {
                let name = match object.first_value(&Attribute::DisplayName) {
                    Some(display) => display.to_string(),
                    None => object.name().to_string(),
                };
                self.extended_rights.insert(right, name);
            }
            Err(_) => warn!(
                "[directory] Extended right {} has a bad rightsGuid {value}",
                object.dn()
            ),
        }
    }

    /// Class GUID by `lDAPDisplayName`. Case insensitive
    pub fn class_guid(&self, name: &str) -> Option<Guid> {
        self.class_names.get(&name.to_lowercase()).copied()
    }

    /// Attribute GUID by `lDAPDisplayName`. Case insensitive
    pub fn attribute_guid(&self, name: &str) -> Option<Guid> {
        self.attribute_names.get(&name.to_lowercase()).copied()
    }

    pub fn attribute(&self, attribute: &Guid) -> Option<&SchemaAttribute> {
        self.attributes.get(attribute)
    }

    pub fn extended_right(&self, right: &Guid) -> Option<&str> {
        self.extended_rights.get(right).map(|name| name.as_str())
    }

    /// Human readable name for any GUID the schema knows
    pub fn label(&self, value: &Guid) -> Option<&str> {
        if let Some(right) = self.extended_rights.get(value) {
            return Some(right);
        }
        if let Some(class) = self.classes.get(value) {
            return Some(class);
        }
        self.attributes
            .get(value)
            .map(|attribute| attribute.name.as_str())
    }
}

impl PropertySets for Schema {
    fn attribute_security_guid(&self, attribute: &Guid) -> Option<Guid> {
        self.attributes.get(attribute)?.security_guid
    }
}

/// `schemaIDGUID` and `lDAPDisplayName` of a class or attribute schema object
fn schema_entry(object: &Object) -> Option<(Guid, String)> {
    let name = object.first_value(&Attribute::LdapDisplayName)?.to_string();
    let data = object.binary_value(&Attribute::SchemaIdGuid)?;
    let schema_guid = Guid::from_ace_slice(&data);
    if schema_guid.is_unknown() {
        warn!("[directory] Schema object {} has a bad schemaIDGUID", object.dn());
        return None;
    }
    Some((schema_guid, name))
}

#[cfg(test)]
mod tests {
    use super::Schema;
    use crate::{
        directory::{attributes::Attribute, object::Object, store::Objects},
        security::{
            access::PropertySets,
            guid::Guid,
            rights::{
                attribute_member, attribute_profile_path, class_computer,
                extended_right_reset_password, property_set_membership, property_set_user_logon,
            },
        },
        utils::encoding::base64_encode_standard,
    };
    use std::{collections::HashMap, str::FromStr};

    #[test]
    fn test_defaults() {
        let schema = Schema::with_defaults();
        assert_eq!(schema.class_guid("COMPUTER"), Some(class_computer()));
        assert_eq!(
            schema.attribute_security_guid(&attribute_member()),
            Some(property_set_membership())
        );
        assert_eq!(
            schema.attribute_security_guid(&attribute_profile_path()),
            Some(property_set_user_logon())
        );
        assert_eq!(
            schema.label(&extended_right_reset_password()),
            Some("User-Force-Change-Password")
        );
        assert_eq!(schema.attribute_guid("ms-Mcs-AdmPwd"), None);
    }

    #[test]
    fn test_from_objects() {
        let laps = Guid::from_str("c8d2e6a4-1b1f-4a23-9c7e-2f0d6b1e5a33").unwrap();
        let confidential = Guid::from_str("4c164200-20c0-11d0-a768-00aa006e0529").unwrap();

        let mut attributes = HashMap::new();
        attributes.insert(
            Attribute::ObjectClass,
            vec![String::from("top"), String::from("attributeSchema")],
        );
        attributes.insert(
            Attribute::LdapDisplayName,
            vec![String::from("ms-Mcs-AdmPwd")],
        );
        attributes.insert(
            Attribute::SchemaIdGuid,
            vec![base64_encode_standard(&laps.to_ace_bytes())],
        );
        attributes.insert(
            Attribute::AttributeSecurityGuid,
            vec![base64_encode_standard(&confidential.to_ace_bytes())],
        );

        let mut right = HashMap::new();
        right.insert(
            Attribute::ObjectClass,
            vec![String::from("top"), String::from("controlAccessRight")],
        );
        right.insert(
            Attribute::RightsGuid,
            vec![String::from("4c164200-20c0-11d0-a768-00aa006e0529")],
        );
        right.insert(
            Attribute::DisplayName,
            vec![String::from("User-Account-Restrictions")],
        );

        let mut objects = Objects::new();
        objects.add(Object::new(
            "CN=ms-Mcs-AdmPwd,CN=Schema,CN=Configuration,DC=corp,DC=local",
            attributes,
        ));
        objects.add(Object::new(
            "CN=User-Account-Restrictions,CN=Extended-Rights,CN=Configuration,DC=corp,DC=local",
            right,
        ));

        let schema = Schema::from_objects(&objects);
        assert_eq!(schema.attribute_guid("ms-mcs-admpwd"), Some(laps));
        assert_eq!(schema.attribute_security_guid(&laps), Some(confidential));
        assert_eq!(
            schema.extended_right(&confidential),
            Some("User-Account-Restrictions")
        );
        assert_eq!(schema.label(&laps), Some("ms-Mcs-AdmPwd"));
    }
}
