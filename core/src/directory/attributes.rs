use serde::Serialize;

/// Directory attributes the analysis reads. Anything else is kept as `Other` (lowercase name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Attribute {
    DistinguishedName,
    Name,
    DisplayName,
    SamAccountName,
    ObjectClass,
    ObjectCategory,
    ObjectSid,
    ObjectGuid,
    SidHistory,
    SecurityDescriptor,
    PrimaryGroupId,
    MemberOf,
    Member,
    ServicePrincipalName,
    UserAccountControl,
    GpLink,
    GmsaMembership,
    RightsGuid,
    SchemaIdGuid,
    AttributeSecurityGuid,
    LdapDisplayName,
    Other(String),
}

impl Attribute {
    /// Map an LDAP attribute name (case insensitive) to an `Attribute`
    pub fn from_name(name: &str) -> Attribute {
        match name.to_lowercase().as_str() {
            "distinguishedname" | "dn" => Attribute::DistinguishedName,
            "name" | "cn" => Attribute::Name,
            "displayname" => Attribute::DisplayName,
            "samaccountname" => Attribute::SamAccountName,
            "objectclass" => Attribute::ObjectClass,
            "objectcategory" => Attribute::ObjectCategory,
            "objectsid" => Attribute::ObjectSid,
            "objectguid" => Attribute::ObjectGuid,
            "sidhistory" => Attribute::SidHistory,
            "ntsecuritydescriptor" => Attribute::SecurityDescriptor,
            "primarygroupid" => Attribute::PrimaryGroupId,
            "memberof" => Attribute::MemberOf,
            "member" => Attribute::Member,
            "serviceprincipalname" => Attribute::ServicePrincipalName,
            "useraccountcontrol" => Attribute::UserAccountControl,
            "gplink" => Attribute::GpLink,
            "msds-groupmsamembership" => Attribute::GmsaMembership,
            "rightsguid" => Attribute::RightsGuid,
            "schemaidguid" => Attribute::SchemaIdGuid,
            "attributesecurityguid" => Attribute::AttributeSecurityGuid,
            "ldapdisplayname" => Attribute::LdapDisplayName,
            other => Attribute::Other(other.to_string()),
        }
    }

    /// LDAP display name
    pub fn name(&self) -> &str {
        match self {
            Attribute::DistinguishedName => "distinguishedName",
            Attribute::Name => "name",
            Attribute::DisplayName => "displayName",
            Attribute::SamAccountName => "sAMAccountName",
            Attribute::ObjectClass => "objectClass",
            Attribute::ObjectCategory => "objectCategory",
            Attribute::ObjectSid => "objectSid",
            Attribute::ObjectGuid => "objectGUID",
            Attribute::SidHistory => "sIDHistory",
            Attribute::SecurityDescriptor => "nTSecurityDescriptor",
            Attribute::PrimaryGroupId => "primaryGroupID",
            Attribute::MemberOf => "memberOf",
            Attribute::Member => "member",
            Attribute::ServicePrincipalName => "servicePrincipalName",
            Attribute::UserAccountControl => "userAccountControl",
            Attribute::GpLink => "gPLink",
            Attribute::GmsaMembership => "msDS-GroupMSAMembership",
            Attribute::RightsGuid => "rightsGuid",
            Attribute::SchemaIdGuid => "schemaIDGUID",
            Attribute::AttributeSecurityGuid => "attributeSecurityGUID",
            Attribute::LdapDisplayName => "lDAPDisplayName",
            Attribute::Other(name) => name,
        }
    }

    /// Binary attributes are carried base64 encoded
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Attribute::ObjectSid
                | Attribute::ObjectGuid
                | Attribute::SidHistory
                | Attribute::SecurityDescriptor
                | Attribute::GmsaMembership
                | Attribute::SchemaIdGuid
                | Attribute::AttributeSecurityGuid
        )
    }
}
