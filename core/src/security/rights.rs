/**
 * Directory service access mask bits and the well known schema/extended right GUIDs the rules check.
 * https://learn.microsoft.com/en-us/windows/win32/adschema/extended-rights
 */
use super::guid::{guid, Guid};

pub const RIGHT_DS_CREATE_CHILD: u32 = 0x0000_0001;
pub const RIGHT_DS_DELETE_CHILD: u32 = 0x0000_0002;
pub const RIGHT_DS_LIST_CONTENTS: u32 = 0x0000_0004;
/**Validated write, also called Self */
pub const RIGHT_DS_WRITE_PROPERTY_EXTENDED: u32 = 0x0000_0008;
pub const RIGHT_DS_READ_PROPERTY: u32 = 0x0000_0010;
pub const RIGHT_DS_WRITE_PROPERTY: u32 = 0x0000_0020;
pub const RIGHT_DS_DELETE_TREE: u32 = 0x0000_0040;
pub const RIGHT_DS_LIST_OBJECT: u32 = 0x0000_0080;
pub const RIGHT_DS_CONTROL_ACCESS: u32 = 0x0000_0100;
pub const RIGHT_DELETE: u32 = 0x0001_0000;
pub const RIGHT_READ_CONTROL: u32 = 0x0002_0000;
pub const RIGHT_WRITE_DACL: u32 = 0x0004_0000;
pub const RIGHT_WRITE_OWNER: u32 = 0x0008_0000;
pub const RIGHT_GENERIC_ALL: u32 = 0x1000_0000;
pub const RIGHT_GENERIC_EXECUTE: u32 = 0x2000_0000;
pub const RIGHT_GENERIC_WRITE: u32 = 0x4000_0000;
pub const RIGHT_GENERIC_READ: u32 = 0x8000_0000;
/**Expanded form of GENERIC_ALL stored in directory ACEs */
pub const RIGHT_DS_FULL_CONTROL: u32 = 0x000f_01ff;
/**Expanded form of GENERIC_WRITE stored in directory ACEs */
pub const RIGHT_DS_GENERIC_WRITE: u32 = 0x0002_0028;

pub fn extended_right_reset_password() -> Guid {
    guid("00299570-246d-11d0-a768-00aa006e0529")
}

pub fn extended_right_get_changes() -> Guid {
    guid("1131f6aa-9c07-11d1-f79f-00c04fc2dcd2")
}

pub fn extended_right_get_changes_all() -> Guid {
    guid("1131f6ad-9c07-11d1-f79f-00c04fc2dcd2")
}

pub fn extended_right_get_changes_filtered_set() -> Guid {
    guid("89e95b76-444d-4c62-991a-0facbeda640c")
}

pub fn attribute_member() -> Guid {
    guid("bf9679c0-0de6-11d0-a285-00aa003049e2")
}

pub fn attribute_service_principal_name() -> Guid {
    guid("f3a64788-5306-11d1-a9c5-0000f80367c1")
}

pub fn attribute_alt_security_identities() -> Guid {
    guid("00fbf30c-91fe-11d1-aebc-0000f80367c1")
}

pub fn attribute_profile_path() -> Guid {
    guid("bf967a05-0de6-11d0-a285-00aa003049e2")
}

pub fn attribute_script_path() -> Guid {
    guid("bf9679a8-0de6-11d0-a285-00aa003049e2")
}

pub fn attribute_key_credential_link() -> Guid {
    guid("5b47d60f-6090-40b2-9f37-2a4de88f3063")
}

pub fn attribute_allowed_to_act() -> Guid {
    guid("3f78c3e5-f79a-46bd-a0b8-9d18116ddc79")
}

pub fn attribute_gp_link() -> Guid {
    guid("f30e3bbe-9ff0-11d1-b603-0000f80367c1")
}

pub fn property_set_membership() -> Guid {
    guid("bc0ac240-79a9-11d0-9020-00c04fc2d4cf")
}

pub fn property_set_user_logon() -> Guid {
    guid("5f202010-79a5-11d0-9020-00c04fc2d4cf")
}

pub fn class_user() -> Guid {
    guid("bf967aba-0de6-11d0-a285-00aa003049e2")
}

pub fn class_computer() -> Guid {
    guid("bf967a86-0de6-11d0-a285-00aa003049e2")
}

pub fn class_group() -> Guid {
    guid("bf967a9c-0de6-11d0-a285-00aa003049e2")
}

pub fn class_organizational_unit() -> Guid {
    guid("bf967aa5-0de6-11d0-a285-00aa003049e2")
}

pub fn class_container() -> Guid {
    guid("bf967a8b-0de6-11d0-a285-00aa003049e2")
}

pub fn class_domain_dns() -> Guid {
    guid("19195a5b-6da0-11d0-afd3-00c04fd930c9")
}

pub fn class_group_policy_container() -> Guid {
    guid("f30e3bc2-9ff0-11d1-b603-0000f80367c1")
}

pub fn class_group_managed_service_account() -> Guid {
    guid("7b8b558a-93a5-4af7-adca-c017e67f1057")
}

#[cfg(test)]
mod tests {
    use super::{
        attribute_member, class_computer, extended_right_reset_password, RIGHT_DS_FULL_CONTROL,
        RIGHT_DS_GENERIC_WRITE, RIGHT_DS_WRITE_PROPERTY, RIGHT_DS_WRITE_PROPERTY_EXTENDED,
        RIGHT_READ_CONTROL, RIGHT_WRITE_DACL, RIGHT_WRITE_OWNER,
    };

    #[test]
    fn test_well_known_guids() {
        assert_eq!(
            extended_right_reset_password().to_string(),
            "00299570-246d-11d0-a768-00aa006e0529"
        );
        assert_eq!(
            attribute_member().to_string(),
            "bf9679c0-0de6-11d0-a285-00aa003049e2"
        );
        assert!(!class_computer().is_unknown());
    }

    #[test]
    fn test_full_control_contains_owner_rights() {
        assert_eq!(RIGHT_DS_FULL_CONTROL & RIGHT_WRITE_DACL, RIGHT_WRITE_DACL);
        assert_eq!(RIGHT_DS_FULL_CONTROL & RIGHT_WRITE_OWNER, RIGHT_WRITE_OWNER);
    }

    #[test]
    fn test_generic_write_mapping() {
        assert_eq!(
            RIGHT_DS_GENERIC_WRITE,
            RIGHT_READ_CONTROL | RIGHT_DS_WRITE_PROPERTY | RIGHT_DS_WRITE_PROPERTY_EXTENDED
        );
        assert_eq!(RIGHT_DS_FULL_CONTROL & RIGHT_DS_GENERIC_WRITE, RIGHT_DS_GENERIC_WRITE);
    }
}
