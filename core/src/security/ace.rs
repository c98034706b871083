use super::{guid::Guid, sid::Sid};
use crate::utils::nom_helper::{
    nom_unsigned_four_bytes, nom_unsigned_one_byte, nom_unsigned_two_bytes, nom_verify_failure,
    Endian,
};
use log::warn;
use nom::bytes::complete::take;
use serde::Serialize;

pub const ACE_FLAG_OBJECT_INHERIT: u8 = 0x01;
pub const ACE_FLAG_CONTAINER_INHERIT: u8 = 0x02;
pub const ACE_FLAG_NO_PROPAGATE_INHERIT: u8 = 0x04;
pub const ACE_FLAG_INHERIT_ONLY: u8 = 0x08;
pub const ACE_FLAG_INHERITED: u8 = 0x10;
pub const ACE_FLAG_SUCCESSFUL_ACCESS: u8 = 0x40;
pub const ACE_FLAG_FAILED_ACCESS: u8 = 0x80;

pub(crate) const ACE_OBJECT_TYPE_PRESENT: u32 = 0x1;
pub(crate) const ACE_INHERITED_OBJECT_TYPE_PRESENT: u32 = 0x2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AceType {
    AccessAllowed,
    AccessDenied,
    SystemAudit,
    SystemAlarm,
    AccessAllowedCompound,
    AccessAllowedObject,
    AccessDeniedObject,
    SystemAuditObject,
    SystemAlarmObject,
    AccessAllowedCallback,
    AccessDeniedCallback,
    AccessAllowedCallbackObject,
    AccessDeniedCallbackObject,
    SystemAuditCallback,
    SystemAlarmCallback,
    SystemAuditCallbackObject,
    SystemAlarmCallbackObject,
    SystemMandatoryLabel,
    Unknown(u8),
}

impl AceType {
    pub fn from_byte(ace_type: u8) -> AceType {
        match ace_type {
            0 => AceType::AccessAllowed,
            1 => AceType::AccessDenied,
            2 => AceType::SystemAudit,
            3 => AceType::SystemAlarm,
            4 => AceType::AccessAllowedCompound,
            5 => AceType::AccessAllowedObject,
            6 => AceType::AccessDeniedObject,
            7 => AceType::SystemAuditObject,
            8 => AceType::SystemAlarmObject,
            9 => AceType::AccessAllowedCallback,
            10 => AceType::AccessDeniedCallback,
            11 => AceType::AccessAllowedCallbackObject,
            12 => AceType::AccessDeniedCallbackObject,
            13 => AceType::SystemAuditCallback,
            14 => AceType::SystemAlarmCallback,
            15 => AceType::SystemAuditCallbackObject,
            16 => AceType::SystemAlarmCallbackObject,
            17 => AceType::SystemMandatoryLabel,
            _ => {
                warn!("[security] Unknown ACE Type: {ace_type}");
                AceType::Unknown(ace_type)
            }
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            AceType::AccessAllowed => 0,
            AceType::AccessDenied => 1,
            AceType::SystemAudit => 2,
            AceType::SystemAlarm => 3,
            AceType::AccessAllowedCompound => 4,
            AceType::AccessAllowedObject => 5,
            AceType::AccessDeniedObject => 6,
            AceType::SystemAuditObject => 7,
            AceType::SystemAlarmObject => 8,
            AceType::AccessAllowedCallback => 9,
            AceType::AccessDeniedCallback => 10,
            AceType::AccessAllowedCallbackObject => 11,
            AceType::AccessDeniedCallbackObject => 12,
            AceType::SystemAuditCallback => 13,
            AceType::SystemAlarmCallback => 14,
            AceType::SystemAuditCallbackObject => 15,
            AceType::SystemAlarmCallbackObject => 16,
            AceType::SystemMandatoryLabel => 17,
            AceType::Unknown(value) => *value,
        }
    }

    /// Object ACEs carry the extra flags field and optional GUIDs
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            AceType::AccessAllowedObject
                | AceType::AccessDeniedObject
                | AceType::SystemAuditObject
                | AceType::SystemAlarmObject
                | AceType::AccessAllowedCallbackObject
                | AceType::AccessDeniedCallbackObject
                | AceType::SystemAuditCallbackObject
                | AceType::SystemAlarmCallbackObject
        )
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, AceType::AccessDenied | AceType::AccessDeniedObject)
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, AceType::AccessAllowed | AceType::AccessAllowedObject)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ace {
    pub ace_type: AceType,
    pub flags: u8,
    pub mask: u32,
    /**Only if Object type and ACE_OBJECT_TYPE_PRESENT object flag */
    pub object_type: Option<Guid>,
    /**Only if Object type and ACE_INHERITED_OBJECT_TYPE_PRESENT object flag */
    pub inherited_object_type: Option<Guid>,
    pub trustee: Sid,
}

impl Ace {
    /// Parse one Access Control Entry. Returns the data after the declared ACE size
    pub(crate) fn parse(data: &[u8]) -> nom::IResult<&[u8], Ace> {
        let (input, ace_type_value) = nom_unsigned_one_byte(data, Endian::Le)?;
        let (input, flags) = nom_unsigned_one_byte(input, Endian::Le)?;
        let (input, size) = nom_unsigned_two_bytes(input, Endian::Le)?;

        let min_size = 8;
        if size < min_size {
            return Err(nom_verify_failure(data));
        }
        let adjust_entry_size = 4;
        // Size includes the header of the entry, but we already nom'd that away
        let (remaining, ace_data) = take(size - adjust_entry_size)(input)?;
        let (ace_data, mask) = nom_unsigned_four_bytes(ace_data, Endian::Le)?;

        let ace_type = AceType::from_byte(ace_type_value);
        let mut ace = Ace {
            ace_type,
            flags,
            mask,
            object_type: None,
            inherited_object_type: None,
            trustee: Sid::everyone(),
        };

        let mut sid_data = ace_data;
        if ace_type.is_object() {
            let (input, object_flags) = nom_unsigned_four_bytes(sid_data, Endian::Le)?;
            sid_data = input;
            if (object_flags & ACE_OBJECT_TYPE_PRESENT) == ACE_OBJECT_TYPE_PRESENT {
                let (input, guid) = Guid::parse(sid_data)?;
                ace.object_type = Some(guid);
                sid_data = input;
            }
            if (object_flags & ACE_INHERITED_OBJECT_TYPE_PRESENT)
                == ACE_INHERITED_OBJECT_TYPE_PRESENT
            {
                let (input, guid) = Guid::parse(sid_data)?;
                ace.inherited_object_type = Some(guid);
                sid_data = input;
            }
        }

        // Anything after the SID (callback conditions, padding) is ignored
        let (_, trustee) = Sid::parse(sid_data)?;
        ace.trustee = trustee;

        Ok((remaining, ace))
    }

    /// Encode back to the binary ACE format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.mask.to_le_bytes());
        if self.ace_type.is_object() {
            let mut object_flags = 0;
            if self.object_type.is_some() {
                object_flags |= ACE_OBJECT_TYPE_PRESENT;
            }
            if self.inherited_object_type.is_some() {
                object_flags |= ACE_INHERITED_OBJECT_TYPE_PRESENT;
            }
            body.extend_from_slice(&object_flags.to_le_bytes());
            if let Some(guid) = &self.object_type {
                body.extend_from_slice(&guid.to_ace_bytes());
            }
            if let Some(guid) = &self.inherited_object_type {
                body.extend_from_slice(&guid.to_ace_bytes());
            }
        }
        body.extend_from_slice(&self.trustee.to_bytes());

        let header_size = 4;
        let size = (body.len() + header_size) as u16;
        let mut data = vec![self.ace_type.as_byte(), self.flags];
        data.extend_from_slice(&size.to_le_bytes());
        data.append(&mut body);
        data
    }

    /// Applies only to children, not the object holding it
    pub fn is_inherit_only(&self) -> bool {
        (self.flags & ACE_FLAG_INHERIT_ONLY) == ACE_FLAG_INHERIT_ONLY
    }

    pub fn is_inherited(&self) -> bool {
        (self.flags & ACE_FLAG_INHERITED) == ACE_FLAG_INHERITED
    }

    /// Object type scope, treating a present but null GUID as unscoped
    pub fn object_scope(&self) -> Option<&Guid> {
        self.object_type.as_ref().filter(|guid| !guid.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::{Ace, AceType, ACE_FLAG_CONTAINER_INHERIT, ACE_FLAG_INHERIT_ONLY};
    use crate::security::{guid::Guid, sid::Sid};
    use std::str::FromStr;

    #[test]
    fn test_parse_ace() {
        let test = [
            0, 0, 24, 0, 63, 0, 15, 0, 1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0, 1,
        ];
        let (remaining, result) = Ace::parse(&test).unwrap();
        assert_eq!(remaining, [1]);
        assert_eq!(result.ace_type, AceType::AccessAllowed);
        assert_eq!(result.mask, 0xf003f);
        assert_eq!(result.trustee.to_string(), "S-1-5-32-544");
        assert_eq!(result.object_type, None);
        assert_eq!(result.to_bytes(), test[..24]);
    }

    #[test]
    fn test_parse_object_ace() {
        // Allow object, container inherit + inherit only, control access, both GUIDs
        let test = [
            5, 10, 56, 0, 0, 1, 0, 0, 3, 0, 0, 0, 0x70, 0x95, 0x29, 0x00, 0x6d, 0x24, 0xd0, 0x11,
            0xa7, 0x68, 0x00, 0xaa, 0x00, 0x6e, 0x05, 0x29, 0x86, 0x7a, 0x96, 0xbf, 0xe6, 0x0d,
            0xd0, 0x11, 0xa2, 0x85, 0x00, 0xaa, 0x00, 0x30, 0x49, 0xe2, 1, 1, 0, 0, 0, 0, 0, 5,
            11, 0, 0, 0,
        ];
        let (remaining, result) = Ace::parse(&test).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(result.ace_type, AceType::AccessAllowedObject);
        assert_eq!(result.flags, ACE_FLAG_CONTAINER_INHERIT | ACE_FLAG_INHERIT_ONLY);
        assert!(result.is_inherit_only());
        assert_eq!(
            result.object_type,
            Some(Guid::from_str("00299570-246d-11d0-a768-00aa006e0529").unwrap())
        );
        assert_eq!(
            result.inherited_object_type,
            Some(Guid::from_str("bf967a86-0de6-11d0-a285-00aa003049e2").unwrap())
        );
        assert_eq!(result.trustee, Sid::authenticated_users());
        assert_eq!(result.to_bytes(), test);
    }

    #[test]
    fn test_parse_inherited_type_only() {
        let test = [
            6, 0, 40, 0, 16, 0, 0, 0, 2, 0, 0, 0, 0x86, 0x7a, 0x96, 0xbf, 0xe6, 0x0d, 0xd0, 0x11,
            0xa2, 0x85, 0x00, 0xaa, 0x00, 0x30, 0x49, 0xe2, 1, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0,
        ];
        let (_, result) = Ace::parse(&test).unwrap();
        assert_eq!(result.ace_type, AceType::AccessDeniedObject);
        assert_eq!(result.object_type, None);
        assert!(result.inherited_object_type.is_some());
        assert_eq!(result.trustee, Sid::everyone());
    }

    #[test]
    fn test_ace_size_too_large() {
        let test = [0, 0, 40, 0, 63, 0, 15, 0, 1, 1, 0, 0, 0, 0, 0, 5, 18, 0, 0, 0];
        assert!(Ace::parse(&test).is_err());
    }

    #[test]
    fn test_ace_size_too_small() {
        let test = [0, 0, 4, 0, 63, 0, 15, 0];
        assert!(Ace::parse(&test).is_err());
    }

    #[test]
    fn test_get_ace_type() {
        assert_eq!(AceType::from_byte(13), AceType::SystemAuditCallback);
        assert_eq!(AceType::from_byte(99), AceType::Unknown(99));
        assert_eq!(AceType::Unknown(99).as_byte(), 99);
        assert!(AceType::from_byte(5).is_object());
        assert!(!AceType::from_byte(17).is_object());
    }
}
