use super::{acl::Acl, error::SecurityError, sid::Sid};
use crate::utils::nom_helper::{
    nom_unsigned_four_bytes, nom_unsigned_one_byte, nom_unsigned_two_bytes, nom_verify_failure,
    Endian,
};
use log::{error, warn};
use nom::bytes::complete::take;
use serde::Serialize;

pub const SE_OWNER_DEFAULTED: u16 = 0x1;
pub const SE_GROUP_DEFAULTED: u16 = 0x2;
pub const SE_DACL_PRESENT: u16 = 0x4;
pub const SE_DACL_DEFAULTED: u16 = 0x8;
pub const SE_SACL_PRESENT: u16 = 0x10;
pub const SE_SACL_DEFAULTED: u16 = 0x20;
pub const SE_DACL_AUTO_INHERIT_REQ: u16 = 0x100;
pub const SE_SACL_AUTO_INHERIT_REQ: u16 = 0x200;
pub const SE_DACL_AUTO_INHERITED: u16 = 0x400;
pub const SE_SACL_AUTO_INHERITED: u16 = 0x800;
pub const SE_DACL_PROTECTED: u16 = 0x1000;
pub const SE_SACL_PROTECTED: u16 = 0x2000;
pub const SE_RM_CONTROL_VALID: u16 = 0x4000;
pub const SE_SELF_RELATIVE: u16 = 0x8000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityDescriptor {
    pub revision: u8,
    pub control: u16,
    pub owner: Option<Sid>,
    pub group: Option<Sid>,
    pub sacl: Option<Acl>,
    pub dacl: Option<Acl>,
}

#[derive(Debug, PartialEq, Serialize, Clone)]
pub enum ControlFlags {
    OwnerDefaulted,
    GroupDefaulted,
    DaclPresent,
    DaclDefaulted,
    SaclPresent,
    SaclDefaulted,
    DaclAutoInheritReq,
    SaclAutoInheritReq,
    DaclAutoInherited,
    SaclAutoInherited,
    DaclProtected,
    SaclProtected,
    ResourceManagerControlValid,
    SelfRelative,
}

impl SecurityDescriptor {
    /// Parse a self-relative Security Descriptor. Offsets are relative to the start of `data`
    pub(crate) fn parse(data: &[u8]) -> nom::IResult<&[u8], SecurityDescriptor> {
        let (input, revision) = nom_unsigned_one_byte(data, Endian::Le)?;
        let (input, reserved) = nom_unsigned_one_byte(input, Endian::Le)?;
        if reserved != 0 {
            return Err(nom_verify_failure(data));
        }
        let (input, control) = nom_unsigned_two_bytes(input, Endian::Le)?;
        let (input, owner_sid_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, group_sid_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, sacl_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, dacl_offset) = nom_unsigned_four_bytes(input, Endian::Le)?;

        let empty = 0;
        let mut descriptor = SecurityDescriptor {
            revision,
            control,
            owner: None,
            group: None,
            sacl: None,
            dacl: None,
        };

        if owner_sid_offset != empty {
            let (sid_start, _) = take(owner_sid_offset)(data)?;
            let (_, sid) = Sid::parse(sid_start)?;
            descriptor.owner = Some(sid);
        }
        if group_sid_offset != empty {
            let (sid_start, _) = take(group_sid_offset)(data)?;
            let (_, sid) = Sid::parse(sid_start)?;
            descriptor.group = Some(sid);
        }

        if sacl_offset != empty {
            let (acl_start, _) = take(sacl_offset)(data)?;
            let (_, acl) = Acl::parse(acl_start)?;
            descriptor.sacl = Some(acl);
        } else if (control & SE_SACL_PRESENT) == SE_SACL_PRESENT {
            warn!("[security] Security descriptor has SACL present flag but no SACL offset");
        }

        if dacl_offset != empty {
            let (acl_start, _) = take(dacl_offset)(data)?;
            let (_, acl) = Acl::parse(acl_start)?;
            descriptor.dacl = Some(acl);
        } else if (control & SE_DACL_PRESENT) == SE_DACL_PRESENT {
            warn!("[security] Security descriptor has DACL present flag but no DACL offset");
        }

        Ok((input, descriptor))
    }

    /// Parse a self-relative Security Descriptor blob
    pub fn from_bytes(data: &[u8]) -> Result<SecurityDescriptor, SecurityError> {
        let descriptor_result = SecurityDescriptor::parse(data);
        match descriptor_result {
            Ok((_, result)) => Ok(result),
            Err(err) => {
                error!(
                    "[security] Could not parse security descriptor ({} bytes): {err:?}",
                    data.len()
                );
                Err(SecurityError::MalformedData)
            }
        }
    }

    /// Encode as a self-relative blob: header, owner, group, SACL, DACL
    pub fn to_bytes(&self) -> Vec<u8> {
        let header_size = 20;
        let mut body = Vec::new();

        let mut append = |part: Option<Vec<u8>>| -> u32 {
            match part {
                Some(mut value) => {
                    let offset = (header_size + body.len()) as u32;
                    body.append(&mut value);
                    offset
                }
                None => 0,
            }
        };
        let owner_offset = append(self.owner.as_ref().map(|sid| sid.to_bytes()));
        let group_offset = append(self.group.as_ref().map(|sid| sid.to_bytes()));
        let sacl_offset = append(self.sacl.as_ref().map(|acl| acl.to_bytes()));
        let dacl_offset = append(self.dacl.as_ref().map(|acl| acl.to_bytes()));

        let mut data = vec![self.revision, 0];
        data.extend_from_slice(&self.control.to_le_bytes());
        for offset in [owner_offset, group_offset, sacl_offset, dacl_offset] {
            data.extend_from_slice(&offset.to_le_bytes());
        }
        data.append(&mut body);
        data
    }

    /// Get the Control Flags associated with the security descriptor
    pub fn control_flags(&self) -> Vec<ControlFlags> {
        let table = [
            (SE_OWNER_DEFAULTED, ControlFlags::OwnerDefaulted),
            (SE_GROUP_DEFAULTED, ControlFlags::GroupDefaulted),
            (SE_DACL_PRESENT, ControlFlags::DaclPresent),
            (SE_DACL_DEFAULTED, ControlFlags::DaclDefaulted),
            (SE_SACL_PRESENT, ControlFlags::SaclPresent),
            (SE_SACL_DEFAULTED, ControlFlags::SaclDefaulted),
            (SE_DACL_AUTO_INHERIT_REQ, ControlFlags::DaclAutoInheritReq),
            (SE_SACL_AUTO_INHERIT_REQ, ControlFlags::SaclAutoInheritReq),
            (SE_DACL_AUTO_INHERITED, ControlFlags::DaclAutoInherited),
            (SE_SACL_AUTO_INHERITED, ControlFlags::SaclAutoInherited),
            (SE_DACL_PROTECTED, ControlFlags::DaclProtected),
            (SE_SACL_PROTECTED, ControlFlags::SaclProtected),
            (SE_RM_CONTROL_VALID, ControlFlags::ResourceManagerControlValid),
            (SE_SELF_RELATIVE, ControlFlags::SelfRelative),
        ];

        table
            .into_iter()
            .filter(|(bit, _)| (self.control & bit) == *bit)
            .map(|(_, flag)| flag)
            .collect()
    }
}
