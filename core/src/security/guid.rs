use super::error::SecurityError;
use crate::utils::nom_helper::nom_sixteen_bytes;
use log::warn;
use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/**
 * GUID stored in canonical (display) byte order.
 * ACEs and `objectGUID` values store the first three fields little endian, use `from_ace_bytes` for those
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid([u8; 16]);

impl Guid {
    pub const NULL: Guid = Guid([0; 16]);
    /**Placeholder for GUIDs we could not decode */
    pub const UNKNOWN: Guid = Guid([0xff; 16]);

    /// Nom a GUID stored in ACE (mixed endian) order
    pub(crate) fn parse(data: &[u8]) -> nom::IResult<&[u8], Guid> {
        let (input, guid_data) = nom_sixteen_bytes(data)?;
        Ok((input, Guid::from_ace_bytes(guid_data)))
    }

    /// Flip ACE/wire ordered bytes into canonical order
    pub fn from_ace_bytes(data: [u8; 16]) -> Guid {
        Guid(Uuid::from_bytes_le(data).into_bytes())
    }

    /// Flip canonical order back into ACE/wire order
    pub fn to_ace_bytes(&self) -> [u8; 16] {
        Uuid::from_bytes(self.0).to_bytes_le()
    }

    /// Convert a wire ordered slice. Anything that is not 16 bytes becomes `Guid::UNKNOWN`
    pub fn from_ace_slice(data: &[u8]) -> Guid {
        match <[u8; 16]>::try_from(data) {
            Ok(bytes) => Guid::from_ace_bytes(bytes),
            Err(_) => {
                warn!(
                    "[security] Provided data does not meet GUID size of 16 bytes, got: {}",
                    data.len()
                );
                Guid::UNKNOWN
            }
        }
    }

    pub fn from_canonical_bytes(data: [u8; 16]) -> Guid {
        Guid(data)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self == &Guid::NULL
    }

    pub fn is_unknown(&self) -> bool {
        self == &Guid::UNKNOWN
    }
}

impl Default for Guid {
    fn default() -> Self {
        Guid::NULL
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_bytes(self.0).hyphenated())
    }
}

impl FromStr for Guid {
    type Err = SecurityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match Uuid::parse_str(value.trim()) {
            Ok(result) => Ok(Guid(result.into_bytes())),
            Err(_) => Err(SecurityError::BadGuid),
        }
    }
}

impl Serialize for Guid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Parse a GUID constant. Only used with literals known to be valid
pub(crate) fn guid(value: &str) -> Guid {
    Guid::from_str(value).unwrap_or(Guid::UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::{guid, Guid};
    use crate::security::error::SecurityError;
    use std::str::FromStr;

    #[test]
    fn test_ace_byte_order() {
        // User-Force-Change-Password as stored inside an object ACE
        let test = [
            0x70, 0x95, 0x29, 0x00, 0x6d, 0x24, 0xd0, 0x11, 0xa7, 0x68, 0x00, 0xaa, 0x00, 0x6e,
            0x05, 0x29,
        ];
        let result = Guid::from_ace_bytes(test);
        assert_eq!(result.to_string(), "00299570-246d-11d0-a768-00aa006e0529");
        assert_eq!(result.to_ace_bytes(), test);
        assert_eq!(
            result.as_bytes(),
            &[
                0x00, 0x29, 0x95, 0x70, 0x24, 0x6d, 0x11, 0xd0, 0xa7, 0x68, 0x00, 0xaa, 0x00,
                0x6e, 0x05, 0x29
            ]
        );
    }

    #[test]
    fn test_parse_guid() {
        let test = [17; 18];
        let (remaining, result) = Guid::parse(&test).unwrap();
        assert_eq!(remaining.len(), 2);
        assert_eq!(result.to_string(), "11111111-1111-1111-1111-111111111111");
    }

    #[test]
    fn test_bad_slice() {
        let test = [17; 15];
        assert!(Guid::from_ace_slice(&test).is_unknown());
    }

    #[test]
    fn test_sentinels() {
        assert!(Guid::NULL.is_null());
        assert!(!Guid::UNKNOWN.is_null());
        assert_eq!(Guid::default(), Guid::NULL);
        assert_eq!(
            guid("00000000-0000-0000-0000-000000000000"),
            Guid::NULL
        );
    }

    #[test]
    fn test_from_str() {
        let result = Guid::from_str("{bf967a86-0de6-11d0-a285-00aa003049e2}").unwrap();
        assert_eq!(result.to_string(), "bf967a86-0de6-11d0-a285-00aa003049e2");
        assert_eq!(Guid::from_str("not a guid"), Err(SecurityError::BadGuid));
    }
}
