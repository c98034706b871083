use super::ace::Ace;
use crate::utils::nom_helper::{
    nom_unsigned_one_byte, nom_unsigned_two_bytes, nom_verify_failure, Endian,
};
use nom::bytes::complete::take;
use serde::Serialize;

/// Access Control List. Entry order matters for evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acl {
    pub revision: u8,
    pub entries: Vec<Ace>,
}

impl Acl {
    /// Parse the raw ACL data. Decodes exactly the number of entries in the header
    pub(crate) fn parse(data: &[u8]) -> nom::IResult<&[u8], Acl> {
        // Nom header of ACL
        let (input, revision) = nom_unsigned_one_byte(data, Endian::Le)?;
        let (input, reserved) = nom_unsigned_one_byte(input, Endian::Le)?;
        if reserved != 0 {
            return Err(nom_verify_failure(data));
        }
        let (input, size) = nom_unsigned_two_bytes(input, Endian::Le)?;
        let (input, count) = nom_unsigned_two_bytes(input, Endian::Le)?;
        let (input, _padding) = nom_unsigned_two_bytes(input, Endian::Le)?;

        let adjust_size = 8;
        if size < adjust_size {
            return Err(nom_verify_failure(data));
        }
        // Size includes the header too, but we already nom'd that away
        let (remaining_input, mut entries_data) = take(size - adjust_size)(input)?;

        let mut entries = Vec::with_capacity(count as usize);
        while entries.len() < count as usize {
            let (input, ace) = Ace::parse(entries_data)?;
            entries.push(ace);
            entries_data = input;
        }

        Ok((remaining_input, Acl { revision, entries }))
    }

    /// Encode back to the binary ACL format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for entry in &self.entries {
            body.append(&mut entry.to_bytes());
        }

        let header_size = 8;
        let size = (body.len() + header_size) as u16;
        let mut data = vec![self.revision, 0];
        data.extend_from_slice(&size.to_le_bytes());
        data.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        data.extend_from_slice(&[0, 0]);
        data.append(&mut body);
        data
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
