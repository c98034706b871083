use super::error::SecurityError;
use crate::utils::nom_helper::{
    nom_unsigned_four_bytes, nom_unsigned_one_byte, nom_verify_failure, Endian,
};
use byteorder::{BigEndian, ReadBytesExt};
use log::error;
use nom::bytes::complete::take;
use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Well known RID of the Protected Users group
pub(crate) const RID_PROTECTED_USERS: u32 = 525;

/// Security identifier. Equality is byte-exact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sid {
    revision: u8,
    authority: u64,
    sub_authorities: Vec<u32>,
}

impl Sid {
    /// Parse a binary SID. Returns remaining bytes after the last sub authority
    pub(crate) fn parse(data: &[u8]) -> nom::IResult<&[u8], Sid> {
        let (input, revision) = nom_unsigned_one_byte(data, Endian::Le)?;
        let (input, count) = nom_unsigned_one_byte(input, Endian::Le)?;

        let max_sub_authorities = 15;
        if count > max_sub_authorities {
            return Err(nom_verify_failure(data));
        }

        let authority_size: usize = 6;
        let (mut input, mut authority_data) = take(authority_size)(input)?;
        let authority = authority_data.read_u48::<BigEndian>().unwrap_or(0);

        let mut sub_authorities = Vec::with_capacity(count as usize);
        while sub_authorities.len() < count as usize {
            let (remaining, value) = nom_unsigned_four_bytes(input, Endian::Le)?;
            sub_authorities.push(value);
            input = remaining;
        }

        Ok((
            input,
            Sid {
                revision,
                authority,
                sub_authorities,
            },
        ))
    }

    /// Parse a binary SID that must make up the whole of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Sid, SecurityError> {
        let sid_result = Sid::parse(data);
        match sid_result {
            Ok((remaining, sid)) if remaining.is_empty() => Ok(sid),
            Ok((remaining, sid)) => {
                error!(
                    "[security] Binary SID {sid} has {} trailing bytes",
                    remaining.len()
                );
                Err(SecurityError::MalformedData)
            }
            Err(err) => {
                error!("[security] Could not parse binary SID {data:?}: {err:?}");
                Err(SecurityError::MalformedData)
            }
        }
    }

    /// Encode back to the binary wire form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(8 + self.sub_authorities.len() * 4);
        data.push(self.revision);
        data.push(self.sub_authorities.len() as u8);
        data.extend_from_slice(&self.authority.to_be_bytes()[2..]);
        for sub in &self.sub_authorities {
            data.extend_from_slice(&sub.to_le_bytes());
        }
        data
    }

    /// Size of the binary form
    pub fn len(&self) -> usize {
        8 + self.sub_authorities.len() * 4
    }

    pub fn is_empty(&self) -> bool {
        self.sub_authorities.is_empty()
    }

    /// Relative identifier. The last sub authority
    pub fn rid(&self) -> Option<u32> {
        self.sub_authorities.last().copied()
    }

    /// Copy of this SID with the last sub authority replaced
    pub fn with_rid(&self, rid: u32) -> Sid {
        let mut sid = self.clone();
        match sid.sub_authorities.last_mut() {
            Some(last) => *last = rid,
            None => sid.sub_authorities.push(rid),
        }
        sid
    }

    /// Domain part of an account SID (everything but the RID)
    pub fn domain_component(&self) -> Option<Sid> {
        if self.sub_authorities.len() < 2 {
            return None;
        }
        let mut sid = self.clone();
        sid.sub_authorities.pop();
        Some(sid)
    }

    /// True if this is a domain SID (S-1-5-21-x-y-z-RID)
    pub fn is_domain_account(&self) -> bool {
        self.authority == 5
            && self.sub_authorities.len() == 5
            && self.sub_authorities.first() == Some(&21)
    }

    pub fn everyone() -> Sid {
        Sid::well_known(1, &[0])
    }

    pub fn authenticated_users() -> Sid {
        Sid::well_known(5, &[11])
    }

    /// Principal Self. Refers to whatever object holds the ACE
    pub fn principal_self() -> Sid {
        Sid::well_known(5, &[10])
    }

    pub fn creator_owner() -> Sid {
        Sid::well_known(3, &[0])
    }

    fn well_known(authority: u64, subs: &[u32]) -> Sid {
        Sid {
            revision: 1,
            authority,
            sub_authorities: subs.to_vec(),
        }
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Authorities that do not fit in 32 bits are shown as hex
        if self.authority >= 1 << 32 {
            write!(f, "S-{}-0x{:012X}", self.revision, self.authority)?;
        } else {
            write!(f, "S-{}-{}", self.revision, self.authority)?;
        }
        for sub in &self.sub_authorities {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

impl FromStr for Sid {
    type Err = SecurityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.trim().split('-');
        match parts.next() {
            Some("S") | Some("s") => {}
            _ => return Err(SecurityError::BadSid),
        }

        let revision = parts
            .next()
            .and_then(|rev| rev.parse::<u8>().ok())
            .ok_or(SecurityError::BadSid)?;

        let authority_text = parts.next().ok_or(SecurityError::BadSid)?;
        let authority = match authority_text
            .strip_prefix("0x")
            .or_else(|| authority_text.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| SecurityError::BadSid)?,
            None => authority_text
                .parse::<u64>()
                .map_err(|_| SecurityError::BadSid)?,
        };
        if authority >= 1 << 48 {
            return Err(SecurityError::BadSid);
        }

        let mut sub_authorities = Vec::new();
        for part in parts {
            let sub = part.parse::<u32>().map_err(|_| SecurityError::BadSid)?;
            sub_authorities.push(sub);
        }
        if sub_authorities.len() > 15 {
            return Err(SecurityError::BadSid);
        }

        Ok(Sid {
            revision,
            authority,
            sub_authorities,
        })
    }
}

impl Serialize for Sid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
