use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum SecurityError {
    MalformedData,
    BadSid,
    BadGuid,
    Base64,
}

impl std::error::Error for SecurityError {}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityError::MalformedData => write!(f, "Malformed security data"),
            SecurityError::BadSid => write!(f, "Could not parse SID"),
            SecurityError::BadGuid => write!(f, "Could not parse GUID"),
            SecurityError::Base64 => write!(f, "Could not base64 decode security data"),
        }
    }
}
