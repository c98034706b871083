use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum DirectoryError {
    ReadFile,
    BadRecord,
    NoObjects,
}

impl std::error::Error for DirectoryError {}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::ReadFile => write!(f, "Could not read directory objects file"),
            DirectoryError::BadRecord => write!(f, "Could not parse directory object record"),
            DirectoryError::NoObjects => write!(f, "No directory objects were loaded"),
        }
    }
}
