use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum TomlError {
    NoFile,
    BadToml,
    Ingest,
    Analysis,
    Output,
}

impl std::error::Error for TomlError {}

impl fmt::Display for TomlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TomlError::NoFile => write!(f, "Failed to read TOML file"),
            TomlError::BadToml => write!(f, "Failed to parse TOML data"),
            TomlError::Ingest => write!(f, "Failed to load directory objects"),
            TomlError::Analysis => write!(f, "Failed to analyze directory objects"),
            TomlError::Output => write!(f, "Failed to output capability graph"),
        }
    }
}
