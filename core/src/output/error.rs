use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum OutputError {
    CreateDirectory,
    CreateFile,
    WriteJson,
    Serialize,
    UnsupportedFormat,
}

impl std::error::Error for OutputError {}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::CreateDirectory => write!(f, "Could not create output directory"),
            OutputError::CreateFile => write!(f, "Could not create output file"),
            OutputError::WriteJson => write!(f, "Could not write output"),
            OutputError::Serialize => write!(f, "Could not serialize output"),
            OutputError::UnsupportedFormat => write!(f, "Unsupported output format"),
        }
    }
}
