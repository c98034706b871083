use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum AnalysisError {
    NoTargets,
    UnknownTarget,
    UnknownTechnique,
    Serialize,
}

impl std::error::Error for AnalysisError {}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::NoTargets => write!(f, "No analysis targets provided"),
            AnalysisError::UnknownTarget => write!(f, "Analysis target not found"),
            AnalysisError::UnknownTechnique => write!(f, "Unknown technique name"),
            AnalysisError::Serialize => write!(f, "Could not serialize capability graph"),
        }
    }
}
