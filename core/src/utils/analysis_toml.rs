use super::error::UtilsError;
use crate::structs::toml::AnalysisToml;
use log::error;
use std::str::from_utf8;

impl AnalysisToml {
    /// Parse the analysis TOML file
    pub(crate) fn parse_analysis_toml(toml_data: &[u8]) -> Result<AnalysisToml, UtilsError> {
        let toml_results = toml::from_str(from_utf8(toml_data).unwrap_or_default());
        let mut analysis: AnalysisToml = match toml_results {
            Ok(results) => results,
            Err(err) => {
                error!("[core] Failed to parse analysis TOML data. Error: {err:?}");
                return Err(UtilsError::BadToml);
            }
        };

        // Format is always lowercase
        analysis.output.format = analysis.output.format.to_lowercase();
        Ok(analysis)
    }
}
