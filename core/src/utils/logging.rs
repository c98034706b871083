use super::{error::UtilsError, uuid::generate_uuid};
use crate::structs::toml::Output;
use log::{error, LevelFilter};
use std::fs::{create_dir_all, File};

/// Create log output file and logging level based on TOML `Output` configuration
pub(crate) fn create_log_file(output: &Output) -> Result<(File, LevelFilter), UtilsError> {
    let path = format!("{}/{}", output.directory, output.name);
    let result = create_dir_all(&path);
    match result {
        Ok(_) => {}
        Err(err) => {
            error!("[core] Failed to create logging output directory for {path}. Error: {err:?}");
            return Err(UtilsError::CreateDirectory);
        }
    }

    let output_result = File::create(format!("{path}/{}.log", generate_uuid()));
    let log_file = match output_result {
        Ok(result) => result,
        Err(err) => {
            error!("[core] Failed to create log file at {path}. Error: {err:?}");
            return Err(UtilsError::LogFile);
        }
    };

    Ok((log_file, log_level(output.logging.as_deref())))
}

/// Level from the `logging` option. Defaults to warn
pub(crate) fn log_level(logging: Option<&str>) -> LevelFilter {
    match logging.map(|level| level.to_lowercase()).as_deref() {
        Some("error") => LevelFilter::Error,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}
