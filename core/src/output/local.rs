use super::error::OutputError;
use crate::{structs::toml::Output, utils::uuid::generate_uuid};
use common::analysis::GraphExport;
use log::{error, info};
use std::{
    fs::{create_dir_all, OpenOptions},
    io::Write,
};

/// Serialize the graph and write it under `<directory>/<name>/<uuid>.json`. Returns the file path
pub(crate) fn output_graph(graph: &GraphExport, output: &Output) -> Result<String, OutputError> {
    if output.format != "json" {
        error!("[core] Unsupported output format: {}", output.format);
        return Err(OutputError::UnsupportedFormat);
    }

    let serde_data = match serde_json::to_vec(graph) {
        Ok(result) => result,
        Err(err) => {
            error!("[core] Failed to serialize capability graph: {err:?}");
            return Err(OutputError::Serialize);
        }
    };
    let output_name = generate_uuid();
    local_output(&serde_data, output, &output_name, &output.format)?;

    let path = format!(
        "{}/{}/{output_name}.{}",
        output.directory, output.name, output.format
    );
    info!("[core] Wrote capability graph to {path}");
    Ok(path)
}

/// Output to local directory provided by TOML input
pub(crate) fn local_output(
    data: &[u8],
    output: &Output,
    output_name: &str,
    extension: &str,
) -> Result<(), OutputError> {
    let output_path = format!("{}/{}", output.directory, output.name);

    let result = create_dir_all(&output_path);
    match result {
        Ok(_) => {}
        Err(err) => {
            error!("[core] Failed to create output directory for {output_path}. Error: {err:?}");
            return Err(OutputError::CreateDirectory);
        }
    }

    let json_file_result = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(format!("{output_path}/{output_name}.{extension}"));

    let mut json_file = match json_file_result {
        Ok(results) => results,
        Err(err) => {
            error!(
                "[core] Failed to create output file {output_name} at {output_path}. Error: {err:?}"
            );
            return Err(OutputError::CreateFile);
        }
    };

    let write_result = json_file.write_all(data);
    match write_result {
        Ok(_) => {}
        Err(err) => {
            error!(
                "[core] Failed to write output to file {output_name} at {output_path}. Error: {err:?}",
            );
            return Err(OutputError::WriteJson);
        }
    }
    Ok(())
}
