use crate::{
    analysis::{expand::expand, request::ExpandRequest},
    directory::{ingest::load_objects, schema::Schema},
    error::TomlError,
    output::local::output_graph,
    rules::{apply, RuleRegistry},
    structs::toml::AnalysisToml,
    utils::logging::create_log_file,
};
use log::{error, info};
use simplelog::{Config, WriteLogger};
use std::fs::read;

/// Parse a TOML file at provided path. Returns the path of the written capability graph
pub fn parse_toml_file(path: &str) -> Result<String, TomlError> {
    let buffer = match read(path) {
        Ok(results) => results,
        Err(err) => {
            error!("[core] Failed to read TOML file {path}: {err:?}");
            return Err(TomlError::NoFile);
        }
    };

    parse_toml_data(&buffer)
}

/// Parse an already read TOML file
pub fn parse_toml_data(data: &[u8]) -> Result<String, TomlError> {
    let toml_results = AnalysisToml::parse_analysis_toml(data);
    let analysis = match toml_results {
        Ok(results) => results,
        Err(_) => {
            return Err(TomlError::BadToml);
        }
    };
    run_analysis(&analysis)
}

/// Load the objects named by the TOML config, build the permission graph, expand it and write the result
pub fn run_analysis(analysis: &AnalysisToml) -> Result<String, TomlError> {
    if let Ok((log_file, level)) = create_log_file(&analysis.output) {
        let _ = WriteLogger::init(level, Config::default(), log_file);
    }

    let mut objects = match load_objects(&analysis.input.objects) {
        Ok(result) => result,
        Err(err) => {
            error!(
                "[core] Failed to load objects from {}: {err:?}",
                analysis.input.objects
            );
            return Err(TomlError::Ingest);
        }
    };

    let schema = Schema::from_objects(&objects);
    let mut registry = RuleRegistry::standard();
    if registry.register_privileged_container(&objects) {
        info!("[core] Registered AdminSDHolder rule");
    }

    let edges = apply(&registry, &mut objects, &schema);
    objects.finalize(&schema);
    info!(
        "[core] Built permission graph with {} objects and {edges} edges",
        objects.len()
    );

    let request = match ExpandRequest::from_options(&objects, &analysis.analysis) {
        Ok(result) => result,
        Err(err) => {
            error!("[core] Could not build expansion request: {err:?}");
            return Err(TomlError::Analysis);
        }
    };

    let graph = expand(&objects, &request);
    info!(
        "[core] Expansion finished after {} rounds with {} implicated objects",
        graph.rounds,
        graph.implicated.len()
    );

    match output_graph(&graph.export(&objects), &analysis.output) {
        Ok(path) => Ok(path),
        Err(err) => {
            error!("[core] Failed to output capability graph: {err:?}");
            Err(TomlError::Output)
        }
    }
}
