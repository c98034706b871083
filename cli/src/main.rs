use base64::{engine::general_purpose, Engine};
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Full path to TOML analysis file
    #[clap(short, long, value_parser)]
    toml: Option<String>,

    /// Base64 encoded TOML analysis file
    #[clap(short, long, value_parser)]
    data: Option<String>,
}

fn main() {
    let args = Args::parse();
    println!("[adpath] Starting privilege path analysis!");

    let analysis_results = if let Some(toml) = args.toml.filter(|value| !value.is_empty()) {
        adpath_core::core::parse_toml_file(&toml)
    } else if let Some(data) = args.data.filter(|value| !value.is_empty()) {
        let toml_data = match general_purpose::STANDARD.decode(&data) {
            Ok(results) => results,
            Err(err) => {
                println!("[adpath] Failed to base64 decode TOML analysis {data}, error: {err:?}");
                return;
            }
        };
        adpath_core::core::parse_toml_data(&toml_data)
    } else {
        println!("[adpath] No TOML file or data provided!");
        return;
    };

    match analysis_results {
        Ok(path) => {
            info!("[adpath] Analysis success");
            println!("[adpath] Capability graph written to {path}");
        }
        Err(err) => {
            println!("[adpath] Failed to analyze directory objects: {err:?}");
            return;
        }
    }
    println!("[adpath] Finished privilege path analysis!");
}
