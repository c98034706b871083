pub(crate) mod analysis_toml;
pub(crate) mod encoding;
pub mod error;
pub(crate) mod logging;
pub(crate) mod nom_helper;
pub(crate) mod uuid;
