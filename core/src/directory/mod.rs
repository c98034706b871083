pub mod attributes;
pub(crate) mod dn;
pub mod error;
pub mod ingest;
pub mod object;
pub mod schema;
pub mod store;
