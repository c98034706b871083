pub mod error;
pub mod expand;
pub mod graph;
pub mod request;
