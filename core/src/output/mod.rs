pub mod error;
pub(crate) mod local;
