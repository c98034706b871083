pub mod analysis;
pub mod core;
pub mod directory;
pub mod error;
pub mod output;
pub mod rules;
pub mod security;
pub mod structs;
pub mod utils;
