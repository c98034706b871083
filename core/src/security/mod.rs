pub mod access;
pub mod ace;
pub mod acl;
pub mod cache;
pub mod descriptor;
pub mod error;
pub mod guid;
pub mod rights;
pub mod sid;
