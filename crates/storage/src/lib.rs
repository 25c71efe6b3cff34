#![forbid(unsafe_code)]

pub mod files;
pub mod repository;
pub mod source;
pub mod sqlite;
