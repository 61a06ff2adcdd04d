pub mod config;
pub mod domain;
pub mod mail;
pub mod report;
pub mod summary;
