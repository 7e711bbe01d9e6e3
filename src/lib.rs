//! Missilery library: crawl/extraction pipeline and structured importer.

pub mod cli;
pub mod config;
pub mod crawl;
pub mod extract;
pub mod import;
pub mod models;
pub mod repository;
pub mod schema;
pub mod storage;
