// 模組定義
pub mod analytics;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod data_ingestion;
pub mod data_provider;
pub mod domain_types;
pub mod utils;
