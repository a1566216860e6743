pub mod config;
pub mod errors;
pub mod format;
pub mod generator;
pub mod models;
pub mod providers;
pub mod report;
pub mod tools;
