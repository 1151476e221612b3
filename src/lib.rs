pub mod analyzers;
pub mod config;
pub mod format;
pub mod generator;
pub mod model;
pub mod output;
pub mod report;
