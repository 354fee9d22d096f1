pub mod alerts;
pub mod config;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parser;
pub mod stats;
pub mod store;
