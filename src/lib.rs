pub mod budget;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod extractor;
pub mod graph;
pub mod render;
pub mod strip;
pub mod types;
pub mod workers;
