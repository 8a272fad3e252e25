pub mod config;
pub mod error;
pub mod host;
pub mod output;
pub mod parser;
pub mod render;
pub mod table;
pub mod update;
