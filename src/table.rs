//! Rate table data model.

use serde::Serialize;

/// Minimum number of entries a table must carry (50 states + DC, at least 50).
pub const MIN_STATES: usize = 50;

pub const PLACEHOLDER_ABBR: &str = "--";
pub const PLACEHOLDER_NAME: &str = "-- Select State --";

/// A validated rate table. Only [`crate::parser::validate`] builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub year: u32,
    pub updated: String,
    pub states: Vec<StateRate>,
}

/// Rate for a single state, as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRate {
    pub abbr: String,
    pub name: String,
    pub rate: f64,
}
