use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Shown in place of a director when the credits carry no "Director" crew entry.
pub const UNKNOWN_DIRECTOR: &str = "N/A";

/// Release years covered by a catalog build, inclusive on both ends.
pub const YEARS: RangeInclusive<u16> = 2010..=2024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// One row of a discovery query. Replaced wholesale on every re-query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
}

/// A movie with its credits folded in: genre names in provider order, at most
/// three cast names in billing order, and a director name or [`UNKNOWN_DIRECTOR`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub director: String,
}

/// Year-keyed listing of enriched movies. Rebuilt in full on every run; a year
/// whose query failed is present with an empty list, never missing.
pub type Catalog = BTreeMap<u16, Vec<MovieDetail>>;
