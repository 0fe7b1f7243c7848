//! Campus reference locations: categories, text search ranking, and
//! distance-based lookup.
//!
//! The functions here are generic over the caller's row type so the same
//! logic serves database rows and in-memory fixtures.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::{haversine_m, Coordinates};

/// Default radius for the nearby-locations query, in metres.
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 1_000.0;

/// Minimum search query length after trimming.
pub const MIN_SEARCH_QUERY_LEN: usize = 1;

// ---------------------------------------------------------------------------
// LocationCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationCategory {
    Gate,
    Hostel,
    Academic,
    Sports,
    Dining,
    Medical,
    Market,
    Other,
}

impl LocationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gate => "gate",
            Self::Hostel => "hostel",
            Self::Academic => "academic",
            Self::Sports => "sports",
            Self::Dining => "dining",
            Self::Medical => "medical",
            Self::Market => "market",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LocationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gate" => Ok(Self::Gate),
            "hostel" => Ok(Self::Hostel),
            "academic" => Ok(Self::Academic),
            "sports" => Ok(Self::Sports),
            "dining" => Ok(Self::Dining),
            "medical" => Ok(Self::Medical),
            "market" => Ok(Self::Market),
            "other" => Ok(Self::Other),
            other => Err(CoreError::Validation(format!(
                "Invalid location type '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for LocationCategory {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// The searchable text of a location.
#[derive(Debug, Clone, Copy)]
pub struct SearchFields<'a> {
    pub name: &'a str,
    pub aliases: &'a [String],
    pub description: &'a str,
}

/// How well a location matched a query; lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    ExactName,
    NamePrefix,
    Alias,
    Substring,
}

/// Rank a single location against a case-insensitive query.
pub fn match_rank(query: &str, fields: SearchFields<'_>) -> Option<MatchRank> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }
    let name = fields.name.to_lowercase();

    if name == q {
        return Some(MatchRank::ExactName);
    }
    if name.starts_with(&q) {
        return Some(MatchRank::NamePrefix);
    }
    if fields.aliases.iter().any(|a| a.to_lowercase().contains(&q)) {
        return Some(MatchRank::Alias);
    }
    if name.contains(&q) || fields.description.to_lowercase().contains(&q) {
        return Some(MatchRank::Substring);
    }
    None
}

/// Filter and order `items` by how well they match `query`.
///
/// Ties keep name order so results are stable.
pub fn search<T, F>(items: Vec<T>, query: &str, fields: F) -> Vec<T>
where
    F: Fn(&T) -> SearchFields<'_>,
{
    let mut ranked: Vec<(MatchRank, T)> = items
        .into_iter()
        .filter_map(|item| match_rank(query, fields(&item)).map(|rank| (rank, item)))
        .collect();

    ranked.sort_by(|(ra, a), (rb, b)| ra.cmp(rb).then_with(|| fields(a).name.cmp(fields(b).name)));
    ranked.into_iter().map(|(_, item)| item).collect()
}

pub fn validate_search_query(query: &str) -> Result<&str, CoreError> {
    let trimmed = query.trim();
    if trimmed.len() < MIN_SEARCH_QUERY_LEN {
        return Err(CoreError::Validation("Search query is required".into()));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// Items within `radius_m` of `center`, nearest first, paired with their
/// distance in metres.
pub fn within_radius<T, F>(items: Vec<T>, center: &Coordinates, radius_m: f64, coords: F) -> Vec<(T, f64)>
where
    F: Fn(&T) -> Coordinates,
{
    let mut hits: Vec<(T, f64)> = items
        .into_iter()
        .map(|item| {
            let d = haversine_m(center, &coords(&item));
            (item, d)
        })
        .filter(|(_, d)| *d <= radius_m)
        .collect();

    hits.sort_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    hits
}
