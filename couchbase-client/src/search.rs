//! Sort orders and facets for search queries.
//!
//! Both serialize to the JSON objects the search service expects inside the
//! `sort` and `facets` request fields.

use serde::Serialize;

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single sort criterion for search hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum SearchSort {
    /// Sort by hit score.
    Score {
        /// Sort in descending order.
        #[serde(skip_serializing_if = "is_false")]
        desc: bool,
    },
    /// Sort by document id.
    Id {
        /// Sort in descending order.
        #[serde(skip_serializing_if = "is_false")]
        desc: bool,
    },
    /// Sort by the value of a stored field.
    Field {
        /// Field to sort on.
        field: String,
        /// How to interpret the field: `auto`, `string`, `number` or `date`.
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        /// Which value to use for multi-valued fields: `default`, `min` or `max`.
        #[serde(skip_serializing_if = "Option::is_none")]
        mode: Option<String>,
        /// Where documents missing the field go: `first` or `last`.
        #[serde(skip_serializing_if = "Option::is_none")]
        missing: Option<String>,
        /// Sort in descending order.
        #[serde(skip_serializing_if = "is_false")]
        desc: bool,
    },
    /// Sort by distance from a geographic point.
    GeoDistance {
        /// Field holding the location.
        field: String,
        /// Reference point as `[longitude, latitude]`.
        location: [f64; 2],
        /// Distance unit, e.g. `km` or `mi`.
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        /// Sort in descending order.
        #[serde(skip_serializing_if = "is_false")]
        desc: bool,
    },
}

impl SearchSort {
    /// Sorts by hit score.
    pub fn score(desc: bool) -> Self {
        Self::Score { desc }
    }

    /// Sorts by document id.
    pub fn id(desc: bool) -> Self {
        Self::Id { desc }
    }

    /// Sorts by a field with default type, mode and missing handling.
    pub fn field(field: impl Into<String>, desc: bool) -> Self {
        Self::Field {
            field: field.into(),
            kind: None,
            mode: None,
            missing: None,
            desc,
        }
    }

    /// Sorts by distance from `(longitude, latitude)`.
    pub fn geo_distance(field: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self::GeoDistance {
            field: field.into(),
            location: [longitude, latitude],
            unit: None,
            desc: false,
        }
    }
}

/// A named numeric range bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericRange {
    /// Bucket name.
    pub name: String,
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Exclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// A named date range bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Bucket name.
    pub name: String,
    /// Inclusive start, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Exclusive end, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Aggregation computed over the hits of a search query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchFacet {
    /// Counts the most frequent terms of a field.
    Term {
        /// Field to aggregate.
        field: String,
        /// Number of terms to return.
        size: u32,
    },
    /// Counts hits falling into numeric ranges.
    NumericRange {
        /// Field to aggregate.
        field: String,
        /// Number of ranges to return.
        size: u32,
        /// The ranges.
        numeric_ranges: Vec<NumericRange>,
    },
    /// Counts hits falling into date ranges.
    DateRange {
        /// Field to aggregate.
        field: String,
        /// Number of ranges to return.
        size: u32,
        /// The ranges.
        date_ranges: Vec<DateRange>,
    },
}

impl SearchFacet {
    /// Creates a term facet.
    pub fn term(field: impl Into<String>, size: u32) -> Self {
        Self::Term {
            field: field.into(),
            size,
        }
    }

    /// Creates a numeric range facet with no ranges yet.
    pub fn numeric_range(field: impl Into<String>, size: u32) -> Self {
        Self::NumericRange {
            field: field.into(),
            size,
            numeric_ranges: Vec::new(),
        }
    }

    /// Creates a date range facet with no ranges yet.
    pub fn date_range(field: impl Into<String>, size: u32) -> Self {
        Self::DateRange {
            field: field.into(),
            size,
            date_ranges: Vec::new(),
        }
    }

    /// Adds a numeric range. Has no effect on other facet kinds.
    pub fn add_numeric_range(
        mut self,
        name: impl Into<String>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        if let Self::NumericRange { numeric_ranges, .. } = &mut self {
            numeric_ranges.push(NumericRange {
                name: name.into(),
                min,
                max,
            });
        }
        self
    }

    /// Adds a date range. Has no effect on other facet kinds.
    pub fn add_date_range(
        mut self,
        name: impl Into<String>,
        start: Option<String>,
        end: Option<String>,
    ) -> Self {
        if let Self::DateRange { date_ranges, .. } = &mut self {
            date_ranges.push(DateRange {
                name: name.into(),
                start,
                end,
            });
        }
        self
    }
}
