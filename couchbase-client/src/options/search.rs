//! Search query options.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{json, Map, Value};

use couchbase_core::ParameterMap;

use crate::error::{InvalidArgumentError, Result};
use crate::mutation_state::MutationState;
use crate::search::{SearchFacet, SearchSort};

/// Markup used to highlight matched terms in search hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchHighlightStyle {
    /// Let the server pick.
    #[default]
    Default,
    /// HTML `<mark>` tags.
    Html,
    /// ANSI terminal escapes.
    Ansi,
}

impl SearchHighlightStyle {
    /// Returns the wire name of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Html => "html",
            Self::Ansi => "ansi",
        }
    }
}

/// Which fields to highlight and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHighlightOptions {
    /// Highlight markup.
    pub style: SearchHighlightStyle,
    /// Fields to highlight; empty means all.
    pub fields: Vec<String>,
}

/// Level of data consistency required for a search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScanConsistency {
    /// No level requested.
    #[default]
    NotSet,
    /// The index may lag behind recent mutations.
    NotBounded,
}

/// Options for a search query.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    scan_consistency: SearchScanConsistency,
    limit: u32,
    skip: u32,
    explain: bool,
    highlight: Option<SearchHighlightOptions>,
    fields: Vec<String>,
    sort: Vec<SearchSort>,
    facets: Option<HashMap<String, SearchFacet>>,
    consistent_with: Option<MutationState>,
    raw: HashMap<String, Value>,
    timeout: Option<Duration>,
}

impl SearchOptions {
    /// Creates options with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scan consistency level.
    pub fn with_scan_consistency(mut self, consistency: SearchScanConsistency) -> Self {
        self.scan_consistency = consistency;
        self
    }

    /// Sets the maximum number of hits to return.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the number of hits to skip.
    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    /// Requests a scoring explanation for each hit.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// Requests highlighting of matched terms.
    pub fn with_highlight(mut self, highlight: SearchHighlightOptions) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Sets the stored fields to return with each hit.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: impl IntoIterator<Item = SearchSort>) -> Self {
        self.sort = sort.into_iter().collect();
        self
    }

    /// Adds a named facet.
    pub fn with_facet(mut self, name: impl Into<String>, facet: SearchFacet) -> Self {
        self.facets
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), facet);
        self
    }

    /// Requires the index to have observed the given mutations.
    pub fn with_consistent_with(mut self, state: MutationState) -> Self {
        self.consistent_with = Some(state);
        self
    }

    /// Sets a raw parameter, sent as-is and taking precedence over every
    /// computed key.
    pub fn with_raw(mut self, key: impl Into<String>, value: Value) -> Self {
        self.raw.insert(key.into(), value);
        self
    }

    /// Sets the client-side timeout for the request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the client-side timeout, if one was set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn validate(&self) -> Result<()> {
        if self.scan_consistency != SearchScanConsistency::NotSet && self.consistent_with.is_some()
        {
            return Err(InvalidArgumentError::MutuallyExclusive {
                first: "scan_consistency",
                second: "consistent_with",
            }
            .into());
        }
        Ok(())
    }

    /// Encodes the options as search request parameters.
    ///
    /// `size`, `from`, `explain`, `fields` and `sort` are always present.
    /// `highlight`, `facets` and `ctl` appear only when the corresponding
    /// option was set. Raw parameters are applied last.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if both a scan consistency level and
    /// a consistent-with mutation state were supplied.
    pub fn to_params(&self) -> Result<ParameterMap> {
        self.validate()?;

        let mut data = ParameterMap::new();
        data.insert("size".to_string(), Value::from(self.limit));
        data.insert("from".to_string(), Value::from(self.skip));
        data.insert("explain".to_string(), Value::from(self.explain));
        data.insert("fields".to_string(), json!(self.fields));
        data.insert("sort".to_string(), json!(self.sort));

        if let Some(highlight) = &self.highlight {
            data.insert(
                "highlight".to_string(),
                json!({
                    "style": highlight.style.as_str(),
                    "fields": highlight.fields,
                }),
            );
        }

        if let Some(facets) = &self.facets {
            let facets: Map<String, Value> = facets
                .iter()
                .map(|(name, facet)| (name.clone(), json!(facet)))
                .collect();
            data.insert("facets".to_string(), Value::Object(facets));
        }

        let consistency = match (&self.scan_consistency, &self.consistent_with) {
            (SearchScanConsistency::NotBounded, _) => Some(json!({ "level": "not_bounded" })),
            (SearchScanConsistency::NotSet, Some(state)) => Some(json!({
                "level": "at_plus",
                "vectors": state.to_search_vectors(),
            })),
            (SearchScanConsistency::NotSet, None) => None,
        };
        if let Some(consistency) = consistency {
            data.insert("ctl".to_string(), json!({ "consistency": consistency }));
        }

        for (key, value) in &self.raw {
            data.insert(key.clone(), value.clone());
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mutation_state::MutationToken;

    #[test]
    fn test_defaults_always_emit_fixed_keys() {
        let params = SearchOptions::new().to_params().unwrap();
        assert_eq!(params["size"], json!(0));
        assert_eq!(params["from"], json!(0));
        assert_eq!(params["explain"], json!(false));
        assert_eq!(params["fields"], json!([]));
        assert_eq!(params["sort"], json!([]));
        assert!(!params.contains_key("highlight"));
        assert!(!params.contains_key("facets"));
        assert!(!params.contains_key("ctl"));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_pagination_and_fields() {
        let params = SearchOptions::new()
            .with_limit(10)
            .with_skip(20)
            .with_explain(true)
            .with_fields(["name", "abv"])
            .with_sort([SearchSort::score(true), SearchSort::field("name", false)])
            .to_params()
            .unwrap();

        assert_eq!(params["size"], json!(10));
        assert_eq!(params["from"], json!(20));
        assert_eq!(params["explain"], json!(true));
        assert_eq!(params["fields"], json!(["name", "abv"]));
        assert_eq!(
            params["sort"],
            json!([
                { "by": "score", "desc": true },
                { "by": "field", "field": "name" }
            ])
        );
    }

    #[test]
    fn test_highlight_emitted_when_set() {
        let params = SearchOptions::new()
            .with_highlight(SearchHighlightOptions {
                style: SearchHighlightStyle::Html,
                fields: vec!["description".to_string()],
            })
            .to_params()
            .unwrap();
        assert_eq!(
            params["highlight"],
            json!({ "style": "html", "fields": ["description"] })
        );

        let params = SearchOptions::new()
            .with_highlight(SearchHighlightOptions::default())
            .to_params()
            .unwrap();
        assert_eq!(params["highlight"], json!({ "style": "", "fields": [] }));
    }

    #[test]
    fn test_facets_emitted_when_set() {
        let params = SearchOptions::new()
            .with_facet("types", SearchFacet::term("type", 5))
            .to_params()
            .unwrap();
        assert_eq!(
            params["facets"],
            json!({ "types": { "field": "type", "size": 5 } })
        );
    }

    #[test]
    fn test_not_bounded_consistency() {
        let params = SearchOptions::new()
            .with_scan_consistency(SearchScanConsistency::NotBounded)
            .to_params()
            .unwrap();
        assert_eq!(
            params["ctl"],
            json!({ "consistency": { "level": "not_bounded" } })
        );
    }

    #[test]
    fn test_consistent_with_emits_at_plus_vectors() {
        let state: MutationState = vec![MutationToken::new("default", 3, 99, 17)]
            .into_iter()
            .collect();
        let params = SearchOptions::new()
            .with_consistent_with(state)
            .to_params()
            .unwrap();
        assert_eq!(
            params["ctl"],
            json!({
                "consistency": {
                    "level": "at_plus",
                    "vectors": { "default": { "3/99": 17 } }
                }
            })
        );
    }

    #[test]
    fn test_consistency_level_and_token_are_exclusive() {
        let err = SearchOptions::new()
            .with_scan_consistency(SearchScanConsistency::NotBounded)
            .with_consistent_with(MutationState::new())
            .to_params()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument(InvalidArgumentError::MutuallyExclusive {
                first: "scan_consistency",
                second: "consistent_with",
            })
        ));
    }

    #[test]
    fn test_raw_overrides_computed_keys() {
        let params = SearchOptions::new()
            .with_limit(5)
            .with_raw("size", json!(999))
            .with_raw("score", json!("none"))
            .to_params()
            .unwrap();
        assert_eq!(params["size"], json!(999));
        assert_eq!(params["score"], json!("none"));
    }

    #[test]
    fn test_raw_can_replace_ctl() {
        let params = SearchOptions::new()
            .with_scan_consistency(SearchScanConsistency::NotBounded)
            .with_raw("ctl", json!({ "timeout": 1000 }))
            .to_params()
            .unwrap();
        assert_eq!(params["ctl"], json!({ "timeout": 1000 }));
    }

    #[test]
    fn test_timeout_is_not_encoded() {
        let options = SearchOptions::new().with_timeout(Duration::from_secs(3));
        let params = options.to_params().unwrap();
        assert_eq!(options.timeout(), Some(Duration::from_secs(3)));
        assert!(!params.contains_key("timeout"));
    }
}
