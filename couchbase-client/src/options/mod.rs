//! Encoding of typed request options into wire parameter maps.
//!
//! Every encoder validates mutually exclusive options before it builds any
//! part of the map, so a rejected request never reaches a connection.

mod analytics;
mod search;

use std::time::Duration;

pub use analytics::AnalyticsOptions;
pub use search::{
    SearchHighlightOptions, SearchHighlightStyle, SearchOptions, SearchScanConsistency,
};

/// Formats a duration the way the query services parse it: a single integer
/// in the coarsest unit that represents it exactly.
pub(crate) fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos % 1_000_000_000 == 0 {
        format!("{}s", nanos / 1_000_000_000)
    } else if nanos % 1_000_000 == 0 {
        format!("{}ms", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        format!("{}us", nanos / 1_000)
    } else {
        format!("{}ns", nanos)
    }
}
