//! Rewrapping of transport errors into client errors.

use serde::Serialize;
use serde_json::Value;

use couchbase_core::error::{
    AnalyticsErrorDesc as CoreAnalyticsErrorDesc, QueryErrorDesc as CoreQueryErrorDesc,
    ViewErrorDesc as CoreViewErrorDesc,
};
use couchbase_core::CoreError;

use crate::error::{
    AnalyticsError, AnalyticsErrorDesc, Error, HttpError, KeyValueError, QueryError,
    QueryErrorDesc, SearchError, ViewError, ViewErrorDesc,
};
use crate::retry::translate_core_retry_reasons;

/// Serializes an error payload to JSON for its `Display` output.
///
/// Serialization failures are logged and produce an empty string.
pub(crate) fn serialize_wrapped_error<T: Serialize>(err: &T) -> String {
    match serde_json::to_string(err) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize error to json");
            String::new()
        }
    }
}

/// Converts a transport error into the matching client error.
///
/// Key-value, view, query, analytics and HTTP errors are copied field for
/// field into their client counterparts, keeping retry reasons and attempt
/// counts intact. Every other transport error is returned as [`Error::Core`].
pub fn enhance_core_error(err: CoreError) -> Error {
    match err {
        CoreError::KeyValue(kv) => Error::KeyValue(KeyValueError {
            inner_error: kv.inner_error,
            status_code: kv.status_code,
            bucket_name: kv.bucket_name,
            scope_name: kv.scope_name,
            collection_name: kv.collection_name,
            collection_id: kv.collection_id,
            error_name: kv.error_name,
            error_description: kv.error_description,
            opaque: kv.opaque,
            context: kv.context,
            reference: kv.reference,
            retry_reasons: translate_core_retry_reasons(kv.retry_reasons),
            retry_attempts: kv.retry_attempts,
        }),
        CoreError::View(view) => Error::View(ViewError {
            inner_error: view.inner_error,
            design_document_name: view.design_document_name,
            view_name: view.view_name,
            errors: view.errors.into_iter().map(translate_view_error_desc).collect(),
            endpoint: view.endpoint,
            retry_reasons: translate_core_retry_reasons(view.retry_reasons),
            retry_attempts: view.retry_attempts,
        }),
        CoreError::Query(query) => Error::Query(QueryError {
            inner_error: query.inner_error,
            statement: query.statement,
            client_context_id: query.client_context_id,
            errors: query.errors.into_iter().map(translate_query_error_desc).collect(),
            endpoint: query.endpoint,
            retry_reasons: translate_core_retry_reasons(query.retry_reasons),
            retry_attempts: query.retry_attempts,
        }),
        CoreError::Analytics(analytics) => Error::Analytics(AnalyticsError {
            inner_error: analytics.inner_error,
            statement: analytics.statement,
            client_context_id: analytics.client_context_id,
            errors: analytics
                .errors
                .into_iter()
                .map(translate_analytics_error_desc)
                .collect(),
            endpoint: analytics.endpoint,
            retry_reasons: translate_core_retry_reasons(analytics.retry_reasons),
            retry_attempts: analytics.retry_attempts,
        }),
        CoreError::Http(http) => Error::Http(HttpError {
            inner_error: http.inner_error,
            unique_id: http.unique_id,
            endpoint: http.endpoint,
            retry_reasons: translate_core_retry_reasons(http.retry_reasons),
            retry_attempts: http.retry_attempts,
        }),
        other => Error::Core(other),
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        enhance_core_error(err)
    }
}

/// Converts an error returned by the search service, attaching the query that
/// was executed.
///
/// HTTP failures become [`Error::Search`]; every other shape is enhanced as by
/// [`enhance_core_error`].
pub fn enhance_search_error(err: CoreError, query: &Value) -> Error {
    match err {
        CoreError::Http(http) => Error::Search(SearchError {
            inner_error: http.inner_error,
            query: Some(query.clone()),
            endpoint: http.endpoint,
            retry_reasons: translate_core_retry_reasons(http.retry_reasons),
            retry_attempts: http.retry_attempts,
        }),
        other => enhance_core_error(other),
    }
}

fn translate_view_error_desc(desc: CoreViewErrorDesc) -> ViewErrorDesc {
    ViewErrorDesc {
        source_node: desc.source_node,
        message: desc.message,
    }
}

fn translate_query_error_desc(desc: CoreQueryErrorDesc) -> QueryErrorDesc {
    QueryErrorDesc {
        code: desc.code,
        message: desc.message,
    }
}

fn translate_analytics_error_desc(desc: CoreAnalyticsErrorDesc) -> AnalyticsErrorDesc {
    AnalyticsErrorDesc {
        code: desc.code,
        message: desc.message,
    }
}
