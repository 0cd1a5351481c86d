//! In-memory transport used by the connection unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use couchbase_core::{
    AgentConfig, AnalyticsProvider, AnalyticsRequest, CoreError, DiagnosticsProvider,
    DiagnosticsReport, DiagnosticsRequest, HttpProvider, HttpRequest, HttpResponse,
    QueryProvider, QueryRequest, SearchProvider, SearchRequest, ServiceResponse, Transport,
    TransportFactory,
};

pub(crate) fn base_config() -> AgentConfig {
    AgentConfig {
        scheme: "couchbase".to_string(),
        addresses: vec!["localhost".to_string()],
        bucket_name: None,
        credentials: None,
        connect_timeout: Duration::from_secs(10),
        kv_timeout: Duration::from_millis(2500),
        use_mutation_tokens: true,
        use_server_durations: true,
        options: Default::default(),
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    connected: AtomicBool,
    cluster_level: AtomicBool,
    providers_fail: AtomicBool,
    close_calls: AtomicUsize,
    connect_error: Mutex<Option<String>>,
    select_error: Mutex<Option<String>>,
    close_error: Mutex<Option<String>>,
    selected_bucket: Mutex<Option<String>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_cluster_level(self: Arc<Self>, supported: bool) -> Arc<Self> {
        self.cluster_level.store(supported, Ordering::SeqCst);
        self
    }

    pub(crate) fn fail_connect(&self, message: &str) {
        *self.connect_error.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn fail_select(&self, message: &str) {
        *self.select_error.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn fail_close(&self, message: &str) {
        *self.close_error.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn fail_providers(&self) {
        self.providers_fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn selected_bucket(&self) -> Option<String> {
        self.selected_bucket.lock().unwrap().clone()
    }

    fn provider(&self) -> couchbase_core::Result<Arc<MockProvider>> {
        if self.providers_fail.load(Ordering::SeqCst) {
            return Err(CoreError::ServiceNotAvailable("not configured".to_string()));
        }
        Ok(Arc::new(MockProvider))
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn build_config(&self) -> couchbase_core::Result<()> {
        Ok(())
    }

    async fn connect(&self) -> couchbase_core::Result<()> {
        if let Some(message) = self.connect_error.lock().unwrap().clone() {
            return Err(CoreError::Connection(message));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn select_bucket(&self, bucket_name: &str) -> couchbase_core::Result<()> {
        if let Some(message) = self.select_error.lock().unwrap().clone() {
            return Err(CoreError::Connection(message));
        }
        *self.selected_bucket.lock().unwrap() = Some(bucket_name.to_string());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn supports_cluster_level_operations(&self) -> bool {
        self.cluster_level.load(Ordering::SeqCst)
    }

    async fn close(&self) -> couchbase_core::Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        match self.close_error.lock().unwrap().clone() {
            Some(message) => Err(CoreError::Connection(message)),
            None => Ok(()),
        }
    }

    fn query_provider(&self) -> couchbase_core::Result<Arc<dyn QueryProvider>> {
        Ok(self.provider()?)
    }

    fn analytics_provider(&self) -> couchbase_core::Result<Arc<dyn AnalyticsProvider>> {
        Ok(self.provider()?)
    }

    fn search_provider(&self) -> couchbase_core::Result<Arc<dyn SearchProvider>> {
        Ok(self.provider()?)
    }

    fn diagnostics_provider(&self) -> couchbase_core::Result<Arc<dyn DiagnosticsProvider>> {
        Ok(self.provider()?)
    }

    fn http_provider(&self) -> couchbase_core::Result<Arc<dyn HttpProvider>> {
        Ok(self.provider()?)
    }
}

#[derive(Debug)]
pub(crate) struct MockProvider;

#[async_trait]
impl QueryProvider for MockProvider {
    async fn query(&self, _request: QueryRequest) -> couchbase_core::Result<ServiceResponse> {
        Ok(ServiceResponse::default())
    }
}

#[async_trait]
impl AnalyticsProvider for MockProvider {
    async fn analytics_query(
        &self,
        _request: AnalyticsRequest,
    ) -> couchbase_core::Result<ServiceResponse> {
        Ok(ServiceResponse::default())
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    async fn search_query(&self, _request: SearchRequest) -> couchbase_core::Result<ServiceResponse> {
        Ok(ServiceResponse::default())
    }
}

#[async_trait]
impl DiagnosticsProvider for MockProvider {
    async fn diagnostics(
        &self,
        request: DiagnosticsRequest,
    ) -> couchbase_core::Result<DiagnosticsReport> {
        Ok(DiagnosticsReport {
            id: request.report_id.unwrap_or_default(),
            config_rev: 1,
            endpoints: Vec::new(),
        })
    }
}

#[async_trait]
impl HttpProvider for MockProvider {
    async fn do_http_request(&self, request: HttpRequest) -> couchbase_core::Result<HttpResponse> {
        Ok(HttpResponse {
            endpoint: "localhost:8091".to_string(),
            status_code: 200,
            body: request.body,
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockFactory {
    created: Mutex<Vec<(AgentConfig, Arc<MockTransport>)>>,
    failing_buckets: Mutex<HashMap<String, String>>,
}

impl MockFactory {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn fail_bucket(&self, bucket: &str, message: &str) {
        self.failing_buckets
            .lock()
            .unwrap()
            .insert(bucket.to_string(), message.to_string());
    }

    pub(crate) fn created(&self) -> Vec<(AgentConfig, Arc<MockTransport>)> {
        self.created.lock().unwrap().clone()
    }
}

impl TransportFactory for MockFactory {
    fn create(&self, config: &AgentConfig) -> Arc<dyn Transport> {
        let transport = MockTransport::new();
        if let Some(bucket) = &config.bucket_name {
            if let Some(message) = self.failing_buckets.lock().unwrap().get(bucket) {
                transport.fail_connect(message);
            }
        }
        self.created
            .lock()
            .unwrap()
            .push((config.clone(), Arc::clone(&transport)));
        transport
    }
}
