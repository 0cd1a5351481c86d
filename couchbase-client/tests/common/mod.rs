//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use couchbase_client::core::{
    AgentConfig, AnalyticsProvider, AnalyticsRequest, CoreError, DiagnosticsProvider,
    DiagnosticsReport, DiagnosticsRequest, HttpProvider, HttpRequest, HttpResponse,
    QueryProvider, QueryRequest, SearchProvider, SearchRequest, ServiceResponse, Transport,
    TransportFactory,
};
use couchbase_client::{ClusterOptions, ConnectionIdentity};
use serde_json::json;
use tokio::sync::Semaphore;

pub const DEFAULT_CONN_STR: &str = "couchbase://localhost";

pub type ErrorFn = Arc<dyn Fn() -> CoreError + Send + Sync>;

/// Scripted behaviour for every transport created for one bucket.
#[derive(Clone, Default)]
pub struct TransportScript {
    pub connect_error: Option<String>,
    pub select_error: Option<String>,
    pub close_error: Option<String>,
    pub cluster_level: bool,
    pub connect_gate: Option<ConnectGate>,
    pub provider_error: Option<ErrorFn>,
}

impl TransportScript {
    pub fn cluster_level(mut self, supported: bool) -> Self {
        self.cluster_level = supported;
        self
    }

    pub fn connect_error(mut self, message: &str) -> Self {
        self.connect_error = Some(message.to_string());
        self
    }

    pub fn select_error(mut self, message: &str) -> Self {
        self.select_error = Some(message.to_string());
        self
    }

    pub fn close_error(mut self, message: &str) -> Self {
        self.close_error = Some(message.to_string());
        self
    }

    pub fn gated(mut self, gate: ConnectGate) -> Self {
        self.connect_gate = Some(gate);
        self
    }

    pub fn provider_error<F>(mut self, f: F) -> Self
    where
        F: Fn() -> CoreError + Send + Sync + 'static,
    {
        self.provider_error = Some(Arc::new(f));
        self
    }
}

/// Holds `connect` until released and reports when a connect has started.
#[derive(Clone)]
pub struct ConnectGate {
    entered: Arc<Semaphore>,
    release: Arc<Semaphore>,
}

impl ConnectGate {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Semaphore::new(0)),
            release: Arc::new(Semaphore::new(0)),
        }
    }

    pub async fn wait_entered(&self) {
        self.entered.acquire().await.unwrap().forget();
    }

    pub fn release(&self) {
        self.release.add_permits(1);
    }

    async fn pass(&self) {
        self.entered.add_permits(1);
        self.release.acquire().await.unwrap().forget();
    }
}

/// Requests seen by every provider handed out by one factory.
#[derive(Default)]
pub struct Recorder {
    pub analytics: Mutex<Vec<AnalyticsRequest>>,
    pub search: Mutex<Vec<SearchRequest>>,
    pub query: Mutex<Vec<QueryRequest>>,
}

pub struct MockTransport {
    pub bucket: Option<String>,
    script: TransportScript,
    recorder: Arc<Recorder>,
    connected: AtomicBool,
    close_calls: AtomicUsize,
    selected_bucket: Mutex<Option<String>>,
}

impl MockTransport {
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn selected_bucket(&self) -> Option<String> {
        self.selected_bucket.lock().unwrap().clone()
    }

    fn provider(&self) -> couchbase_client::core::Result<Arc<MockProvider>> {
        Ok(Arc::new(MockProvider {
            recorder: Arc::clone(&self.recorder),
            error: self.script.provider_error.clone(),
        }))
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn build_config(&self) -> couchbase_client::core::Result<()> {
        Ok(())
    }

    async fn connect(&self) -> couchbase_client::core::Result<()> {
        if let Some(gate) = &self.script.connect_gate {
            gate.pass().await;
        }
        if let Some(message) = &self.script.connect_error {
            return Err(CoreError::Connection(message.clone()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn select_bucket(&self, bucket_name: &str) -> couchbase_client::core::Result<()> {
        if let Some(message) = &self.script.select_error {
            return Err(CoreError::Connection(message.clone()));
        }
        *self.selected_bucket.lock().unwrap() = Some(bucket_name.to_string());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn supports_cluster_level_operations(&self) -> bool {
        self.script.cluster_level
    }

    async fn close(&self) -> couchbase_client::core::Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        match &self.script.close_error {
            Some(message) => Err(CoreError::Connection(message.clone())),
            None => Ok(()),
        }
    }

    fn query_provider(&self) -> couchbase_client::core::Result<Arc<dyn QueryProvider>> {
        Ok(self.provider()?)
    }

    fn analytics_provider(&self) -> couchbase_client::core::Result<Arc<dyn AnalyticsProvider>> {
        Ok(self.provider()?)
    }

    fn search_provider(&self) -> couchbase_client::core::Result<Arc<dyn SearchProvider>> {
        Ok(self.provider()?)
    }

    fn diagnostics_provider(&self) -> couchbase_client::core::Result<Arc<dyn DiagnosticsProvider>> {
        Ok(self.provider()?)
    }

    fn http_provider(&self) -> couchbase_client::core::Result<Arc<dyn HttpProvider>> {
        Ok(self.provider()?)
    }
}

pub struct MockProvider {
    recorder: Arc<Recorder>,
    error: Option<ErrorFn>,
}

impl MockProvider {
    fn respond(&self) -> couchbase_client::core::Result<ServiceResponse> {
        if let Some(error) = &self.error {
            return Err(error());
        }
        Ok(ServiceResponse {
            rows: vec![json!({"id": 1})],
            metadata: json!({"status": "success"}),
        })
    }
}

#[async_trait]
impl QueryProvider for MockProvider {
    async fn query(&self, request: QueryRequest) -> couchbase_client::core::Result<ServiceResponse> {
        self.recorder.query.lock().unwrap().push(request);
        self.respond()
    }
}

#[async_trait]
impl AnalyticsProvider for MockProvider {
    async fn analytics_query(
        &self,
        request: AnalyticsRequest,
    ) -> couchbase_client::core::Result<ServiceResponse> {
        self.recorder.analytics.lock().unwrap().push(request);
        self.respond()
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    async fn search_query(
        &self,
        request: SearchRequest,
    ) -> couchbase_client::core::Result<ServiceResponse> {
        self.recorder.search.lock().unwrap().push(request);
        self.respond()
    }
}

#[async_trait]
impl DiagnosticsProvider for MockProvider {
    async fn diagnostics(
        &self,
        request: DiagnosticsRequest,
    ) -> couchbase_client::core::Result<DiagnosticsReport> {
        if let Some(error) = &self.error {
            return Err(error());
        }
        Ok(DiagnosticsReport {
            id: request.report_id.unwrap_or_else(|| "generated".to_string()),
            config_rev: 42,
            endpoints: Vec::new(),
        })
    }
}

#[async_trait]
impl HttpProvider for MockProvider {
    async fn do_http_request(
        &self,
        request: HttpRequest,
    ) -> couchbase_client::core::Result<HttpResponse> {
        if let Some(error) = &self.error {
            return Err(error());
        }
        Ok(HttpResponse {
            endpoint: "localhost:8091".to_string(),
            status_code: 200,
            body: request.body,
        })
    }
}

/// Factory handing out scripted transports, keyed by bucket name.
///
/// The `None` key scripts the cluster-level connection made by
/// `Cluster::connect`.
#[derive(Default)]
pub struct MockFactory {
    scripts: Mutex<HashMap<Option<String>, TransportScript>>,
    created: Mutex<Vec<Arc<MockTransport>>>,
    pub recorder: Arc<Recorder>,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_cluster(&self, script: TransportScript) {
        self.scripts.lock().unwrap().insert(None, script);
    }

    pub fn script_bucket(&self, bucket: &str, script: TransportScript) {
        self.scripts
            .lock()
            .unwrap()
            .insert(Some(bucket.to_string()), script);
    }

    pub fn created(&self) -> Vec<Arc<MockTransport>> {
        self.created.lock().unwrap().clone()
    }

    pub fn created_for(&self, bucket: &str) -> Vec<Arc<MockTransport>> {
        self.created()
            .into_iter()
            .filter(|t| t.bucket.as_deref() == Some(bucket))
            .collect()
    }
}

impl TransportFactory for MockFactory {
    fn create(&self, config: &AgentConfig) -> Arc<dyn Transport> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&config.bucket_name)
            .cloned()
            .unwrap_or_default();
        let transport = Arc::new(MockTransport {
            bucket: config.bucket_name.clone(),
            script,
            recorder: Arc::clone(&self.recorder),
            connected: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
            selected_bucket: Mutex::new(None),
        });
        self.created.lock().unwrap().push(Arc::clone(&transport));
        transport
    }
}

pub fn default_options() -> ClusterOptions {
    ClusterOptions::builder()
        .credentials("Administrator", "password")
        .build()
        .expect("failed to build options")
}

pub fn base_agent_config() -> AgentConfig {
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

pub fn bucket_identity(bucket: &str) -> ConnectionIdentity {
    ConnectionIdentity::for_bucket(bucket, &ClusterOptions::default())
}
