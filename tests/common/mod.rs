//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use ipcheck_gate::audit::{AuditRecord, AuditStore, MemoryAuditStore};
use ipcheck_gate::config::GateConfig;
use ipcheck_gate::reputation::IpApiClient;
use ipcheck_gate::{HttpServer, Shutdown};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET: &str = "s3cret";
pub const CONTENT_FILE: &str = "greeting.json";
pub const CONTENT_BODY: &str = r#"{"hello":"world"}"#;

/// A running gate bound to an ephemeral port.
pub struct TestGate {
    pub addr: SocketAddr,
    pub store: Arc<dyn AuditStore>,
    pub lookups: MockServer,
    shutdown: Shutdown,
    _content: TempDir,
}

impl TestGate {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stored records, newest first.
    pub async fn records(&self) -> Vec<AuditRecord> {
        let mut records = self.store.list().await.unwrap();
        ipcheck_gate::audit::sort_newest_first(&mut records);
        records
    }

    pub async fn lookup_count(&self) -> usize {
        self.lookups.received_requests().await.unwrap().len()
    }
}

impl Drop for TestGate {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn tokyo_payload() -> Value {
    json!({
        "status": "success",
        "country": "Japan",
        "regionName": "Tokyo",
        "city": "Chiyoda",
        "query": "127.0.0.1"
    })
}

/// Lookup service answering every `/json/{ip}` with the Tokyo payload.
pub async fn tokyo_lookups() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_payload()))
        .mount(&server)
        .await;
    server
}

/// Lookup service that always fails.
pub async fn failing_lookups() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/json/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    server
}

pub async fn start_gate(lookups: MockServer, configure: impl FnOnce(&mut GateConfig)) -> TestGate {
    start_gate_with_store(lookups, Arc::new(MemoryAuditStore::new()), configure).await
}

pub async fn start_gate_with_store(
    lookups: MockServer,
    store: Arc<dyn AuditStore>,
    configure: impl FnOnce(&mut GateConfig),
) -> TestGate {
    let content = tempfile::tempdir().unwrap();
    std::fs::write(content.path().join(CONTENT_FILE), CONTENT_BODY).unwrap();

    let mut config = GateConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.credential.value = SECRET.to_string();
    config.content.directory = content.path().to_string_lossy().into_owned();
    config.reputation.base_url = lookups.uri();
    config.reputation.timeout_ms = 1000;
    configure(&mut config);

    let reputation = Arc::new(IpApiClient::new(&config.reputation).unwrap());
    let server = HttpServer::new(config, store.clone(), reputation).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGate {
        addr,
        store,
        lookups,
        shutdown,
        _content: content,
    }
}

/// Client that neither follows redirects nor uses a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
