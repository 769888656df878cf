//! Shared fixtures for integration tests
#![allow(dead_code)]

use fabao::api::ApiClient;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Mock backend mounted under `/api`, like the real service
pub struct MockApi {
    pub server: MockServer,
}

impl MockApi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}/api", self.server.uri())
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url())
    }

    /// Client with a short default timeout for delay tests
    pub fn impatient_client(&self) -> ApiClient {
        self.client().with_default_timeout(Duration::from_millis(200))
    }

    /// Number of requests the server saw at `path`
    pub async fn hits(&self, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }
}

/// Single keyword group as the backend sends it
pub fn one_group_payload() -> Value {
    json!({
        "status": 200,
        "data": [
            { "id": 1, "keyword1": "a", "keyword2": "b", "relation": "AND" }
        ]
    })
}

/// Temporary directory for config files
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).expect("Failed to read test file")
    }
}
