#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const TEST_PASSWORD: &str = "pw123456";

/// A server process with its own in-memory database; killed on drop
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_student-api"));
        cmd.env("APP_ENV", "development")
            .env("SERVER_ADDRESS", format!("127.0.0.1:{}", port))
            .env("DATABASE_URL", "sqlite::memory:")
            .env("JWT_SECRET", "integration-test-secret-with-enough-bytes")
            .env("SECURITY_BCRYPT_COST", "4")
            .env("RUST_LOG", "student_api=warn")
            .env_remove("CONFIG_PATH")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str) -> Result<reqwest::Response> {
        let body = json!({ "name": "Ada", "email": email, "password": TEST_PASSWORD, "age": 20 });
        Ok(self.client.post(self.url("/api/registration")).json(&body).send().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        let body = json!({ "email": email, "password": password });
        Ok(self.client.post(self.url("/api/login")).json(&body).send().await?)
    }

    /// Register `email` and return a bearer token for it
    pub async fn token_for(&self, email: &str) -> Result<String> {
        self.register(email).await?;
        let res = self.login(email, TEST_PASSWORD).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
