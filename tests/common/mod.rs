#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

pub const SESSION_KEY: &str = "integration-test-session-key";

pub struct TestServer {
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(session_key: &str) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = server_command(session_key)
            .env("CVEDB_WEB_PORT", port.to_string())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Command for the compiled server binary with a controlled environment.
pub fn server_command(session_key: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cvedb-web"));
    cmd.env("CVEDB_SESSION_KEY", session_key)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::null());
    cmd
}

pub async fn start_server() -> Result<TestServer> {
    start_server_with_key(SESSION_KEY).await
}

pub async fn start_server_with_key(session_key: &str) -> Result<TestServer> {
    let server = TestServer::spawn(session_key)?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// `name=value` part of the response's `Set-Cookie` header, if any.
pub fn session_cookie(res: &reqwest::Response) -> Option<String> {
    let header = res.headers().get(reqwest::header::SET_COOKIE)?;
    let header = header.to_str().ok()?;
    header.split(';').next().map(|s| s.trim().to_string())
}
