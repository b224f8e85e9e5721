#![allow(dead_code)] // each integration test binary uses a subset of these helpers

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<Option<TestServer>> = OnceLock::new();
static COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_larder-api"));
        cmd.env("LARDER_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL and JWT_SECRET
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
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
}

/// Shared server for DB-backed tests. Returns None (test skips) when no
/// DATABASE_URL is configured in the environment.
pub async fn server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().ok());
    match server {
        Some(server) => {
            server.wait_ready(Duration::from_secs(15)).await?;
            Ok(Some(server))
        }
        None => anyhow::bail!("failed to spawn server binary"),
    }
}

/// Unique-enough email local part for test account isolation
pub fn unique_email(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}@example.com", prefix, std::process::id(), n)
}

/// Register a fresh account and return (email, bearer token)
pub async fn register_and_login(server: &TestServer, prefix: &str) -> Result<(String, String)> {
    let client = reqwest::Client::new();
    let email = unique_email(prefix);
    let password = "testpass123";

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&serde_json::json!({ "email": email, "password": password, "name": prefix }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let payload = res.json::<serde_json::Value>().await?;
    let token = payload["data"]["token"]
        .as_str()
        .context("login response missing token")?
        .to_string();

    Ok((email, token))
}

/// Client that sends the bearer token on every request
pub fn auth_client(token: &str) -> Result<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::AUTHORIZATION,
        format!("Bearer {}", token).parse().context("invalid token header")?,
    );
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

/// Tiny but fully decodable PNG payload
pub fn png_bytes() -> Vec<u8> {
    use image::{DynamicImage, ImageOutputFormat};
    use std::io::Cursor;

    let img = DynamicImage::new_rgb8(10, 10);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png).expect("encode png");
    buf.into_inner()
}
