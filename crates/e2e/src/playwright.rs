//! Playwright browser automation
//!
//! The browser lives in a Node process running `js/bridge.js`. Rust sends one
//! JSON request per line on the bridge's stdin and reads one reply per line
//! from its stdout, so a single page stays open for a whole scenario.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::locator::{Locator, LocatorPart, NamePattern};

const BRIDGE_SCRIPT: &str = include_str!("../js/bridge.js");

/// Environment variable carrying the JSON launch options to the bridge
pub const BRIDGE_CONFIG_ENV: &str = "ATS_E2E_BRIDGE_CONFIG";

type BridgeReader = Box<dyn AsyncRead + Send + Unpin>;
type BridgeWriter = Box<dyn AsyncWrite + Send + Unpin>;

struct BridgeIo {
    writer: BridgeWriter,
    lines: Lines<BufReader<BridgeReader>>,
}

/// Live browser page behind the bridge
pub struct PlaywrightHandle {
    io: Mutex<BridgeIo>,

    /// Request ids; 0 is reserved for the readiness reply
    next_id: AtomicU64,

    /// Upper bound for a single request/reply exchange
    call_timeout: Duration,

    /// Bridge process, when we spawned one
    child: std::sync::Mutex<Option<Child>>,

    /// Keeps the written bridge script alive while node runs it
    _script_dir: Option<tempfile::TempDir>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::InvalidConfig(format!("unknown browser: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

/// A reply line from the bridge
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub id: u64,
    pub ok: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl Response {
    fn into_result(self) -> E2eResult<Value> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(E2eError::Playwright(
                self.error.unwrap_or_else(|| "unknown bridge error".to_string()),
            ))
        }
    }
}

/// Launch options forwarded to the bridge
#[derive(Debug, Serialize)]
struct BridgeConfig {
    browser: Browser,
    headless: bool,
    slow_mo: u64,
    viewport: Viewport,
    timeout: u64,
}

#[derive(Debug, Serialize)]
struct Viewport {
    width: u32,
    height: u32,
}

impl From<&PlaywrightConfig> for BridgeConfig {
    fn from(config: &PlaywrightConfig) -> Self {
        Self {
            browser: config.browser,
            headless: config.headless,
            slow_mo: config.slow_mo_ms,
            viewport: Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
            },
            timeout: config.default_timeout_ms,
        }
    }
}

impl PlaywrightHandle {
    /// Start node with the bridge script and wait for the browser to be ready
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        let bridge_config = serde_json::to_string(&BridgeConfig::from(config))?;
        let node_path = absolute(&config.node_modules)?;

        debug!("Launching Playwright bridge: {}", script_path.display());

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .env(BRIDGE_CONFIG_ENV, bridge_config)
            .env("NODE_PATH", node_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("Failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        let mut handle = Self::with_transport(stdout, stdin, config.call_timeout);
        handle.child = std::sync::Mutex::new(Some(child));
        handle._script_dir = Some(script_dir);

        handle.wait_ready(config.launch_timeout).await?;
        info!(
            "{} ready ({}x{}, headless: {})",
            config.browser.as_str(),
            config.viewport_width,
            config.viewport_height,
            config.headless
        );
        Ok(handle)
    }

    /// Build a handle over an arbitrary bridge transport.
    ///
    /// `reader` yields the bridge's replies and `writer` accepts requests.
    /// No readiness handshake is performed.
    pub fn with_transport<R, W>(reader: R, writer: W, call_timeout: Duration) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let reader: BridgeReader = Box::new(reader);
        Self {
            io: Mutex::new(BridgeIo {
                writer: Box::new(writer),
                lines: BufReader::new(reader).lines(),
            }),
            next_id: AtomicU64::new(1),
            call_timeout,
            child: std::sync::Mutex::new(None),
            _script_dir: None,
        }
    }

    /// Check if Playwright is installed
    pub fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    async fn wait_ready(&self, launch_timeout: Duration) -> E2eResult<()> {
        let mut io = self.io.lock().await;
        let response = tokio::time::timeout(launch_timeout, read_response(&mut io.lines))
            .await
            .map_err(|_| E2eError::Timeout("browser launch".to_string()))??;

        if response.id != 0 {
            return Err(E2eError::Protocol(format!(
                "expected readiness reply, got id {}",
                response.id
            )));
        }
        response.into_result().map(|_| ())
    }

    /// Send one request and wait for its reply
    pub(crate) async fn call(&self, method: &str, params: Value) -> E2eResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let line = serde_json::to_string(&Request { id, method, params })?;

        let mut io = self.io.lock().await;
        debug!(id, method, "bridge call");

        let response = tokio::time::timeout(self.call_timeout, exchange(&mut io, id, &line))
            .await
            .map_err(|_| E2eError::Timeout(format!("bridge call '{}'", method)))??;

        response.into_result()
    }

    pub fn locator(&self, selector: &str) -> Locator<'_> {
        Locator::new(
            self,
            LocatorPart::Css {
                selector: selector.to_string(),
            },
        )
    }

    pub fn get_by_role(&self, role: &str, name: Option<NamePattern>) -> Locator<'_> {
        Locator::new(
            self,
            LocatorPart::Role {
                role: role.to_string(),
                name,
            },
        )
    }

    pub fn get_by_label(&self, text: &str) -> Locator<'_> {
        Locator::new(
            self,
            LocatorPart::Label {
                text: text.to_string(),
            },
        )
    }

    pub async fn goto(&self, url: &str) -> E2eResult<()> {
        self.call("goto", json!({ "url": url })).await?;
        Ok(())
    }

    /// `load`, `domcontentloaded` or `networkidle`
    pub async fn wait_for_load_state(&self, state: &str) -> E2eResult<()> {
        self.call("wait_for_load_state", json!({ "state": state })).await?;
        Ok(())
    }

    pub async fn set_viewport_size(&self, width: u32, height: u32) -> E2eResult<()> {
        self.call("set_viewport_size", json!({ "width": width, "height": height }))
            .await?;
        Ok(())
    }

    /// Wait for `selector` to reach `state`; `None` uses the page default timeout
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        state: WaitState,
        timeout_ms: Option<u64>,
    ) -> E2eResult<()> {
        self.call(
            "wait_for_selector",
            json!({ "selector": selector, "state": state.as_str(), "timeout": timeout_ms }),
        )
        .await?;
        Ok(())
    }

    pub async fn go_back(&self) -> E2eResult<()> {
        self.call("go_back", json!({})).await?;
        Ok(())
    }

    pub async fn title(&self) -> E2eResult<String> {
        let value = self.call("title", json!({})).await?;
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| E2eError::Protocol(format!("title returned {}", value)))
    }

    pub async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()> {
        let path = absolute(path)?;
        self.call(
            "screenshot",
            json!({ "path": path.to_string_lossy(), "full_page": full_page }),
        )
        .await?;
        Ok(())
    }

    pub async fn mouse_down(&self) -> E2eResult<()> {
        self.call("mouse_down", json!({})).await?;
        Ok(())
    }

    pub async fn mouse_up(&self) -> E2eResult<()> {
        self.call("mouse_up", json!({})).await?;
        Ok(())
    }

    pub async fn mouse_move(&self, x: f64, y: f64, steps: u32) -> E2eResult<()> {
        self.call("mouse_move", json!({ "x": x, "y": y, "steps": steps }))
            .await?;
        Ok(())
    }

    /// Fixed pause, for animations the page gives no signal for
    pub async fn wait_for_timeout(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Close the browser and reap the bridge process
    pub async fn close(mut self) -> E2eResult<()> {
        if let Err(e) = self.call("close", json!({})).await {
            warn!("Bridge close failed: {}", e);
        }

        let child = self.child.get_mut().map(Option::take).unwrap_or(None);
        if let Some(mut child) = child {
            match tokio::time::timeout(Duration::from_secs(5), child.wait()).await {
                Ok(Ok(status)) => debug!("Bridge exited with {}", status),
                Ok(Err(e)) => warn!("Failed to wait for bridge: {}", e),
                Err(_) => {
                    warn!("Bridge did not exit, killing it");
                    child.kill().await?;
                }
            }
        }
        Ok(())
    }
}

async fn exchange(io: &mut BridgeIo, id: u64, line: &str) -> E2eResult<Response> {
    io.writer.write_all(line.as_bytes()).await?;
    io.writer.write_all(b"\n").await?;
    io.writer.flush().await?;

    loop {
        let response = read_response(&mut io.lines).await?;
        if response.id == id {
            return Ok(response);
        }
        warn!(expected = id, got = response.id, "Discarding stale bridge reply");
    }
}

/// Next reply line; anything that is not a reply (stray console output) is skipped
async fn read_response(lines: &mut Lines<BufReader<BridgeReader>>) -> E2eResult<Response> {
    loop {
        let line = lines.next_line().await?.ok_or(E2eError::BridgeClosed)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Response>(trimmed) {
            Ok(response) => return Ok(response),
            Err(_) => debug!("bridge output: {}", trimmed),
        }
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!(target: "playwright", "{}", line);
    }
}

fn absolute(path: &Path) -> E2eResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,

    /// Delay Playwright inserts before every action
    pub slow_mo_ms: u64,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Default timeout for Playwright actions and waits
    pub default_timeout_ms: u64,

    /// Guard around one bridge exchange; must exceed `default_timeout_ms`
    pub call_timeout: Duration,

    pub launch_timeout: Duration,

    /// Where `require('playwright')` is resolved from
    pub node_modules: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            slow_mo_ms: 0,
            viewport_width: 1920,
            viewport_height: 1080,
            default_timeout_ms: 30_000,
            call_timeout: Duration::from_secs(45),
            launch_timeout: Duration::from_secs(30),
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_from_str() {
        assert_eq!("firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("webkit".parse::<Browser>().unwrap(), Browser::Webkit);
        assert!("netscape".parse::<Browser>().is_err());
    }

    #[test]
    fn test_bridge_config_serialization() {
        let config = PlaywrightConfig {
            headless: false,
            slow_mo_ms: 500,
            ..Default::default()
        };
        let value = serde_json::to_value(BridgeConfig::from(&config)).unwrap();
        assert_eq!(
            value,
            json!({
                "browser": "chromium",
                "headless": false,
                "slow_mo": 500,
                "viewport": { "width": 1920, "height": 1080 },
                "timeout": 30000
            })
        );
    }

    #[test]
    fn test_error_reply_becomes_playwright_error() {
        let response: Response =
            serde_json::from_str(r#"{"id":3,"ok":false,"error":"Timeout 10000ms exceeded"}"#).unwrap();
        match response.into_result() {
            Err(E2eError::Playwright(msg)) => assert!(msg.contains("Timeout")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_reply_without_result_is_null() {
        let response: Response = serde_json::from_str(r#"{"id":1,"ok":true}"#).unwrap();
        assert_eq!(response.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn test_bridge_script_handles_every_rust_method() {
        for method in [
            "goto",
            "wait_for_load_state",
            "set_viewport_size",
            "wait_for_selector",
            "go_back",
            "title",
            "screenshot",
            "mouse_down",
            "mouse_up",
            "mouse_move",
            "click",
            "fill",
            "hover",
            "text_content",
            "is_visible",
            "count",
            "bounding_box",
            "close",
        ] {
            assert!(
                BRIDGE_SCRIPT.contains(method),
                "bridge script does not handle '{}'",
                method
            );
        }
    }
}
