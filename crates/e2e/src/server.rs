//! Application under test - readiness probing and optional spawning

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to the application; owns the process only when we started it
pub struct ServerHandle {
    child: Option<Child>,
    pub base_url: String,
}

impl ServerHandle {
    /// Spawn the app if a command is configured, then wait until it answers
    pub async fn start(config: ServerConfig) -> E2eResult<Self> {
        let child = match &config.command {
            Some(command) => Some(spawn_command(command, &config)?),
            None => {
                info!("Using running application at {}", config.base_url);
                None
            }
        };

        let handle = ServerHandle {
            child,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        };

        handle
            .wait_for_healthy(&config.health_path, config.startup_timeout)
            .await?;

        info!("Application is healthy at {}", handle.base_url);
        Ok(handle)
    }

    /// Wait for the application to respond with a success status
    async fn wait_for_healthy(&self, health_path: &str, timeout_duration: Duration) -> E2eResult<()> {
        let health_url = format!("{}{}", self.base_url, health_path);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for application at {}...", health_url);
                    }
                    // Connection refused is expected while the dev server boots
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(250)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the application if we spawned it
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        info!("Stopping application (pid: {})", child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        let _ = child.kill();
        let _ = child.wait();

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn spawn_command(command: &[String], config: &ServerConfig) -> E2eResult<Child> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| E2eError::InvalidConfig("empty server command".to_string()))?;

    info!("Spawning application: {}", command.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args).stdout(Stdio::null()).stderr(Stdio::null());
    if let Some(dir) = &config.working_dir {
        cmd.current_dir(dir);
    }

    cmd.spawn()
        .map_err(|e| E2eError::ServerStartup(format!("Failed to spawn {}: {}", program, e)))
}

/// One-shot probe: does anything answer at `url`?
pub async fn is_reachable(url: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    client.get(url).send().await.is_ok()
}

/// Configuration for reaching the application
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root URL of the frontend
    pub base_url: String,

    /// Program and arguments that start the app (None = already running)
    pub command: Option<Vec<String>>,

    pub working_dir: Option<PathBuf>,

    /// Path polled until it returns a success status
    pub health_path: String,

    pub startup_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            command: None,
            working_dir: None,
            health_path: "/".to_string(),
            startup_timeout: Duration::from_secs(30),
        }
    }
}
