//! Experiment server process controller.
//!
//! Owns the child process handle and answers status queries by probing the
//! server's TCP port. Status is three-valued: the window between spawning
//! the child and the port accepting connections (or between a kill and the
//! port closing) reports [`ServerStatus::Pending`].

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::ServerError;

/// Point-in-time experiment server status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// Port is accepting connections.
    Running,
    /// No child and port closed.
    Stopped,
    /// A start or stop is in flight and has not settled yet.
    Pending,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerStatus::Running => write!(f, "running"),
            ServerStatus::Stopped => write!(f, "stopped"),
            ServerStatus::Pending => write!(f, "pending"),
        }
    }
}

/// Launch and polling configuration for [`ServerController`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Command line that starts the experiment server.
    pub command: String,
    /// Host the server listens on.
    pub host: String,
    /// Port the server listens on.
    pub port: u16,
    /// Interval between status probes while waiting.
    pub poll_interval: Duration,
    /// Upper bound on any status wait. Waits past this report
    /// [`ServerError::WaitTimeout`] instead of hanging.
    pub wait_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            command: "experiment-server".to_string(),
            host: "localhost".to_string(),
            port: 22362,
            poll_interval: Duration::from_secs(1),
            wait_timeout: Duration::from_secs(60),
        }
    }
}

/// Controls the local experiment server process.
pub struct ServerController {
    config: ControllerConfig,
    child: Option<Child>,
}

const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

impl ServerController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            child: None,
        }
    }

    /// Spawn the experiment server process. Does not wait for the port to
    /// open; callers that need readiness follow up with [`Self::wait_for`].
    pub async fn startup(&mut self) -> Result<(), ServerError> {
        if self.status().await == ServerStatus::Running {
            return Err(ServerError::AlreadyRunning);
        }
        let argv = shlex::split(&self.config.command)
            .filter(|argv| !argv.is_empty())
            .ok_or_else(|| ServerError::InvalidCommand(self.config.command.clone()))?;
        info!(command = %self.config.command, "starting experiment server");
        let child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        self.child = Some(child);
        Ok(())
    }

    /// Signal the experiment server to stop. Does not wait for the port to
    /// close; callers follow up with [`Self::wait_for`].
    pub async fn shutdown(&mut self) -> Result<(), ServerError> {
        let Some(mut child) = self.child.take() else {
            return Err(ServerError::NotRunning);
        };
        info!("stopping experiment server");
        child.kill().await?;
        let _ = child.wait().await;
        Ok(())
    }

    /// Stop (if running) and start the server again.
    pub async fn restart(&mut self) -> Result<(), ServerError> {
        match self.shutdown().await {
            Ok(()) | Err(ServerError::NotRunning) => {}
            Err(e) => return Err(e),
        }
        // Give the old process a chance to release the port.
        let _ = self.wait_for(ServerStatus::Stopped).await;
        self.startup().await
    }

    /// Probe the current status.
    pub async fn status(&mut self) -> ServerStatus {
        let port_open = self.probe_port().await;
        let child_alive = match self.child.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(Some(status)) => {
                    warn!(%status, "experiment server exited");
                    self.child = None;
                    false
                }
                Ok(None) => true,
                Err(e) => {
                    warn!(error = %e, "could not poll experiment server process");
                    true
                }
            },
            None => false,
        };
        match (port_open, child_alive) {
            (true, _) => ServerStatus::Running,
            (false, true) => ServerStatus::Pending,
            (false, false) => ServerStatus::Stopped,
        }
    }

    /// Poll until `target` is observed, bounded by the configured timeout.
    pub async fn wait_for(&mut self, target: ServerStatus) -> Result<(), ServerError> {
        let deadline = Instant::now() + self.config.wait_timeout;
        loop {
            let status = self.status().await;
            if status == target {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ServerError::WaitTimeout {
                    target,
                    timeout: self.config.wait_timeout,
                });
            }
            debug!(%status, %target, "waiting for experiment server");
            sleep(self.config.poll_interval).await;
        }
    }

    async fn probe_port(&self) -> bool {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        matches!(
            timeout(PROBE_TIMEOUT, TcpStream::connect(&addr)).await,
            Ok(Ok(_))
        )
    }

    #[cfg(test)]
    fn probe_addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }
}
