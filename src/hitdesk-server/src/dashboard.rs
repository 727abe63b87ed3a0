//! Auxiliary HTTP dashboard.
//!
//! A minimal status page an operator can open in a browser while the shell
//! runs. Served in a background task; the shell keeps going regardless of
//! whether anyone ever connects.

use axum::Json;
use axum::Router;
use axum::routing::get;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::ServerError;

#[derive(Debug, Clone, Serialize)]
struct DashboardInfo {
    tool: &'static str,
    version: &'static str,
}

async fn index() -> &'static str {
    concat!(
        "hitdesk dashboard\n",
        "  GET /api/info - tool info\n",
        "  GET /healthz  - liveness\n",
    )
}

async fn info_handler() -> Json<DashboardInfo> {
    Json(DashboardInfo {
        tool: "hitdesk",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn healthz() -> &'static str {
    "ok"
}

fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/info", get(info_handler))
        .route("/healthz", get(healthz))
}

/// Bind `ip:port` and serve the dashboard in a background task.
///
/// Returns the bound address and the task handle once the listener is up,
/// so bind errors (port in use, bad address) surface to the caller instead
/// of dying silently in the task.
pub async fn serve(
    ip: &str,
    port: u16,
) -> Result<(std::net::SocketAddr, JoinHandle<()>), ServerError> {
    let listener = TcpListener::bind((ip, port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "dashboard listening");
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            tracing::error!(error = %e, "dashboard server stopped");
        }
    });
    Ok((addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_info_and_health() {
        let (addr, handle) = serve("127.0.0.1", 0).await.unwrap();
        let body = reqwest::get(format!("http://{addr}/healthz"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");

        let info: serde_json::Value = reqwest::get(format!("http://{addr}/api/info"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(info["tool"], "hitdesk");
        handle.abort();
    }

    #[tokio::test]
    async fn bind_error_surfaces() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let err = serve("127.0.0.1", addr.port()).await;
        assert!(err.is_err());
    }
}
