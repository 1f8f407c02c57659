use axum::{Json, Router, extract::State, routing::get};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Deno Deploy 等でスリープさせないための自己 ping 間隔
pub const SELF_PING_INTERVAL: Duration = Duration::from_secs(4 * 60);

#[derive(Clone)]
pub struct HealthState {
    started_at: Instant,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: String,
    pub uptime: f64, // 秒
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
}

async fn root() -> &'static str {
    "Bot is running!"
}

async fn health(State(state): State<HealthState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

pub async fn serve(port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("HTTP サーバーをポート {} で起動しました", port);
    axum::serve(listener, router(HealthState::new())).await
}

/// DEPLOY_URL/health を定期的に叩く
pub fn spawn_self_ping(deploy_url: String) {
    log::info!("自己 ping を開始します: {}", deploy_url);
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let url = format!("{}/health", deploy_url);
        let mut ticker = tokio::time::interval(SELF_PING_INTERVAL);
        // 最初の tick は即時なので飛ばす
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match ping(&client, &url).await {
                Ok(report) => log::info!("自己 ping 成功: {}", report.timestamp),
                Err(e) => log::error!("自己 ping 失敗: {}", e),
            }
        }
    });
}

async fn ping(client: &reqwest::Client, url: &str) -> Result<HealthReport, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<HealthReport>()
        .await
}
