use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use url::Url;

use crate::types::quality::Quality;

pub const DEFAULT_ENDPOINT: &str = "wss://ws.growagardenpro.com";
pub const ENDPOINT_ENV: &str = "GARDEN_MONITOR_ENDPOINT";

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub endpoint: Url,
    /// Time between server-side restocks.
    pub refresh_interval: TimeDelta,
    pub reconnect_delay: Duration,
    pub tick_interval: Duration,
    pub alert_quality: Quality,
    pub qualities_path: PathBuf,
}

impl MonitorConfig {
    /// `endpoint` wins over `GARDEN_MONITOR_ENDPOINT`, which wins over the public server.
    pub fn new(
        endpoint: Option<String>,
        alert_quality: Quality,
        qualities_path: PathBuf,
    ) -> Result<Self> {
        let raw_endpoint = endpoint
            .or_else(|| env::var(ENDPOINT_ENV).ok())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            endpoint: parse_endpoint(&raw_endpoint)?,
            refresh_interval: refresh_interval(),
            reconnect_delay: Duration::from_secs(5),
            tick_interval: Duration::from_secs(1),
            alert_quality,
            qualities_path,
        })
    }
}

pub fn refresh_interval() -> TimeDelta {
    TimeDelta::minutes(5) + TimeDelta::seconds(3)
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid endpoint url {raw:?}"))?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => bail!("endpoint must use ws:// or wss://, got {other}://"),
    }
}
