use anyhow::{Context, Result};
use popdash::{
    chart::{Dashboard, PageSettings},
    config::DashboardConfig,
    fetch::{self, Source},
    process,
};
use reqwest::Client;
use std::{env, path::PathBuf};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,popdash=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config_path = env::args().nth(1).map(PathBuf::from);
    let cfg = DashboardConfig::load(config_path.as_deref())?;
    let condition = cfg.condition()?;
    let location = cfg.location()?;

    // ─── 3) fetch & parse the registry ───────────────────────────────
    let source = Source::parse(&cfg.source);
    info!(%source, "loading registry");
    let client = Client::new();
    let raw = fetch::load_text(&client, &source).await?;
    let parsed = process::parse_registry(&raw)?;
    info!(
        records = parsed.records.len(),
        dropped = parsed.dropped_rows,
        "registry ready"
    );

    // ─── 4) draw every chart ─────────────────────────────────────────
    let mut dashboard = Dashboard::new(parsed.records);
    dashboard.init(condition, location);

    // ─── 5) write outputs ────────────────────────────────────────────
    let page = dashboard.render_page(&PageSettings {
        title: cfg.title.clone(),
        echarts_url: cfg.echarts_url.clone(),
    })?;
    if let Some(parent) = cfg.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&cfg.output, page)
        .await
        .with_context(|| format!("writing {}", cfg.output.display()))?;
    info!(path = %cfg.output.display(), "dashboard written");

    if let Some(path) = &cfg.aggregates_json {
        let json = serde_json::to_string_pretty(&dashboard.aggregates())?;
        fs::write(path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "aggregates written");
    }

    info!("all done");
    Ok(())
}
