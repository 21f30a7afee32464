mod commands;
mod fixture;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::FixedOffset;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use alloffers_client::{ApiClient, Session};
use alloffers_ui::dom::{LoggedDom, MemoryDom};
use alloffers_ui::prefs::FileStore;
use alloffers_ui::{Locale, Page, PageConfig, Timings};

use crate::commands::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alloffers_page=debug,alloffers_ui=debug,alloffers_client=debug".into()),
        )
        .init();

    // Config
    let base_url = std::env::var("ALLOFFERS_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".into());
    let cookies = std::env::var("ALLOFFERS_COOKIES").unwrap_or_default();
    let path = std::env::var("ALLOFFERS_PAGE_PATH").unwrap_or_else(|_| "/".into());
    let locale: Locale = match std::env::var("ALLOFFERS_LOCALE") {
        Ok(raw) => raw.parse()?,
        Err(_) => Locale::default(),
    };
    let state_path: PathBuf = std::env::var("ALLOFFERS_STATE_PATH")
        .unwrap_or_else(|_| "alloffers-state.json".into())
        .into();
    let fixture_path: Option<PathBuf> = std::env::var("ALLOFFERS_FIXTURE").ok().map(PathBuf::from);
    let poll_secs: u64 = std::env::var("ALLOFFERS_POLL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);

    let session = if cookies.trim().is_empty() {
        Session::anonymous()
    } else {
        Session::from_cookie_header(&cookies)
    };
    let client = Arc::new(ApiClient::new(&base_url, session).context("invalid ALLOFFERS_BASE_URL")?);
    let store = Arc::new(
        FileStore::open(&state_path)
            .with_context(|| format!("failed to open preferences at {}", state_path.display()))?,
    );

    let mut config = PageConfig {
        path,
        locale,
        timings: Timings {
            poll_interval: Duration::from_secs(poll_secs),
            ..Timings::default()
        },
        ..PageConfig::default()
    };
    if let Ok(raw) = std::env::var("ALLOFFERS_SERVER_OFFSET") {
        config.server_offset = raw
            .parse::<FixedOffset>()
            .with_context(|| format!("invalid ALLOFFERS_SERVER_OFFSET '{}'", raw))?;
    }

    info!("AllOffers page runtime against {}", base_url);
    info!(
        "Page {} ({:?}), poll every {}s, server time {}",
        config.path, config.locale, poll_secs, config.server_offset
    );

    let skeleton = MemoryDom::dashboard();
    match &fixture_path {
        Some(path) => {
            let inserted = fixture::mount(&skeleton, &fixture::load(path)?);
            info!("Loaded {} elements from {}", inserted, path.display());
        }
        None => info!("No ALLOFFERS_FIXTURE set, page has only the dashboard skeleton"),
    }
    let dom = Arc::new(LoggedDom::new(skeleton));
    let mut page = Page::load(dom.clone(), client, store, config);

    println!("{}", commands::USAGE);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed, shutting down...");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => {
                        if let Err(e) = commands::execute(cmd, &mut page, &dom) {
                            warn!("{:#}", e);
                        }
                    }
                    Err(e) => warn!("{:#}", e),
                }
            }
        }
    }

    page.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
