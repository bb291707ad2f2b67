// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::{fmt, path::PathBuf};
use tokio::fs;
use tracing::info;
use url::Url;

/// Where the registry export lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl Source {
    /// `http(s)://…` is remote; anything else is a filesystem path.
    pub fn parse(s: &str) -> Self {
        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Remote(url),
            _ => Source::Local(PathBuf::from(s)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => write!(f, "{}", url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the whole export as text: a single GET, or a single file read.
#[tracing::instrument(level = "info", skip(client), fields(source = %source))]
pub async fn load_text(client: &Client, source: &Source) -> Result<String> {
    let text = match source {
        Source::Remote(url) => client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("GET {}", url))?
            .text()
            .await
            .with_context(|| format!("reading body from {}", url))?,
        Source::Local(path) => fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
    };
    info!(bytes = text.len(), "source loaded");
    Ok(text)
}
