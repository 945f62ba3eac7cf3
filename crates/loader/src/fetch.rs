//! Byte acquisition with a size cap.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use config::LoaderConfig;
use log::warn;

/// Reads at most `max + 1` bytes so an oversized input is detected without
/// being buffered in full.
fn read_capped<R: Read>(reader: R, max: u64, what: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take(max.saturating_add(1))
        .read_to_end(&mut buf)
        .with_context(|| format!("failed to read {what}"))?;
    if buf.len() as u64 > max {
        warn!("rejecting {what}: larger than {max} bytes");
        bail!("{what} exceeds the maximum size of {max} bytes");
    }
    Ok(buf)
}

pub(crate) fn read_file(path: &Path, cfg: &LoaderConfig) -> Result<Vec<u8>> {
    let what = path.display().to_string();
    let file = File::open(path).with_context(|| format!("failed to open {what}"))?;
    let len = file
        .metadata()
        .with_context(|| format!("failed to stat {what}"))?
        .len();
    if len > cfg.max_file_size {
        warn!("rejecting {what}: {len} bytes, limit {}", cfg.max_file_size);
        bail!(
            "{what} is {len} bytes, which exceeds the maximum size of {} bytes",
            cfg.max_file_size
        );
    }
    read_capped(file, cfg.max_file_size, &what)
}

#[cfg(feature = "http")]
pub(crate) fn fetch_url(url: &str, cfg: &LoaderConfig) -> Result<Vec<u8>> {
    use std::time::Duration;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()
        .context("failed to create HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error status"))?;
    if let Some(len) = response.content_length() {
        if len > cfg.max_file_size {
            warn!("rejecting {url}: {len} bytes, limit {}", cfg.max_file_size);
            bail!(
                "{url} is {len} bytes, which exceeds the maximum size of {} bytes",
                cfg.max_file_size
            );
        }
    }
    read_capped(response, cfg.max_file_size, url)
}

#[cfg(not(feature = "http"))]
pub(crate) fn fetch_url(url: &str, _cfg: &LoaderConfig) -> Result<Vec<u8>> {
    bail!("cannot load {url}: this build does not include the `http` feature")
}
