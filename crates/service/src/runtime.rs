//! Runtime environment helpers
//!
//! Sanity checks run once at startup before stores are opened.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the directory holding the issue data file exists.
pub async fn ensure_data_dir(data_file: &str) -> anyhow::Result<()> {
    let parent = match Path::new(data_file).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => {
            debug!(%data_file, "data file has no parent directory; using cwd");
            return Ok(());
        }
    };
    if tokio::fs::metadata(parent).await.is_err() {
        warn!(dir = %parent.display(), "data directory missing; creating it");
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    Ok(())
}
