//! File-backed domain store.
//!
//! The JSON file is the single source of truth. Writes go to a sibling temp
//! file that is renamed over the target, so readers never see a partial list.
//! Every write gets its own temp file; overlapping saves resolve last-rename-wins.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use tracing::info;

use crate::{config::Config, errors::Error, ports::DomainStore, Result};

#[derive(Clone, Debug)]
pub struct JsonFileDomainStore {
    path: PathBuf,
    seed: Option<PathBuf>,
}

impl JsonFileDomainStore {
    pub fn new(path: impl Into<PathBuf>, seed: Option<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.domain_list_path(), cfg.domain_list_seed_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file on first use: from the bundled seed when there is one, else empty.
    async fn ensure_initialized(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| Error::storage(&self.path, e))?
        {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::storage(parent, e))?;
        }

        let seeded = match &self.seed {
            Some(seed) => match tokio::fs::read_to_string(seed).await {
                Ok(contents) => Some(contents),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(Error::storage(seed, e)),
            },
            None => None,
        };

        match seeded {
            Some(contents) => {
                write_atomic(&self.path, &contents).await?;
                info!(path = %self.path.display(), "Copied default paywall domain list");
            }
            None => {
                write_atomic(&self.path, "[]\n").await?;
                info!(path = %self.path.display(), "Created empty paywall domain list");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DomainStore for JsonFileDomainStore {
    async fn list(&self) -> Result<Vec<String>> {
        self.ensure_initialized().await?;

        let txt = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::storage(&self.path, e))?;
        serde_json::from_str::<Vec<String>>(&txt)
            .map_err(|e| Error::storage(&self.path, format!("expected a JSON array of strings: {e}")))
    }

    async fn save(&self, mut domains: Vec<String>) -> Result<()> {
        domains.sort();
        domains.dedup();

        let mut txt = serde_json::to_string_pretty(&domains)?;
        txt.push('\n');
        write_atomic(&self.path, &txt).await
    }
}

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::storage(path, "path has no file name"))?;
    let tmp = path.with_file_name(format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| Error::storage(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(Error::storage(path, e));
    }
    Ok(())
}
