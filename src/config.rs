//! Portal configuration: where data and uploads live.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Directory layout and output options for a [`Portal`](crate::Portal).
///
/// ```rust
/// use school_portal_store::PortalConfig;
///
/// let cfg = PortalConfig::new("/srv/school").pretty(false);
/// assert_eq!(cfg.data_dir(), std::path::Path::new("/srv/school/data"));
/// assert_eq!(cfg.upload_dir(), std::path::Path::new("/srv/school/uploads"));
/// ```
#[derive(Debug, Clone)]
pub struct PortalConfig {
    base_dir: PathBuf,
    data_dir: Option<PathBuf>,
    upload_dir: Option<PathBuf>,
    pretty: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl PortalConfig {
    /// Layout rooted at `base_dir`: `data/` and `uploads/` beneath it.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            data_dir: None,
            upload_dir: None,
            pretty: true,
        }
    }

    /// Read `PORTAL_BASE_DIR`, `PORTAL_DATA_DIR` and `PORTAL_UPLOAD_DIR`.
    /// Unset variables keep their defaults; empty ones are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Result<Option<PathBuf>> {
            match lookup(key) {
                None => Ok(None),
                Some(v) if v.trim().is_empty() => {
                    Err(Error::Config(format!("{key} is set but empty")))
                }
                Some(v) => Ok(Some(PathBuf::from(v))),
            }
        };
        let mut cfg = Self::new(get("PORTAL_BASE_DIR")?.unwrap_or_else(|| PathBuf::from(".")));
        cfg.data_dir = get("PORTAL_DATA_DIR")?;
        cfg.upload_dir = get("PORTAL_UPLOAD_DIR")?;
        Ok(cfg)
    }

    /// Override the data directory (default: `<base>/data`).
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Override the upload directory (default: `<base>/uploads`).
    pub fn with_upload_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.upload_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Pretty-print stored JSON (default: true).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Base directory; upload paths in records are relative to it.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("data"))
    }

    /// Resolved upload directory.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("uploads"))
    }

    /// Whether stored JSON is indented.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}
