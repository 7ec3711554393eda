use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::TcResult;
use crate::session::SessionConfig;

pub trait ConfigStore {
    /// Read the stored configuration; `Ok(None)` when nothing is stored
    fn try_load(&self) -> TcResult<Option<SessionConfig>>;

    /// Like `try_load`, but any problem degrades to defaults
    fn load(&self) -> SessionConfig {
        match self.try_load() {
            Ok(Some(cfg)) => cfg,
            Ok(None) => SessionConfig::default(),
            Err(e) => {
                warn!("ignoring unreadable config: {e}");
                SessionConfig::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn try_load(&self) -> TcResult<Option<SessionConfig>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let cfg = serde_json::from_slice::<SessionConfig>(&bytes)?;
        Ok(Some(cfg))
    }
}
