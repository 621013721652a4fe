use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Persisted viewer state: the last opened resource and the renderer kind it
/// was displayed with. Consumed as startup input, a missing file is a clean
/// default rather than an error.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct SessionState {
    pub last_source: Option<PathBuf>,
    pub renderer_kind: Option<String>,
}

impl SessionState {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(SessionState::default());
        }

        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|err| Error::Parse(format!("Invalid session state: {}", err)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|err| Error::Runtime(format!("Session state serialization: {}", err)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn remember<P: Into<PathBuf>, S: Into<String>>(&mut self, source: P, renderer_kind: S) {
        self.last_source = Some(source.into());
        self.renderer_kind = Some(renderer_kind.into());
    }
}
