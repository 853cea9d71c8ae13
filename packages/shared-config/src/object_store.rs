//! Object store binding configuration

use std::path::PathBuf;

use crate::get_optional_env;

/// Object store binding
///
/// The binding is optional at startup. Requests that need it fail with a
/// server error while it is missing, the same way an unbound bucket would.
#[derive(Debug, Clone, Default)]
pub struct ObjectStoreConfig {
    /// Root directory of the filesystem-backed store
    pub path: Option<PathBuf>,
}

impl ObjectStoreConfig {
    /// Load from `OBJECT_STORE_PATH`
    pub fn from_env() -> Self {
        Self {
            path: get_optional_env("OBJECT_STORE_PATH").map(PathBuf::from),
        }
    }

    /// Bind to a directory
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.path.is_some()
    }
}
