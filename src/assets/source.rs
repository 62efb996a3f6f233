use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::{Result, ViewerError};

/// Where an asset's bytes come from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// Local file
    Path(PathBuf),
    /// Remote resource, fetched by the loader
    Url(String),
    /// In-memory object URL (user upload); gone after reload
    Blob { url: String, bytes: Arc<[u8]> },
    /// Bytes restored from the persistence store
    Stored(Arc<[u8]>),
}

impl AssetSource {
    /// Blob sources are the only ones that need persisting.
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Blob { .. })
    }

    /// Human-readable locator for logs and errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Url(url) | Self::Blob { url, .. } => url.clone(),
            Self::Stored(bytes) => format!("<stored {} bytes>", bytes.len()),
        }
    }

    /// Bytes already held in memory, if any.
    #[must_use]
    pub fn bytes(&self) -> Option<&Arc<[u8]>> {
        match self {
            Self::Blob { bytes, .. } | Self::Stored(bytes) => Some(bytes),
            Self::Path(_) | Self::Url(_) => None,
        }
    }

    /// Reads local or in-memory bytes. Remote URLs need a fetching loader.
    ///
    /// File reads go through `tokio::fs` and must be polled inside a tokio runtime.
    pub async fn read_bytes(&self) -> Result<Arc<[u8]>> {
        match self {
            Self::Path(path) => {
                let data = tokio::fs::read(path).await.map_err(|err| ViewerError::AssetLoad {
                    name: path.display().to_string(),
                    reason: err.to_string(),
                })?;
                Ok(Arc::from(data))
            }
            Self::Blob { bytes, .. } | Self::Stored(bytes) => Ok(Arc::clone(bytes)),
            Self::Url(url) => Err(ViewerError::AssetLoad {
                name: url.clone(),
                reason: "remote sources require a fetching loader".into(),
            }),
        }
    }
}
