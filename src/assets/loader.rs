use std::future::Future;

use crate::assets::source::AssetSource;
use crate::assets::template::ModelTemplate;
use crate::errors::{Result, ViewerError};

/// Asynchronously decodes an asset into a model tree.
///
/// A failed load must not leave anything behind; the viewer registers
/// nothing until the future resolves successfully.
pub trait AssetLoader: Send + Sync {
    fn load(&self, source: &AssetSource) -> impl Future<Output = Result<ModelTemplate>> + Send;
}

/// Reads [`ModelTemplate`]s serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelLoader;

impl AssetLoader for JsonModelLoader {
    async fn load(&self, source: &AssetSource) -> Result<ModelTemplate> {
        let bytes = source.read_bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ViewerError::AssetLoad {
            name: source.describe(),
            reason: err.to_string(),
        })
    }
}
