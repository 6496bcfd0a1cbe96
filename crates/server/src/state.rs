use courserec_common::{AppConfig, Result};
use courserec_vector::SimilarityEngine;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Similarity engine over the loaded corpus
    pub engine: Arc<SimilarityEngine>,
}

impl AppState {
    /// Load the configured corpus and build the similarity matrix
    pub fn new(config: AppConfig) -> Result<Self> {
        let engine = SimilarityEngine::load(&config.data_path, &config.embeddings_column)?;
        Ok(Self::with_engine(config, Arc::new(engine)))
    }

    /// State around an existing engine
    pub fn with_engine(config: AppConfig, engine: Arc<SimilarityEngine>) -> Self {
        Self { config, engine }
    }
}
