#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Provider name passed to `create_provider` ("hash" or "none").
    pub provider: String,
    /// Vector length for the hash provider (powers of two work best: 256, 512, 1024).
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hash".into(),
            dimension: 256,
        }
    }
}
