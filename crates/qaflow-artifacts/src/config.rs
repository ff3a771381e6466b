use std::path::PathBuf;

/// Recognized `artifact.*` configuration (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStoreConfig {
    pub root: PathBuf,
    pub retention_days: u32,
    pub max_file_bytes: u64,
}

impl Default for ArtifactStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".qaflow/artifacts"),
            retention_days: 30,
            max_file_bytes: 100 * 1024 * 1024,
        }
    }
}
