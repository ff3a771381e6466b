use std::collections::HashMap;
use std::path::{Path, PathBuf};

use qaflow_core::{current_unix_timestamp_ms, write_bytes_atomic, QaError};

use crate::config::ArtifactStoreConfig;
use crate::kind::ArtifactKind;

/// One catalog row returned by `list` (§4.A).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub key: String,
    pub kind: ArtifactKind,
    pub size_bytes: u64,
    pub created_at_unix_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactKindStats {
    pub count: u64,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactStoreStats {
    pub total: u64,
    pub total_size_bytes: u64,
    pub by_kind: HashMap<&'static str, ArtifactKindStats>,
    pub oldest_unix_ms: Option<u64>,
    pub newest_unix_ms: Option<u64>,
}

/// Content-addressed, run-namespaced artifact store (§4.A).
///
/// Keys are stable, opaque relative paths of the form
/// `{kind_dir}/{run_id}/{timestamp}_{sanitized_name}` so `delete(run_id)`
/// is a directory-scope operation per kind, not a catalog scan.
pub struct ArtifactStore {
    config: ArtifactStoreConfig,
}

impl ArtifactStore {
    pub fn new(config: ArtifactStoreConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Writes one artifact, returning its opaque key.
    pub fn put(
        &self,
        run_id: &str,
        kind: ArtifactKind,
        bytes: &[u8],
        logical_name: &str,
    ) -> Result<String, QaError> {
        validate_run_id(run_id)?;
        let sanitized = sanitize_logical_name(logical_name)?;
        validate_extension(kind, &sanitized)?;
        if bytes.len() as u64 > self.config.max_file_bytes {
            return Err(QaError::validation(format!(
                "artifact '{}' is {} bytes, exceeds cap of {} bytes",
                logical_name,
                bytes.len(),
                self.config.max_file_bytes
            )));
        }

        let now_ms = current_unix_timestamp_ms();
        let filename = format!("{}_{}", iso8601_compact(now_ms), sanitized);
        let key = format!("{}/{}/{}", kind.dir_name(), run_id, filename);
        let absolute_path = self.config.root.join(&key);
        write_bytes_atomic(&absolute_path, bytes)
            .map_err(|error| QaError::transient_infra(format!("failed to write artifact: {error}")))?;
        tracing::info!(run_id, key = %key, bytes = bytes.len(), "artifact stored");
        Ok(key)
    }

    /// Convenience wrapper for log text, always written as `ArtifactKind::Log`.
    pub fn put_log(&self, run_id: &str, name: &str, text: &str) -> Result<String, QaError> {
        let name_with_extension = if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{name}.log")
        };
        self.put(run_id, ArtifactKind::Log, text.as_bytes(), &name_with_extension)
    }

    pub fn get(&self, key: &str) -> Result<Vec<u8>, QaError> {
        let absolute_path = self.resolve_key(key)?;
        std::fs::read(&absolute_path)
            .map_err(|_| QaError::not_found(format!("artifact key '{key}' not found")))
    }

    /// Lists all artifacts for a run across every kind, streaming the
    /// per-kind directory listing so memory stays bounded by the number
    /// of files for that run, not the whole store (§4.A).
    pub fn list(&self, run_id: &str) -> Result<Vec<ArtifactEntry>, QaError> {
        validate_run_id(run_id)?;
        let mut entries = Vec::new();
        for kind in ArtifactKind::all() {
            let dir = self.config.root.join(kind.dir_name()).join(run_id);
            let Ok(read_dir) = std::fs::read_dir(&dir) else {
                continue;
            };
            for dir_entry in read_dir.flatten() {
                let Ok(metadata) = dir_entry.metadata() else {
                    continue;
                };
                if !metadata.is_file() {
                    continue;
                }
                let file_name = dir_entry.file_name();
                let file_name = file_name.to_string_lossy();
                entries.push(ArtifactEntry {
                    key: format!("{}/{}/{}", kind.dir_name(), run_id, file_name),
                    kind,
                    size_bytes: metadata.len(),
                    created_at_unix_ms: file_modified_unix_ms(&metadata),
                });
            }
        }
        Ok(entries)
    }

    /// Deletes every artifact for a run. Idempotent: a second call on an
    /// already-deleted run returns `Ok(())` per the artifact idempotence
    /// property (§8).
    pub fn delete(&self, run_id: &str) -> Result<(), QaError> {
        validate_run_id(run_id)?;
        for kind in ArtifactKind::all() {
            let dir = self.config.root.join(kind.dir_name()).join(run_id);
            match std::fs::remove_dir_all(&dir) {
                Ok(()) => {}
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => {
                    return Err(QaError::transient_infra(format!(
                        "failed to delete artifacts for run '{run_id}': {error}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Computes store-wide statistics by streaming the on-disk catalog so
    /// memory stays O(1) regardless of file count (§4.A).
    pub fn stats(&self) -> ArtifactStoreStats {
        let mut stats = ArtifactStoreStats::default();
        for kind in ArtifactKind::all() {
            let kind_dir = self.config.root.join(kind.dir_name());
            let Ok(run_dirs) = std::fs::read_dir(&kind_dir) else {
                continue;
            };
            let mut kind_stats = ArtifactKindStats::default();
            for run_dir in run_dirs.flatten() {
                let Ok(files) = std::fs::read_dir(run_dir.path()) else {
                    continue;
                };
                for file_entry in files.flatten() {
                    let Ok(metadata) = file_entry.metadata() else {
                        continue;
                    };
                    if !metadata.is_file() {
                        continue;
                    }
                    let created_at = file_modified_unix_ms(&metadata);
                    kind_stats.count += 1;
                    kind_stats.size_bytes += metadata.len();
                    stats.oldest_unix_ms = Some(match stats.oldest_unix_ms {
                        Some(existing) => existing.min(created_at),
                        None => created_at,
                    });
                    stats.newest_unix_ms = Some(match stats.newest_unix_ms {
                        Some(existing) => existing.max(created_at),
                        None => created_at,
                    });
                }
            }
            stats.total += kind_stats.count;
            stats.total_size_bytes += kind_stats.size_bytes;
            stats.by_kind.insert(kind.as_str(), kind_stats);
        }
        stats
    }

    /// Deletes every artifact file older than `retention_days`, returning
    /// the number of files removed. Streams the catalog one file at a
    /// time rather than materializing it (§4.A).
    pub fn sweep(&self, retention_days: u32) -> Result<u64, QaError> {
        let cutoff_ms = current_unix_timestamp_ms()
            .saturating_sub(u64::from(retention_days) * 24 * 60 * 60 * 1000);
        let mut deleted = 0u64;
        for kind in ArtifactKind::all() {
            let kind_dir = self.config.root.join(kind.dir_name());
            let Ok(run_dirs) = std::fs::read_dir(&kind_dir) else {
                continue;
            };
            for run_dir in run_dirs.flatten() {
                let run_dir_path = run_dir.path();
                let Ok(files) = std::fs::read_dir(&run_dir_path) else {
                    continue;
                };
                for file_entry in files.flatten() {
                    let Ok(metadata) = file_entry.metadata() else {
                        continue;
                    };
                    if !metadata.is_file() {
                        continue;
                    }
                    if file_modified_unix_ms(&metadata) < cutoff_ms {
                        if std::fs::remove_file(file_entry.path()).is_ok() {
                            deleted += 1;
                        }
                    }
                }
            }
        }
        Ok(deleted)
    }

    fn resolve_key(&self, key: &str) -> Result<PathBuf, QaError> {
        if key.contains("..") {
            return Err(QaError::validation("artifact key cannot contain '..'"));
        }
        Ok(self.config.root.join(key))
    }
}

fn validate_run_id(run_id: &str) -> Result<(), QaError> {
    if run_id.trim().is_empty() || run_id.contains("..") || run_id.contains('/') {
        return Err(QaError::validation("invalid run id for artifact operation"));
    }
    Ok(())
}

/// Rejects path traversal and path separators, keeping only a safe,
/// filesystem-portable logical name (§4.A invariant iii).
fn sanitize_logical_name(logical_name: &str) -> Result<String, QaError> {
    let trimmed = logical_name.trim();
    if trimmed.is_empty() {
        return Err(QaError::validation("artifact logical name cannot be empty"));
    }
    if trimmed.contains("..") {
        return Err(QaError::validation("artifact logical name cannot contain '..'"));
    }
    let sanitized: String = trimmed
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    Ok(sanitized)
}

fn validate_extension(kind: ArtifactKind, sanitized_name: &str) -> Result<(), QaError> {
    let extension = Path::new(sanitized_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension {
        Some(extension) if kind.allowed_extensions().contains(&extension.as_str()) => Ok(()),
        _ => Err(QaError::validation(format!(
            "artifact '{}' has an extension not allowed for kind {}",
            sanitized_name,
            kind.as_str()
        ))),
    }
}

fn iso8601_compact(unix_ms: u64) -> String {
    let datetime = chrono::DateTime::from_timestamp_millis(unix_ms as i64)
        .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).expect("epoch is valid"));
    datetime.format("%Y%m%dT%H%M%S%3fZ").to_string()
}

fn file_modified_unix_ms(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}
