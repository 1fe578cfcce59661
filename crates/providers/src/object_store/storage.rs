// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk per-bucket object storage (spec.md §4.3, §6 "Filesystem
//! layout"): `<data>/s3/<bucket>/<key-escaped-to-paths>` for payloads,
//! `<data>/s3/.metadata/<bucket>/<key>.json` for sidecar metadata.
//! Follows the same snapshot-to-disk idiom as `lc_store`'s table
//! persistence (`crates/store/src/persistence.rs`) but per-object rather
//! than whole-database, since object payloads are the unit of durability
//! here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: String,
    pub size: u64,
    pub etag: String,
    pub user_metadata: BTreeMap<String, String>,
    pub last_modified_ms: i64,
}

#[derive(Debug, Clone)]
pub struct GetObjectOutput {
    pub bytes: Vec<u8>,
    pub metadata: ObjectMetadata,
}

#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub etag: String,
    pub last_modified_ms: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ListObjectsOutput {
    pub items: Vec<ObjectSummary>,
    pub next_token: Option<String>,
    pub truncated: bool,
}

/// ETag law (spec.md §8): `etag(bytes) = md5_hex(bytes)`, deterministic,
/// surrounded by double quotes on the wire (spec.md §6) — the quoting is
/// the adaptor's job, this returns the bare hex digest.
pub fn md5_hex(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Maps an object key to a filesystem path component-by-component on `/`,
/// so `a/b/c.txt` becomes nested directories rather than one file named
/// with embedded slashes.
fn key_to_path(root: &Path, key: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in key.split('/') {
        path.push(segment);
    }
    path
}

pub struct BucketStorage {
    data_dir: PathBuf,
}

impl BucketStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        BucketStorage { data_dir: data_dir.into() }
    }

    fn bucket_root(&self, bucket: &str) -> PathBuf {
        self.data_dir.join("s3").join(bucket)
    }

    fn metadata_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.data_dir.join("s3").join(".metadata").join(bucket).join(format!("{key}.json"))
    }

    pub fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: Option<String>,
        user_metadata: BTreeMap<String, String>,
        now_ms: i64,
    ) -> ProviderResult<ObjectMetadata> {
        let path = key_to_path(&self.bucket_root(bucket), key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;

        let metadata = ObjectMetadata {
            content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            size: bytes.len() as u64,
            etag: md5_hex(bytes),
            user_metadata,
            last_modified_ms: now_ms,
        };
        let meta_path = self.metadata_path(bucket, key);
        if let Some(parent) = meta_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&meta_path, serde_json::to_vec(&metadata).map_err(|e| ProviderError::Validation(e.to_string()))?)?;
        Ok(metadata)
    }

    pub fn get_object(&self, bucket: &str, key: &str) -> ProviderResult<Option<GetObjectOutput>> {
        let Some(metadata) = self.read_metadata(bucket, key)? else { return Ok(None) };
        let path = key_to_path(&self.bucket_root(bucket), key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(GetObjectOutput { bytes, metadata })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn head_object(&self, bucket: &str, key: &str) -> ProviderResult<Option<ObjectMetadata>> {
        self.read_metadata(bucket, key)
    }

    fn read_metadata(&self, bucket: &str, key: &str) -> ProviderResult<Option<ObjectMetadata>> {
        match std::fs::read(self.metadata_path(bucket, key)) {
            Ok(bytes) => {
                let metadata = serde_json::from_slice(&bytes).map_err(|e| ProviderError::Validation(e.to_string()))?;
                Ok(Some(metadata))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes a payload and its metadata sidecar. Returns whether the
    /// object previously existed (spec.md §4.3, "delete ... existed?").
    pub fn delete_object(&self, bucket: &str, key: &str) -> ProviderResult<bool> {
        let existed = self.read_metadata(bucket, key)?.is_some();
        if existed {
            let path = key_to_path(&self.bucket_root(bucket), key);
            let _ = std::fs::remove_file(&path);
            let _ = std::fs::remove_file(self.metadata_path(bucket, key));
        }
        Ok(existed)
    }

    /// Whether the bucket has any objects — `delete_bucket` on a
    /// non-empty bucket fails (spec.md §8, "round-trip / idempotence laws").
    pub fn is_empty(&self, bucket: &str) -> bool {
        self.all_keys(bucket).next().is_none()
    }

    fn all_keys(&self, bucket: &str) -> impl Iterator<Item = String> {
        let meta_root = self.data_dir.join("s3").join(".metadata").join(bucket);
        let mut keys = Vec::new();
        if let Ok(entries) = walk_json_files(&meta_root) {
            for path in entries {
                if let Ok(rel) = path.strip_prefix(&meta_root) {
                    let mut key = rel.to_string_lossy().replace('\\', "/");
                    if let Some(stripped) = key.strip_suffix(".json") {
                        key = stripped.to_string();
                    }
                    keys.push(key);
                }
            }
        }
        keys.into_iter()
    }

    /// Lists objects under `prefix` in sorted key order, paginated by
    /// opaque continuation tokens (spec.md §4.3, "Pagination is by sorted
    /// key order; tokens are opaque cursors").
    pub fn list_objects(&self, bucket: &str, prefix: Option<&str>, max_keys: usize, continuation_token: Option<&str>) -> ListObjectsOutput {
        let mut keys: Vec<String> = self.all_keys(bucket).filter(|k| prefix.is_none_or(|p| k.starts_with(p))).collect();
        keys.sort();

        let start = match continuation_token {
            Some(token) => keys.iter().position(|k| k.as_str() > token).unwrap_or(keys.len()),
            None => 0,
        };
        let remaining = &keys[start..];
        let max_keys = max_keys.max(1);
        let page: Vec<&String> = remaining.iter().take(max_keys).collect();
        let truncated = remaining.len() > page.len();
        let next_token = if truncated { page.last().map(|k| k.to_string()) } else { None };

        let items = page
            .into_iter()
            .filter_map(|key| {
                self.read_metadata(bucket, key).ok().flatten().map(|meta| ObjectSummary {
                    key: key.clone(),
                    size: meta.size,
                    etag: meta.etag,
                    last_modified_ms: meta.last_modified_ms,
                })
            })
            .collect();

        ListObjectsOutput { items, next_token, truncated }
    }
}

fn walk_json_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if !root.exists() {
        return Ok(out);
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|e| e == "json") {
                out.push(path);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
