// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Presigned-URL signing and validation (spec.md §4.3, §9 Open Question 3):
//! HMAC-SHA256 over a canonical string of `(method, bucket, key,
//! expires_at)` using a configured symmetric key. Explicitly not
//! SigV4-compatible — this is a local emulator, not a real signing
//! service.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use lc_wire::PresignedUrlFields;
use sha2::Sha256;

use crate::error::{ProviderError, ProviderResult};

type HmacSha256 = Hmac<Sha256>;

fn sign(key: &str, canonical: &str) -> ProviderResult<String> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| ProviderError::Validation("invalid signing key".to_string()))?;
    mac.update(canonical.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Builds a signed [`PresignedUrlFields`] for `(method, bucket, key)`,
/// valid for `expires_in_secs` from `now_unix_secs` (spec.md §4.3,
/// "presign(bucket, key, method, expires-in)").
pub fn presign(signing_key: &str, method: &str, bucket: &str, key: &str, now_unix_secs: u64, expires_in_secs: u64) -> ProviderResult<PresignedUrlFields> {
    let expires_at = now_unix_secs + expires_in_secs;
    let canonical = PresignedUrlFields::canonical_string(method, bucket, key, expires_at);
    Ok(PresignedUrlFields {
        method: method.to_string(),
        bucket: bucket.to_string(),
        key: key.to_string(),
        expires_at,
        signature: sign(signing_key, &canonical)?,
    })
}

/// Validates a previously-signed [`PresignedUrlFields`]: the signature
/// must match when recomputed with `signing_key`, and `now_unix_secs`
/// must not be past `expires_at` (spec.md §4.3 `validate_presigned`, §8
/// "sign(url); validate(url) = true with the same signing key; false
/// with any other").
pub fn validate(signing_key: &str, fields: &PresignedUrlFields, now_unix_secs: u64) -> ProviderResult<()> {
    if now_unix_secs > fields.expires_at {
        return Err(ProviderError::InvalidPresignedUrl);
    }
    let canonical = PresignedUrlFields::canonical_string(&fields.method, &fields.bucket, &fields.key, fields.expires_at);
    let expected = sign(signing_key, &canonical);
    if !constant_time_eq(expected.as_bytes(), fields.signature.as_bytes()) {
        return Err(ProviderError::InvalidPresignedUrl);
    }
    Ok(())
}

/// Avoids leaking signature-comparison timing; a mismatch from tampering
/// or the wrong key both just look "invalid" to the caller.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[path = "presign_tests.rs"]
mod tests;
