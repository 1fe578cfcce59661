// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the individual service providers (spec.md §4.3–§4.9,
//! §7). Each variant maps to one of the taxonomy's classes; adaptors
//! translate these into their own wire-error shape via [`lc_wire::ErrorKind`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("bucket not found: {0}")]
    NoSuchBucket(String),

    #[error("key not found: {bucket}/{key}")]
    NoSuchKey { bucket: String, key: String },

    #[error("queue not found: {0}")]
    NoSuchQueue(String),

    #[error("topic not found: {0}")]
    NoSuchTopic(String),

    #[error("event bus not found: {0}")]
    NoSuchEventBus(String),

    #[error("rule not found: {0}")]
    NoSuchRule(String),

    #[error("subscription not found: {0}")]
    NoSuchSubscription(String),

    #[error("parameter not found: {0}")]
    NoSuchParameter(String),

    #[error("secret not found: {0}")]
    NoSuchSecret(String),

    #[error("receipt handle is invalid or expired: {0}")]
    InvalidReceiptHandle(String),

    #[error("compute function not found: {0}")]
    NoSuchFunction(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("bucket is not empty: {0}")]
    BucketNotEmpty(String),

    #[error("presigned URL is invalid or expired")]
    InvalidPresignedUrl,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("compute invocation failed: {0}")]
    ComputeFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
