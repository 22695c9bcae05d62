// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP collaborator boundary, consumed only by the resource resolver
//! for URL-variant jobs.

use async_trait::async_trait;
use snare_core::HttpResponse;
use thiserror::Error;

/// Errors from HTTP fetches
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request to {url} failed: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Synchronous-semantics GET: the resolver blocks its job (not its
/// worker's thread) until the response is in.
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
}
