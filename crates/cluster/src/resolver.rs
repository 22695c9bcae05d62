// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource resolution: turn a job's target into a loadable page.
//!
//! No taint-specific logic happens here. URL targets cost one fetch
//! through the HTTP collaborator; the other two variants resolve without
//! touching the network.

use crate::error::JobError;
use snare_adapters::HttpClient;
use snare_core::{Page, Resource};

pub(crate) async fn resolve<H: HttpClient>(
    resource: &Resource,
    http: &H,
) -> Result<Page, JobError> {
    match resource {
        Resource::Url(url) => {
            let response =
                http.get(url).await.map_err(|e| JobError::ResourceLoad(e.to_string()))?;
            Ok(Page::from_response(response))
        }
        Resource::Response(response) => Ok(Page::from_response(response.clone())),
        Resource::Page(page) => Ok(page.clone()),
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
