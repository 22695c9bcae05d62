// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job target resources and the page model.

use crate::sink::Dom;
use serde::{Deserialize, Serialize};

/// A fetched HTTP response, as returned by the HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

crate::builder! {
    pub struct HttpResponseBuilder => HttpResponse {
        into {
            url: String = "http://fixture.local/",
            body: String = "<html></html>",
        }
        set {
            status: u16 = 200,
        }
    }
}

/// A loadable page definition, and after execution the carrier of the
/// harvested sinks.
///
/// `dom` is empty until a worker has run the page and harvested it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub body: String,
    #[serde(default)]
    pub dom: Dom,
}

impl Page {
    /// Parse a fetched response into a page definition.
    pub fn from_response(response: HttpResponse) -> Self {
        Self { url: response.url, body: response.body, dom: Dom::default() }
    }
}

/// Target of a job. Exactly one variant is active; the resolver turns
/// each into a loadable [`Page`] without any taint-specific logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resource {
    /// Raw URL, fetched via the HTTP collaborator at resolve time.
    Url(String),
    /// Already-fetched response, parsed directly.
    Response(HttpResponse),
    /// Pre-parsed page, passed through unchanged.
    Page(Page),
}

impl Resource {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// The target URL, regardless of variant.
    pub fn target_url(&self) -> &str {
        match self {
            Resource::Url(url) => url,
            Resource::Response(response) => &response.url,
            Resource::Page(page) => &page.url,
        }
    }
}

crate::simple_display! {
    Resource {
        Url(..) => "url",
        Response(..) => "response",
        Page(..) => "page",
    }
}

impl From<HttpResponse> for Resource {
    fn from(response: HttpResponse) -> Self {
        Self::Response(response)
    }
}

impl From<Page> for Resource {
    fn from(page: Page) -> Self {
        Self::Page(page)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
