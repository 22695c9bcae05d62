// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! snare-adapters: boundary traits for the cluster's external collaborators.
//!
//! The cluster core never talks to a renderer process or the network
//! directly; it goes through [`BrowserEngine`]/[`BrowserLauncher`] and
//! [`HttpClient`]. Fakes that emulate the in-page instrumentation
//! contract live behind the `test-support` feature.

pub mod browser;
pub mod http;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use browser::{BrowserEngine, BrowserLauncher, EngineError, Settled};
pub use http::{HttpClient, HttpError};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHttp, FakeLauncher, FixtureSet, RouteBehavior};
