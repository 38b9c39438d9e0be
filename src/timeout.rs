// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deadline for calls leaving the process (key directory, challenge storage).
//!
//! One attempt per call. Retrying is the caller's decision.

use std::future::Future;
use std::time::Duration;

use crate::error::{AuthnError, AuthnResult};

/// Run `fut` with an upper bound of `limit`.
///
/// An elapsed deadline is reported as `UpstreamUnavailable` naming `what`.
pub(crate) async fn bounded<T, E, F>(limit: Duration, what: &str, fut: F) -> AuthnResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<AuthnError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(AuthnError::UpstreamUnavailable(format!(
            "{what} timed out after {}ms",
            limit.as_millis()
        ))),
    }
}
