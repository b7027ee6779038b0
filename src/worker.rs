// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background worker registration.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::error::Error;
use crate::platform::PushPlatform;

/// An active background worker registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRegistration {
    /// URL of the registered worker script.
    pub script_url: String,
    /// Scope the worker controls.
    pub scope: String,
}

/// Registers the background worker that receives push events.
///
/// The worker is a process-wide singleton. The first successful registration
/// is cached and returned by every later call without contacting the
/// platform again.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use webpush_lib::platform::MemoryPlatform;
/// use webpush_lib::{Capabilities, WorkerRegistrar};
///
/// # async fn example() -> webpush_lib::Result<()> {
/// let platform = Arc::new(MemoryPlatform::new());
/// let registrar = WorkerRegistrar::new(platform, &Capabilities::full(), "/sw.js");
///
/// let first = registrar.register().await?;
/// let second = registrar.register().await?;
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WorkerRegistrar<P> {
    platform: Arc<P>,
    supported: bool,
    script_url: String,
    active: RwLock<Option<WorkerRegistration>>,
}

impl<P: PushPlatform> WorkerRegistrar<P> {
    /// Creates a registrar for the given worker script.
    #[must_use]
    pub fn new(platform: Arc<P>, capabilities: &Capabilities, script_url: impl Into<String>) -> Self {
        Self {
            platform,
            supported: capabilities.service_worker,
            script_url: script_url.into(),
            active: RwLock::new(None),
        }
    }

    /// Returns the worker script URL.
    #[must_use]
    pub fn script_url(&self) -> &str {
        &self.script_url
    }

    /// Returns the cached registration, if the worker is active.
    #[must_use]
    pub fn active(&self) -> Option<WorkerRegistration> {
        self.active.read().clone()
    }

    /// Registers the worker and waits for it to become active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if workers are unavailable, or
    /// [`Error::Platform`] if the platform refuses the registration or the
    /// script fails to install.
    pub async fn register(&self) -> Result<WorkerRegistration, Error> {
        if !self.supported {
            return Err(Error::Unsupported);
        }

        if let Some(registration) = self.active() {
            tracing::debug!(scope = %registration.scope, "Worker already registered");
            return Ok(registration);
        }

        tracing::debug!(script = %self.script_url, "Registering background worker");
        let registration = self.platform.register_worker(&self.script_url).await?;

        // Concurrent callers may race here; the platform hands both the same
        // registration, so the first one stored wins.
        let mut active = self.active.write();
        Ok(active.get_or_insert(registration).clone())
    }
}
