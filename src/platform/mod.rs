// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push platform abstraction.
//!
//! The push lifecycle depends on host services: worker registration, the
//! push manager and the notification permission. [`PushPlatform`] gathers
//! them behind one trait so every component receives its host explicitly
//! instead of reaching for global state.
//!
//! # Implementations
//!
//! - [`MemoryPlatform`]: deterministic in-process platform for headless
//!   environments and tests
//!
//! A browser binding implements the same trait on top of the host's own
//! APIs.

mod memory;

pub use memory::{MemoryPlatform, PlatformCalls};

use crate::capabilities::Capabilities;
use crate::consent::ConsentState;
use crate::error::PlatformError;
use crate::subscription::{PushSubscription, SubscribeOptions};
use crate::worker::WorkerRegistration;

/// Host services needed to manage a push subscription.
///
/// Implementations own the worker registration and the subscription store.
/// Both are shared singletons: implementations must make repeated calls
/// safe and must not create duplicate workers.
#[allow(async_fn_in_trait)]
pub trait PushPlatform {
    /// Reports which push primitives the host exposes.
    fn capabilities(&self) -> Capabilities;

    /// Returns the current notification permission.
    fn permission(&self) -> ConsentState;

    /// Shows the permission prompt and returns the user's answer.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the prompt cannot be shown.
    async fn request_permission(&self) -> Result<ConsentState, PlatformError>;

    /// Registers a worker script and waits until it is active.
    ///
    /// # Arguments
    ///
    /// * `script_url` - URL of the worker script
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if registration is refused or installation fails.
    async fn register_worker(&self, script_url: &str) -> Result<WorkerRegistration, PlatformError>;

    /// Returns the subscription the platform currently holds.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the subscription store cannot be read.
    async fn get_subscription(&self) -> Result<Option<PushSubscription>, PlatformError>;

    /// Subscribes to the push service.
    ///
    /// # Arguments
    ///
    /// * `options` - Subscribe options, including the application server key
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if no worker is active, permission is missing
    /// or key generation fails.
    async fn subscribe(&self, options: &SubscribeOptions) -> Result<PushSubscription, PlatformError>;
}
