// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push capability detection.
//!
//! Push notifications need three platform primitives: background worker
//! registration, a push manager on that worker, and the notification
//! permission API. [`Capabilities`] records which of them the host exposes.
//!
//! Missing capabilities are not an error. They turn every state machine
//! trigger into a no-op.

use crate::platform::PushPlatform;

/// Push primitives exposed by the host platform.
///
/// # Examples
///
/// ```
/// use webpush_lib::Capabilities;
///
/// let caps = Capabilities::full();
/// assert!(caps.is_push_supported());
///
/// // A host with workers but no push manager cannot subscribe
/// let caps = Capabilities::builder().with_service_worker().with_notification().build();
/// assert!(!caps.is_push_supported());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
// Each flag is an independent platform feature probed separately.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Background worker registration is available.
    pub service_worker: bool,

    /// The push manager is available on worker registrations.
    pub push_manager: bool,

    /// The notification permission API is available.
    pub notification: bool,
}

impl Capabilities {
    /// Capabilities of a host exposing every push primitive.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            service_worker: true,
            push_manager: true,
            notification: true,
        }
    }

    /// Capabilities of a host without any push primitive.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            service_worker: false,
            push_manager: false,
            notification: false,
        }
    }

    /// Returns a builder starting from [`Capabilities::none`].
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::new()
    }

    /// Queries the platform for its push primitives.
    ///
    /// Synchronous and side-effect free.
    #[must_use]
    pub fn probe<P: PushPlatform>(platform: &P) -> Self {
        let caps = platform.capabilities();
        tracing::debug!(
            service_worker = caps.service_worker,
            push_manager = caps.push_manager,
            notification = caps.notification,
            "Probed push capabilities"
        );
        caps
    }

    /// Returns whether every primitive needed for push is present.
    #[must_use]
    pub const fn is_push_supported(&self) -> bool {
        self.service_worker && self.push_manager && self.notification
    }
}

/// Builder for creating custom capabilities.
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    inner: Capabilities,
}

impl CapabilitiesBuilder {
    /// Creates a new builder with no capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables background worker registration.
    #[must_use]
    pub fn with_service_worker(mut self) -> Self {
        self.inner.service_worker = true;
        self
    }

    /// Enables the push manager.
    #[must_use]
    pub fn with_push_manager(mut self) -> Self {
        self.inner.push_manager = true;
        self
    }

    /// Enables the notification permission API.
    #[must_use]
    pub fn with_notification(mut self) -> Self {
        self.inner.notification = true;
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.inner
    }
}
