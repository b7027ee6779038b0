// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push lifecycle state snapshot.

use serde::{Deserialize, Serialize};

use crate::consent::ConsentState;
use crate::error::OperationError;
use crate::registration::ServerRegistrationId;
use crate::subscription::PushSubscription;

/// Snapshot of the push lifecycle exposed to the UI.
///
/// A server registration id is only ever present alongside the subscription
/// it was issued for. Replacing the subscription drops the id.
///
/// Serializes with camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushState {
    user_consent: ConsentState,
    user_subscription: Option<PushSubscription>,
    push_server_subscription_id: Option<ServerRegistrationId>,
    error: Option<OperationError>,
    loading: bool,
    push_notification_supported: bool,
}

impl Default for PushState {
    fn default() -> Self {
        Self::new(false)
    }
}

impl PushState {
    /// Creates the initial state.
    #[must_use]
    pub fn new(push_notification_supported: bool) -> Self {
        Self {
            user_consent: ConsentState::Default,
            user_subscription: None,
            push_server_subscription_id: None,
            error: None,
            loading: false,
            push_notification_supported,
        }
    }

    /// Returns the last known notification permission.
    #[must_use]
    pub fn user_consent(&self) -> ConsentState {
        self.user_consent
    }

    /// Returns the current push subscription.
    #[must_use]
    pub fn user_subscription(&self) -> Option<&PushSubscription> {
        self.user_subscription.as_ref()
    }

    /// Returns the id assigned by the registration server.
    #[must_use]
    pub fn push_server_subscription_id(&self) -> Option<&ServerRegistrationId> {
        self.push_server_subscription_id.as_ref()
    }

    /// Returns the error left by the last failing phase.
    #[must_use]
    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    /// Returns `true` while a phase is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Returns whether the platform supports push notifications.
    #[must_use]
    pub fn push_notification_supported(&self) -> bool {
        self.push_notification_supported
    }

    // ========== Mutations (state machine only) ==========

    /// Marks a phase as started: loading on, previous error cleared.
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Records the end of a phase.
    pub(crate) fn settle(&mut self, loading: bool, error: Option<OperationError>) {
        self.loading = loading;
        if error.is_some() {
            self.error = error;
        }
    }

    pub(crate) fn set_consent(&mut self, consent: ConsentState) {
        self.user_consent = consent;
    }

    /// Installs a freshly created subscription and drops any server id.
    pub(crate) fn replace_subscription(&mut self, subscription: PushSubscription) {
        self.user_subscription = Some(subscription);
        self.push_server_subscription_id = None;
    }

    /// Installs the subscription found on the platform.
    ///
    /// The server id survives only if the platform still holds the exact
    /// subscription it was issued for.
    pub(crate) fn rehydrate_subscription(&mut self, subscription: Option<PushSubscription>) {
        if self.user_subscription != subscription {
            self.push_server_subscription_id = None;
        }
        self.user_subscription = subscription;
    }

    /// Stores the server id if `subscription` is still the current one.
    ///
    /// Returns `false` and leaves the state untouched otherwise.
    pub(crate) fn set_registration_id(
        &mut self,
        subscription: &PushSubscription,
        id: ServerRegistrationId,
    ) -> bool {
        if self.user_subscription.as_ref() != Some(subscription) {
            return false;
        }
        self.push_server_subscription_id = Some(id);
        true
    }
}
