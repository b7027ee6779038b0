// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Creation and retrieval of push subscriptions.

use std::sync::Arc;

use crate::error::Error;
use crate::platform::PushPlatform;

use super::{PushSubscription, SubscribeOptions};

/// Creates and retrieves the platform push subscription.
///
/// The manager does not check consent or capabilities itself. Callers are
/// expected to go through the consent flow first; if they don't, the
/// platform rejects the subscribe call and the rejection is propagated.
#[derive(Debug)]
pub struct SubscriptionManager<P> {
    platform: Arc<P>,
    options: SubscribeOptions,
}

impl<P: PushPlatform> SubscriptionManager<P> {
    /// Creates a subscription manager using the given subscribe options.
    #[must_use]
    pub fn new(platform: Arc<P>, options: SubscribeOptions) -> Self {
        Self { platform, options }
    }

    /// Returns the options passed to the platform on subscribe.
    #[must_use]
    pub fn options(&self) -> &SubscribeOptions {
        &self.options
    }

    /// Looks up the subscription the platform already holds.
    ///
    /// Lookup failures are logged and reported as no subscription.
    pub async fn get_existing_subscription(&self) -> Option<PushSubscription> {
        match self.platform.get_subscription().await {
            Ok(subscription) => {
                tracing::debug!(
                    found = subscription.is_some(),
                    "Looked up existing push subscription"
                );
                subscription
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to look up existing push subscription");
                None
            }
        }
    }

    /// Asks the platform for a new push subscription.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Platform`] carrying the platform's name, message and
    /// code when the platform rejects the request.
    pub async fn create_subscription(&self) -> Result<PushSubscription, Error> {
        match self.platform.subscribe(&self.options).await {
            Ok(subscription) => {
                tracing::debug!(endpoint = %subscription.endpoint, "Created push subscription");
                Ok(subscription)
            }
            Err(err) => {
                tracing::error!(
                    name = %err.name,
                    message = %err.message,
                    code = err.code,
                    "Couldn't create the notification subscription"
                );
                Err(err.into())
            }
        }
    }
}
