// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the push lifecycle.

use std::time::Duration;

use serde::Deserialize;

use crate::subscription::SubscribeOptions;

/// Configuration of a [`PushNotifications`](crate::PushNotifications) instance.
///
/// Built with `with_*` methods, or deserialized from any serde format; every
/// field has a default.
///
/// # Examples
///
/// ```
/// use webpush_lib::PushConfig;
/// use std::time::Duration;
///
/// let config = PushConfig::new()
///     .with_worker_script("/push-worker.js")
///     .with_application_server_key("BEl62iUYgUivxIkv69yViEuiBIa-Ib9-SkvMeAtA3LFgDzkrxZJjSgSnfckjBJuBkr3qBUYIHBQFLXYp5Nksh8U")
///     .with_server_url("https://push.example.com")
///     .with_request_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.worker_script(), "/push-worker.js");
/// assert!(config.subscribe_options().user_visible_only);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PushConfig {
    worker_script: String,
    application_server_key: Option<String>,
    user_visible_only: bool,
    server_url: Option<String>,
    #[serde(with = "duration_millis")]
    request_timeout: Duration,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PushConfig {
    /// Default worker script URL.
    pub const DEFAULT_WORKER_SCRIPT: &'static str = "/sw.js";
    /// Default registration request timeout.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            worker_script: Self::DEFAULT_WORKER_SCRIPT.to_string(),
            application_server_key: None,
            user_visible_only: true,
            server_url: None,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the URL of the background worker script.
    #[must_use]
    pub fn with_worker_script(mut self, script_url: impl Into<String>) -> Self {
        self.worker_script = script_url.into();
        self
    }

    /// Sets the VAPID public key (URL-safe base64) sent when subscribing.
    #[must_use]
    pub fn with_application_server_key(mut self, key: impl Into<String>) -> Self {
        self.application_server_key = Some(key.into());
        self
    }

    /// Sets whether every push must show a notification.
    #[must_use]
    pub fn with_user_visible_only(mut self, user_visible_only: bool) -> Self {
        self.user_visible_only = user_visible_only;
        self
    }

    /// Sets the base URL of the registration server.
    #[must_use]
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Sets the registration request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the worker script URL.
    #[must_use]
    pub fn worker_script(&self) -> &str {
        &self.worker_script
    }

    /// Returns the VAPID public key.
    #[must_use]
    pub fn application_server_key(&self) -> Option<&str> {
        self.application_server_key.as_deref()
    }

    /// Returns the registration server base URL.
    #[must_use]
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// Returns the registration request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the options passed to the platform on subscribe.
    #[must_use]
    pub fn subscribe_options(&self) -> SubscribeOptions {
        SubscribeOptions {
            user_visible_only: self.user_visible_only,
            application_server_key: self.application_server_key.clone(),
        }
    }

    /// Returns the HTTP registration settings, if a server URL is set.
    #[cfg(feature = "http")]
    #[must_use]
    pub fn registration_config(&self) -> Option<crate::registration::RegistrationConfig> {
        self.server_url.as_ref().map(|url| {
            crate::registration::RegistrationConfig::new(url.clone())
                .with_timeout(self.request_timeout)
        })
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
