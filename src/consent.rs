// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User consent for push notifications.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::error::{Error, ValueError};
use crate::platform::PushPlatform;

/// Notification permission as reported by the platform.
///
/// # Examples
///
/// ```
/// use webpush_lib::ConsentState;
///
/// let state: ConsentState = "granted".parse().unwrap();
/// assert!(state.is_granted());
/// assert_eq!(ConsentState::Denied.to_string(), "denied");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentState {
    /// The user has not decided yet.
    #[default]
    Default,
    /// The user allowed notifications.
    Granted,
    /// The user refused notifications.
    Denied,
}

impl ConsentState {
    /// Returns `true` if notifications are allowed.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Returns the lowercase platform name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for ConsentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsentState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            _ => Err(ValueError::InvalidConsentState(s.to_string())),
        }
    }
}

/// Reads and requests notification permission.
///
/// When the platform lacks push support the manager reports
/// [`ConsentState::Default`] and refuses to prompt.
#[derive(Debug)]
pub struct ConsentManager<P> {
    platform: Arc<P>,
    supported: bool,
}

impl<P: PushPlatform> ConsentManager<P> {
    /// Creates a consent manager backed by the given platform.
    #[must_use]
    pub fn new(platform: Arc<P>, capabilities: &Capabilities) -> Self {
        Self {
            platform,
            supported: capabilities.is_push_supported(),
        }
    }

    /// Returns the permission state at call time.
    #[must_use]
    pub fn current_consent(&self) -> ConsentState {
        if self.supported {
            self.platform.permission()
        } else {
            ConsentState::Default
        }
    }

    /// Prompts the user for notification permission.
    ///
    /// A refusal is returned as [`ConsentState::Denied`], not as an error;
    /// the user may be asked again later.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if push is unavailable, or
    /// [`Error::Platform`] if the prompt could not be shown.
    pub async fn request_consent(&self) -> Result<ConsentState, Error> {
        if !self.supported {
            return Err(Error::Unsupported);
        }

        let consent = self.platform.request_permission().await?;
        tracing::debug!(consent = %consent, "Notification permission answered");
        Ok(consent)
    }
}
