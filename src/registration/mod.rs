// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registration of push subscriptions with a remote server.
//!
//! Once the platform has issued a [`PushSubscription`], the application
//! server must learn about it before it can deliver messages. The server
//! answers with a [`ServerRegistrationId`] that later calls use to refer to
//! the stored subscription.
//!
//! # Implementations
//!
//! - [`HttpRegistrationClient`]: JSON over HTTP (`POST /subscription`,
//!   `GET /subscription/{id}`), enabled by the `http` feature

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpRegistrationClient, RegistrationConfig};

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, ValueError};
use crate::subscription::PushSubscription;

/// Identifier assigned by the registration server to a stored subscription.
///
/// Servers answer with either a JSON string or a JSON number; both are kept
/// as their textual form.
///
/// # Examples
///
/// ```
/// use webpush_lib::ServerRegistrationId;
///
/// let id: ServerRegistrationId = serde_json::from_str("42").unwrap();
/// assert_eq!(id.as_str(), "42");
///
/// let id: ServerRegistrationId = serde_json::from_str("\"srv-42\"").unwrap();
/// assert_eq!(id.to_string(), "srv-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServerRegistrationId(String);

impl ServerRegistrationId {
    /// Creates an id from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::EmptyRegistrationId`] if `value` is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValueError::EmptyRegistrationId);
        }
        Ok(Self(value))
    }

    /// Returns the textual form of the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerRegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ServerRegistrationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        };
        Self::new(text).map_err(serde::de::Error::custom)
    }
}

/// A server that stores push subscriptions.
#[allow(async_fn_in_trait)]
pub trait RegistrationServer {
    /// Submits a subscription and returns the id the server assigned to it.
    ///
    /// # Arguments
    ///
    /// * `subscription` - The subscription to store
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` on transport failure or rejection, and
    /// `Error::Parse` if the response carries no usable id.
    async fn submit(&self, subscription: &PushSubscription) -> Result<ServerRegistrationId, Error>;

    /// Checks that the server still knows the given id.
    ///
    /// # Arguments
    ///
    /// * `id` - The id returned by a previous [`submit`](Self::submit)
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the server does not acknowledge the id.
    async fn fetch_status(&self, id: &ServerRegistrationId) -> Result<(), Error>;
}
