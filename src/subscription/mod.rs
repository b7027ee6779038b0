// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push subscriptions issued by the platform.
//!
//! A [`PushSubscription`] is the token a push service hands out: an endpoint
//! URL where messages for this client are delivered, plus the public keys the
//! sender needs to encrypt payloads. It serializes to the JSON shape the
//! platform itself produces, so it can be posted to a registration server
//! unchanged.
//!
//! ```
//! use webpush_lib::subscription::PushSubscription;
//!
//! let json = r#"{
//!     "endpoint": "https://push.example.com/send/abc",
//!     "expirationTime": null,
//!     "keys": { "p256dh": "BNc...", "auth": "tBH..." }
//! }"#;
//!
//! let subscription: PushSubscription = serde_json::from_str(json).unwrap();
//! assert_eq!(subscription.endpoint, "https://push.example.com/send/abc");
//! ```

mod manager;

pub use manager::SubscriptionManager;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A push subscription as issued by the platform.
///
/// Subscriptions are never mutated. A new subscription replaces the old one
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    /// URL of the push service endpoint for this client.
    pub endpoint: String,

    /// When the push service will expire the subscription, if known.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expiration_time: Option<DateTime<Utc>>,

    /// Encryption keys for message payloads.
    pub keys: SubscriptionKeys,
}

impl PushSubscription {
    /// Creates a subscription without an expiration time.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, keys: SubscriptionKeys) -> Self {
        Self {
            endpoint: endpoint.into(),
            expiration_time: None,
            keys,
        }
    }
}

/// Public keys attached to a subscription (URL-safe base64).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// P-256 ECDH public key of the client.
    pub p256dh: String,
    /// Authentication secret.
    pub auth: String,
}

/// Options passed to the platform when subscribing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeOptions {
    /// Every push must result in a user-visible notification.
    pub user_visible_only: bool,

    /// VAPID public key identifying the application server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_server_key: Option<String>,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            user_visible_only: true,
            application_server_key: None,
        }
    }
}
