// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `webpush_lib` - client-side lifecycle of a web push subscription.
//!
//! This library drives the steps a client goes through before it can receive
//! push messages: registering a background worker, asking the user for
//! notification consent, subscribing to the push service, and registering
//! the subscription with an application server.
//!
//! # Components
//!
//! - **Capability probe** ([`Capabilities`]): does the host support push at all
//! - **Worker registrar** ([`WorkerRegistrar`]): idempotent worker registration
//! - **Consent manager** ([`ConsentManager`]): permission reads and prompts
//! - **Subscription manager** ([`SubscriptionManager`]): create or restore the
//!   platform subscription
//! - **Registration client** ([`RegistrationServer`]): hand the subscription to
//!   the application server
//! - **State machine** ([`PushNotifications`]): one observable [`PushState`]
//!   and five triggers
//!
//! Host services are reached through the [`PushPlatform`](platform::PushPlatform)
//! trait. [`MemoryPlatform`](platform::MemoryPlatform) implements it in memory.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use webpush_lib::platform::MemoryPlatform;
//! use webpush_lib::{PhaseOutcome, PushConfig, PushNotifications};
//!
//! #[tokio::main]
//! async fn main() -> webpush_lib::Result<()> {
//!     let config = PushConfig::new()
//!         .with_worker_script("/sw.js")
//!         .with_application_server_key("BEl62iUYgUivxIkv69yViEuiBIa-Ib9-SkvMeAtA3LFgDzkrxZJjSgSnfckjBJuBkr3qBUYIHBQFLXYp5Nksh8U")
//!         .with_server_url("https://push.example.com");
//!
//!     let push = PushNotifications::with_http(Arc::new(MemoryPlatform::new()), &config)?;
//!
//!     let _ = push.bootstrap().await;
//!     if let PhaseOutcome::Failed(error) = push.request_consent().await {
//!         eprintln!("{error}");
//!         return Ok(());
//!     }
//!     let _ = push.subscribe().await;
//!     let _ = push.register_with_server().await;
//!
//!     println!("{:?}", push.state().push_server_subscription_id());
//!     Ok(())
//! }
//! ```
//!
//! # Observing State
//!
//! ```ignore
//! let mut rx = push.watch();
//! while rx.changed().await.is_ok() {
//!     let state = rx.borrow_and_update();
//!     render(state.loading(), state.error());
//! }
//! ```

mod capabilities;
mod config;
pub mod consent;
pub mod error;
mod notifications;
pub mod platform;
pub mod registration;
pub mod state;
pub mod subscription;
mod worker;

pub use capabilities::{Capabilities, CapabilitiesBuilder};
pub use config::PushConfig;
pub use consent::{ConsentManager, ConsentState};
pub use error::{
    Error, OperationError, ParseError, PlatformError, PreconditionError, ProtocolError, Result,
    ValueError,
};
pub use notifications::PushNotifications;
#[cfg(feature = "http")]
pub use registration::{HttpRegistrationClient, RegistrationConfig};
pub use registration::{RegistrationServer, ServerRegistrationId};
pub use state::{Phase, PhaseOutcome, PushState, SkipReason};
pub use subscription::{PushSubscription, SubscribeOptions, SubscriptionKeys, SubscriptionManager};
pub use worker::{WorkerRegistrar, WorkerRegistration};
