// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory push platform.

use std::time::Duration;

use parking_lot::Mutex;

use crate::capabilities::Capabilities;
use crate::consent::ConsentState;
use crate::error::PlatformError;
use crate::platform::PushPlatform;
use crate::subscription::{PushSubscription, SubscribeOptions, SubscriptionKeys};
use crate::worker::WorkerRegistration;

/// Base URL of the endpoints issued by [`MemoryPlatform`].
const ENDPOINT_BASE: &str = "https://push.memory.invalid/send";

/// Number of calls each platform operation has received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformCalls {
    /// Permission prompts shown.
    pub permission_prompts: usize,
    /// Worker registration requests.
    pub worker_registrations: usize,
    /// Existing subscription lookups.
    pub subscription_lookups: usize,
    /// Subscribe requests.
    pub subscribe_requests: usize,
}

#[derive(Debug)]
struct Inner {
    permission: ConsentState,
    prompt_answer: ConsentState,
    worker: Option<WorkerRegistration>,
    subscription: Option<PushSubscription>,
    subscription_key: Option<String>,
    worker_failure: Option<PlatformError>,
    lookup_failure: Option<PlatformError>,
    subscribe_failure: Option<PlatformError>,
    prompt_failure: Option<PlatformError>,
    issued: u64,
    calls: PlatformCalls,
}

/// A deterministic push platform living entirely in memory.
///
/// It follows the platform rules the state machine relies on: one worker
/// per script, subscribe needs an active worker and granted permission, and
/// subscribing again with the same key returns the existing subscription.
///
/// Failures can be injected per operation; each injected failure is consumed
/// by the next call. An optional latency is applied to every async call via
/// `tokio::time::sleep`, which lets tests interleave concurrent triggers
/// under a paused clock.
///
/// # Examples
///
/// ```
/// use webpush_lib::ConsentState;
/// use webpush_lib::platform::MemoryPlatform;
///
/// let platform = MemoryPlatform::new()
///     .with_prompt_answer(ConsentState::Granted)
///     .with_active_worker("/sw.js");
///
/// assert_eq!(platform.permission_state(), ConsentState::Default);
/// ```
#[derive(Debug)]
pub struct MemoryPlatform {
    capabilities: Capabilities,
    latency: Duration,
    inner: Mutex<Inner>,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    /// Creates a platform with full push support and undecided permission.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities::full(),
            latency: Duration::ZERO,
            inner: Mutex::new(Inner {
                permission: ConsentState::Default,
                prompt_answer: ConsentState::Granted,
                worker: None,
                subscription: None,
                subscription_key: None,
                worker_failure: None,
                lookup_failure: None,
                subscribe_failure: None,
                prompt_failure: None,
                issued: 0,
                calls: PlatformCalls::default(),
            }),
        }
    }

    /// Sets the capabilities reported by the platform.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the delay applied to every async call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Sets the initial permission state.
    #[must_use]
    pub fn with_permission(self, permission: ConsentState) -> Self {
        self.inner.lock().permission = permission;
        self
    }

    /// Sets the answer the simulated user gives to permission prompts.
    #[must_use]
    pub fn with_prompt_answer(self, answer: ConsentState) -> Self {
        self.set_prompt_answer(answer);
        self
    }

    /// Starts with a worker already active for the given script.
    #[must_use]
    pub fn with_active_worker(self, script_url: &str) -> Self {
        self.inner.lock().worker = Some(worker_for(script_url));
        self
    }

    /// Starts with a subscription already stored.
    #[must_use]
    pub fn with_subscription(self, subscription: PushSubscription) -> Self {
        self.inner.lock().subscription = Some(subscription);
        self
    }

    /// Changes the answer given to the next permission prompts.
    pub fn set_prompt_answer(&self, answer: ConsentState) {
        self.inner.lock().prompt_answer = answer;
    }

    /// Makes the next permission prompt fail.
    pub fn fail_next_prompt(&self, error: PlatformError) {
        self.inner.lock().prompt_failure = Some(error);
    }

    /// Makes the next worker registration fail.
    pub fn fail_next_worker_registration(&self, error: PlatformError) {
        self.inner.lock().worker_failure = Some(error);
    }

    /// Makes the next existing subscription lookup fail.
    pub fn fail_next_lookup(&self, error: PlatformError) {
        self.inner.lock().lookup_failure = Some(error);
    }

    /// Makes the next subscribe request fail.
    pub fn fail_next_subscribe(&self, error: PlatformError) {
        self.inner.lock().subscribe_failure = Some(error);
    }

    /// Drops the stored subscription, as a push service expiring it would.
    pub fn expire_subscription(&self) {
        let mut inner = self.inner.lock();
        inner.subscription = None;
        inner.subscription_key = None;
    }

    /// Returns the current permission state.
    #[must_use]
    pub fn permission_state(&self) -> ConsentState {
        self.inner.lock().permission
    }

    /// Returns the active worker registration.
    #[must_use]
    pub fn worker(&self) -> Option<WorkerRegistration> {
        self.inner.lock().worker.clone()
    }

    /// Returns the stored subscription.
    #[must_use]
    pub fn subscription(&self) -> Option<PushSubscription> {
        self.inner.lock().subscription.clone()
    }

    /// Returns how often each operation has been called.
    #[must_use]
    pub fn calls(&self) -> PlatformCalls {
        self.inner.lock().calls
    }

    async fn settle(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn worker_for(script_url: &str) -> WorkerRegistration {
    WorkerRegistration {
        script_url: script_url.to_string(),
        scope: "/".to_string(),
    }
}

fn issue_subscription(serial: u64) -> PushSubscription {
    PushSubscription::new(
        format!("{ENDPOINT_BASE}/{serial:08x}"),
        SubscriptionKeys {
            p256dh: format!("BMemoryPlatformClientKey{serial:08x}"),
            auth: format!("memory-auth-{serial:08x}"),
        },
    )
}

impl PushPlatform for MemoryPlatform {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn permission(&self) -> ConsentState {
        self.permission_state()
    }

    async fn request_permission(&self) -> Result<ConsentState, PlatformError> {
        self.settle().await;

        let mut inner = self.inner.lock();
        inner.calls.permission_prompts += 1;
        if let Some(error) = inner.prompt_failure.take() {
            return Err(error);
        }
        inner.permission = inner.prompt_answer;
        Ok(inner.permission)
    }

    async fn register_worker(&self, script_url: &str) -> Result<WorkerRegistration, PlatformError> {
        self.settle().await;

        let mut inner = self.inner.lock();
        inner.calls.worker_registrations += 1;
        if let Some(error) = inner.worker_failure.take() {
            return Err(error);
        }

        if let Some(worker) = inner.worker.as_ref().filter(|w| w.script_url == script_url) {
            return Ok(worker.clone());
        }

        let worker = worker_for(script_url);
        inner.worker = Some(worker.clone());
        Ok(worker)
    }

    async fn get_subscription(&self) -> Result<Option<PushSubscription>, PlatformError> {
        self.settle().await;

        let mut inner = self.inner.lock();
        inner.calls.subscription_lookups += 1;
        if let Some(error) = inner.lookup_failure.take() {
            return Err(error);
        }
        Ok(inner.subscription.clone())
    }

    async fn subscribe(&self, options: &SubscribeOptions) -> Result<PushSubscription, PlatformError> {
        self.settle().await;

        let mut inner = self.inner.lock();
        inner.calls.subscribe_requests += 1;
        if let Some(error) = inner.subscribe_failure.take() {
            return Err(error);
        }
        if inner.worker.is_none() {
            return Err(PlatformError::invalid_state(
                "Subscription failed - no active Service Worker",
            ));
        }
        if !inner.permission.is_granted() {
            return Err(PlatformError::not_allowed(
                "Registration failed - permission denied",
            ));
        }

        if let Some(existing) = &inner.subscription
            && inner.subscription_key == options.application_server_key
        {
            return Ok(existing.clone());
        }

        inner.issued += 1;
        let subscription = issue_subscription(inner.issued);
        inner.subscription = Some(subscription.clone());
        inner.subscription_key.clone_from(&options.application_server_key);
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(key: Option<&str>) -> SubscribeOptions {
        SubscribeOptions {
            user_visible_only: true,
            application_server_key: key.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn subscribe_requires_active_worker() {
        let platform = MemoryPlatform::new().with_permission(ConsentState::Granted);
        let err = platform.subscribe(&options(None)).await.unwrap_err();
        assert_eq!(err.name, "InvalidStateError");
    }

    #[tokio::test]
    async fn subscribe_requires_permission() {
        let platform = MemoryPlatform::new().with_active_worker("/sw.js");
        let err = platform.subscribe(&options(None)).await.unwrap_err();
        assert_eq!(err.name, "NotAllowedError");
    }

    #[tokio::test]
    async fn subscribe_reuses_subscription_for_same_key() {
        let platform = MemoryPlatform::new()
            .with_permission(ConsentState::Granted)
            .with_active_worker("/sw.js");

        let first = platform.subscribe(&options(Some("key-a"))).await.unwrap();
        let again = platform.subscribe(&options(Some("key-a"))).await.unwrap();
        let other = platform.subscribe(&options(Some("key-b"))).await.unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(platform.subscription(), Some(other));
        assert_eq!(platform.calls().subscribe_requests, 3);
    }

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let platform = MemoryPlatform::new();
        platform.fail_next_worker_registration(PlatformError::abort("install failed"));

        assert!(platform.register_worker("/sw.js").await.is_err());
        assert!(platform.register_worker("/sw.js").await.is_ok());
        assert_eq!(platform.calls().worker_registrations, 2);
    }

    #[tokio::test]
    async fn prompt_updates_permission() {
        let platform = MemoryPlatform::new().with_prompt_answer(ConsentState::Denied);

        assert_eq!(platform.request_permission().await.unwrap(), ConsentState::Denied);
        assert_eq!(platform.permission(), ConsentState::Denied);
    }

    #[tokio::test]
    async fn expire_clears_subscription() {
        let platform = MemoryPlatform::new()
            .with_permission(ConsentState::Granted)
            .with_active_worker("/sw.js");
        platform.subscribe(&options(None)).await.unwrap();

        platform.expire_subscription();
        assert!(platform.get_subscription().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_calls() {
        let platform = MemoryPlatform::new().with_latency(Duration::from_millis(250));
        let started = tokio::time::Instant::now();

        platform.register_worker("/sw.js").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
