// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push lifecycle state machine.
//!
//! [`PushNotifications`] composes the worker registrar, consent manager,
//! subscription manager and registration server into one observable
//! [`PushState`] plus five triggers:
//!
//! | Trigger | Phase |
//! |---|---|
//! | [`bootstrap`](PushNotifications::bootstrap) | worker registration + subscription rehydration |
//! | [`request_consent`](PushNotifications::request_consent) | permission prompt |
//! | [`subscribe`](PushNotifications::subscribe) | new push subscription |
//! | [`register_with_server`](PushNotifications::register_with_server) | `POST /subscription` |
//! | [`confirm_with_server`](PushNotifications::confirm_with_server) | `GET /subscription/{id}` |
//!
//! Every trigger runs the same sequence: mark the phase in flight, set
//! `loading` and clear the error, await the delegate, then apply either the
//! result or the error and recompute `loading`. Triggers never return an
//! error; failures end up in [`PushState::error`].
//!
//! A trigger whose phase is already running is skipped. Different phases may
//! overlap; `loading` stays on until the last one settles.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::capabilities::Capabilities;
use crate::config::PushConfig;
use crate::consent::ConsentManager;
use crate::error::{Error, OperationError, PreconditionError};
use crate::platform::PushPlatform;
use crate::registration::RegistrationServer;
use crate::state::{Phase, PhaseOutcome, PushState, SkipReason};
use crate::subscription::SubscriptionManager;
use crate::worker::{WorkerRegistrar, WorkerRegistration};

/// Client-side push subscription lifecycle.
///
/// # Type Parameters
///
/// - `P`: the push platform (see [`PushPlatform`])
/// - `S`: the registration server (see [`RegistrationServer`])
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use webpush_lib::platform::MemoryPlatform;
/// use webpush_lib::{PushConfig, PushNotifications};
///
/// # async fn example() -> webpush_lib::Result<()> {
/// let config = PushConfig::new().with_server_url("https://push.example.com");
/// let push = PushNotifications::with_http(Arc::new(MemoryPlatform::new()), &config)?;
///
/// let _ = push.bootstrap().await;
/// let _ = push.request_consent().await;
/// let _ = push.subscribe().await;
/// let _ = push.register_with_server().await;
///
/// let state = push.state();
/// println!("registered as {:?}", state.push_server_subscription_id());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PushNotifications<P, S> {
    supported: bool,
    registrar: WorkerRegistrar<P>,
    consent: ConsentManager<P>,
    subscriptions: SubscriptionManager<P>,
    server: S,
    state: watch::Sender<PushState>,
    /// Bit set of phases currently in flight (see `Phase::bit`).
    in_flight: Mutex<u8>,
    attached: AtomicBool,
}

impl<P: PushPlatform, S: RegistrationServer> PushNotifications<P, S> {
    /// Creates the state machine.
    ///
    /// Push support is probed once here and never re-evaluated.
    #[must_use]
    pub fn new(platform: Arc<P>, server: S, config: &PushConfig) -> Self {
        let capabilities = Capabilities::probe(platform.as_ref());
        let supported = capabilities.is_push_supported();

        let registrar =
            WorkerRegistrar::new(Arc::clone(&platform), &capabilities, config.worker_script());
        let consent = ConsentManager::new(Arc::clone(&platform), &capabilities);
        let subscriptions = SubscriptionManager::new(platform, config.subscribe_options());

        let mut initial = PushState::new(supported);
        initial.set_consent(consent.current_consent());
        let (state, _) = watch::channel(initial);

        if !supported {
            tracing::info!("Push notifications are not supported; all actions are disabled");
        }

        Self {
            supported,
            registrar,
            consent,
            subscriptions,
            server,
            state,
            in_flight: Mutex::new(0),
            attached: AtomicBool::new(true),
        }
    }

    /// Returns whether the platform supports push notifications.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> PushState {
        self.state.borrow().clone()
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<PushState> {
        self.state.subscribe()
    }

    /// Returns the active worker registration, if bootstrap registered one.
    #[must_use]
    pub fn worker(&self) -> Option<WorkerRegistration> {
        self.registrar.active()
    }

    /// Returns the registration server.
    #[must_use]
    pub fn server(&self) -> &S {
        &self.server
    }

    /// Returns whether results are still applied to the state.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Detaches the state machine from its consumer.
    ///
    /// Phases still in flight run to completion but their results are
    /// discarded, and later triggers are skipped.
    pub fn detach(&self) {
        if self.attached.swap(false, Ordering::AcqRel) {
            tracing::debug!("Push state machine detached");
        }
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    /// Registers the worker and rehydrates the existing subscription.
    ///
    /// Both steps run concurrently. A failed worker registration is reported
    /// as the phase error but does not prevent the subscription from being
    /// restored. The consent state is refreshed from the platform.
    pub async fn bootstrap(&self) -> PhaseOutcome {
        let operation = async {
            let (worker, existing) = tokio::join!(
                self.registrar.register(),
                self.subscriptions.get_existing_subscription()
            );
            Ok::<_, Error>((worker, existing, self.consent.current_consent()))
        };

        self.run_phase(
            Phase::Bootstrap,
            operation,
            |state, (worker, existing, consent)| {
                state.set_consent(consent);
                state.rehydrate_subscription(existing);
                worker.map(|_| ())
            },
        )
        .await
    }

    /// Prompts the user for notification permission.
    ///
    /// Any answer other than granted leaves the subscription untouched and
    /// stores a `Consent denied` error.
    pub async fn request_consent(&self) -> PhaseOutcome {
        self.run_phase(
            Phase::RequestConsent,
            self.consent.request_consent(),
            |state, consent| {
                state.set_consent(consent);
                if consent.is_granted() {
                    Ok(())
                } else {
                    Err(Error::ConsentDenied(consent))
                }
            },
        )
        .await
    }

    /// Creates a new push subscription.
    ///
    /// On success the subscription is replaced and the server registration
    /// id is dropped, since it belonged to the previous subscription.
    pub async fn subscribe(&self) -> PhaseOutcome {
        self.run_phase(
            Phase::Subscribe,
            self.subscriptions.create_subscription(),
            |state, subscription| {
                state.replace_subscription(subscription);
                Ok(())
            },
        )
        .await
    }

    /// Submits the current subscription to the registration server.
    ///
    /// Fails with a precondition violation, without contacting the server,
    /// if no subscription exists. The returned id is discarded if the
    /// subscription was replaced while the request was in flight.
    pub async fn register_with_server(&self) -> PhaseOutcome {
        let operation = async {
            let subscription = self
                .state
                .borrow()
                .user_subscription()
                .cloned()
                .ok_or(PreconditionError::MissingSubscription)?;
            let id = self.server.submit(&subscription).await?;
            Ok::<_, Error>((subscription, id))
        };

        self.run_phase(
            Phase::RegisterWithServer,
            operation,
            |state, (subscription, id)| {
                if state.set_registration_id(&subscription, id) {
                    Ok(())
                } else {
                    Err(PreconditionError::SubscriptionReplaced.into())
                }
            },
        )
        .await
    }

    /// Asks the registration server to confirm the stored id.
    ///
    /// Fails with a precondition violation, without contacting the server,
    /// if no id has been assigned yet.
    pub async fn confirm_with_server(&self) -> PhaseOutcome {
        let operation = async {
            let id = self
                .state
                .borrow()
                .push_server_subscription_id()
                .cloned()
                .ok_or(PreconditionError::MissingRegistrationId)?;
            self.server.fetch_status(&id).await
        };

        self.run_phase(Phase::ConfirmWithServer, operation, |_, ()| Ok(()))
            .await
    }

    // =========================================================================
    // Phase runner
    // =========================================================================

    /// Runs one phase.
    ///
    /// `apply` receives the delegate's value and may still reject it, in
    /// which case its partial updates are kept and the error is recorded.
    async fn run_phase<T, F, A>(&self, phase: Phase, operation: F, apply: A) -> PhaseOutcome
    where
        F: Future<Output = Result<T, Error>>,
        A: FnOnce(&mut PushState, T) -> Result<(), Error>,
    {
        if !self.supported {
            return PhaseOutcome::Skipped(SkipReason::Unsupported);
        }
        if !self.is_attached() {
            return PhaseOutcome::Skipped(SkipReason::Detached);
        }

        {
            let mut in_flight = self.in_flight.lock();
            if *in_flight & phase.bit() != 0 {
                tracing::debug!(%phase, "Phase already in flight, ignoring trigger");
                return PhaseOutcome::Skipped(SkipReason::AlreadyInFlight);
            }
            *in_flight |= phase.bit();
            self.state.send_modify(PushState::begin);
        }

        tracing::debug!(%phase, "Phase started");
        let result = operation.await;

        let mut in_flight = self.in_flight.lock();
        *in_flight &= !phase.bit();
        let loading = *in_flight != 0;

        if !self.is_attached() {
            tracing::debug!(%phase, "Discarding result of detached phase");
            return PhaseOutcome::Skipped(SkipReason::Detached);
        }

        let mut failure = None;
        self.state.send_modify(|state| {
            let error = match result.and_then(|value| apply(state, value)) {
                Ok(()) => None,
                Err(err) => {
                    tracing::warn!(%phase, error = %err, "Phase failed");
                    Some(OperationError::from(&err))
                }
            };
            failure.clone_from(&error);
            state.settle(loading, error);
        });
        drop(in_flight);

        match failure {
            Some(error) => PhaseOutcome::Failed(error),
            None => {
                tracing::debug!(%phase, "Phase completed");
                PhaseOutcome::Completed
            }
        }
    }
}

#[cfg(feature = "http")]
impl<P: PushPlatform> PushNotifications<P, crate::registration::HttpRegistrationClient> {
    /// Creates the state machine with an HTTP registration client built from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns error if `config` has no server URL or the HTTP client cannot
    /// be created.
    pub fn with_http(platform: Arc<P>, config: &PushConfig) -> crate::Result<Self> {
        let registration = config.registration_config().ok_or_else(|| {
            crate::error::ProtocolError::InvalidAddress("server URL is required".to_string())
        })?;
        let server = registration.into_client()?;
        Ok(Self::new(platform, server, config))
    }
}
