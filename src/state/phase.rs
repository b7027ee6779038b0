// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State machine phases and their outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OperationError;

/// A step of the push lifecycle.
///
/// Phases are listed in their usual trigger order, but each one can be
/// triggered on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Worker registration and subscription rehydration at startup.
    Bootstrap,
    /// Permission prompt.
    RequestConsent,
    /// Creation of a new push subscription.
    Subscribe,
    /// Submission of the subscription to the registration server.
    RegisterWithServer,
    /// Confirmation that the server knows the registration id.
    ConfirmWithServer,
}

impl Phase {
    /// All phases in trigger order.
    pub const ALL: [Self; 5] = [
        Self::Bootstrap,
        Self::RequestConsent,
        Self::Subscribe,
        Self::RegisterWithServer,
        Self::ConfirmWithServer,
    ];

    /// Returns the kebab-case name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::RequestConsent => "request-consent",
            Self::Subscribe => "subscribe",
            Self::RegisterWithServer => "register-with-server",
            Self::ConfirmWithServer => "confirm-with-server",
        }
    }

    /// Bit used to track this phase in an in-flight set.
    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a trigger did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The platform lacks push support.
    Unsupported,
    /// The same phase is already running.
    AlreadyInFlight,
    /// The state machine was detached from its consumer.
    Detached,
}

/// How a triggered phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a phase outcome reports whether the action had any effect"]
pub enum PhaseOutcome {
    /// The phase ran and its result was applied.
    Completed,
    /// The phase ran and failed; the error was stored in the state.
    Failed(OperationError),
    /// The phase did not run, or its result was discarded.
    Skipped(SkipReason),
}

impl PhaseOutcome {
    /// Returns `true` if the phase completed successfully.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns the error if the phase failed.
    #[must_use]
    pub fn error(&self) -> Option<&OperationError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Completed | Self::Skipped(_) => None,
        }
    }

    /// Returns the skip reason if the phase did not run.
    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped(reason) => Some(*reason),
            Self::Completed | Self::Failed(_) => None,
        }
    }
}
