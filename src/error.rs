// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `webpush_lib` library.
//!
//! Failures are split by origin: the push platform ([`PlatformError`]), the
//! registration server transport ([`ProtocolError`]), server response decoding
//! ([`ParseError`]) and actions triggered out of order ([`PreconditionError`]).
//!
//! The state machine never returns these to its caller. Every failure is
//! converted into an [`OperationError`], the flat `{name, message, code}`
//! value the UI renders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consent::ConsentState;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The host does not expose the push primitives.
    #[error("push notifications are not supported by this platform")]
    Unsupported,

    /// The user did not grant notification permission.
    #[error("notification consent not granted: {0}")]
    ConsentDenied(ConsentState),

    /// The push platform rejected an operation.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Communication with the registration server failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The registration server answered with an unreadable body.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An action was triggered before the data it needs exists.
    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionError),

    /// A value failed validation.
    #[error("invalid value: {0}")]
    Value(#[from] ValueError),
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An unknown permission state string was provided.
    #[error("invalid consent state: {0}")]
    InvalidConsentState(String),

    /// A registration id was empty.
    #[error("registration id must not be empty")]
    EmptyRegistrationId,
}

/// A rejection reported by the push platform.
///
/// Mirrors the shape of a DOM exception: a symbolic `name` such as
/// `AbortError`, a human readable `message` and a legacy numeric `code`.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{name}: {message} (code {code})")]
pub struct PlatformError {
    /// Symbolic error name.
    pub name: String,
    /// Human readable description.
    pub message: String,
    /// Numeric error code.
    pub code: u32,
}

impl PlatformError {
    /// Legacy code of `NotSupportedError`.
    pub const NOT_SUPPORTED_CODE: u32 = 9;
    /// Legacy code of `InvalidStateError`.
    pub const INVALID_STATE_CODE: u32 = 11;
    /// Legacy code of `AbortError`.
    pub const ABORT_CODE: u32 = 20;

    /// Creates a new platform error.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code,
        }
    }

    /// Error raised when an operation needs an active worker and none exists.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new("InvalidStateError", message, Self::INVALID_STATE_CODE)
    }

    /// Error raised when permission is missing for the requested operation.
    #[must_use]
    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new("NotAllowedError", message, 0)
    }

    /// Error raised when an in-progress operation is aborted by the platform.
    #[must_use]
    pub fn abort(message: impl Into<String>) -> Self {
        Self::new("AbortError", message, Self::ABORT_CODE)
    }
}

/// Errors related to registration server communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server rejected request: HTTP {status} - {reason}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

impl ProtocolError {
    /// Returns the HTTP status attached to this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            #[cfg(feature = "http")]
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Rejected { status, .. } => Some(*status),
            Self::InvalidAddress(_) | Self::Timeout(_) => None,
        }
    }
}

/// Errors related to parsing registration server responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Actions triggered out of their supported order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    /// Server registration requested without a local subscription.
    #[error("no push subscription exists yet")]
    MissingSubscription,

    /// Server confirmation requested without a server registration id.
    #[error("subscription has not been registered with the server")]
    MissingRegistrationId,

    /// The subscription was replaced while its registration was in flight.
    #[error("subscription was replaced while registering with the server")]
    SubscriptionReplaced,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The error value exposed to the UI.
///
/// Every failing phase of the state machine stores one of these. It is
/// cleared when the next action starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Symbolic error name.
    pub name: String,
    /// Human readable description.
    pub message: String,
    /// Numeric error code.
    pub code: u32,
}

impl OperationError {
    /// Name used when the user refuses notification permission.
    pub const CONSENT_DENIED: &'static str = "Consent denied";
    /// Name used for server communication failures.
    pub const NETWORK_ERROR: &'static str = "NetworkError";
    /// Name used for actions triggered out of order.
    pub const PRECONDITION_VIOLATION: &'static str = "PreconditionViolation";
    /// Name used when the platform lacks push support.
    pub const NOT_SUPPORTED: &'static str = "NotSupportedError";
    /// Name used for values rejected by validation.
    pub const INVALID_VALUE: &'static str = "InvalidValueError";

    /// Creates a new operation error.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code,
        }
    }

    /// Returns `true` if this error reports a refused consent.
    #[must_use]
    pub fn is_consent_denied(&self) -> bool {
        self.name == Self::CONSENT_DENIED
    }

    /// Returns `true` if this error reports an action triggered out of order.
    #[must_use]
    pub fn is_precondition_violation(&self) -> bool {
        self.name == Self::PRECONDITION_VIOLATION
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} (code {})", self.name, self.message, self.code)
    }
}

impl From<PlatformError> for OperationError {
    fn from(err: PlatformError) -> Self {
        Self {
            name: err.name,
            message: err.message,
            code: err.code,
        }
    }
}

impl From<&Error> for OperationError {
    fn from(err: &Error) -> Self {
        match err {
            Error::Unsupported => Self::new(
                Self::NOT_SUPPORTED,
                err.to_string(),
                PlatformError::NOT_SUPPORTED_CODE,
            ),
            Error::ConsentDenied(_) => Self::new(
                Self::CONSENT_DENIED,
                "You denied the consent to receive notifications",
                0,
            ),
            Error::Platform(platform) => platform.clone().into(),
            Error::Protocol(protocol) => Self::new(
                Self::NETWORK_ERROR,
                protocol.to_string(),
                protocol.status().map_or(0, u32::from),
            ),
            Error::Parse(parse) => Self::new(Self::NETWORK_ERROR, parse.to_string(), 0),
            Error::Precondition(precondition) => {
                Self::new(Self::PRECONDITION_VIOLATION, precondition.to_string(), 0)
            }
            Error::Value(value) => Self::new(Self::INVALID_VALUE, value.to_string(), 0),
        }
    }
}

impl From<Error> for OperationError {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}
