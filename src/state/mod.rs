// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable push lifecycle state.
//!
//! [`PushState`] is the read-only snapshot a UI renders. It is only ever
//! changed by the state machine, one [`Phase`] at a time; every trigger
//! reports how it ended through a [`PhaseOutcome`].
//!
//! # Examples
//!
//! ```
//! use webpush_lib::state::PushState;
//!
//! let state = PushState::new(true);
//! assert!(state.push_notification_supported());
//! assert!(!state.loading());
//! assert!(state.user_subscription().is_none());
//! ```

mod phase;
mod push_state;

pub use phase::{Phase, PhaseOutcome, SkipReason};
pub use push_state::PushState;
