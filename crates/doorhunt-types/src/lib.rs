//! Shared vocabulary for DoorHunt.
//!
//! This crate defines the types every other layer speaks:
//!
//! - **Identity** ([`PlayerId`], [`ArenaId`], [`LocationRef`]): who and
//!   where. Locations are opaque references; the core never interprets
//!   them, it only hands them back to the roster collaborator.
//! - **Round vocabulary** ([`Phase`], [`Role`], [`RoundOutcome`]): the
//!   states and results of a round.
//! - **Results** ([`Outcome`]): the success tag every mutating operation
//!   returns alongside its rejection enum.
//! - **Display** ([`StatusUpdate`]): the per-tick payload pushed to
//!   status displays.
//!
//! # Architecture
//!
//! ```text
//! Engine (facade) → Session layer → Arena layer → Types (this crate)
//!                        ↓
//!                      Clock
//! ```

mod phase;
mod types;

pub use phase::{Phase, RoundOutcome, StatusUpdate};
pub use types::{ArenaId, LocationRef, Outcome, PlayerId, Role};
