//! Arena configuration for DoorHunt.
//!
//! An arena is a statically configured venue that hosts at most one round
//! at a time. This crate owns its settings and the registry that hands out
//! immutable snapshots of them:
//!
//! - [`ArenaConfig`]: player limits, phase durations, and the three
//!   locations a round needs.
//! - [`SETTINGS`] / [`LOCATION_SLOTS`]: data-driven tables describing every
//!   editable numeric setting and location slot, so admin tooling iterates
//!   them instead of hard-coding a case per field.
//! - [`ArenaRegistry`]: the concurrent id → config map. Edits replace the
//!   stored `Arc<ArenaConfig>`; sessions keep whatever snapshot they already
//!   hold, so a change only reaches the next round.

mod config;
mod error;
mod registry;
mod settings;

pub use config::{ArenaConfig, ArenaDefaults};
pub use error::ArenaError;
pub use registry::ArenaRegistry;
pub use settings::{location_slot, setting, LocationSlot, SettingSpec, LOCATION_SLOTS, SETTINGS};
