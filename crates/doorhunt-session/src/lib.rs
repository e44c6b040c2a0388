//! Rounds, session actors, and routing for DoorHunt.
//!
//! # Architecture
//!
//! ```text
//!                     ┌────────────────────┐
//!  join / leave ─────▶│   SessionManager   │── PlayerIndex (player → arena)
//!  eliminations       └─────────┬──────────┘
//!  admin abort                  │ one SessionHandle per arena
//!                 ┌─────────────┼─────────────┐
//!                 ▼             ▼             ▼
//!          ┌───────────┐ ┌───────────┐ ┌───────────┐
//!          │  actor    │ │  actor    │ │  actor    │  mpsc commands
//!          │  Session  │ │  Session  │ │  Session  │  + timer deliveries
//!          └─────┬─────┘ └───────────┘ └───────────┘
//!                │
//!                ▼
//!     Services: Notifier · RosterSink · LoadoutProvider
//! ```
//!
//! - [`Session`] is the synchronous round state machine. It owns its phase,
//!   roster, role sets, kill counts and timer handles.
//! - The actor serializes everything that touches one session: commands
//!   from [`SessionHandle`] and timer deliveries from its
//!   [`TokioScheduler`](doorhunt_clock::TokioScheduler).
//! - [`SessionManager`] owns the arena → session and player → arena maps.
//!   Sessions in different arenas run in parallel with no shared lock.

mod actor;
mod config;
mod error;
mod index;
mod manager;
mod roles;
mod services;
mod session;
mod snapshot;

pub use actor::SessionHandle;
pub use config::SessionConfig;
pub use error::SessionError;
pub use index::PlayerIndex;
pub use manager::{ArenaListing, SessionManager};
pub use roles::{RoleAssigner, RoleSplit};
pub use services::{
    CollaboratorError, LoadoutProvider, NoopLoadout, NoopNotifier, NoopRosterSink, Notifier,
    RosterSink, Services,
};
pub use session::Session;
pub use snapshot::{RoundSummary, SessionSnapshot, SessionStatus};
