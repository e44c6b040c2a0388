//! # DoorHunt
//!
//! A multi-arena round orchestration engine for hide-and-seek games.
//!
//! Each configured arena hosts at most one round at a time. A round is a
//! timer-driven state machine: players gather, roles are drawn, evaders
//! hide, hunters are released, and every caught evader joins the hunt
//! until the clock runs out or nobody is left hiding.
//!
//! The engine never touches the game world itself. It tells three
//! collaborators what to do ([`Notifier`], [`RosterSink`],
//! [`LoadoutProvider`]) and reacts to the join, leave and elimination
//! events the host reports.
//!
//! ## Layers
//!
//! ```text
//! doorhunt (this crate)  ─ Engine, EngineConfig, DoorHuntError, telemetry
//!        │
//! doorhunt-session       ─ SessionManager, Session state machine, actors
//!        │
//! doorhunt-arena         ─ ArenaConfig, setting tables, ArenaRegistry
//! doorhunt-clock         ─ Scheduler, TokioScheduler, ManualScheduler
//! doorhunt-types         ─ PlayerId, ArenaId, Phase, Outcome, ...
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doorhunt::prelude::*;
//!
//! # async fn run() -> Result<(), DoorHuntError> {
//! doorhunt::telemetry::init_tracing();
//!
//! let engine = Engine::builder().build()?;
//! let docks = ArenaId::new("docks");
//! let sessions = engine.sessions();
//!
//! sessions.create_arena(&docks, "The Docks")?;
//! sessions.set_location(&docks, "lobby", Some(LocationRef::new("docks:lobby")))?;
//! sessions.set_location(&docks, "evader-spawn", Some(LocationRef::new("docks:pier")))?;
//! sessions.set_location(&docks, "hunter-holding", Some(LocationRef::new("docks:cage")))?;
//!
//! sessions.join(PlayerId(1), &docks).await?;
//! sessions.join(PlayerId(2), &docks).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod engine;
mod error;
pub mod telemetry;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::DoorHuntError;

pub use doorhunt_arena::{ArenaConfig, ArenaDefaults, ArenaError, ArenaRegistry};
pub use doorhunt_clock::{ClockConfig, ManualScheduler, MissedTickPolicy, Scheduler, TimerHandle};
pub use doorhunt_session::{
    ArenaListing, CollaboratorError, LoadoutProvider, Notifier, RoundSummary, RosterSink,
    Services, Session, SessionConfig, SessionError, SessionHandle, SessionManager,
    SessionSnapshot, SessionStatus,
};
pub use doorhunt_types::{
    ArenaId, LocationRef, Outcome, Phase, PlayerId, Role, RoundOutcome, StatusUpdate,
};

/// Everything a host integration usually needs.
pub mod prelude {
    pub use crate::{
        ArenaConfig, ArenaId, CollaboratorError, DoorHuntError, Engine, EngineConfig,
        LoadoutProvider, LocationRef, Notifier, Outcome, Phase, PlayerId, Role, RosterSink,
        SessionError, StatusUpdate,
    };
}
