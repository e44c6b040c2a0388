//! Recording collaborators and a virtual-clock harness shared by the
//! integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use doorhunt_arena::{ArenaConfig, ArenaDefaults};
use doorhunt_clock::ManualScheduler;
use doorhunt_session::{
    CollaboratorError, LoadoutProvider, Notifier, PlayerIndex, RosterSink, Services, Session,
    SessionConfig,
};
use doorhunt_types::{ArenaId, LocationRef, Outcome, Phase, PlayerId, Role, StatusUpdate};
use parking_lot::Mutex;

pub const LOBBY: &str = "lobby";
pub const SPAWN: &str = "spawn";
pub const HOLDING: &str = "holding";

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Broadcast {
        recipients: Vec<PlayerId>,
        text: String,
    },
    Status(StatusUpdate),
    Relocate(PlayerId, LocationRef),
    Reset(PlayerId),
    Equip(PlayerId, Role),
}

/// Captures every collaborator call in order.
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn equips_of(&self, player: PlayerId) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, Call::Equip(p, Role::Hunter) if *p == player))
            .count()
    }

    pub fn last_location_of(&self, player: PlayerId) -> Option<LocationRef> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            Call::Relocate(p, loc) if *p == player => Some(loc.clone()),
            _ => None,
        })
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Broadcast { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<StatusUpdate> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Status(status) => Some(status.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl Notifier for Recorder {
    fn broadcast(
        &self,
        _arena: &ArenaId,
        recipients: &[PlayerId],
        text: &str,
    ) -> Result<(), CollaboratorError> {
        self.push(Call::Broadcast {
            recipients: recipients.to_vec(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn update_status(&self, status: &StatusUpdate) -> Result<(), CollaboratorError> {
        self.push(Call::Status(status.clone()));
        Ok(())
    }
}

impl RosterSink for Recorder {
    fn relocate(&self, player: PlayerId, location: &LocationRef) -> Result<(), CollaboratorError> {
        self.push(Call::Relocate(player, location.clone()));
        Ok(())
    }

    fn reset_player_state(&self, player: PlayerId) -> Result<(), CollaboratorError> {
        self.push(Call::Reset(player));
        Ok(())
    }
}

impl LoadoutProvider for Recorder {
    fn equip(&self, player: PlayerId, role: Role) -> Result<(), CollaboratorError> {
        self.push(Call::Equip(player, role));
        Ok(())
    }
}

pub fn recording_services(recorder: &Arc<Recorder>) -> Services {
    Services::new(recorder.clone(), recorder.clone(), recorder.clone())
}

/// Fails every call.
#[derive(Debug, Default)]
pub struct Broken;

impl Notifier for Broken {
    fn broadcast(&self, _: &ArenaId, _: &[PlayerId], _: &str) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::new("notifier", "display offline"))
    }

    fn update_status(&self, _: &StatusUpdate) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::new("notifier", "display offline"))
    }
}

impl RosterSink for Broken {
    fn relocate(&self, _: PlayerId, _: &LocationRef) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::new("roster", "world unloaded"))
    }

    fn reset_player_state(&self, _: PlayerId) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::new("roster", "world unloaded"))
    }
}

impl LoadoutProvider for Broken {
    fn equip(&self, _: PlayerId, _: Role) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::new("loadout", "kit plugin missing"))
    }
}

// ---------------------------------------------------------------------------
// Arena fixtures
// ---------------------------------------------------------------------------

/// A configured arena: min 2, max 8, recruit 10, prepare 5, hide 5, live 60.
pub fn arena() -> ArenaConfig {
    arena_with(ArenaDefaults {
        min_players: 2,
        max_players: 8,
        recruit_countdown_secs: 10,
        prepare_secs: 5,
        hide_secs: 5,
        live_secs: 60,
    })
}

pub fn arena_with(defaults: ArenaDefaults) -> ArenaConfig {
    let mut config = ArenaConfig::new(ArenaId::new("docks"), "The Docks", &defaults);
    config.lobby = Some(LocationRef::new(LOBBY));
    config.evader_spawn = Some(LocationRef::new(SPAWN));
    config.hunter_holding = Some(LocationRef::new(HOLDING));
    config
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        end_cooldown_secs: 10,
        announce_delay_secs: 1,
        ..SessionConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A session on a virtual clock with recording collaborators.
pub struct Harness {
    pub clock: ManualScheduler,
    pub recorder: Arc<Recorder>,
    pub index: PlayerIndex,
    pub session: Session,
}

impl Harness {
    pub fn new(arena: ArenaConfig) -> Self {
        Self::with_config(arena, session_config())
    }

    pub fn with_config(arena: ArenaConfig, config: SessionConfig) -> Self {
        let recorder = Arc::new(Recorder::default());
        Self::with_services(arena, config, recording_services(&recorder), recorder)
    }

    pub fn with_services(
        arena: ArenaConfig,
        config: SessionConfig,
        services: Services,
        recorder: Arc<Recorder>,
    ) -> Self {
        let clock = ManualScheduler::new();
        let index = PlayerIndex::new();
        let session = Session::new(
            Arc::new(arena),
            config,
            services,
            index.clone(),
            Box::new(clock.clone()),
        );
        Self {
            clock,
            recorder,
            index,
            session,
        }
    }

    /// Advances virtual time by whole seconds, delivering fired timers.
    pub fn advance(&mut self, secs: u64) {
        let Self { clock, session, .. } = self;
        clock.advance(Duration::from_secs(secs), |handle| {
            session.on_timer(handle);
        });
    }

    /// Joins the way the manager does: claim the index entry first.
    pub fn join(&mut self, id: u64) -> Outcome {
        let player = PlayerId(id);
        self.index
            .reserve(player, self.session.arena_id().clone())
            .expect("player already indexed");
        self.session.join(player).expect("join rejected")
    }

    pub fn join_all(&mut self, ids: impl IntoIterator<Item = u64>) {
        for id in ids {
            self.join(id);
        }
    }

    /// Joins `count` players and runs the countdown out.
    pub fn start_round(&mut self, count: u64) {
        self.join_all(1..=count);
        let recruit = self.session.arena().recruit_countdown_secs;
        self.advance(u64::from(recruit));
        assert_eq!(self.session.phase(), Phase::Preparing);
    }

    /// Runs from Preparing into Live.
    pub fn release_hunters(&mut self) {
        let arena = Arc::clone(self.session.arena());
        self.advance(u64::from(arena.prepare_secs));
        assert_eq!(self.session.phase(), Phase::Hiding);
        self.advance(u64::from(arena.hide_secs));
        assert_eq!(self.session.phase(), Phase::Live);
    }

    pub fn hunters(&self) -> Vec<PlayerId> {
        self.session.snapshot().hunters
    }

    pub fn evaders(&self) -> Vec<PlayerId> {
        self.session.snapshot().evaders
    }

    /// `hunters ∪ evaders == roster`, disjoint, roster within capacity.
    pub fn assert_partition(&self) {
        let roster: HashSet<_> = self.session.roster().iter().copied().collect();
        let hunters = self.session.hunters();
        let evaders = self.session.evaders();
        assert!(hunters.is_disjoint(evaders), "hunters and evaders overlap");
        let union: HashSet<_> = hunters.union(evaders).copied().collect();
        assert_eq!(union, roster, "role sets diverged from roster");
        assert_eq!(roster.len(), self.session.roster().len(), "duplicate roster entry");
        assert!(self.session.roster().len() <= self.session.arena().max_players);
    }
}
