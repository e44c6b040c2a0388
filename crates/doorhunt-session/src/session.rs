//! The round state machine.
//!
//! A [`Session`] is plain synchronous state. It never spawns, locks, or
//! awaits: the actor in [`crate::actor`] owns it and feeds it commands and
//! timer deliveries one at a time, and tests drive it directly with a
//! [`ManualScheduler`](doorhunt_clock::ManualScheduler).
//!
//! ```text
//!  Waiting ──min reached──▶ Countdown ──0──▶ Preparing ──0──▶ Hiding ──0──▶ Live
//!     ▲  ◀──below min────────┘                                    │          │
//!     │                                           no evaders left ▼          │ 0
//!     └──────0── Cooldown ◀──announce delay── Ending ◀────────────┴──────────┘
//! ```
//!
//! Each timed phase runs one repeating tick timer (`phase_timer`). Ending
//! runs a one-shot (`announce_timer`). Every transition cancels the timer
//! it supersedes, and [`Session::on_timer`] ignores any handle it isn't
//! currently holding.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use doorhunt_arena::ArenaConfig;
use doorhunt_clock::{Scheduler, TimerHandle};
use doorhunt_types::{
    ArenaId, LocationRef, Outcome, Phase, PlayerId, Role, RoundOutcome, StatusUpdate,
};
use tracing::{debug, info, trace};

use crate::{
    PlayerIndex, RoleAssigner, RoundSummary, Services, SessionConfig, SessionError,
    SessionSnapshot, SessionStatus,
};

/// One arena's round: membership, roles, timers and kill bookkeeping.
pub struct Session {
    arena: Arc<ArenaConfig>,
    config: SessionConfig,
    services: Services,
    index: PlayerIndex,
    scheduler: Box<dyn Scheduler>,
    roles: RoleAssigner,

    phase: Phase,
    remaining: u32,
    /// Join order. `hunters ∪ evaders` always equals this.
    roster: Vec<PlayerId>,
    hunters: HashSet<PlayerId>,
    evaders: HashSet<PlayerId>,
    /// Hunters picked at role assignment who haven't been released yet.
    held: HashSet<PlayerId>,
    kill_counts: HashMap<PlayerId, u32>,
    /// Victim → last hunter to hit them.
    pending_attacker: HashMap<PlayerId, PlayerId>,
    last_summary: Option<RoundSummary>,

    phase_timer: Option<TimerHandle>,
    announce_timer: Option<TimerHandle>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("arena", &self.arena.id)
            .field("phase", &self.phase)
            .field("remaining", &self.remaining)
            .field("roster", &self.roster)
            .field("phase_timer", &self.phase_timer)
            .field("announce_timer", &self.announce_timer)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates an empty session in [`Phase::Waiting`].
    pub fn new(
        arena: Arc<ArenaConfig>,
        config: SessionConfig,
        services: Services,
        index: PlayerIndex,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            arena,
            config,
            services,
            index,
            scheduler,
            roles: RoleAssigner::default(),
            phase: Phase::Waiting,
            remaining: 0,
            roster: Vec::new(),
            hunters: HashSet::new(),
            evaders: HashSet::new(),
            held: HashSet::new(),
            kill_counts: HashMap::new(),
            pending_attacker: HashMap::new(),
            last_summary: None,
            phase_timer: None,
            announce_timer: None,
        }
    }

    pub fn with_role_assigner(mut self, roles: RoleAssigner) -> Self {
        self.roles = roles;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn arena(&self) -> &Arc<ArenaConfig> {
        &self.arena
    }

    pub fn arena_id(&self) -> &ArenaId {
        &self.arena.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds left in the current timed phase; 0 outside of one.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    pub fn hunters(&self) -> &HashSet<PlayerId> {
        &self.hunters
    }

    pub fn evaders(&self) -> &HashSet<PlayerId> {
        &self.evaders
    }

    pub fn is_member(&self, player: PlayerId) -> bool {
        self.roster.contains(&player)
    }

    pub fn role_of(&self, player: PlayerId) -> Option<Role> {
        if self.hunters.contains(&player) {
            Some(Role::Hunter)
        } else if self.evaders.contains(&player) {
            Some(Role::Evader)
        } else {
            None
        }
    }

    pub fn kill_count(&self, player: PlayerId) -> u32 {
        self.kill_counts.get(&player).copied().unwrap_or(0)
    }

    pub fn pending_attacker(&self, victim: PlayerId) -> Option<PlayerId> {
        self.pending_attacker.get(&victim).copied()
    }

    pub fn last_summary(&self) -> Option<&RoundSummary> {
        self.last_summary.as_ref()
    }

    /// Whether any timer handle is currently held.
    pub fn has_timers(&self) -> bool {
        self.phase_timer.is_some() || self.announce_timer.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase,
            remaining_secs: self.remaining,
            players: self.roster.len(),
            max_players: self.arena.max_players,
            hunters: self.hunters.len(),
            evaders: self.evaders.len(),
        }
    }

    pub fn status_update(&self) -> StatusUpdate {
        StatusUpdate {
            arena: self.arena.id.clone(),
            phase: self.phase,
            remaining_secs: self.remaining,
            hunters: self.hunters.len(),
            evaders: self.evaders.len(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let in_order = |set: &HashSet<PlayerId>| {
            self.roster
                .iter()
                .filter(|player| set.contains(player))
                .copied()
                .collect()
        };
        SessionSnapshot {
            arena: self.arena.id.clone(),
            display_name: self.arena.display_name.clone(),
            phase: self.phase,
            remaining_secs: self.remaining,
            max_players: self.arena.max_players,
            roster: self.roster.clone(),
            hunters: in_order(&self.hunters),
            evaders: in_order(&self.evaders),
            kill_counts: self.kill_counts.iter().map(|(p, k)| (*p, *k)).collect(),
            last_summary: self.last_summary.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Swaps in a newer arena snapshot. Only takes effect between rounds.
    ///
    /// Returns `true` if the snapshot was adopted.
    pub fn adopt_arena(&mut self, arena: Arc<ArenaConfig>) -> bool {
        if self.phase != Phase::Waiting || Arc::ptr_eq(&self.arena, &arena) {
            return false;
        }
        if self.roster.len() > arena.max_players {
            debug!(
                arena = %self.arena.id,
                players = self.roster.len(),
                max = arena.max_players,
                "keeping old arena snapshot, roster exceeds new maximum"
            );
            return false;
        }
        self.arena = arena;
        debug!(arena = %self.arena.id, "arena snapshot refreshed");
        true
    }

    /// Adds a player to the roster and sends them to the lobby.
    ///
    /// Starts the recruiting countdown once the arena minimum is reached.
    pub fn join(&mut self, player: PlayerId) -> Result<Outcome, SessionError> {
        if !self.arena.is_configured() {
            return Err(SessionError::ArenaNotConfigured(self.arena.id.clone()));
        }
        if self.is_member(player) {
            return Err(SessionError::AlreadyInSession(player));
        }
        if !self.phase.is_joinable() {
            return Err(SessionError::SessionBusy(self.arena.id.clone()));
        }
        if self.roster.len() >= self.arena.max_players {
            return Err(SessionError::SessionFull(self.arena.id.clone()));
        }

        self.roster.push(player);
        self.evaders.insert(player);
        self.services.reset_player_state(player);
        self.services.relocate(player, self.arena.lobby.as_ref());

        info!(
            arena = %self.arena.id,
            %player,
            players = self.roster.len(),
            "player joined"
        );
        self.broadcast(&format!(
            "{player} joined ({}/{})",
            self.roster.len(),
            self.arena.max_players
        ));

        if self.phase == Phase::Waiting && self.roster.len() >= self.arena.min_players {
            self.start_countdown();
        } else {
            self.push_status();
        }
        Ok(Outcome::Applied)
    }

    /// Removes a player from every set and returns them out of the arena.
    ///
    /// `silent` suppresses the "left" broadcast (disconnects).
    pub fn leave(&mut self, player: PlayerId, silent: bool) -> Result<Outcome, SessionError> {
        let Some(position) = self.roster.iter().position(|p| *p == player) else {
            return Err(SessionError::NotInSession(player));
        };

        self.roster.remove(position);
        self.hunters.remove(&player);
        self.evaders.remove(&player);
        self.held.remove(&player);
        self.kill_counts.remove(&player);
        self.pending_attacker.remove(&player);
        self.pending_attacker.retain(|_, attacker| *attacker != player);
        self.index.release(player, &self.arena.id);
        self.send_out(player);

        info!(
            arena = %self.arena.id,
            %player,
            silent,
            players = self.roster.len(),
            "player left"
        );
        if !silent {
            self.broadcast(&format!(
                "{player} left ({}/{})",
                self.roster.len(),
                self.arena.max_players
            ));
        }

        if self.roster.is_empty() && self.phase != Phase::Waiting {
            self.reset("roster empty");
        } else {
            self.recheck();
            self.push_status();
        }
        Ok(Outcome::Applied)
    }

    // -----------------------------------------------------------------------
    // Eliminations
    // -----------------------------------------------------------------------

    /// Converts `victim` to a hunter and credits `attacker`.
    ///
    /// Ignored outside Hiding/Live or when `victim` isn't an evader.
    pub fn eliminate(&mut self, attacker: PlayerId, victim: PlayerId) -> Outcome {
        if !self.phase.is_active_play() || !self.evaders.contains(&victim) {
            debug!(
                arena = %self.arena.id,
                %attacker,
                %victim,
                phase = %self.phase,
                "elimination ignored"
            );
            return Outcome::Ignored;
        }
        self.convert(victim, Some(attacker));
        Outcome::Applied
    }

    /// Remembers the last hunter to hit an evader.
    pub fn record_attack(&mut self, attacker: PlayerId, victim: PlayerId) -> Outcome {
        if !self.hunters.contains(&attacker) || !self.evaders.contains(&victim) {
            return Outcome::Ignored;
        }
        self.pending_attacker.insert(victim, attacker);
        trace!(arena = %self.arena.id, %attacker, %victim, "attack recorded");
        Outcome::Applied
    }

    /// Eliminates `victim` on behalf of its recorded attacker.
    ///
    /// Without a recorded attacker who is still a hunter the victim is
    /// converted anyway, but nobody gets the kill.
    pub fn resolve_indirect_elimination(&mut self, victim: PlayerId) -> Outcome {
        if !self.phase.is_active_play() || !self.evaders.contains(&victim) {
            debug!(
                arena = %self.arena.id,
                %victim,
                phase = %self.phase,
                "indirect elimination ignored"
            );
            return Outcome::Ignored;
        }
        let attacker = self
            .pending_attacker
            .remove(&victim)
            .filter(|attacker| self.hunters.contains(attacker));
        self.convert(victim, attacker);
        Outcome::Applied
    }

    // -----------------------------------------------------------------------
    // Abort & shutdown
    // -----------------------------------------------------------------------

    /// Cancels every timer, returns all players out, and resets to Waiting.
    ///
    /// Ignored when already idle and empty.
    pub fn force_end(&mut self) -> Outcome {
        self.cancel_timers();
        if self.phase == Phase::Waiting && self.roster.is_empty() {
            return Outcome::Ignored;
        }
        info!(arena = %self.arena.id, phase = %self.phase, "round aborted");
        self.broadcast("The round was stopped by an administrator.");
        self.enter(Phase::Cooldown, 0);
        self.reset("aborted");
        Outcome::Applied
    }

    /// Like [`force_end`](Self::force_end) but without any broadcast.
    pub fn shutdown(&mut self) {
        self.cancel_timers();
        if self.phase != Phase::Waiting || !self.roster.is_empty() {
            self.reset("shutdown");
        }
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Delivers a fired timer. Handles the session no longer holds are
    /// dropped.
    pub fn on_timer(&mut self, handle: TimerHandle) -> Outcome {
        if self.phase_timer == Some(handle) {
            self.tick();
            Outcome::Applied
        } else if self.announce_timer == Some(handle) {
            self.announce_timer = None;
            self.scheduler.cancel(handle);
            self.enter_cooldown();
            Outcome::Applied
        } else {
            debug!(arena = %self.arena.id, %handle, phase = %self.phase, "stale timer ignored");
            Outcome::Ignored
        }
    }

    fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
        trace!(arena = %self.arena.id, phase = %self.phase, remaining = self.remaining, "tick");

        if self.remaining > 0 {
            if announce_due(self.remaining) {
                match self.phase {
                    Phase::Countdown => {
                        self.broadcast(&format!("Round starts in {}s", self.remaining))
                    }
                    Phase::Preparing => {
                        self.broadcast(&format!("Hiding starts in {}s", self.remaining))
                    }
                    _ => {}
                }
            }
            self.push_status();
            return;
        }

        self.cancel_phase_timer();
        match self.phase {
            Phase::Countdown => self.begin_round(),
            Phase::Preparing => self.start_hiding(),
            Phase::Hiding => self.start_live(),
            Phase::Live => self.end_round(RoundOutcome::EvadersWin),
            Phase::Cooldown => self.reset("cooldown elapsed"),
            Phase::Waiting | Phase::Ending => {
                debug!(arena = %self.arena.id, phase = %self.phase, "phase timer outside a timed phase");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn start_countdown(&mut self) {
        let secs = self.arena.recruit_countdown_secs;
        self.enter(Phase::Countdown, secs);
        self.broadcast(&format!("Enough players! Round starts in {secs}s"));
        if secs == 0 {
            self.begin_round();
        } else {
            self.start_phase_timer();
        }
    }

    fn begin_round(&mut self) {
        if self.roster.is_empty() {
            self.reset("no players at round start");
            return;
        }

        let split = self.roles.assign(&self.roster, &mut rand::rng());
        self.hunters = split.hunters.into_iter().collect();
        self.evaders = split.evaders.into_iter().collect();
        self.held = self.hunters.clone();
        self.kill_counts.clear();
        self.pending_attacker.clear();
        self.last_summary = None;

        info!(
            arena = %self.arena.id,
            hunters = self.hunters.len(),
            evaders = self.evaders.len(),
            "roles assigned"
        );

        let secs = self.arena.prepare_secs;
        self.enter(Phase::Preparing, secs);
        self.broadcast(&format!(
            "Roles assigned: {} hunters, {} evaders. Hiding starts in {secs}s",
            self.hunters.len(),
            self.evaders.len()
        ));
        if secs == 0 {
            self.start_hiding();
        } else {
            self.start_phase_timer();
        }
    }

    fn start_hiding(&mut self) {
        let secs = self.arena.hide_secs;
        self.enter(Phase::Hiding, secs);

        for &player in &self.roster {
            self.services.reset_player_state(player);
            let spot = if self.hunters.contains(&player) {
                self.arena.hunter_holding.as_ref()
            } else {
                self.arena.evader_spawn.as_ref()
            };
            self.services.relocate(player, spot);
        }
        self.broadcast(&format!("Hide! Hunters are released in {secs}s"));

        if self.evaders.is_empty() {
            self.end_round(RoundOutcome::HuntersWin);
        } else if secs == 0 {
            self.start_live();
        } else {
            self.start_phase_timer();
        }
    }

    fn start_live(&mut self) {
        let secs = self.arena.live_secs;
        self.enter(Phase::Live, secs);

        for player in std::mem::take(&mut self.held) {
            if !self.hunters.contains(&player) {
                continue;
            }
            self.services.relocate(player, self.arena.evader_spawn.as_ref());
            self.services.equip(player, Role::Hunter);
        }
        self.broadcast(&format!(
            "The hunters are loose! Survive for {}",
            self.clock_text()
        ));

        if self.evaders.is_empty() {
            self.end_round(RoundOutcome::HuntersWin);
        } else if secs == 0 {
            self.end_round(RoundOutcome::EvadersWin);
        } else {
            self.start_phase_timer();
        }
    }

    fn end_round(&mut self, outcome: RoundOutcome) {
        self.cancel_phase_timer();
        let summary = RoundSummary::new(outcome, &self.roster, &self.evaders, &self.kill_counts);
        self.enter(Phase::Ending, 0);
        info!(
            arena = %self.arena.id,
            %outcome,
            survivors = summary.survivors.len(),
            "round ended"
        );
        for line in summary.lines() {
            self.broadcast(&line);
        }
        self.last_summary = Some(summary);

        self.cancel_announce_timer();
        let delay = self.ticks(self.config.announce_delay_secs);
        self.announce_timer = Some(self.scheduler.schedule_once(delay));
    }

    fn enter_cooldown(&mut self) {
        if self.roster.is_empty() {
            self.reset("roster empty");
            return;
        }
        let secs = self.config.end_cooldown_secs;
        self.enter(Phase::Cooldown, secs);
        for &player in &self.roster {
            self.services.reset_player_state(player);
        }
        self.broadcast(&format!("Returning to the lobby in {secs}s"));
        if secs == 0 {
            self.reset("cooldown elapsed");
        } else {
            self.start_phase_timer();
        }
    }

    /// Back to an empty Waiting session. The last summary survives.
    fn reset(&mut self, reason: &'static str) {
        self.cancel_timers();
        let players = std::mem::take(&mut self.roster);
        for &player in &players {
            self.index.release(player, &self.arena.id);
            self.send_out(player);
        }
        self.hunters.clear();
        self.evaders.clear();
        self.held.clear();
        self.kill_counts.clear();
        self.pending_attacker.clear();

        info!(arena = %self.arena.id, reason, returned = players.len(), "session reset");
        self.enter(Phase::Waiting, 0);
    }

    /// Minimum-player rule before the round, empty-evaders rule during it.
    fn recheck(&mut self) {
        match self.phase {
            Phase::Countdown if self.roster.len() < self.arena.min_players => {
                self.cancel_phase_timer();
                self.enter(Phase::Waiting, 0);
                self.broadcast("Not enough players, countdown cancelled.");
            }
            Phase::Hiding | Phase::Live if self.evaders.is_empty() => {
                self.end_round(RoundOutcome::HuntersWin);
            }
            _ => {}
        }
    }

    fn convert(&mut self, victim: PlayerId, credited: Option<PlayerId>) {
        self.evaders.remove(&victim);
        self.hunters.insert(victim);
        self.pending_attacker.remove(&victim);

        let clock = self.clock_text();
        match credited {
            Some(attacker) => {
                let kills = {
                    let count = self.kill_counts.entry(attacker).or_insert(0);
                    *count += 1;
                    *count
                };
                info!(arena = %self.arena.id, %attacker, %victim, kills, "evader caught");
                self.broadcast(&format!("{victim} was caught by {attacker} ({clock} left)"));
            }
            None => {
                info!(arena = %self.arena.id, %victim, "evader caught without credit");
                self.broadcast(&format!("{victim} was caught ({clock} left)"));
            }
        }

        self.services.reset_player_state(victim);
        self.services.equip(victim, Role::Hunter);
        self.services.relocate(victim, self.arena.evader_spawn.as_ref());

        let before = self.phase;
        self.recheck();
        if self.phase == before {
            self.push_status();
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn enter(&mut self, next: Phase, remaining: u32) {
        let previous = std::mem::replace(&mut self.phase, next);
        self.remaining = remaining;
        info!(
            arena = %self.arena.id,
            from = %previous,
            to = %next,
            remaining,
            "phase transition"
        );
        self.push_status();
    }

    fn start_phase_timer(&mut self) {
        self.cancel_phase_timer();
        let tick = self.ticks(1);
        self.phase_timer = Some(self.scheduler.schedule_repeating(tick));
    }

    fn cancel_phase_timer(&mut self) {
        if let Some(handle) = self.phase_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_announce_timer(&mut self) {
        if let Some(handle) = self.announce_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_timers(&mut self) {
        self.cancel_phase_timer();
        self.cancel_announce_timer();
    }

    fn ticks(&self, count: u32) -> Duration {
        self.config.clock.tick * count
    }

    fn return_location(&self) -> Option<&LocationRef> {
        self.config
            .return_location
            .as_ref()
            .or(self.arena.lobby.as_ref())
    }

    fn send_out(&self, player: PlayerId) {
        self.services.reset_player_state(player);
        self.services.relocate(player, self.return_location());
    }

    fn broadcast(&self, text: &str) {
        self.services.broadcast(&self.arena.id, &self.roster, text);
    }

    fn push_status(&self) {
        self.services.update_status(&self.status_update());
    }

    fn clock_text(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}

fn announce_due(remaining: u32) -> bool {
    remaining <= 5 || remaining % 10 == 0
}
