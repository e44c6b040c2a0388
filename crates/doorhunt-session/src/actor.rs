//! Session actor: one Tokio task per arena that owns its [`Session`].
//!
//! Commands and timer deliveries arrive on two channels and are handled
//! one at a time, so a countdown expiring can never interleave with a
//! leave that invalidates it. After every message the actor republishes
//! the session's [`SessionStatus`] on a watch channel.

use std::sync::Arc;

use doorhunt_arena::ArenaConfig;
use doorhunt_clock::{TimerHandle, TokioScheduler};
use doorhunt_types::{ArenaId, Outcome, PlayerId};
use tokio::sync::{mpsc, oneshot, watch};

use crate::{PlayerIndex, Services, Session, SessionConfig, SessionError, SessionSnapshot, SessionStatus};

type Reply<T> = oneshot::Sender<T>;

/// Requests a [`SessionHandle`] can make of its actor.
pub(crate) enum SessionCommand {
    Join {
        player: PlayerId,
        arena: Arc<ArenaConfig>,
        reply: Reply<Result<Outcome, SessionError>>,
    },
    Leave {
        player: PlayerId,
        silent: bool,
        reply: Reply<Result<Outcome, SessionError>>,
    },
    Eliminate {
        attacker: PlayerId,
        victim: PlayerId,
        reply: Reply<Outcome>,
    },
    RecordAttack {
        attacker: PlayerId,
        victim: PlayerId,
        reply: Reply<Outcome>,
    },
    ResolveIndirect {
        victim: PlayerId,
        reply: Reply<Outcome>,
    },
    ForceEnd {
        reply: Reply<Outcome>,
    },
    Snapshot {
        reply: Reply<SessionSnapshot>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

/// Handle to a running session actor. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    arena: ArenaId,
    sender: mpsc::Sender<SessionCommand>,
    status: watch::Receiver<SessionStatus>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("arena", &self.arena)
            .field("status", &*self.status.borrow())
            .finish()
    }
}

impl SessionHandle {
    pub fn arena(&self) -> &ArenaId {
        &self.arena
    }

    /// The status published after the actor's last message.
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// A receiver that wakes on every status change.
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Joins `player`, first adopting `arena` if the session is between
    /// rounds.
    pub async fn join(
        &self,
        player: PlayerId,
        arena: Arc<ArenaConfig>,
    ) -> Result<Outcome, SessionError> {
        self.request(|reply| SessionCommand::Join {
            player,
            arena,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, player: PlayerId, silent: bool) -> Result<Outcome, SessionError> {
        self.request(|reply| SessionCommand::Leave {
            player,
            silent,
            reply,
        })
        .await?
    }

    pub async fn eliminate(
        &self,
        attacker: PlayerId,
        victim: PlayerId,
    ) -> Result<Outcome, SessionError> {
        self.request(|reply| SessionCommand::Eliminate {
            attacker,
            victim,
            reply,
        })
        .await
    }

    pub async fn record_attack(
        &self,
        attacker: PlayerId,
        victim: PlayerId,
    ) -> Result<Outcome, SessionError> {
        self.request(|reply| SessionCommand::RecordAttack {
            attacker,
            victim,
            reply,
        })
        .await
    }

    pub async fn resolve_indirect_elimination(
        &self,
        victim: PlayerId,
    ) -> Result<Outcome, SessionError> {
        self.request(|reply| SessionCommand::ResolveIndirect { victim, reply })
            .await
    }

    pub async fn force_end(&self) -> Result<Outcome, SessionError> {
        self.request(|reply| SessionCommand::ForceEnd { reply }).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    /// Returns every player out silently and stops the actor.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Shutdown { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| SessionError::Unavailable(self.arena.clone()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::Unavailable(self.arena.clone()))
    }
}

/// The task side of a [`SessionHandle`].
struct SessionActor {
    session: Session,
    commands: mpsc::Receiver<SessionCommand>,
    fired: mpsc::UnboundedReceiver<TimerHandle>,
    status: watch::Sender<SessionStatus>,
}

impl SessionActor {
    async fn run(mut self) {
        tracing::info!(arena = %self.session.arena_id(), "session actor started");

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        // Every handle is gone.
                        self.session.shutdown();
                        break;
                    };
                    if !self.handle(command) {
                        break;
                    }
                }
                Some(handle) = self.fired.recv() => {
                    self.session.on_timer(handle);
                    self.publish();
                }
            }
        }

        tracing::info!(arena = %self.session.arena_id(), "session actor stopped");
    }

    /// Handles one command. Returns `false` once the actor should stop.
    ///
    /// Status is published before replying so a caller that awaited the
    /// reply already sees the new status.
    fn handle(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Join {
                player,
                arena,
                reply,
            } => {
                self.session.adopt_arena(arena);
                let result = self.session.join(player);
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::Leave {
                player,
                silent,
                reply,
            } => {
                let result = self.session.leave(player, silent);
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::Eliminate {
                attacker,
                victim,
                reply,
            } => {
                let outcome = self.session.eliminate(attacker, victim);
                self.publish();
                let _ = reply.send(outcome);
            }
            SessionCommand::RecordAttack {
                attacker,
                victim,
                reply,
            } => {
                let outcome = self.session.record_attack(attacker, victim);
                let _ = reply.send(outcome);
            }
            SessionCommand::ResolveIndirect { victim, reply } => {
                let outcome = self.session.resolve_indirect_elimination(victim);
                self.publish();
                let _ = reply.send(outcome);
            }
            SessionCommand::ForceEnd { reply } => {
                let outcome = self.session.force_end();
                self.publish();
                let _ = reply.send(outcome);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            SessionCommand::Shutdown { reply } => {
                tracing::info!(arena = %self.session.arena_id(), "session shutting down");
                self.session.shutdown();
                self.publish();
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn publish(&self) {
        let next = self.session.status();
        self.status.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

/// Spawns a session actor for `arena` and returns a handle to it.
///
/// Must be called from within a Tokio runtime.
pub(crate) fn spawn_session(
    arena: Arc<ArenaConfig>,
    config: SessionConfig,
    services: Services,
    index: PlayerIndex,
) -> SessionHandle {
    let (scheduler, fired) = TokioScheduler::new(&config.clock);
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
    let arena_id = arena.id.clone();

    let session = Session::new(arena, config, services, index, Box::new(scheduler));
    let (status_tx, status_rx) = watch::channel(session.status());

    let actor = SessionActor {
        session,
        commands: rx,
        fired,
        status: status_tx,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        arena: arena_id,
        sender: tx,
        status: status_rx,
    }
}
