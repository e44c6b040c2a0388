//! `Engine` builder: wires the arena registry, collaborators and the
//! session manager together.

use std::sync::Arc;

use doorhunt_arena::{ArenaConfig, ArenaRegistry};
use doorhunt_session::{LoadoutProvider, Notifier, RosterSink, Services, SessionManager};

use crate::{DoorHuntError, EngineConfig};

/// Builder for an [`Engine`].
///
/// Collaborators default to no-ops; bind the ones your host provides.
///
/// # Example
///
/// ```rust,ignore
/// let engine = Engine::builder()
///     .config(EngineConfig::from_json_str(&text)?)
///     .notifier(Arc::new(ChatNotifier::new(server)))
///     .roster_sink(Arc::new(WorldRoster::new(server)))
///     .arena(saved_arena)
///     .build()?;
///
/// engine.sessions().join(player, &arena_id).await?;
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    services: Services,
    arenas: Vec<ArenaConfig>,
}

impl EngineBuilder {
    /// Creates a builder with default settings and no-op collaborators.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            services: Services::noop(),
            arenas: Vec::new(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.services = self.services.with_notifier(notifier);
        self
    }

    pub fn roster_sink(mut self, roster: Arc<dyn RosterSink>) -> Self {
        self.services = self.services.with_roster_sink(roster);
        self
    }

    pub fn loadout(mut self, loadout: Arc<dyn LoadoutProvider>) -> Self {
        self.services = self.services.with_loadout(loadout);
        self
    }

    /// Registers an arena at startup, e.g. one loaded from storage.
    pub fn arena(mut self, arena: ArenaConfig) -> Self {
        self.arenas.push(arena);
        self
    }

    /// Validates the configuration and registers every arena.
    ///
    /// No tasks are spawned here; session actors start on the first join.
    pub fn build(self) -> Result<Engine, DoorHuntError> {
        let config = self.config.validated();
        let registry = ArenaRegistry::new(config.arena_defaults.clone());
        for arena in self.arenas {
            registry.insert(arena)?;
        }

        tracing::info!(
            arenas = registry.len(),
            tick_ms = config.session.clock.tick.as_millis() as u64,
            "engine built"
        );

        let sessions = SessionManager::new(Arc::new(registry), self.services, config.session.clone());
        Ok(Engine {
            config,
            sessions: Arc::new(sessions),
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured DoorHunt engine. Cheap to clone.
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    sessions: Arc<SessionManager>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Membership, elimination, admin and query operations.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn arenas(&self) -> &ArenaRegistry {
        self.sessions.arenas()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stops every session and returns all players out.
    pub async fn shutdown(&self) {
        self.sessions.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use doorhunt_arena::{ArenaDefaults, ArenaError};
    use doorhunt_types::ArenaId;

    use super::*;

    #[test]
    fn test_build_registers_arenas() {
        let engine = Engine::builder()
            .arena(ArenaConfig::new(ArenaId::new("docks"), "Docks", &ArenaDefaults::default()))
            .build()
            .unwrap();
        assert_eq!(engine.arenas().len(), 1);
        assert!(engine.arenas().get(&ArenaId::new("docks")).is_some());
    }

    #[test]
    fn test_build_rejects_invalid_arena() {
        let mut arena = ArenaConfig::new(ArenaId::new("docks"), "Docks", &ArenaDefaults::default());
        arena.max_players = 1;
        let result = Engine::builder().arena(arena).build();
        assert!(matches!(
            result,
            Err(DoorHuntError::Arena(ArenaError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_build_uses_configured_arena_defaults() {
        let mut config = EngineConfig::default();
        config.arena_defaults.live_secs = 90;
        let engine = Engine::builder().config(config).build().unwrap();

        let arena = engine
            .sessions()
            .create_arena(&ArenaId::new("attic"), "Attic")
            .unwrap();
        assert_eq!(arena.live_secs, 90);
    }
}
