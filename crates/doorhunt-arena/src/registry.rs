//! The arena registry: a concurrent map of arena snapshots.

use std::sync::Arc;

use dashmap::DashMap;
use doorhunt_types::{ArenaId, LocationRef};

use crate::{location_slot, setting, ArenaConfig, ArenaDefaults, ArenaError};

/// Holds every known arena as an immutable `Arc<ArenaConfig>`.
///
/// Readers get a cheap clone of the current snapshot. Writers build a new
/// config from the old one and swap it in, so anyone still holding the old
/// `Arc` (a running session) keeps seeing the values it started with.
#[derive(Debug, Default)]
pub struct ArenaRegistry {
    arenas: DashMap<ArenaId, Arc<ArenaConfig>>,
    defaults: ArenaDefaults,
}

impl ArenaRegistry {
    /// Creates an empty registry that seeds new arenas from `defaults`.
    pub fn new(defaults: ArenaDefaults) -> Self {
        Self {
            arenas: DashMap::new(),
            defaults,
        }
    }

    /// Registers a fully built config, e.g. one loaded from storage.
    ///
    /// Replaces any previous config with the same id.
    pub fn insert(&self, config: ArenaConfig) -> Result<Arc<ArenaConfig>, ArenaError> {
        config.validate()?;
        let config = Arc::new(config);
        self.arenas.insert(config.id.clone(), Arc::clone(&config));
        tracing::debug!(arena = %config.id, "arena registered");
        Ok(config)
    }

    /// Creates a new, unconfigured arena seeded from the defaults.
    pub fn create(&self, id: ArenaId, display_name: &str) -> Result<Arc<ArenaConfig>, ArenaError> {
        let config = ArenaConfig::new(id.clone(), display_name, &self.defaults);
        config.validate()?;
        match self.arenas.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                Err(ArenaError::AlreadyExists(existing.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let config = Arc::new(config);
                slot.insert(Arc::clone(&config));
                tracing::info!(arena = %config.id, "arena created");
                Ok(config)
            }
        }
    }

    /// Removes an arena, returning its last snapshot.
    pub fn remove(&self, id: &ArenaId) -> Result<Arc<ArenaConfig>, ArenaError> {
        let (_, config) = self
            .arenas
            .remove(id)
            .ok_or_else(|| ArenaError::Unknown(id.clone()))?;
        tracing::info!(arena = %id, "arena deleted");
        Ok(config)
    }

    /// Returns the current snapshot for an arena.
    pub fn get(&self, id: &ArenaId) -> Option<Arc<ArenaConfig>> {
        self.arenas.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// All arenas, sorted by id.
    pub fn list(&self) -> Vec<Arc<ArenaConfig>> {
        let mut arenas: Vec<_> = self
            .arenas
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        arenas.sort_by(|a, b| a.id.cmp(&b.id));
        arenas
    }

    pub fn len(&self) -> usize {
        self.arenas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arenas.is_empty()
    }

    /// Applies a numeric setting by key through the setting table.
    pub fn apply_setting(
        &self,
        id: &ArenaId,
        key: &str,
        value: i64,
    ) -> Result<Arc<ArenaConfig>, ArenaError> {
        let spec = setting(key).ok_or_else(|| ArenaError::UnknownSetting(key.to_string()))?;
        let updated = self.update(id, |config| spec.apply(config, value))?;
        tracing::info!(arena = %id, setting = spec.key, value, "arena setting changed");
        Ok(updated)
    }

    /// Sets or clears a location slot by key through the slot table.
    pub fn set_location(
        &self,
        id: &ArenaId,
        slot: &str,
        location: Option<LocationRef>,
    ) -> Result<Arc<ArenaConfig>, ArenaError> {
        let slot = location_slot(slot).ok_or_else(|| ArenaError::UnknownSlot(slot.to_string()))?;
        let updated = self.update(id, |config| {
            slot.set(config, location);
            Ok(())
        })?;
        tracing::info!(
            arena = %id,
            slot = slot.key,
            configured = updated.is_configured(),
            "arena location changed"
        );
        Ok(updated)
    }

    pub fn set_display_name(&self, id: &ArenaId, name: &str) -> Result<Arc<ArenaConfig>, ArenaError> {
        self.update(id, |config| {
            config.display_name = name.to_string();
            Ok(())
        })
    }

    /// Copy-on-write edit: the closure mutates a clone, which replaces the
    /// stored snapshot only if it succeeds.
    fn update(
        &self,
        id: &ArenaId,
        edit: impl FnOnce(&mut ArenaConfig) -> Result<(), ArenaError>,
    ) -> Result<Arc<ArenaConfig>, ArenaError> {
        let mut entry = self
            .arenas
            .get_mut(id)
            .ok_or_else(|| ArenaError::Unknown(id.clone()))?;
        let mut next = ArenaConfig::clone(entry.value());
        edit(&mut next)?;
        next.validate()?;
        let next = Arc::new(next);
        *entry.value_mut() = Arc::clone(&next);
        Ok(next)
    }
}
