//! Data-driven tables of editable arena settings and location slots.
//!
//! Each entry bundles a key, display metadata, and plain function pointers
//! for reading, writing, and validating the field. Admin surfaces look
//! entries up by key and call through them; adding a setting means adding a
//! row here, nothing else.

use doorhunt_types::LocationRef;

use crate::{ArenaConfig, ArenaError};

// ---------------------------------------------------------------------------
// Numeric settings
// ---------------------------------------------------------------------------

/// One editable numeric setting.
pub struct SettingSpec {
    /// Stable key used by admin commands and config files.
    pub key: &'static str,
    pub display_name: &'static str,
    /// Prompt shown when asking an admin for a new value.
    pub prompt: &'static str,
    getter: fn(&ArenaConfig) -> u32,
    setter: fn(&mut ArenaConfig, u32),
    validator: fn(&ArenaConfig, i64) -> bool,
}

impl SettingSpec {
    pub fn get(&self, arena: &ArenaConfig) -> u32 {
        (self.getter)(arena)
    }

    /// Whether `value` would be accepted for `arena` as it currently stands.
    pub fn is_valid(&self, arena: &ArenaConfig, value: i64) -> bool {
        u32::try_from(value).is_ok() && (self.validator)(arena, value)
    }

    /// Validates and writes `value`.
    pub fn apply(&self, arena: &mut ArenaConfig, value: i64) -> Result<(), ArenaError> {
        if !self.is_valid(arena, value) {
            return Err(ArenaError::InvalidValue {
                key: self.key,
                value,
            });
        }
        let value = u32::try_from(value).map_err(|_| ArenaError::InvalidValue {
            key: self.key,
            value,
        })?;
        (self.setter)(arena, value);
        Ok(())
    }
}

impl std::fmt::Debug for SettingSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingSpec").field("key", &self.key).finish()
    }
}

/// Every editable numeric setting.
pub static SETTINGS: [SettingSpec; 6] = [
    SettingSpec {
        key: "min-players",
        display_name: "Min Players",
        prompt: "Enter the minimum players required to start",
        getter: |a| a.min_players as u32,
        setter: |a, v| a.min_players = v as usize,
        validator: |a, v| v >= 1 && v <= a.max_players as i64,
    },
    SettingSpec {
        key: "max-players",
        display_name: "Max Players",
        prompt: "Enter the maximum players allowed",
        getter: |a| a.max_players as u32,
        setter: |a, v| a.max_players = v as usize,
        validator: |a, v| v >= 1 && v >= a.min_players as i64,
    },
    SettingSpec {
        key: "recruit",
        display_name: "Lobby Countdown",
        prompt: "Enter the recruiting countdown in seconds",
        getter: |a| a.recruit_countdown_secs,
        setter: |a, v| a.recruit_countdown_secs = v,
        validator: |_, v| v >= 0,
    },
    SettingSpec {
        key: "prepare",
        display_name: "Prepare Duration",
        prompt: "Enter the prepare duration in seconds",
        getter: |a| a.prepare_secs,
        setter: |a, v| a.prepare_secs = v,
        validator: |_, v| v >= 0,
    },
    SettingSpec {
        key: "hide",
        display_name: "Hiding Time",
        prompt: "Enter the hiding time in seconds",
        getter: |a| a.hide_secs,
        setter: |a, v| a.hide_secs = v,
        validator: |_, v| v >= 0,
    },
    SettingSpec {
        key: "live",
        display_name: "Hunt Duration",
        prompt: "Enter the hunt duration in seconds",
        getter: |a| a.live_secs,
        setter: |a, v| a.live_secs = v,
        validator: |_, v| v >= 0,
    },
];

/// Looks up a setting by key (case-insensitive).
pub fn setting(key: &str) -> Option<&'static SettingSpec> {
    SETTINGS.iter().find(|s| s.key.eq_ignore_ascii_case(key))
}

// ---------------------------------------------------------------------------
// Location slots
// ---------------------------------------------------------------------------

/// One addressable location slot.
pub struct LocationSlot {
    pub key: &'static str,
    pub display_name: &'static str,
    getter: fn(&ArenaConfig) -> Option<&LocationRef>,
    setter: fn(&mut ArenaConfig, Option<LocationRef>),
}

impl LocationSlot {
    pub fn get<'a>(&self, arena: &'a ArenaConfig) -> Option<&'a LocationRef> {
        (self.getter)(arena)
    }

    /// Sets (or clears, with `None`) the slot.
    pub fn set(&self, arena: &mut ArenaConfig, location: Option<LocationRef>) {
        (self.setter)(arena, location)
    }
}

impl std::fmt::Debug for LocationSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSlot").field("key", &self.key).finish()
    }
}

pub static LOCATION_SLOTS: [LocationSlot; 3] = [
    LocationSlot {
        key: "lobby",
        display_name: "Lobby",
        getter: |a| a.lobby.as_ref(),
        setter: |a, l| a.lobby = l,
    },
    LocationSlot {
        key: "evader-spawn",
        display_name: "Evader Spawn",
        getter: |a| a.evader_spawn.as_ref(),
        setter: |a, l| a.evader_spawn = l,
    },
    LocationSlot {
        key: "hunter-holding",
        display_name: "Hunter Holding Spawn",
        getter: |a| a.hunter_holding.as_ref(),
        setter: |a, l| a.hunter_holding = l,
    },
];

/// Looks up a location slot by key (case-insensitive).
pub fn location_slot(key: &str) -> Option<&'static LocationSlot> {
    LOCATION_SLOTS.iter().find(|s| s.key.eq_ignore_ascii_case(key))
}
