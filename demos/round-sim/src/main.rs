//! Plays one DoorHunt round against logging collaborators.
//!
//! ```text
//! RUST_LOG=round_sim=info,doorhunt_session=info cargo run -p round-sim
//! ```

use std::sync::Arc;
use std::time::Duration;

use doorhunt::prelude::*;
use doorhunt::SessionHandle;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Stands in for chat, scoreboards, teleports and kits by logging them.
struct World;

impl Notifier for World {
    fn broadcast(
        &self,
        arena: &ArenaId,
        recipients: &[PlayerId],
        text: &str,
    ) -> Result<(), CollaboratorError> {
        tracing::info!(target: "round_sim::chat", %arena, to = recipients.len(), "{text}");
        Ok(())
    }

    fn update_status(&self, status: &StatusUpdate) -> Result<(), CollaboratorError> {
        tracing::debug!(
            target: "round_sim::board",
            arena = %status.arena,
            phase = %status.phase,
            "{} {} | hunters {} | evaders {}",
            status.phase.time_label(),
            status.clock_text(),
            status.hunters,
            status.evaders,
        );
        Ok(())
    }
}

impl RosterSink for World {
    fn relocate(&self, player: PlayerId, location: &LocationRef) -> Result<(), CollaboratorError> {
        tracing::info!(target: "round_sim::world", %player, %location, "teleport");
        Ok(())
    }

    fn reset_player_state(&self, player: PlayerId) -> Result<(), CollaboratorError> {
        tracing::debug!(target: "round_sim::world", %player, "inventory cleared");
        Ok(())
    }
}

impl LoadoutProvider for World {
    fn equip(&self, player: PlayerId, role: Role) -> Result<(), CollaboratorError> {
        tracing::info!(target: "round_sim::world", %player, %role, "kit granted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), DoorHuntError> {
    doorhunt::telemetry::init_tracing_with("round_sim=info,doorhunt_session=info,info");

    // One tick every 100ms keeps the whole round under ten seconds.
    let config = EngineConfig::from_json_str(
        r#"{ "clock": { "tick": 100 }, "end_cooldown_secs": 5 }"#,
    )?;
    let world = Arc::new(World);
    let engine = Engine::builder()
        .config(config)
        .notifier(world.clone())
        .roster_sink(world.clone())
        .loadout(world)
        .build()?;
    let sessions = engine.sessions();

    let docks = ArenaId::new("docks");
    sessions.create_arena(&docks, "The Docks")?;
    sessions.set_location(&docks, "lobby", Some(LocationRef::new("docks:lobby")))?;
    sessions.set_location(&docks, "evader-spawn", Some(LocationRef::new("docks:pier")))?;
    sessions.set_location(&docks, "hunter-holding", Some(LocationRef::new("docks:cage")))?;
    for (key, value) in [("recruit", 10), ("prepare", 5), ("hide", 10), ("live", 40)] {
        sessions.apply_setting(&docks, key, value)?;
    }

    for id in 1..=6 {
        sessions.join(PlayerId(id), &docks).await?;
    }
    let handle = sessions.get_or_create_session(&docks)?;

    wait_for(&handle, |phase| phase == Phase::Live).await?;
    let Some(snapshot) = sessions.snapshot(&docks).await else {
        return Ok(());
    };
    tracing::info!(
        target: "round_sim",
        hunters = ?snapshot.hunters,
        evaders = ?snapshot.evaders,
        "hunt is on"
    );

    // Catch all evaders but one: a direct catch, then a delayed one.
    let hunter = snapshot.hunters[0];
    let mut evaders = snapshot.evaders.into_iter();
    if let Some(victim) = evaders.next() {
        tokio::time::sleep(Duration::from_millis(500)).await;
        sessions.eliminate(hunter, victim).await?;
    }
    if let Some(victim) = evaders.next() {
        sessions.record_attack(hunter, victim).await?;
        tokio::time::sleep(Duration::from_millis(300)).await;
        sessions.resolve_indirect_elimination(victim).await?;
    }
    // One player drops out mid-round.
    if let Some(quitter) = evaders.next() {
        sessions.disconnect(quitter).await?;
    }

    wait_for(&handle, |phase| matches!(phase, Phase::Ending | Phase::Cooldown)).await?;
    if let Some(summary) = sessions.snapshot(&docks).await.and_then(|s| s.last_summary) {
        tracing::info!(target: "round_sim", outcome = %summary.outcome, survivors = ?summary.survivors, "round over");
    }

    wait_for(&handle, |phase| phase == Phase::Waiting).await?;
    tracing::info!(
        target: "round_sim",
        active_rounds = sessions.active_round_count(),
        players = sessions.players_in_rounds_count(),
        "back to the lobby"
    );

    engine.shutdown().await;
    Ok(())
}

async fn wait_for(
    handle: &SessionHandle,
    reached: impl Fn(Phase) -> bool,
) -> Result<(), DoorHuntError> {
    let mut status = handle.watch_status();
    status
        .wait_for(|status| reached(status.phase))
        .await
        .map_err(|_| SessionError::Unavailable(handle.arena().clone()))?;
    Ok(())
}
