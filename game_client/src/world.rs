//! World reconciliation.
//!
//! Translates decoded server messages into visual-object mutations.
//! The engine primitives (instantiate, move, destroy) live behind the
//! [`Stage`] trait so rendering stays out of this crate; the binary and
//! the tests supply their own stages.

use std::collections::HashMap;

use game_protocol::{
    math::Vec3,
    rpc::{LoginResponsePayload, PlayerId, ServerRpc, SpawnPayload, SyncPayload},
};
use tracing::{debug, info};

/// Which kind of visual object to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefab {
    Player,
    OtherPlayer,
    Item,
}

/// Visual-object primitives provided by the engine.
pub trait Stage {
    type Handle;

    fn create(&mut self, prefab: Prefab, name: String, position: Vec3) -> Self::Handle;
    fn set_position(&mut self, handle: &Self::Handle, position: Vec3);
    fn destroy(&mut self, handle: Self::Handle);
}

/// Mirrors remote state into local visual objects.
///
/// The registry maps each remote player id to its object handle. An
/// entry is created on first sighting in a sync snapshot and updated in
/// place afterwards; the protocol has no despawn, so entries live until
/// [`Reconciler::clear`]. The local player's own id is never inserted.
pub struct Reconciler<S: Stage> {
    stage: S,
    spawn_point: Vec3,
    local_id: Option<PlayerId>,
    local_player: Option<S::Handle>,
    remote: HashMap<PlayerId, S::Handle>,
}

impl<S: Stage> Reconciler<S> {
    pub fn new(stage: S, spawn_point: Vec3) -> Self {
        Self {
            stage,
            spawn_point,
            local_id: None,
            local_player: None,
            remote: HashMap::new(),
        }
    }

    /// Applies one drained message. Called from the frame loop only.
    pub fn apply(&mut self, rpc: ServerRpc) {
        match rpc {
            // Pings are observed in the read context and never queued.
            ServerRpc::Ping(ping) => debug!(message = %ping.message, "Ping"),
            ServerRpc::LoginResponse(payload) => self.on_login_response(payload),
            ServerRpc::Sync(payload) => self.on_sync(payload),
            ServerRpc::Spawn(payload) => self.on_spawn(payload),
        }
    }

    /// Records the assigned id and creates the local player object at
    /// the configured spawn point.
    pub fn on_login_response(&mut self, payload: LoginResponsePayload) {
        info!(id = payload.id.0, "Logged in");
        self.local_id = Some(payload.id);
        let handle = self
            .stage
            .create(Prefab::Player, "Player".to_string(), self.spawn_point);
        self.local_player = Some(handle);
    }

    /// Reconciles one snapshot: self is skipped, known ids are moved in
    /// place, new ids get a fresh object. Entries are handled
    /// independently, so snapshot order does not matter.
    pub fn on_sync(&mut self, payload: SyncPayload) {
        for player in payload.players {
            if Some(player.id) == self.local_id {
                continue;
            }
            if let Some(handle) = self.remote.get(&player.id) {
                self.stage.set_position(handle, player.position);
            } else {
                let handle = self.stage.create(
                    Prefab::OtherPlayer,
                    format!("Other{}", player.id.0),
                    player.position,
                );
                self.remote.insert(player.id, handle);
                debug!(id = player.id.0, "Created remote player");
            }
        }
    }

    /// Fire-and-forget world effect: an untracked item object.
    pub fn on_spawn(&mut self, payload: SpawnPayload) {
        self.stage
            .create(Prefab::Item, "Item".to_string(), payload.position);
    }

    pub fn local_id(&self) -> Option<PlayerId> {
        self.local_id
    }

    pub fn local_player(&self) -> Option<&S::Handle> {
        self.local_player.as_ref()
    }

    pub fn remote_count(&self) -> usize {
        self.remote.len()
    }

    pub fn has_remote(&self, id: PlayerId) -> bool {
        self.remote.contains_key(&id)
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    /// Scene teardown: destroys every owned object and empties the
    /// registry. The local id is kept; it is valid for the session.
    pub fn clear(&mut self) {
        for (_, handle) in self.remote.drain() {
            self.stage.destroy(handle);
        }
        if let Some(handle) = self.local_player.take() {
            self.stage.destroy(handle);
        }
    }
}
