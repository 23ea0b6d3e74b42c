//! Relay entities: sessions and the games they join.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::value_object::{ConnectionId, GameKey, SessionId, Timestamp};

/// A session's reference to the game it currently belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub game_key: GameKey,
    /// Display name given on join, kept as sent
    pub name: Value,
}

/// A durable player identity, rebindable across connections.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    /// Currently bound connection, if any
    pub connection_id: Option<ConnectionId>,
    /// Most recently received message (diagnostic only)
    pub last_message: Value,
    /// Time of the last message
    pub timestamp: Timestamp,
    /// Time of the most recent registration
    pub connected_at: Timestamp,
    pub membership: Option<Membership>,
}

impl Session {
    pub fn new(id: SessionId, now: Timestamp) -> Self {
        Self {
            id,
            connection_id: None,
            last_message: Value::Null,
            timestamp: now,
            connected_at: now,
            membership: None,
        }
    }

    /// Bind a new connection, returning the connection it replaces.
    pub fn bind_connection(
        &mut self,
        connection_id: ConnectionId,
        payload: Value,
        now: Timestamp,
    ) -> Option<ConnectionId> {
        let previous = self.connection_id.replace(connection_id);
        self.record_message(payload, now);
        self.connected_at = now;
        previous
    }

    /// Clear the binding if it still points at `connection_id`.
    ///
    /// Returns `true` when the binding was cleared.
    pub fn release_connection(&mut self, connection_id: &ConnectionId) -> bool {
        if self.connection_id.as_ref() == Some(connection_id) {
            self.connection_id = None;
            true
        } else {
            false
        }
    }

    pub fn record_message(&mut self, payload: Value, now: Timestamp) {
        self.last_message = payload;
        self.timestamp = now;
    }

    /// Point the session at a game, returning the previous membership.
    pub fn join(&mut self, game_key: GameKey, name: Value) -> Option<Membership> {
        self.membership.replace(Membership { game_key, name })
    }

    pub fn game_key(&self) -> Option<&GameKey> {
        self.membership.as_ref().map(|m| &m.game_key)
    }
}

/// A game's projection of one member.
///
/// Either the `{id, name, cells}` record written on join or the full state
/// a client last sent as a self update. Always carries `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession(Map<String, Value>);

impl GameSession {
    pub fn joined(id: &SessionId, name: Value, cells: Value) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.as_str().to_string()));
        fields.insert("name".to_string(), name);
        fields.insert("cells".to_string(), cells);
        Self(fields)
    }

    /// Replace the projection with a client-provided state, tagged with `id`.
    pub fn snapshot(id: &SessionId, mut state: Map<String, Value>) -> Self {
        state.insert("id".to_string(), Value::String(id.as_str().to_string()));
        Self(state)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// A named group of sessions that receive each other's updates.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub key: GameKey,
    pub members: HashMap<SessionId, GameSession>,
}

impl Game {
    pub fn new(key: GameKey) -> Self {
        Self {
            key,
            members: HashMap::new(),
        }
    }

    pub fn upsert_member(&mut self, session_id: SessionId, member: GameSession) {
        self.members.insert(session_id, member);
    }

    pub fn remove_member(&mut self, session_id: &SessionId) -> Option<GameSession> {
        self.members.remove(session_id)
    }

    pub fn member(&self, session_id: &SessionId) -> Option<&GameSession> {
        self.members.get(session_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member session ids, sorted.
    pub fn member_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.members.keys().cloned().collect();
        ids.sort();
        ids
    }
}
