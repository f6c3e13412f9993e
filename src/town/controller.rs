//! The central per-town state machine.
//!
//! One [`TownController`] owns everything reachable from one `coveyTownID`:
//! players, sessions, conversation areas, and the listeners subscribed to it.
//! All mutating operations serialize through a single `tokio::sync::Mutex`
//! (`SPEC_FULL.md` §5's "single logical serialization domain per town"); listener
//! dispatch always happens after the guard is dropped so a listener that calls
//! back into the controller (e.g. to unsubscribe itself) can never deadlock on
//! its own notification.

use std::collections::HashMap;
use std::sync::Arc;

use rand::RngExt;
use tokio::sync::Mutex;

use crate::config::TownConfig;
use crate::error::TownError;
use crate::listener::TownListener;
use crate::metrics::Metrics;
use crate::model::{
    AreaListener, BoundingBox, ConversationArea, Player, PlayerId, PlayerSession, SessionToken,
    UserLocation, NO_TOPIC,
};
use crate::video::VideoTokenSource;

struct TownState {
    friendly_name: String,
    is_publicly_listed: bool,
    players: HashMap<PlayerId, Player>,
    sessions: HashMap<SessionToken, PlayerSession>,
    areas: HashMap<String, ConversationArea>,
    listeners: Vec<Arc<dyn TownListener>>,
}

/// One event queued during a mutating call, dispatched to every town listener
/// after the state lock is released. Order within the `Vec` is dispatch order.
enum TownEvent {
    PlayerJoined(Player),
    PlayerMoved(Player),
    PlayerDisconnected(Player),
    AreaUpdated(ConversationArea),
    AreaDestroyed(ConversationArea),
    TownDestroyed,
}

/// Outcome of adding or removing an occupant from one conversation area.
enum AreaChange {
    Updated(ConversationArea),
    Destroyed(ConversationArea),
}

impl AreaChange {
    fn into_event(self) -> TownEvent {
        match self {
            Self::Updated(area) => TownEvent::AreaUpdated(area),
            Self::Destroyed(area) => TownEvent::AreaDestroyed(area),
        }
    }
}

pub struct TownController {
    pub town_id: String,
    pub town_update_password: String,
    pub capacity: u32,
    config: TownConfig,
    video_token_source: Arc<dyn VideoTokenSource>,
    metrics: Arc<Metrics>,
    state: Mutex<TownState>,
}

impl TownController {
    pub fn new(
        town_id: String,
        friendly_name: String,
        town_update_password: String,
        is_publicly_listed: bool,
        config: TownConfig,
        video_token_source: Arc<dyn VideoTokenSource>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let capacity = config.default_capacity;
        Self {
            town_id,
            town_update_password,
            capacity,
            config,
            video_token_source,
            metrics,
            state: Mutex::new(TownState {
                friendly_name,
                is_publicly_listed,
                players: HashMap::new(),
                sessions: HashMap::new(),
                areas: HashMap::new(),
                listeners: Vec::new(),
            }),
        }
    }

    pub async fn friendly_name(&self) -> String {
        self.state.lock().await.friendly_name.clone()
    }

    pub async fn is_publicly_listed(&self) -> bool {
        self.state.lock().await.is_publicly_listed
    }

    pub async fn set_friendly_name(&self, friendly_name: String) {
        self.state.lock().await.friendly_name = friendly_name;
    }

    pub async fn set_publicly_listed(&self, is_publicly_listed: bool) {
        self.state.lock().await.is_publicly_listed = is_publicly_listed;
    }

    pub async fn occupancy(&self) -> usize {
        self.state.lock().await.players.len()
    }

    pub async fn get_player(&self, player_id: &str) -> Option<Player> {
        self.state.lock().await.players.get(player_id).cloned()
    }

    pub async fn players_snapshot(&self) -> Vec<Player> {
        self.state.lock().await.players.values().cloned().collect()
    }

    pub async fn find_session(&self, session_token: &str) -> Option<PlayerSession> {
        self.state.lock().await.sessions.get(session_token).cloned()
    }

    pub async fn get_conversation_area(&self, label: &str) -> Option<ConversationArea> {
        self.state.lock().await.areas.get(label).map(ConversationArea::duplicate_state)
    }

    pub async fn conversation_areas_snapshot(&self) -> Vec<ConversationArea> {
        self.state
            .lock()
            .await
            .areas
            .values()
            .map(ConversationArea::duplicate_state)
            .collect()
    }

    /// Registers `listener` for area-scoped occupant-change events. Returns
    /// `false` if no live area carries `label`.
    pub async fn add_area_listener(&self, label: &str, listener: Arc<dyn AreaListener>) -> bool {
        let mut state = self.state.lock().await;
        match state.areas.get_mut(label) {
            Some(area) => {
                area.add_listener(listener);
                true
            }
            None => false,
        }
    }

    pub async fn remove_area_listener(&self, label: &str, listener: &Arc<dyn AreaListener>) {
        let mut state = self.state.lock().await;
        if let Some(area) = state.areas.get_mut(label) {
            area.remove_listener(listener);
        }
    }

    /// Idempotent by identity: registering the same `Arc` twice is a no-op.
    pub async fn add_town_listener(&self, listener: Arc<dyn TownListener>) {
        let mut state = self.state.lock().await;
        if !state.listeners.iter().any(|existing| Arc::ptr_eq(existing, &listener)) {
            state.listeners.push(listener);
        }
    }

    pub async fn remove_town_listener(&self, listener: &Arc<dyn TownListener>) {
        let mut state = self.state.lock().await;
        state.listeners.retain(|existing| !Arc::ptr_eq(existing, listener));
    }

    /// Registers a new player, minting a video token and a session token.
    ///
    /// The token mint is awaited *before* the player is committed to any
    /// collection — if the caller's future is dropped while the mint is still
    /// in flight, nothing has been mutated and no listener has observed a
    /// partial player (`SPEC_FULL.md` §5 suspension-point rule).
    pub async fn add_player(&self, user_name: String) -> Result<PlayerSession, TownError> {
        {
            let state = self.state.lock().await;
            if state.players.len() as u32 >= self.capacity {
                return Err(TownError::CapacityReached {
                    town_id: self.town_id.clone(),
                    capacity: self.capacity,
                });
            }
        }

        let player_id = generate_player_id();
        let video_token = match self.video_token_source.mint_token(&self.town_id, &player_id).await {
            Ok(token) => token,
            Err(err) => {
                self.metrics.record_token_mint_failure();
                return Err(TownError::from(err));
            }
        };
        let session_token = generate_token(self.config.session_token_bytes);

        let (player, listeners) = {
            let mut state = self.state.lock().await;
            if state.players.len() as u32 >= self.capacity {
                return Err(TownError::CapacityReached {
                    town_id: self.town_id.clone(),
                    capacity: self.capacity,
                });
            }
            let player = Player::new(player_id.clone(), user_name);
            state.players.insert(player_id.clone(), player.clone());
            state.sessions.insert(
                session_token.clone(),
                PlayerSession::new(session_token.clone(), player_id.clone(), video_token.clone()),
            );
            (player, state.listeners.clone())
        };

        self.metrics.record_player_connected();
        dispatch_events(&self.town_id, &listeners, vec![TownEvent::PlayerJoined(player)]);

        Ok(PlayerSession::new(session_token, player_id, video_token))
    }

    /// Removes the session's player, evicting them from their conversation
    /// area (possibly destroying it) before firing `onPlayerDisconnected`.
    pub async fn destroy_session(&self, session_token: &str) -> Result<(), TownError> {
        let mut state = self.state.lock().await;
        let Some(session) = state.sessions.remove(session_token) else {
            return Err(TownError::UnknownSession { town_id: self.town_id.clone() });
        };

        let player = state.players.remove(&session.player_id);
        let mut events = Vec::new();

        if let Some(player) = &player {
            if let Some(label) = &player.active_conversation_area {
                if let Some(change) = remove_from_area(&mut state, label, &player.id, &self.metrics) {
                    events.push(change.into_event());
                }
            }
        }
        if let Some(player) = player {
            events.push(TownEvent::PlayerDisconnected(player));
        }

        let listeners = state.listeners.clone();
        drop(state);

        self.metrics.record_player_disconnected();
        dispatch_events(&self.town_id, &listeners, events);
        Ok(())
    }

    /// The central state machine (`SPEC_FULL.md` §4.1).
    ///
    /// A client-supplied `conversationLabel` is authoritative and is never
    /// overridden by a spatial guess; a label naming a non-existent or
    /// destroyed area is treated identically to no label at all.
    pub async fn update_player_location(
        &self,
        player_id: &str,
        new_location: UserLocation,
    ) -> Result<(), TownError> {
        let mut state = self.state.lock().await;
        let Some(current_label) = state.players.get(player_id).map(|p| p.active_conversation_area.clone())
        else {
            return Err(TownError::UnknownSession { town_id: self.town_id.clone() });
        };

        let intended_label = new_location
            .conversation_label
            .as_ref()
            .filter(|label| !label.is_empty() && state.areas.contains_key(label.as_str()))
            .cloned();

        let mut events = Vec::new();

        if intended_label != current_label {
            if let Some(old_label) = &current_label {
                if let Some(change) = remove_from_area(&mut state, old_label, player_id, &self.metrics) {
                    events.push(change.into_event());
                }
            }
            if let Some(new_label) = &intended_label {
                if let Some(change) = add_to_area(&mut state, new_label, player_id) {
                    events.push(change.into_event());
                }
            }
            if let Some(player) = state.players.get_mut(player_id) {
                player.active_conversation_area = intended_label;
            }
        }

        let moved_player = {
            let player = state.players.get_mut(player_id).expect("player resolved above");
            player.location = new_location;
            player.clone()
        };
        events.push(TownEvent::PlayerMoved(moved_player));

        let listeners = state.listeners.clone();
        drop(state);

        dispatch_events(&self.town_id, &listeners, events);
        Ok(())
    }

    /// Installs a new conversation area, rejecting inactive topics, duplicate
    /// labels, and overlapping bounding boxes with no state change and no
    /// events. On success, spatially-contained unattached players are
    /// auto-enrolled and a single `onConversationAreaUpdated` fires.
    pub async fn add_conversation_area(
        &self,
        label: String,
        topic: String,
        bounding_box: BoundingBox,
    ) -> bool {
        if topic == NO_TOPIC {
            return false;
        }

        let mut state = self.state.lock().await;
        if state.areas.contains_key(&label) {
            return false;
        }
        if state.areas.values().any(|existing| existing.bounding_box.overlaps(&bounding_box)) {
            return false;
        }

        let mut area = ConversationArea::new(label.clone(), topic, bounding_box);
        for player in state.players.values_mut() {
            if player.active_conversation_area.is_none()
                && bounding_box.strictly_contains(player.location.x, player.location.y)
            {
                area.add_occupant(player.id.clone());
                player.active_conversation_area = Some(label.clone());
            }
        }

        let snapshot = area.duplicate_state();
        state.areas.insert(label, area);
        self.metrics.record_area_created();
        let listeners = state.listeners.clone();
        drop(state);

        dispatch_events(&self.town_id, &listeners, vec![TownEvent::AreaUpdated(snapshot)]);
        true
    }

    /// Fires `onTownDestroyed` to every listener and empties the town. The
    /// caller (normally [`crate::town::TownsStore`]) still owns evicting this
    /// controller from the registry.
    pub async fn disconnect_all_players(&self) {
        let mut state = self.state.lock().await;
        let area_count = state.areas.len();
        state.players.clear();
        state.sessions.clear();
        state.areas.clear();
        let listeners = state.listeners.clone();
        drop(state);

        self.metrics.record_areas_removed(area_count as u64);
        dispatch_events(&self.town_id, &listeners, vec![TownEvent::TownDestroyed]);
    }
}

fn remove_from_area(
    state: &mut TownState,
    label: &str,
    player_id: &str,
    metrics: &Metrics,
) -> Option<AreaChange> {
    let area = state.areas.get_mut(label)?;
    area.remove_occupant(player_id);
    if area.is_empty() {
        let area = state.areas.remove(label)?;
        area.notify_destroyed();
        metrics.record_area_removed();
        Some(AreaChange::Destroyed(area.duplicate_state()))
    } else {
        area.notify_occupants_changed();
        Some(AreaChange::Updated(area.duplicate_state()))
    }
}

fn add_to_area(state: &mut TownState, label: &str, player_id: &str) -> Option<AreaChange> {
    let area = state.areas.get_mut(label)?;
    area.add_occupant(player_id.to_string());
    area.notify_occupants_changed();
    Some(AreaChange::Updated(area.duplicate_state()))
}

/// Dispatches `events` in order to every listener, best-effort: a listener that
/// panics is logged and skipped, never preventing the remaining listeners (or
/// the remaining events) from running (`SPEC_FULL.md` §7 ListenerException).
fn dispatch_events(town_id: &str, listeners: &[Arc<dyn TownListener>], events: Vec<TownEvent>) {
    for event in &events {
        for listener in listeners {
            let listener = listener.as_ref();
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| match event {
                TownEvent::PlayerJoined(p) => listener.on_player_joined(p),
                TownEvent::PlayerMoved(p) => listener.on_player_moved(p),
                TownEvent::PlayerDisconnected(p) => listener.on_player_disconnected(p),
                TownEvent::AreaUpdated(a) => listener.on_conversation_area_updated(a),
                TownEvent::AreaDestroyed(a) => listener.on_conversation_area_destroyed(a),
                TownEvent::TownDestroyed => listener.on_town_destroyed(),
            }));
            if outcome.is_err() {
                tracing::error!(%town_id, "town listener panicked while being notified; continuing");
            }
        }
    }
}

fn generate_player_id() -> PlayerId {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn generate_token(byte_len: usize) -> String {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; byte_len.max(1)];
    for byte in &mut bytes {
        *byte = rng.random_range(0..=u8::MAX);
    }
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
