//! The process-wide registry of live towns.
//!
//! One [`TownsStore`] is shared (via `Arc`) across every HTTP and WebSocket
//! handler. Each town's actual mutable state lives behind its own
//! [`TownController`] lock; this registry only ever holds `Arc<TownController>`
//! handles, so looking a town up never contends with traffic inside it.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::TownConfig;
use crate::error::TownError;
use crate::metrics::Metrics;
use crate::town::controller::{generate_token, TownController};
use crate::video::VideoTokenSource;

/// Returned to the caller that created a town — the only moment the update
/// password is ever handed back in the clear.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TownCreateResponse {
    pub town_id: String,
    pub town_update_password: String,
}

/// One row of the public town directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TownListing {
    pub town_id: String,
    pub friendly_name: String,
    pub current_occupancy: usize,
    pub maximum_occupancy: u32,
}

/// Towns are kept in an `IndexMap` rather than a hash-sharded map so that
/// `get_towns` can list them in creation order (`SPEC_FULL.md` §2/§3/§4.3,
/// mirroring the original Covey.Town store's use of a JS `Map`, which is
/// itself insertion-ordered). The registry is small and short-held —
/// creation, lookup, and eviction — so a plain `std::sync::Mutex` guarding
/// it never contends with the per-town traffic that happens behind each
/// `TownController`'s own lock.
pub struct TownsStore {
    towns: Mutex<IndexMap<String, Arc<TownController>>>,
    config: TownConfig,
    video_token_source: Arc<dyn VideoTokenSource>,
    metrics: Arc<Metrics>,
}

impl TownsStore {
    pub fn new(
        config: TownConfig,
        video_token_source: Arc<dyn VideoTokenSource>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            towns: Mutex::new(IndexMap::new()),
            config,
            video_token_source,
            metrics,
        }
    }

    /// Allocates a new town and its controller. The town update password is
    /// generated once here and never stored anywhere but the controller itself.
    /// `friendly_name` is silently truncated to `town.max_friendly_name_length`
    /// rather than rejected — a display label has no correctness consequence.
    pub fn create_town(&self, friendly_name: String, is_publicly_listed: bool) -> TownCreateResponse {
        let town_id = uuid::Uuid::new_v4().to_string();
        let town_update_password = generate_token(self.config.town_password_bytes);

        let controller = TownController::new(
            town_id.clone(),
            truncate_friendly_name(friendly_name, self.config.max_friendly_name_length),
            town_update_password.clone(),
            is_publicly_listed,
            self.config.clone(),
            self.video_token_source.clone(),
            self.metrics.clone(),
        );
        self.towns.lock().unwrap().insert(town_id.clone(), Arc::new(controller));
        self.metrics.record_town_created();

        TownCreateResponse { town_id, town_update_password }
    }

    pub fn get_controller_for_town(&self, town_id: &str) -> Option<Arc<TownController>> {
        self.towns.lock().unwrap().get(town_id).cloned()
    }

    /// Every publicly-listed town with its current/maximum occupancy, in the
    /// order the towns were created. Towns created with `isPubliclyListed:
    /// false` never appear here; they're still reachable by anyone who
    /// already has the `townID`.
    pub async fn get_towns(&self) -> Vec<TownListing> {
        let controllers: Vec<Arc<TownController>> =
            self.towns.lock().unwrap().values().cloned().collect();

        let mut listings = Vec::with_capacity(controllers.len());
        for controller in controllers {
            if !controller.is_publicly_listed().await {
                continue;
            }
            listings.push(TownListing {
                town_id: controller.town_id.clone(),
                friendly_name: controller.friendly_name().await,
                current_occupancy: controller.occupancy().await,
                maximum_occupancy: controller.capacity,
            });
        }
        listings
    }

    pub async fn update_town(
        &self,
        town_id: &str,
        town_update_password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> Result<(), TownError> {
        let controller = self
            .towns
            .lock()
            .unwrap()
            .get(town_id)
            .cloned()
            .ok_or_else(|| TownError::UnknownTown { town_id: town_id.to_string() })?;

        if controller.town_update_password != town_update_password {
            return Err(TownError::UnknownPassword { town_id: town_id.to_string() });
        }

        if let Some(friendly_name) = friendly_name {
            controller.set_friendly_name(truncate_friendly_name(friendly_name, self.config.max_friendly_name_length)).await;
        }
        if let Some(is_publicly_listed) = is_publicly_listed {
            controller.set_publicly_listed(is_publicly_listed).await;
        }
        Ok(())
    }

    /// Disconnects every player, evicts the controller from the registry, and
    /// drops the last `Arc` reference this store holds.
    pub async fn delete_town(&self, town_id: &str, town_update_password: &str) -> Result<(), TownError> {
        let controller = self
            .towns
            .lock()
            .unwrap()
            .get(town_id)
            .cloned()
            .ok_or_else(|| TownError::UnknownTown { town_id: town_id.to_string() })?;

        if controller.town_update_password != town_update_password {
            return Err(TownError::UnknownPassword { town_id: town_id.to_string() });
        }

        controller.disconnect_all_players().await;
        self.towns.lock().unwrap().shift_remove(town_id);
        self.metrics.record_town_destroyed();
        Ok(())
    }
}

fn truncate_friendly_name(friendly_name: String, max_len: usize) -> String {
    if friendly_name.len() <= max_len {
        return friendly_name;
    }
    friendly_name.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::InMemoryVideoTokenSource;

    fn store() -> TownsStore {
        TownsStore::new(
            TownConfig::default(),
            Arc::new(InMemoryVideoTokenSource::new(8)),
            Arc::new(Metrics::new()),
        )
    }

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let store = store();
        let created = store.create_town("Alice's Town".to_string(), true);
        let controller = store.get_controller_for_town(&created.town_id).unwrap();
        assert_eq!(controller.friendly_name().await, "Alice's Town");
    }

    #[tokio::test]
    async fn private_towns_are_not_listed() {
        let store = store();
        store.create_town("Public".to_string(), true);
        store.create_town("Private".to_string(), false);
        let listings = store.get_towns().await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].friendly_name, "Public");
    }

    #[tokio::test]
    async fn get_towns_preserves_creation_order() {
        let store = store();
        store.create_town("First".to_string(), true);
        store.create_town("Second".to_string(), true);
        store.create_town("Third".to_string(), true);

        let listings = store.get_towns().await;
        let names: Vec<&str> = listings.iter().map(|l| l.friendly_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn deleting_a_town_preserves_order_of_the_rest() {
        let store = store();
        let first = store.create_town("First".to_string(), true);
        store.create_town("Second".to_string(), true);
        store.create_town("Third".to_string(), true);

        store.delete_town(&first.town_id, &first.town_update_password).await.unwrap();
        let listings = store.get_towns().await;
        let names: Vec<&str> = listings.iter().map(|l| l.friendly_name.as_str()).collect();
        assert_eq!(names, vec!["Second", "Third"]);
    }

    #[tokio::test]
    async fn update_requires_correct_password() {
        let store = store();
        let created = store.create_town("Town".to_string(), true);
        let result = store
            .update_town(&created.town_id, "wrong", Some("New Name".to_string()), None)
            .await;
        assert!(result.is_err());

        store
            .update_town(&created.town_id, &created.town_update_password, Some("New Name".to_string()), None)
            .await
            .unwrap();
        let controller = store.get_controller_for_town(&created.town_id).unwrap();
        assert_eq!(controller.friendly_name().await, "New Name");
    }

    #[tokio::test]
    async fn overlong_friendly_names_are_truncated_not_rejected() {
        let mut config = TownConfig::default();
        config.max_friendly_name_length = 5;
        let store = TownsStore::new(config, Arc::new(InMemoryVideoTokenSource::new(8)), Arc::new(Metrics::new()));
        let created = store.create_town("Too Long A Name".to_string(), true);
        let controller = store.get_controller_for_town(&created.town_id).unwrap();
        assert_eq!(controller.friendly_name().await, "Too L");
    }

    #[tokio::test]
    async fn delete_evicts_and_disconnects() {
        let store = store();
        let created = store.create_town("Town".to_string(), true);
        let controller = store.get_controller_for_town(&created.town_id).unwrap();
        controller.add_player("p1".to_string()).await.unwrap();

        store.delete_town(&created.town_id, &created.town_update_password).await.unwrap();
        assert!(store.get_controller_for_town(&created.town_id).is_none());
    }

    #[tokio::test]
    async fn unknown_town_errors_on_update_and_delete() {
        let store = store();
        assert!(store.update_town("ghost", "pw", None, None).await.is_err());
        assert!(store.delete_town("ghost", "pw").await.is_err());
    }
}
