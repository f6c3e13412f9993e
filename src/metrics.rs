//! Process-wide operational counters, exposed over HTTP as a JSON snapshot.
//!
//! Deliberately small: this deployment tracks only what `SPEC_FULL.md` §1.1 calls
//! for (towns active, players connected, areas active, token mint failures), not
//! the sprawling per-feature counter set a distributed relay would need.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters shared across the process via `Arc<Metrics>`.
#[derive(Debug, Default)]
pub struct Metrics {
    towns_active: AtomicU64,
    players_connected: AtomicU64,
    areas_active: AtomicU64,
    token_mint_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_town_created(&self) {
        self.towns_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_town_destroyed(&self) {
        let _ = self.towns_active.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
            Some(v.saturating_sub(1))
        });
    }

    pub fn record_player_connected(&self) {
        self.players_connected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_player_disconnected(&self) {
        let _ = self.players_connected.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
            Some(v.saturating_sub(1))
        });
    }

    pub fn record_area_created(&self) {
        self.areas_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_area_removed(&self) {
        self.record_areas_removed(1);
    }

    pub fn record_areas_removed(&self, count: u64) {
        let _ = self.areas_active.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
            Some(v.saturating_sub(count))
        });
    }

    pub fn record_token_mint_failure(&self) {
        self.token_mint_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            towns_active: self.towns_active.load(Ordering::Relaxed),
            players_connected: self.players_connected.load(Ordering::Relaxed),
            areas_active: self.areas_active.load(Ordering::Relaxed),
            token_mint_failures: self.token_mint_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub towns_active: u64,
    pub players_connected: u64,
    pub areas_active: u64,
    pub token_mint_failures: u64,
}
