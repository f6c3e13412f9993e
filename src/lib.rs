#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::similar_names
)]

//! Authoritative in-memory controller for multiplayer 2D towns.
//!
//! A "town" is a shared 2D space: players move around it, overhear each other
//! inside labelled conversation areas, and are notified of one another's
//! comings and goings through a per-town listener registry. [`town::TownsStore`]
//! owns the registry of live towns; [`town::TownController`] is the state
//! machine for one of them.

/// Runtime configuration: layered env/file/default loading.
pub mod config;
/// Wire-facing error codes and the library's `TownError` type.
pub mod error;
/// The controller-wide observer interface (`TownListener`).
pub mod listener;
/// `tracing` initialization.
pub mod logging;
/// Small operational counters exposed over `/metrics`.
pub mod metrics;
/// Core data model: players, sessions, conversation areas.
pub mod model;
/// Wire formats for the subscription WebSocket.
pub mod protocol;
/// HTTP/RPC handlers and the WebSocket upgrade endpoint.
pub mod server;
/// Bridges one `TownController` to one socket.
pub mod subscription;
/// Per-town state machine and the process-wide towns registry.
pub mod town;
/// The pluggable video-chat credential provider.
pub mod video;
