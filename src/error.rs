//! Library-level error types for the town controller subsystem.
//!
//! Each fallible operation on [`crate::town::TownController`] and
//! [`crate::town::TownsStore`] returns a [`TownError`]; every variant carries a stable
//! [`ErrorCode`] so clients on the wire get a machine-readable tag alongside the
//! human message. Application glue (CLI, `main`) collapses these into `anyhow::Error`
//! at the process boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, wire-facing error code. Serializes as `SCREAMING_SNAKE_CASE`.
///
/// Bands:
/// - 1xxx: authentication / session
/// - 2xxx: conversation area admission
/// - 3xxx: town lifecycle / store
/// - 4xxx: external collaborators (video token source)
/// - 9xxx: internal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 1xxx - authentication / session
    UnknownTown,
    UnknownSession,

    // 2xxx - conversation area admission
    AreaTopicInactive,
    AreaLabelTaken,
    AreaOverlapsExisting,

    // 3xxx - town lifecycle / store
    UnknownPassword,
    TownCapacityReached,

    // 4xxx - external collaborators
    TokenMintFailure,

    // 9xxx - internal
    ListenerFailure,
}

impl ErrorCode {
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownTown => "no town is registered under the given townID",
            Self::UnknownSession => "the sessionToken is not recognized by this town",
            Self::AreaTopicInactive => "a conversation area may not be created with the NO_TOPIC sentinel",
            Self::AreaLabelTaken => "another live conversation area already uses this label",
            Self::AreaOverlapsExisting => "the bounding box overlaps a live conversation area",
            Self::UnknownPassword => "the supplied town update password is incorrect",
            Self::TownCapacityReached => "the town is at its configured player capacity",
            Self::TokenMintFailure => "the video token source failed to mint a token",
            Self::ListenerFailure => "a listener raised while being notified",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Library error type for town-controller operations.
#[derive(Debug, thiserror::Error)]
pub enum TownError {
    #[error("unknown town: {town_id}")]
    UnknownTown { town_id: String },

    #[error("unknown session for town {town_id}")]
    UnknownSession { town_id: String },

    #[error("conversation area rejected: {reason}")]
    AreaRejected { reason: &'static str, code: ErrorCode },

    #[error("incorrect update password for town {town_id}")]
    UnknownPassword { town_id: String },

    #[error("town {town_id} is at capacity ({capacity})")]
    CapacityReached { town_id: String, capacity: u32 },

    #[error("video token source failed: {0}")]
    TokenMint(#[from] crate::video::TokenMintError),
}

impl TownError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownTown { .. } => ErrorCode::UnknownTown,
            Self::UnknownSession { .. } => ErrorCode::UnknownSession,
            Self::AreaRejected { code, .. } => *code,
            Self::UnknownPassword { .. } => ErrorCode::UnknownPassword,
            Self::CapacityReached { .. } => ErrorCode::TownCapacityReached,
            Self::TokenMint(_) => ErrorCode::TokenMintFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_a_non_trivial_description() {
        let codes = [
            ErrorCode::UnknownTown,
            ErrorCode::UnknownSession,
            ErrorCode::AreaTopicInactive,
            ErrorCode::AreaLabelTaken,
            ErrorCode::AreaOverlapsExisting,
            ErrorCode::UnknownPassword,
            ErrorCode::TownCapacityReached,
            ErrorCode::TokenMintFailure,
            ErrorCode::ListenerFailure,
        ];
        for code in codes {
            assert!(code.description().len() > 10);
            assert_eq!(code.to_string(), code.description());
        }
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::AreaOverlapsExisting).unwrap();
        assert_eq!(json, "\"AREA_OVERLAPS_EXISTING\"");
    }

    #[test]
    fn town_error_code_matches_variant() {
        let err = TownError::UnknownTown {
            town_id: "abc".into(),
        };
        assert_eq!(err.code(), ErrorCode::UnknownTown);
    }
}
