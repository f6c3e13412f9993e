//! Request/response handlers for the plain-HTTP surface (`SPEC_FULL.md` §4.5).
//!
//! Town lifecycle (create/list/update/delete) and session/area creation are
//! ordinary request/response RPCs; only the ongoing position stream rides the
//! WebSocket in [`super::ws`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, TownError};
use crate::model::{BoundingBox, Player};
use crate::protocol::ConversationAreaView;
use crate::town::TownCreateResponse;

use super::AppState;

/// Wraps [`TownError`] so this module alone decides the HTTP mapping, keeping
/// `crate::error` free of a web-framework dependency.
struct AppError(TownError);

impl From<TownError> for AppError {
    fn from(err: TownError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.code() {
            ErrorCode::UnknownTown | ErrorCode::UnknownSession => StatusCode::NOT_FOUND,
            ErrorCode::UnknownPassword => StatusCode::FORBIDDEN,
            ErrorCode::TownCapacityReached => StatusCode::CONFLICT,
            ErrorCode::AreaTopicInactive | ErrorCode::AreaLabelTaken | ErrorCode::AreaOverlapsExisting => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::TokenMintFailure | ErrorCode::ListenerFailure => StatusCode::BAD_GATEWAY,
        };
        let body = Json(ErrorBody {
            code: self.0.code(),
            message: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTownRequest {
    pub friendly_name: String,
    #[serde(default)]
    pub is_publicly_listed: bool,
}

pub async fn create_town(
    State(state): State<AppState>,
    Json(request): Json<CreateTownRequest>,
) -> Json<TownCreateResponse> {
    Json(state.towns.create_town(request.friendly_name, request.is_publicly_listed))
}

pub async fn list_towns(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.towns.get_towns().await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTownRequest {
    pub town_update_password: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub is_publicly_listed: Option<bool>,
}

pub async fn update_town(
    State(state): State<AppState>,
    Path(town_id): Path<String>,
    Json(request): Json<UpdateTownRequest>,
) -> Result<StatusCode, AppError> {
    state
        .towns
        .update_town(&town_id, &request.town_update_password, request.friendly_name, request.is_publicly_listed)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct DeleteTownQuery {
    pub town_update_password: String,
}

pub async fn delete_town(
    State(state): State<AppState>,
    Path(town_id): Path<String>,
    Query(query): Query<DeleteTownQuery>,
) -> Result<StatusCode, AppError> {
    state.towns.delete_town(&town_id, &query.town_update_password).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTownRequest {
    pub user_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTownResponse {
    pub session_token: String,
    pub player_id: String,
    pub video_token: String,
    pub current_players: Vec<Player>,
    pub current_conversation_areas: Vec<ConversationAreaView>,
    pub capacity: u32,
}

pub async fn join_town(
    State(state): State<AppState>,
    Path(town_id): Path<String>,
    Json(request): Json<JoinTownRequest>,
) -> Result<Json<JoinTownResponse>, AppError> {
    let controller = state
        .towns
        .get_controller_for_town(&town_id)
        .ok_or_else(|| TownError::UnknownTown { town_id: town_id.clone() })?;

    let session = controller.add_player(request.user_name).await?;
    let current_players = controller.players_snapshot().await;
    let current_conversation_areas =
        controller.conversation_areas_snapshot().await.iter().map(Into::into).collect();

    Ok(Json(JoinTownResponse {
        session_token: session.session_token,
        player_id: session.player_id,
        video_token: session.video_token,
        current_players,
        current_conversation_areas,
        capacity: controller.capacity,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationAreaRequest {
    pub label: String,
    pub topic: String,
    pub bounding_box: BoundingBox,
}

pub async fn create_conversation_area(
    State(state): State<AppState>,
    Path(town_id): Path<String>,
    Json(request): Json<CreateConversationAreaRequest>,
) -> Result<StatusCode, AppError> {
    let controller = state
        .towns
        .get_controller_for_town(&town_id)
        .ok_or_else(|| TownError::UnknownTown { town_id: town_id.clone() })?;

    let created = controller.add_conversation_area(request.label, request.topic, request.bounding_box).await;
    if created {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError(TownError::AreaRejected {
            reason: "label taken, topic inactive, or bounding box overlaps a live area",
            code: ErrorCode::AreaOverlapsExisting,
        }))
    }
}

pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}
