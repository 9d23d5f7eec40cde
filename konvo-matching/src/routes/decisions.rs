use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};
use konvo_shared::types::auth::AuthUser;
use konvo_shared::types::ApiResponse;

use crate::events::publisher;
use crate::matching::decision::{self, Decision, DecisionOutcome, NotifyKind, Outcome};
use crate::models::Profile;
use crate::schema::profiles;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub subject_id: Uuid,
    pub decision: Decision,
}

/// POST /decisions - record a like, dislike, or remove against another user
pub async fn record_decision(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<Json<ApiResponse<DecisionOutcome>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "create a profile first"))?;

    let subject_exists: i64 = profiles::table
        .filter(profiles::user_id.eq(req.subject_id))
        .count()
        .get_result(&mut conn)?;
    if subject_exists == 0 {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }

    let result = decision::record_decision(&mut conn, user.id, req.subject_id, req.decision)?;

    tracing::info!(
        actor = %user.id,
        subject = %req.subject_id,
        outcome = ?result.outcome,
        "decision recorded"
    );

    // The notify list is returned to the presentation layer; the matching
    // events fan out to the notification collaborator over the bus.
    if result.notify.iter().any(|n| n.kind == NotifyKind::LikeReceived) {
        publisher::publish_like_sent(&state.rabbitmq, user.id, req.subject_id, &actor.name).await;
    }
    if result.outcome == Outcome::Matched && !result.notify.is_empty() {
        publisher::publish_match_created(&state.rabbitmq, user.id, req.subject_id).await;
    }

    Ok(Json(ApiResponse::ok(result)))
}
