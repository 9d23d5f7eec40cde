use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult};
use konvo_shared::types::auth::AuthUser;
use konvo_shared::types::ApiResponse;

use crate::matching::ledger::{self, RelationshipStatus};
use crate::models::Profile;
use crate::schema::profiles;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MatchView {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: String,
    pub photo_ref: Option<String>,
    pub city: Option<String>,
    pub matched_at: Option<DateTime<Utc>>,
}

/// GET /matches - everyone the caller is currently matched with
///
/// A removed or disliked pair is no longer in `matched` status, so severed
/// matches drop out of this list for both sides without extra filtering.
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MatchView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rels = ledger::find_for_user_with_status(&mut conn, user.id, RelationshipStatus::Matched)?;

    let partner_ids: Vec<Uuid> = rels.iter().map(|r| r.counterpart(user.id)).collect();
    let matched_at: HashMap<Uuid, Option<DateTime<Utc>>> = rels
        .iter()
        .map(|r| (r.counterpart(user.id), r.matched_at))
        .collect();

    let partners = profiles::table
        .filter(profiles::user_id.eq_any(&partner_ids))
        .load::<Profile>(&mut conn)?;

    let mut views: Vec<MatchView> = partners
        .into_iter()
        .map(|p| {
            let at = matched_at.get(&p.user_id).copied().flatten();
            MatchView {
                user_id: p.user_id,
                name: p.name,
                age: p.age,
                gender: p.gender,
                bio: p.bio,
                photo_ref: p.photo_ref,
                city: p.city,
                matched_at: at,
            }
        })
        .collect();

    // most recent match first
    views.sort_by(|a, b| b.matched_at.cmp(&a.matched_at));

    Ok(Json(ApiResponse::ok(views)))
}

#[derive(Debug, Serialize)]
pub struct LikerView {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: String,
    pub photo_ref: Option<String>,
    pub liked_at: DateTime<Utc>,
}

/// GET /likes/received - pending likes awaiting the caller's answer
///
/// Only active likers are shown; deactivated profiles keep their pending
/// row but stay invisible until they come back.
pub async fn likes_received(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<LikerView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let pending = ledger::find_for_user_with_status(&mut conn, user.id, RelationshipStatus::Pending)?;

    // Only likes aimed at the caller; their own outgoing likes stay hidden
    let liker_ids: Vec<Uuid> = pending
        .iter()
        .filter(|r| r.subject_id == user.id)
        .map(|r| r.actor_id)
        .collect();

    let liked_at: HashMap<Uuid, DateTime<Utc>> = pending
        .iter()
        .filter(|r| r.subject_id == user.id)
        .map(|r| (r.actor_id, r.created_at))
        .collect();

    let likers = profiles::table
        .filter(profiles::user_id.eq_any(&liker_ids))
        .filter(profiles::active.eq(true))
        .load::<Profile>(&mut conn)?;

    let mut views: Vec<LikerView> = likers
        .into_iter()
        .map(|p| {
            let at = liked_at.get(&p.user_id).copied().unwrap_or(p.created_at);
            LikerView {
                user_id: p.user_id,
                name: p.name,
                age: p.age,
                gender: p.gender,
                bio: p.bio,
                photo_ref: p.photo_ref,
                liked_at: at,
            }
        })
        .collect();

    views.sort_by(|a, b| b.liked_at.cmp(&a.liked_at));

    Ok(Json(ApiResponse::ok(views)))
}
