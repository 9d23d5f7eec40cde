use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};
use konvo_shared::middleware::AdminUser;
use konvo_shared::types::pagination::{Paginated, PaginationParams};
use konvo_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::Profile;
use crate::schema::{profiles, relationships};
use crate::services::credit_service;
use crate::AppState;

// --- List users (paginated) ---

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Profile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let items = profiles::table
        .order(profiles::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Profile>(&mut conn)?;

    let total: i64 = profiles::table.count().get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

// --- Service statistics ---

#[derive(Debug, Serialize)]
pub struct StatsView {
    pub total_users: i64,
    pub active_users: i64,
    pub male_users: i64,
    pub female_users: i64,
    pub total_matches: i64,
    pub new_users_today: i64,
    pub users_with_referrals: i64,
    pub total_referred: i64,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<StatsView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total_users: i64 = profiles::table.count().get_result(&mut conn)?;
    let active_users: i64 = profiles::table
        .filter(profiles::active.eq(true))
        .count()
        .get_result(&mut conn)?;
    let male_users: i64 = profiles::table
        .filter(profiles::gender.eq("Male"))
        .count()
        .get_result(&mut conn)?;
    let female_users: i64 = profiles::table
        .filter(profiles::gender.eq("Female"))
        .count()
        .get_result(&mut conn)?;

    let total_matches: i64 = relationships::table
        .filter(relationships::status.eq("matched"))
        .count()
        .get_result(&mut conn)?;

    let today_start = Utc::now().date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
    let new_users_today: i64 = profiles::table
        .filter(profiles::created_at.ge(today_start))
        .count()
        .get_result(&mut conn)?;

    let users_with_referrals: i64 = profiles::table
        .filter(profiles::referral_count.gt(0))
        .count()
        .get_result(&mut conn)?;
    let total_referred: i64 = profiles::table
        .filter(profiles::referred_by.is_not_null())
        .count()
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(StatsView {
        total_users,
        active_users,
        male_users,
        female_users,
        total_matches,
        new_users_today,
        users_with_referrals,
        total_referred,
    })))
}

// --- Moderation actions ---

/// POST /admin/users/:id/ban - a ban also deactivates, so the user drops
/// out of matching and broadcasts immediately
pub async fn ban_user(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let banned = diesel::update(profiles::table.filter(profiles::user_id.eq(user_id)))
        .set((
            profiles::banned.eq(true),
            profiles::active.eq(false),
            profiles::updated_at.eq(Utc::now()),
        ))
        .get_result::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    publisher::publish_user_banned(&state.rabbitmq, user_id).await;
    tracing::warn!(admin = %admin.0.id, user_id = %user_id, "user banned");

    Ok(Json(ApiResponse::ok(banned)))
}

/// POST /admin/users/:id/toggle-active
pub async fn toggle_active(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user_id))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let updated = diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((
            profiles::active.eq(!profile.active),
            profiles::updated_at.eq(Utc::now()),
        ))
        .get_result::<Profile>(&mut conn)?;

    tracing::info!(
        admin = %admin.0.id,
        user_id = %user_id,
        active = updated.active,
        "user visibility toggled"
    );

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Manual credit grants ---

#[derive(Debug, Deserialize)]
pub struct GrantCreditsRequest {
    pub amount: i32,
}

#[derive(Debug, Serialize)]
pub struct GrantCreditsResponse {
    pub user_id: Uuid,
    pub balance: i32,
}

pub async fn grant_credits(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<GrantCreditsRequest>,
) -> AppResult<Json<ApiResponse<GrantCreditsResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let balance = credit_service::grant_credit(&mut conn, user_id, req.amount)?;

    publisher::publish_credit_granted(&state.rabbitmq, user_id, req.amount).await;
    tracing::info!(admin = %admin.0.id, user_id = %user_id, amount = req.amount, "manual credit grant");

    Ok(Json(ApiResponse::ok(GrantCreditsResponse { user_id, balance })))
}

// --- Broadcast announcements ---

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub message: String,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BroadcastQueuedResponse {
    pub queued: bool,
    pub audience: i64,
}

/// POST /admin/broadcast - queue an announcement for delivery
///
/// Delivery is the notification collaborator's job; this publishes the
/// request and reports the current active audience size.
pub async fn request_broadcast(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(req): Json<BroadcastRequest>,
) -> AppResult<Json<ApiResponse<BroadcastQueuedResponse>>> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("broadcast message must not be empty".into()));
    }
    if req.button_text.is_some() != req.button_url.is_some() {
        return Err(AppError::Validation(
            "button text and url must be provided together".into(),
        ));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let audience: i64 = profiles::table
        .filter(profiles::active.eq(true))
        .filter(profiles::banned.eq(false))
        .count()
        .get_result(&mut conn)?;

    publisher::publish_announcement_requested(
        &state.rabbitmq,
        message,
        req.button_text.as_deref(),
        req.button_url.as_deref(),
    )
    .await;

    tracing::info!(admin = %admin.0.id, audience, "broadcast queued");

    Ok(Json(ApiResponse::ok(BroadcastQueuedResponse {
        queued: true,
        audience,
    })))
}
