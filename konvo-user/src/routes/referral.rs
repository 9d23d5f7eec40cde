use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};
use konvo_shared::types::auth::AuthUser;
use konvo_shared::types::ApiResponse;

use crate::models::Profile;
use crate::schema::profiles;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ReferralView {
    pub referral_code: String,
    pub premium_credits: i32,
    pub referral_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<Uuid>,
}

/// GET /referral - the caller's referral code and credit standing.
/// Link rendering is the frontend's job; this only hands over the facts.
pub async fn get_referral_info(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ReferralView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "create a profile first"))?;

    Ok(Json(ApiResponse::ok(ReferralView {
        referral_code: profile.referral_code,
        premium_credits: profile.premium_credits,
        referral_count: profile.referral_count,
        referred_by: profile.referred_by,
    })))
}
