use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};
use konvo_shared::types::auth::AuthUser;
use konvo_shared::types::profile::{Gender, InterestedIn};
use konvo_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{NewProfile, Profile, UpdateProfile};
use crate::schema::profiles;
use crate::services::{credit_service, referral_service};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 18, max = 120))]
    pub age: i32,
    pub gender: String,
    pub interested_in: String,
    #[validate(length(max = 1000))]
    pub bio: String,
    pub photo_ref: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub referral_code: Option<String>,
}

fn parse_orientation(gender: &str, interested_in: &str) -> AppResult<(Gender, InterestedIn)> {
    let g: Gender = gender
        .parse()
        .map_err(|e: String| AppError::Validation(e))?;
    let i: InterestedIn = interested_in
        .parse()
        .map_err(|e: String| AppError::Validation(e))?;
    Ok((g, i))
}

fn check_geo_pair(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    if latitude.is_some() != longitude.is_some() {
        return Err(AppError::Validation(
            "latitude and longitude must be provided together".into(),
        ));
    }
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::Validation("latitude out of range".into()));
        }
    }
    if let Some(lng) = longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::Validation("longitude out of range".into()));
        }
    }
    Ok(())
}

/// GET /me
pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "create a profile first"))?;

    Ok(Json(ApiResponse::ok(profile)))
}

/// PUT /me - complete (or re-complete) the caller's profile
///
/// First completion applies the referral code, seeds starting credits, and
/// generates the caller's own referral code. Re-completing overwrites the
/// profile fields and reactivates the profile; referral input is ignored
/// after signup.
pub async fn complete_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let (gender, interested_in) = parse_orientation(&req.gender, &req.interested_in)?;
    check_geo_pair(req.latitude, req.longitude)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .optional()?;

    if let Some(profile) = existing {
        if profile.banned {
            return Err(AppError::new(ErrorCode::UserBanned, "this account is banned"));
        }

        let updated = diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
            .set((
                profiles::name.eq(&req.name),
                profiles::age.eq(req.age),
                profiles::gender.eq(gender.to_string()),
                profiles::interested_in.eq(interested_in.to_string()),
                profiles::bio.eq(&req.bio),
                profiles::photo_ref.eq(req.photo_ref.clone()),
                profiles::city.eq(req.city.clone()),
                profiles::latitude.eq(req.latitude),
                profiles::longitude.eq(req.longitude),
                profiles::active.eq(true),
                profiles::updated_at.eq(Utc::now()),
            ))
            .get_result::<Profile>(&mut conn)?;

        publisher::publish_profile_updated(&state.rabbitmq, user.id).await;
        return Ok(Json(ApiResponse::ok(updated)));
    }

    // First completion: resolve the referral before anything is written
    let referrer = match req.referral_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            let referrer = profiles::table
                .filter(profiles::referral_code.eq(code))
                .first::<Profile>(&mut conn)
                .optional()?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::InvalidReferralCode, "referral code not found")
                })?;
            if referrer.user_id == user.id {
                return Err(AppError::new(
                    ErrorCode::CannotReferSelf,
                    "cannot use your own referral code",
                ));
            }
            Some(referrer)
        }
        _ => None,
    };

    let referral_code = referral_service::generate_referral_code(&mut conn)?;
    let starting_credits = if referrer.is_some() { 1 } else { 0 };

    let new_profile = NewProfile {
        user_id: user.id,
        name: req.name.clone(),
        age: req.age,
        gender: gender.to_string(),
        interested_in: interested_in.to_string(),
        bio: req.bio.clone(),
        photo_ref: req.photo_ref.clone(),
        city: req.city.clone(),
        latitude: req.latitude,
        longitude: req.longitude,
        active: true,
        premium_credits: starting_credits,
        referral_code,
        referred_by: referrer.as_ref().map(|r| r.user_id),
    };

    let profile = diesel::insert_into(profiles::table)
        .values(&new_profile)
        .get_result::<Profile>(&mut conn)?;

    if let Some(referrer) = referrer {
        credit_service::record_referral(&mut conn, referrer.user_id)?;
        publisher::publish_referral_completed(&state.rabbitmq, referrer.user_id, user.id).await;
    }

    publisher::publish_profile_created(&state.rabbitmq, user.id, &profile.name).await;

    tracing::info!(user_id = %user.id, "profile created");
    Ok(Json(ApiResponse::ok(profile)))
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct EditProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 18, max = 120))]
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub interested_in: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    pub photo_ref: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// PATCH /me - edit individual profile fields
pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<EditProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let gender = match req.gender.as_deref() {
        Some(g) => Some(
            g.parse::<Gender>()
                .map_err(|e: String| AppError::Validation(e))?,
        ),
        None => None,
    };
    let interested_in = match req.interested_in.as_deref() {
        Some(i) => Some(
            i.parse::<InterestedIn>()
                .map_err(|e: String| AppError::Validation(e))?,
        ),
        None => None,
    };
    check_geo_pair(req.latitude, req.longitude)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "create a profile first"))?;

    if profile.banned {
        return Err(AppError::new(ErrorCode::UserBanned, "this account is banned"));
    }

    let changes = UpdateProfile {
        name: req.name,
        age: req.age,
        gender: gender.map(|g| g.to_string()),
        interested_in: interested_in.map(|i| i.to_string()),
        bio: req.bio,
        photo_ref: req.photo_ref,
        city: req.city,
        latitude: req.latitude,
        longitude: req.longitude,
        updated_at: Some(Utc::now()),
    };

    let updated = diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set(&changes)
        .get_result::<Profile>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, user.id).await;

    Ok(Json(ApiResponse::ok(updated)))
}

#[derive(Debug, Serialize)]
pub struct ActiveStateResponse {
    pub active: bool,
}

/// POST /me/deactivate - hide the profile from matching and broadcasts
pub async fn deactivate_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ActiveStateResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows = diesel::update(profiles::table.filter(profiles::user_id.eq(user.id)))
        .set((profiles::active.eq(false), profiles::updated_at.eq(Utc::now())))
        .execute(&mut conn)?;

    if rows == 0 {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "create a profile first"));
    }

    publisher::publish_profile_deactivated(&state.rabbitmq, user.id).await;

    Ok(Json(ApiResponse::ok(ActiveStateResponse { active: false })))
}

/// POST /me/reactivate
pub async fn reactivate_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ActiveStateResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "create a profile first"))?;

    if profile.banned {
        return Err(AppError::new(ErrorCode::UserBanned, "this account is banned"));
    }

    diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((profiles::active.eq(true), profiles::updated_at.eq(Utc::now())))
        .execute(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, user.id).await;

    Ok(Json(ApiResponse::ok(ActiveStateResponse { active: true })))
}
