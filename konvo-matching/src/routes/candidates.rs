use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult};
use konvo_shared::types::auth::AuthUser;
use konvo_shared::types::ApiResponse;

use crate::matching::selector::{self, SelectionSource};
use crate::models::Profile;
use crate::AppState;

/// The public face of a profile shown to another user. Balance, referral
/// data, and moderation flags stay server-side.
#[derive(Debug, Serialize)]
pub struct CandidateView {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: String,
    pub photo_ref: Option<String>,
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub match_score: i32,
}

impl CandidateView {
    fn new(profile: Profile, distance_km: Option<f64>, match_score: i32) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.name,
            age: profile.age,
            gender: profile.gender,
            bio: profile.bio,
            photo_ref: profile.photo_ref,
            city: profile.city,
            distance_km: distance_km.map(|km| km.round()),
            match_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NextCandidateResponse {
    pub candidate: Option<CandidateView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SelectionSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// GET /candidates/next - the next eligible profile for the caller
pub async fn next_candidate(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<NextCandidateResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let selected = selector::select_candidate(&mut conn, user.id, state.config.nearby_radius_km)?;

    let response = match selected {
        Some(sel) => {
            let source = sel.source;
            let body = NextCandidateResponse {
                candidate: Some(CandidateView::new(sel.profile, sel.distance_km, sel.match_score)),
                source: Some(source),
                reason: None,
            };
            if source == SelectionSource::Fallback {
                ApiResponse::ok_with_message(
                    body,
                    "No nearby matches found. Showing matches from other locations.",
                )
            } else {
                ApiResponse::ok(body)
            }
        }
        None => ApiResponse::ok_with_message(
            NextCandidateResponse {
                candidate: None,
                source: None,
                reason: Some("none"),
            },
            "No more matches available at the moment. Check back later!",
        ),
    };

    Ok(Json(response))
}
