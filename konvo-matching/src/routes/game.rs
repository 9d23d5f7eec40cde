use axum::extract::{Path, State};
use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};
use konvo_shared::types::auth::AuthUser;
use konvo_shared::types::ApiResponse;

use crate::game::{self, Answer, GameSession};
use crate::matching::ledger::{self, RelationshipStatus};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub question: &'static str,
    pub options: [&'static str; 2],
}

/// POST /game/:partner_id/start - draw a question for a matched pair
///
/// Both players get the same pending question in the keyed session store;
/// either side answering first just waits for the other.
pub async fn start_game(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<QuestionView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let pair = ledger::find_pair(&mut conn, user.id, partner_id)?;
    let matched = match pair {
        Some(rec) => ledger::status_of(&rec)? == RelationshipStatus::Matched,
        None => false,
    };
    if !matched {
        return Err(AppError::new(
            ErrorCode::NotMatchedWithUser,
            "you can only play with a match",
        ));
    }

    let question_idx = rand::thread_rng().gen_range(0..game::QUESTIONS.len());

    game::save_session(
        &state.redis,
        user.id,
        &GameSession {
            partner_id,
            question_idx,
            answer: None,
        },
    )
    .await;
    game::save_session(
        &state.redis,
        partner_id,
        &GameSession {
            partner_id: user.id,
            question_idx,
            answer: None,
        },
    )
    .await;

    let q = &game::QUESTIONS[question_idx];
    Ok(Json(ApiResponse::ok(QuestionView {
        question: q.question,
        options: q.options,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: Answer,
}

#[derive(Debug, Serialize)]
pub struct GameResult {
    pub both_answered: bool,
    pub your_choice: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

fn choice_text(question_idx: usize, answer: Answer) -> &'static str {
    let q = &game::QUESTIONS[question_idx];
    match answer {
        Answer::A => q.options[0],
        Answer::B => q.options[1],
    }
}

/// POST /game/answer - answer the caller's pending question
pub async fn answer_game(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnswerRequest>,
) -> AppResult<Json<ApiResponse<GameResult>>> {
    let mut session = game::load_session(&state.redis, user.id)
        .await
        .ok_or_else(|| {
            AppError::new(ErrorCode::GameSessionExpired, "no pending question, start a new one")
        })?;

    session.answer = Some(req.answer);
    game::save_session(&state.redis, user.id, &session).await;

    let your_choice = choice_text(session.question_idx, req.answer);

    // See whether the partner already answered the same question
    let partner = game::load_session(&state.redis, session.partner_id).await;
    let finished = partner.as_ref().and_then(|p| {
        if p.partner_id == user.id && p.question_idx == session.question_idx {
            p.answer
        } else {
            None
        }
    });

    let result = match finished {
        Some(partner_answer) => {
            let agreed = partner_answer == req.answer;
            let score = if agreed {
                game::bump_score(&state.redis, user.id, session.partner_id).await
            } else {
                game::get_score(&state.redis, user.id, session.partner_id).await
            };

            game::clear_session(&state.redis, user.id).await;
            game::clear_session(&state.redis, session.partner_id).await;

            GameResult {
                both_answered: true,
                your_choice,
                partner_choice: Some(choice_text(session.question_idx, partner_answer)),
                agreed: Some(agreed),
                score: Some(score),
            }
        }
        None => GameResult {
            both_answered: false,
            your_choice,
            partner_choice: None,
            agreed: None,
            score: None,
        },
    };

    Ok(Json(ApiResponse::ok(result)))
}

#[derive(Debug, Serialize)]
pub struct CompatibilityView {
    pub partner_id: Uuid,
    pub score: i64,
}

/// GET /game/:partner_id/compatibility
pub async fn get_compatibility(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CompatibilityView>>> {
    let score = game::get_score(&state.redis, user.id, partner_id).await;
    Ok(Json(ApiResponse::ok(CompatibilityView { partner_id, score })))
}
