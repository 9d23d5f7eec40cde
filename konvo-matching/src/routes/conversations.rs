use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};
use konvo_shared::types::auth::AuthUser;
use konvo_shared::types::pagination::{Paginated, PaginationParams};
use konvo_shared::types::ApiResponse;

use crate::events::publisher;
use crate::matching::ledger::{self, RelationshipStatus};
use crate::models::{Message, NewMessage, Profile};
use crate::schema::{messages, profiles};
use crate::AppState;

const MAX_MESSAGE_LEN: usize = 2000;
const PREVIEW_LEN: usize = 80;

/// Both members of a matched pair may message each other; everyone else
/// gets turned away here.
fn require_matched(conn: &mut PgConnection, a: Uuid, b: Uuid) -> AppResult<()> {
    let pair = ledger::find_pair(conn, a, b)?;
    let matched = match pair {
        Some(rec) => ledger::status_of(&rec)? == RelationshipStatus::Matched,
        None => false,
    };
    if !matched {
        return Err(AppError::new(
            ErrorCode::NotMatchedWithUser,
            "you are not matched with this user",
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// POST /conversations/:user_id/messages
pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let body = req.body.trim();
    if body.is_empty() {
        return Err(AppError::Validation("message body must not be empty".into()));
    }
    if body.len() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation(format!(
            "message body must be at most {MAX_MESSAGE_LEN} characters"
        )));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let sender = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "create a profile first"))?;

    require_matched(&mut conn, user.id, partner_id)?;

    let message = diesel::insert_into(messages::table)
        .values(&NewMessage {
            sender_id: user.id,
            recipient_id: partner_id,
            body: body.to_string(),
        })
        .get_result::<Message>(&mut conn)?;

    let preview: String = body.chars().take(PREVIEW_LEN).collect();
    publisher::publish_message_sent(
        &state.rabbitmq,
        message.id,
        user.id,
        partner_id,
        &sender.name,
        &preview,
    )
    .await;

    Ok(Json(ApiResponse::ok(message)))
}

/// GET /conversations/:user_id/messages - the thread with one partner,
/// newest first
pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Message>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    require_matched(&mut conn, user.id, partner_id)?;

    let in_thread = messages::sender_id
        .eq(user.id)
        .and(messages::recipient_id.eq(partner_id))
        .or(messages::sender_id
            .eq(partner_id)
            .and(messages::recipient_id.eq(user.id)));

    let items = messages::table
        .filter(in_thread)
        .order(messages::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Message>(&mut conn)?;

    let total: i64 = messages::table.filter(in_thread).count().get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}
