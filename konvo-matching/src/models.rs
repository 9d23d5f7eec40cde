use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{messages, profiles, relationships};

// --- Profile (read model; konvo-user owns the writes) ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub interested_in: String,
    pub bio: String,
    pub photo_ref: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub active: bool,
    pub banned: bool,
    pub premium_credits: i32,
    pub referral_code: String,
    pub referred_by: Option<Uuid>,
    pub referral_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Relationship (the pair ledger) ---

/// One mutable row per unordered pair. `user_lo`/`user_hi` are the canonical
/// sort of the two user ids and carry the unique index; `actor_id` is the
/// user who authored the row's current status.
#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = relationships)]
pub struct Relationship {
    pub id: Uuid,
    pub user_lo: Uuid,
    pub user_hi: Uuid,
    pub actor_id: Uuid,
    pub subject_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub matched_at: Option<DateTime<Utc>>,
}

impl Relationship {
    /// The other member of the pair, from `user`'s point of view.
    pub fn counterpart(&self, user: Uuid) -> Uuid {
        if self.user_lo == user {
            self.user_hi
        } else {
            self.user_lo
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = relationships)]
pub struct NewRelationship {
    pub user_lo: Uuid,
    pub user_hi: Uuid,
    pub actor_id: Uuid,
    pub subject_id: Uuid,
    pub status: String,
}

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
}
