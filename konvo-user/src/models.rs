use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::profiles;

// --- Profile ---

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

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
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
    pub premium_credits: i32,
    pub referral_code: String,
    pub referred_by: Option<Uuid>,
}

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub interested_in: Option<String>,
    pub bio: Option<String>,
    pub photo_ref: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}
