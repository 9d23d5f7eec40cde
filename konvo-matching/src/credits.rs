use diesel::prelude::*;
use uuid::Uuid;

use konvo_shared::errors::AppResult;

use crate::schema::profiles;

// Grants live in konvo-user (referral signups and admin grants); this
// service only ever spends.

/// Spend one premium credit. The decrement is guarded in SQL so two
/// concurrent spenders cannot both drain the last credit; returns false
/// (no mutation) on a zero balance.
pub fn consume_credit(conn: &mut PgConnection, user_id: Uuid) -> AppResult<bool> {
    let rows = diesel::update(
        profiles::table
            .filter(profiles::user_id.eq(user_id))
            .filter(profiles::premium_credits.gt(0)),
    )
    .set(profiles::premium_credits.eq(profiles::premium_credits - 1))
    .execute(conn)?;

    Ok(rows == 1)
}
