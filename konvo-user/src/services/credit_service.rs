use diesel::prelude::*;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};

use crate::schema::profiles;

/// Add premium match credits to a user's balance. The increment runs in
/// SQL, never read-modify-write, so concurrent grants cannot clobber each
/// other and the balance stays non-negative.
pub fn grant_credit(conn: &mut PgConnection, user_id: Uuid, amount: i32) -> AppResult<i32> {
    if amount <= 0 {
        return Err(AppError::Validation("credit amount must be positive".into()));
    }

    let balance = diesel::update(profiles::table.filter(profiles::user_id.eq(user_id)))
        .set(profiles::premium_credits.eq(profiles::premium_credits + amount))
        .returning(profiles::premium_credits)
        .get_result::<i32>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    tracing::info!(user_id = %user_id, amount, balance, "premium credits granted");
    Ok(balance)
}

/// Record a completed referral on the referrer: one credit plus the
/// referral counter, in one atomic update.
pub fn record_referral(conn: &mut PgConnection, referrer_id: Uuid) -> AppResult<()> {
    let rows = diesel::update(profiles::table.filter(profiles::user_id.eq(referrer_id)))
        .set((
            profiles::premium_credits.eq(profiles::premium_credits + 1),
            profiles::referral_count.eq(profiles::referral_count + 1),
        ))
        .execute(conn)?;

    if rows == 0 {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "referrer profile not found"));
    }
    Ok(())
}
