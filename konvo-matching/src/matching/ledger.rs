use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewRelationship, Relationship};
use crate::schema::relationships;

/// The four states a pair can be in. `Pending` awaits reciprocation;
/// the other three block re-selection (`Removed` only from the remover's
/// side, see the selector's exclusion rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Pending,
    Matched,
    Disliked,
    Removed,
}

impl std::fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipStatus::Pending => write!(f, "pending"),
            RelationshipStatus::Matched => write!(f, "matched"),
            RelationshipStatus::Disliked => write!(f, "disliked"),
            RelationshipStatus::Removed => write!(f, "removed"),
        }
    }
}

impl std::str::FromStr for RelationshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RelationshipStatus::Pending),
            "matched" => Ok(RelationshipStatus::Matched),
            "disliked" => Ok(RelationshipStatus::Disliked),
            "removed" => Ok(RelationshipStatus::Removed),
            _ => Err(format!("unknown relationship status: {s}")),
        }
    }
}

/// Canonical unordered pair key. Every ledger lookup and the unique index
/// on `(user_lo, user_hi)` use this ordering, so both directions of a pair
/// land on the same row.
pub fn pair_key(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Parse the stored status. An unknown value means the ledger has been
/// corrupted out-of-band; surface it rather than guessing.
pub fn status_of(rec: &Relationship) -> AppResult<RelationshipStatus> {
    rec.status.parse().map_err(|_| {
        tracing::error!(record_id = %rec.id, status = %rec.status, "unknown ledger status");
        AppError::new(ErrorCode::LedgerInconsistent, "ledger record has unknown status")
    })
}

/// Load the pair row, if any. Finding more than one row for a canonical
/// pair is a fatal consistency error; picking one arbitrarily could
/// resurrect a disliked pair.
pub fn find_pair(conn: &mut PgConnection, a: Uuid, b: Uuid) -> AppResult<Option<Relationship>> {
    let (lo, hi) = pair_key(a, b);
    let rows = relationships::table
        .filter(relationships::user_lo.eq(lo))
        .filter(relationships::user_hi.eq(hi))
        .limit(2)
        .load::<Relationship>(conn)?;

    if rows.len() > 1 {
        tracing::error!(user_lo = %lo, user_hi = %hi, "multiple ledger rows for one pair");
        return Err(AppError::new(
            ErrorCode::LedgerInconsistent,
            "multiple ledger rows for one pair",
        ));
    }

    Ok(rows.into_iter().next())
}

/// All relationship rows touching `user`, in either direction.
pub fn find_all_for_user(conn: &mut PgConnection, user: Uuid) -> AppResult<Vec<Relationship>> {
    let rows = relationships::table
        .filter(relationships::user_lo.eq(user).or(relationships::user_hi.eq(user)))
        .load::<Relationship>(conn)?;
    Ok(rows)
}

/// Rows touching `user` with the given status.
pub fn find_for_user_with_status(
    conn: &mut PgConnection,
    user: Uuid,
    status: RelationshipStatus,
) -> AppResult<Vec<Relationship>> {
    let rows = relationships::table
        .filter(relationships::user_lo.eq(user).or(relationships::user_hi.eq(user)))
        .filter(relationships::status.eq(status.to_string()))
        .order(relationships::created_at.desc())
        .load::<Relationship>(conn)?;
    Ok(rows)
}

/// Insert a fresh row for the pair, authored by `actor`. Returns false when
/// another writer won the unique index race; the caller re-reads and retries.
pub fn try_insert(
    conn: &mut PgConnection,
    actor: Uuid,
    subject: Uuid,
    status: RelationshipStatus,
) -> AppResult<bool> {
    let (lo, hi) = pair_key(actor, subject);
    let rows = diesel::insert_into(relationships::table)
        .values(&NewRelationship {
            user_lo: lo,
            user_hi: hi,
            actor_id: actor,
            subject_id: subject,
            status: status.to_string(),
        })
        .on_conflict((relationships::user_lo, relationships::user_hi))
        .do_nothing()
        .execute(conn)?;
    Ok(rows == 1)
}

/// Promote a pending row to matched. Compare-and-set on the prior status:
/// returns false when the row changed under us.
pub fn try_promote(conn: &mut PgConnection, record_id: Uuid) -> AppResult<bool> {
    let rows = diesel::update(
        relationships::table
            .filter(relationships::id.eq(record_id))
            .filter(relationships::status.eq(RelationshipStatus::Pending.to_string())),
    )
    .set((
        relationships::status.eq(RelationshipStatus::Matched.to_string()),
        relationships::matched_at.eq(Utc::now()),
    ))
    .execute(conn)?;
    Ok(rows == 1)
}

/// Move the row to a new status, re-authored by the acting user.
/// Compare-and-set on the status the caller observed.
pub fn try_reauthor(
    conn: &mut PgConnection,
    record_id: Uuid,
    from: RelationshipStatus,
    to: RelationshipStatus,
    actor: Uuid,
    subject: Uuid,
) -> AppResult<bool> {
    let rows = diesel::update(
        relationships::table
            .filter(relationships::id.eq(record_id))
            .filter(relationships::status.eq(from.to_string())),
    )
    .set((
        relationships::status.eq(to.to_string()),
        relationships::actor_id.eq(actor),
        relationships::subject_id.eq(subject),
    ))
    .execute(conn)?;
    Ok(rows == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_independent() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(pair_key(a, b), pair_key(b, a));
        let (lo, hi) = pair_key(a, b);
        assert!(lo < hi);
    }

    #[test]
    fn status_roundtrip() {
        for s in ["pending", "matched", "disliked", "removed"] {
            assert_eq!(s.parse::<RelationshipStatus>().unwrap().to_string(), s);
        }
        assert!("blocked".parse::<RelationshipStatus>().is_err());
    }
}
