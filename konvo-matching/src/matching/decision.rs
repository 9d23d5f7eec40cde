use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};

use super::ledger::{self, RelationshipStatus};
use crate::models::Relationship;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Like,
    Dislike,
    Remove,
}

/// What happened to the pair, in the vocabulary the presentation layer
/// templates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Sent,
    Matched,
    AlreadyPending,
    Disliked,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyKind {
    LikeReceived,
    Match,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notify {
    pub user_id: Uuid,
    pub kind: NotifyKind,
}

#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    pub outcome: Outcome,
    pub notify: Vec<Notify>,
}

/// What the current pair row looked like when the decision was planned.
#[derive(Debug, Clone, Copy)]
pub struct PairView {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub status: RelationshipStatus,
}

impl PairView {
    fn of(rec: &Relationship) -> AppResult<Self> {
        Ok(Self {
            id: rec.id,
            actor_id: rec.actor_id,
            status: ledger::status_of(rec)?,
        })
    }
}

/// The single write (or no-op) a decision resolves to against the observed
/// pair state. Every write is compare-and-set; a miss means another writer
/// touched the pair and the caller re-plans from a fresh read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Insert(RelationshipStatus),
    Promote { record_id: Uuid },
    Reauthor {
        record_id: Uuid,
        from: RelationshipStatus,
        to: RelationshipStatus,
    },
    Done(Outcome),
}

/// Pure transition function of the pair state machine.
///
/// * A like on an empty pair opens `pending`; on the counterpart's pending
///   it promotes to `matched`; on anything resolved it echoes the existing
///   status without touching the row.
/// * A dislike is permanent and idempotent: it claims the row whatever
///   state it is in, except a row that is already `disliked`.
/// * A remove severs a `matched`/`pending` row, re-authored by the remover
///   so its exclusion stays scoped to them; an absent row degrades to a
///   fresh insert, and an already-blocked row is left alone.
pub fn plan(actor: Uuid, existing: Option<PairView>, decision: Decision) -> Step {
    match decision {
        Decision::Like => match existing {
            None => Step::Insert(RelationshipStatus::Pending),
            Some(v) => match v.status {
                RelationshipStatus::Pending if v.actor_id != actor => {
                    Step::Promote { record_id: v.id }
                }
                RelationshipStatus::Pending => Step::Done(Outcome::AlreadyPending),
                RelationshipStatus::Matched => Step::Done(Outcome::Matched),
                RelationshipStatus::Disliked => Step::Done(Outcome::Disliked),
                RelationshipStatus::Removed => Step::Done(Outcome::Removed),
            },
        },
        Decision::Dislike => match existing {
            None => Step::Insert(RelationshipStatus::Disliked),
            Some(v) => match v.status {
                RelationshipStatus::Disliked => Step::Done(Outcome::Disliked),
                other => Step::Reauthor {
                    record_id: v.id,
                    from: other,
                    to: RelationshipStatus::Disliked,
                },
            },
        },
        Decision::Remove => match existing {
            None => Step::Insert(RelationshipStatus::Removed),
            Some(v) => match v.status {
                RelationshipStatus::Matched | RelationshipStatus::Pending => Step::Reauthor {
                    record_id: v.id,
                    from: v.status,
                    to: RelationshipStatus::Removed,
                },
                RelationshipStatus::Disliked | RelationshipStatus::Removed => {
                    Step::Done(Outcome::Removed)
                }
            },
        },
    }
}

fn outcome_for_insert(status: RelationshipStatus, actor: Uuid, subject: Uuid) -> DecisionOutcome {
    match status {
        RelationshipStatus::Pending => DecisionOutcome {
            outcome: Outcome::Sent,
            notify: vec![Notify {
                user_id: subject,
                kind: NotifyKind::LikeReceived,
            }],
        },
        RelationshipStatus::Disliked => DecisionOutcome {
            outcome: Outcome::Disliked,
            notify: vec![],
        },
        RelationshipStatus::Removed => DecisionOutcome {
            outcome: Outcome::Removed,
            notify: vec![],
        },
        // plan() never inserts a matched row
        RelationshipStatus::Matched => {
            tracing::error!(actor = %actor, subject = %subject, "unexpected matched insert");
            DecisionOutcome {
                outcome: Outcome::Matched,
                notify: vec![],
            }
        }
    }
}

/// Record a like/dislike/remove decision and report who to notify.
///
/// The read-then-write sequence races with the other member of the pair, so
/// every write is compare-and-set against the observed state and the whole
/// loop retries on a miss. Retries are bounded: a lost match transition is
/// the one failure here the user cannot recover from by themselves.
pub fn record_decision(
    conn: &mut PgConnection,
    actor: Uuid,
    subject: Uuid,
    decision: Decision,
) -> AppResult<DecisionOutcome> {
    if actor == subject {
        return Err(AppError::new(
            ErrorCode::CannotDecideSelf,
            "cannot like, dislike, or remove yourself",
        ));
    }

    for attempt in 1..=MAX_ATTEMPTS {
        let existing = ledger::find_pair(conn, actor, subject)?;
        let view = existing.as_ref().map(PairView::of).transpose()?;

        match plan(actor, view, decision) {
            Step::Insert(status) => {
                if ledger::try_insert(conn, actor, subject, status)? {
                    return Ok(outcome_for_insert(status, actor, subject));
                }
            }
            Step::Promote { record_id } => {
                if ledger::try_promote(conn, record_id)? {
                    return Ok(DecisionOutcome {
                        outcome: Outcome::Matched,
                        notify: vec![
                            Notify {
                                user_id: actor,
                                kind: NotifyKind::Match,
                            },
                            Notify {
                                user_id: subject,
                                kind: NotifyKind::Match,
                            },
                        ],
                    });
                }
            }
            Step::Reauthor { record_id, from, to } => {
                if ledger::try_reauthor(conn, record_id, from, to, actor, subject)? {
                    let outcome = match to {
                        RelationshipStatus::Disliked => Outcome::Disliked,
                        _ => Outcome::Removed,
                    };
                    return Ok(DecisionOutcome {
                        outcome,
                        notify: vec![],
                    });
                }
            }
            Step::Done(outcome) => {
                return Ok(DecisionOutcome {
                    outcome,
                    notify: vec![],
                });
            }
        }

        tracing::debug!(
            actor = %actor,
            subject = %subject,
            attempt,
            "pair write lost a race, re-reading"
        );
        std::thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64));
    }

    Err(AppError::new(
        ErrorCode::LedgerConflict,
        "pair is under contention, try again",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(actor: Uuid, status: RelationshipStatus) -> PairView {
        PairView {
            id: Uuid::now_v7(),
            actor_id: actor,
            status,
        }
    }

    #[test]
    fn first_like_opens_pending() {
        let a = Uuid::now_v7();
        assert_eq!(
            plan(a, None, Decision::Like),
            Step::Insert(RelationshipStatus::Pending)
        );
    }

    #[test]
    fn reciprocal_like_promotes_regardless_of_order() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        // A liked first, B answers
        let pending_by_a = view(a, RelationshipStatus::Pending);
        assert!(matches!(
            plan(b, Some(pending_by_a), Decision::Like),
            Step::Promote { .. }
        ));

        // B liked first, A answers
        let pending_by_b = view(b, RelationshipStatus::Pending);
        assert!(matches!(
            plan(a, Some(pending_by_b), Decision::Like),
            Step::Promote { .. }
        ));
    }

    #[test]
    fn duplicate_like_is_a_noop() {
        let a = Uuid::now_v7();
        let pending_by_a = view(a, RelationshipStatus::Pending);
        assert_eq!(
            plan(a, Some(pending_by_a), Decision::Like),
            Step::Done(Outcome::AlreadyPending)
        );
    }

    #[test]
    fn like_never_reopens_a_blocked_pair() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        for (status, outcome) in [
            (RelationshipStatus::Matched, Outcome::Matched),
            (RelationshipStatus::Disliked, Outcome::Disliked),
            (RelationshipStatus::Removed, Outcome::Removed),
        ] {
            assert_eq!(
                plan(a, Some(view(b, status)), Decision::Like),
                Step::Done(outcome)
            );
        }
    }

    #[test]
    fn dislike_is_idempotent_and_permanent() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        assert_eq!(
            plan(a, None, Decision::Dislike),
            Step::Insert(RelationshipStatus::Disliked)
        );

        // Repeated dislike: no second row, no status churn
        assert_eq!(
            plan(a, Some(view(b, RelationshipStatus::Disliked)), Decision::Dislike),
            Step::Done(Outcome::Disliked)
        );

        // A dislike claims a pending or matched row
        for status in [RelationshipStatus::Pending, RelationshipStatus::Matched] {
            assert!(matches!(
                plan(a, Some(view(b, status)), Decision::Dislike),
                Step::Reauthor {
                    to: RelationshipStatus::Disliked,
                    ..
                }
            ));
        }

        // And once disliked, a later like from either side stays a no-op
        let disliked = view(b, RelationshipStatus::Disliked);
        assert_eq!(plan(a, Some(disliked), Decision::Like), Step::Done(Outcome::Disliked));
        assert_eq!(plan(b, Some(disliked), Decision::Like), Step::Done(Outcome::Disliked));
    }

    #[test]
    fn remove_severs_or_degrades_to_insert() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        // Severing an existing match re-authors the row to the remover
        assert!(matches!(
            plan(a, Some(view(b, RelationshipStatus::Matched)), Decision::Remove),
            Step::Reauthor {
                to: RelationshipStatus::Removed,
                ..
            }
        ));

        // No prior state is not an error: a fresh removed row is created
        assert_eq!(
            plan(a, None, Decision::Remove),
            Step::Insert(RelationshipStatus::Removed)
        );

        // An already-blocked pair needs no further writes
        for status in [RelationshipStatus::Disliked, RelationshipStatus::Removed] {
            assert_eq!(
                plan(a, Some(view(b, status)), Decision::Remove),
                Step::Done(Outcome::Removed)
            );
        }
    }

    #[test]
    fn insert_outcomes_carry_the_right_notifications() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        let sent = outcome_for_insert(RelationshipStatus::Pending, a, b);
        assert_eq!(sent.outcome, Outcome::Sent);
        assert_eq!(sent.notify.len(), 1);
        assert_eq!(sent.notify[0].user_id, b);
        assert_eq!(sent.notify[0].kind, NotifyKind::LikeReceived);

        let disliked = outcome_for_insert(RelationshipStatus::Disliked, a, b);
        assert_eq!(disliked.outcome, Outcome::Disliked);
        assert!(disliked.notify.is_empty());
    }
}
