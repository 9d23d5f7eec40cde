use diesel::pg::Pg;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use konvo_shared::errors::{AppError, AppResult, ErrorCode};
use konvo_shared::types::profile::{Gender, InterestedIn};

use super::ledger::{self, RelationshipStatus};
use super::proximity;
use crate::credits;
use crate::models::{Profile, Relationship};
use crate::schema::profiles;

/// How many base-filtered rows the in-process proximity pass scans. The
/// store has no ranking contract, so the scan window doubles as the
/// natural-order tie-break.
const CANDIDATE_SCAN_LIMIT: i64 = 100;

/// How the returned candidate was found. `Fallback` means the proximity
/// pass came up empty and the pick is from the full population; the
/// presentation layer words that differently from a nearby match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionSource {
    Premium,
    Nearby,
    Fallback,
    Anywhere,
}

#[derive(Debug)]
pub struct SelectedCandidate {
    pub profile: Profile,
    pub source: SelectionSource,
    pub distance_km: Option<f64>,
    pub match_score: i32,
}

/// User ids the requester's candidate search must never return: the
/// requester themselves, both sides of any disliked or matched pair,
/// removals the requester authored, and subjects the requester has already
/// liked and is awaiting a reply from. A pending like *received* does not
/// exclude: the liker can still come up in the requester's own pass and
/// be liked back into a match.
pub fn exclusion_set(user: Uuid, rels: &[Relationship]) -> AppResult<HashSet<Uuid>> {
    let mut excluded = HashSet::new();
    excluded.insert(user);

    for rec in rels {
        let other = rec.counterpart(user);
        match ledger::status_of(rec)? {
            RelationshipStatus::Disliked | RelationshipStatus::Matched => {
                excluded.insert(other);
            }
            RelationshipStatus::Removed | RelationshipStatus::Pending => {
                if rec.actor_id == user {
                    excluded.insert(other);
                }
            }
        }
    }

    Ok(excluded)
}

/// Display score shown alongside a candidate, 0-4: one point each for the
/// candidate wanting the requester's gender, the requester wanting theirs,
/// a shared city, and ages within 5 years.
pub fn match_score(requester: &Profile, candidate: &Profile) -> i32 {
    let mut score = 0;
    let requester_gender = requester.gender.parse::<Gender>().ok();
    let candidate_gender = candidate.gender.parse::<Gender>().ok();
    if let (Ok(pref), Some(g)) = (candidate.interested_in.parse::<InterestedIn>(), requester_gender)
    {
        if pref.accepts(g) {
            score += 1;
        }
    }
    if let (Ok(pref), Some(g)) = (requester.interested_in.parse::<InterestedIn>(), candidate_gender)
    {
        if pref.accepts(g) {
            score += 1;
        }
    }
    let city_a = requester.city.as_deref().and_then(proximity::normalize_city);
    let city_b = candidate.city.as_deref().and_then(proximity::normalize_city);
    if let (Some(a), Some(b)) = (city_a, city_b) {
        if a == b {
            score += 1;
        }
    }
    if (requester.age - candidate.age).abs() <= 5 {
        score += 1;
    }
    score
}

/// Pick from an already-filtered candidate list: the first nearby profile
/// when the requester has location data, the first of the full list
/// (tagged `Fallback`) when nothing is nearby, or plain natural order when
/// the requester has no location at all.
pub fn choose_candidate(
    requester: &Profile,
    candidates: Vec<Profile>,
    nearby_radius_km: f64,
) -> Option<SelectedCandidate> {
    if candidates.is_empty() {
        return None;
    }

    if !proximity::has_location(requester) {
        let profile = candidates.into_iter().next()?;
        return Some(annotate(requester, profile, SelectionSource::Anywhere));
    }

    let nearby_pos = candidates.iter().position(|c| {
        proximity::proximity_rank(requester, c)
            .map(|km| km <= nearby_radius_km)
            .unwrap_or(false)
    });

    match nearby_pos {
        Some(pos) => {
            let profile = candidates.into_iter().nth(pos)?;
            Some(annotate(requester, profile, SelectionSource::Nearby))
        }
        None => {
            let profile = candidates.into_iter().next()?;
            Some(annotate(requester, profile, SelectionSource::Fallback))
        }
    }
}

fn annotate(requester: &Profile, profile: Profile, source: SelectionSource) -> SelectedCandidate {
    let distance_km = match (
        requester.latitude,
        requester.longitude,
        profile.latitude,
        profile.longitude,
    ) {
        (Some(lat_a), Some(lng_a), Some(lat_b), Some(lng_b)) => {
            Some(proximity::haversine_km(lat_a, lng_a, lat_b, lng_b))
        }
        _ => None,
    };
    let match_score = match_score(requester, &profile);
    SelectedCandidate {
        profile,
        source,
        distance_km,
        match_score,
    }
}

/// The base eligibility filter shared by the premium and standard passes:
/// visible, not banned, mutually compatible preferences, not excluded.
fn eligible<'a>(
    requester: &'a Profile,
    exclude: &[Uuid],
) -> profiles::BoxedQuery<'a, Pg> {
    let mut query = profiles::table
        .filter(profiles::user_id.ne_all(exclude.to_vec()))
        .filter(profiles::active.eq(true))
        .filter(profiles::banned.eq(false))
        .filter(profiles::interested_in.eq_any(vec![requester.gender.clone(), "Both".to_string()]))
        .into_boxed();

    if requester.interested_in != "Both" {
        query = query.filter(profiles::gender.eq(requester.interested_in.clone()));
    }

    query
}

/// Compute the next eligible candidate for `requester_id`.
///
/// Premium lookups pre-empt the standard pass: a requester holding credits
/// is first offered another credit holder, paying one credit on success.
/// The consume is atomic, so a raced-away balance simply falls through to
/// the standard pass. Selection itself never writes the ledger.
pub fn select_candidate(
    conn: &mut PgConnection,
    requester_id: Uuid,
    nearby_radius_km: f64,
) -> AppResult<Option<SelectedCandidate>> {
    let requester = profiles::table
        .filter(profiles::user_id.eq(requester_id))
        .first::<Profile>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "create a profile first"))?;

    let rels = ledger::find_all_for_user(conn, requester_id)?;
    let exclude: Vec<Uuid> = exclusion_set(requester_id, &rels)?.into_iter().collect();

    if requester.premium_credits > 0 {
        let premium = eligible(&requester, &exclude)
            .filter(profiles::premium_credits.gt(0))
            .first::<Profile>(conn)
            .optional()?;

        if let Some(candidate) = premium {
            if credits::consume_credit(conn, requester_id)? {
                tracing::debug!(requester = %requester_id, candidate = %candidate.user_id, "premium credit spent");
                return Ok(Some(annotate(&requester, candidate, SelectionSource::Premium)));
            }
            // balance raced to zero between the read and the spend
        }
    }

    let candidates = eligible(&requester, &exclude)
        .limit(CANDIDATE_SCAN_LIMIT)
        .load::<Profile>(conn)?;

    Ok(choose_candidate(&requester, candidates, nearby_radius_km))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(user_id: Uuid) -> Profile {
        Profile {
            id: Uuid::now_v7(),
            user_id,
            name: "test".into(),
            age: 25,
            gender: "Male".into(),
            interested_in: "Female".into(),
            bio: String::new(),
            photo_ref: None,
            city: None,
            latitude: None,
            longitude: None,
            active: true,
            banned: false,
            premium_credits: 0,
            referral_code: "KONVO-TEST00".into(),
            referred_by: None,
            referral_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rel(actor: Uuid, subject: Uuid, status: &str) -> Relationship {
        let (lo, hi) = ledger::pair_key(actor, subject);
        Relationship {
            id: Uuid::now_v7(),
            user_lo: lo,
            user_hi: hi,
            actor_id: actor,
            subject_id: subject,
            status: status.into(),
            created_at: Utc::now(),
            matched_at: None,
        }
    }

    #[test]
    fn exclusion_always_contains_self() {
        let me = Uuid::now_v7();
        let excluded = exclusion_set(me, &[]).unwrap();
        assert_eq!(excluded.len(), 1);
        assert!(excluded.contains(&me));
    }

    #[test]
    fn disliked_and_matched_exclude_both_directions() {
        let me = Uuid::now_v7();
        let them = Uuid::now_v7();

        for status in ["disliked", "matched"] {
            // regardless of who authored the row
            for (actor, subject) in [(me, them), (them, me)] {
                let excluded = exclusion_set(me, &[rel(actor, subject, status)]).unwrap();
                assert!(excluded.contains(&them), "{status} by {actor} should exclude");
            }
        }
    }

    #[test]
    fn removal_excludes_only_for_the_remover() {
        let me = Uuid::now_v7();
        let them = Uuid::now_v7();

        let mine = exclusion_set(me, &[rel(me, them, "removed")]).unwrap();
        assert!(mine.contains(&them));

        let theirs = exclusion_set(me, &[rel(them, me, "removed")]).unwrap();
        assert!(!theirs.contains(&them));
    }

    #[test]
    fn own_pending_like_is_not_reoffered_but_received_likes_are() {
        let me = Uuid::now_v7();
        let them = Uuid::now_v7();

        let i_liked = exclusion_set(me, &[rel(me, them, "pending")]).unwrap();
        assert!(i_liked.contains(&them));

        let they_liked = exclusion_set(me, &[rel(them, me, "pending")]).unwrap();
        assert!(!they_liked.contains(&them));
    }

    #[test]
    fn unknown_status_is_fatal_not_ignored() {
        let me = Uuid::now_v7();
        let them = Uuid::now_v7();
        assert!(exclusion_set(me, &[rel(me, them, "blocked")]).is_err());
    }

    #[test]
    fn choose_prefers_nearby_and_flags_fallback() {
        let mut me = profile(Uuid::now_v7());
        me.city = Some("Lagos".into());

        let far = {
            let mut p = profile(Uuid::now_v7());
            p.city = Some("Abuja".into());
            p
        };
        let near = {
            let mut p = profile(Uuid::now_v7());
            p.city = Some("city: Lagos".into());
            p
        };

        // nearby beats store order
        let picked = choose_candidate(&me, vec![far.clone(), near.clone()], 50.0).unwrap();
        assert_eq!(picked.profile.user_id, near.user_id);
        assert_eq!(picked.source, SelectionSource::Nearby);

        // nothing nearby: first of the relaxed list, tagged as fallback
        let fallback = choose_candidate(&me, vec![far.clone()], 50.0).unwrap();
        assert_eq!(fallback.profile.user_id, far.user_id);
        assert_eq!(fallback.source, SelectionSource::Fallback);

        // no location on the requester: plain natural order
        let anywhere = choose_candidate(&profile(Uuid::now_v7()), vec![far.clone()], 50.0).unwrap();
        assert_eq!(anywhere.source, SelectionSource::Anywhere);

        assert!(choose_candidate(&me, vec![], 50.0).is_none());
    }

    #[test]
    fn match_score_counts_mutual_interest_city_and_age() {
        let mut a = profile(Uuid::now_v7());
        a.gender = "Male".into();
        a.interested_in = "Female".into();
        a.city = Some("Lagos".into());
        a.age = 27;

        let mut b = profile(Uuid::now_v7());
        b.gender = "Female".into();
        b.interested_in = "Male".into();
        b.city = Some("city: lagos".into());
        b.age = 24;

        assert_eq!(match_score(&a, &b), 4);

        b.interested_in = "Female".into();
        b.city = Some("Abuja".into());
        b.age = 40;
        assert_eq!(match_score(&a, &b), 1);
    }
}
