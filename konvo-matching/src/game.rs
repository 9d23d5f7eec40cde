use serde::{Deserialize, Serialize};
use uuid::Uuid;

use konvo_shared::clients::redis::RedisClient;

use crate::matching::ledger::pair_key;

const SESSION_PREFIX: &str = "game:session";
const SCORE_PREFIX: &str = "game:score";
const SESSION_TTL: u64 = 3600; // an unanswered question expires after 1h
const SCORE_TTL: i64 = 2_592_000; // 30 days

pub struct WyrQuestion {
    pub question: &'static str,
    pub options: [&'static str; 2],
}

pub const QUESTIONS: &[WyrQuestion] = &[
    WyrQuestion {
        question: "Would you rather go on a cozy movie night or a fancy dinner date?",
        options: ["Movie Night", "Fancy Dinner"],
    },
    WyrQuestion {
        question: "Would you rather receive a surprise gift or a surprise kiss?",
        options: ["Gift", "Kiss"],
    },
    WyrQuestion {
        question: "Would you rather travel the world together or build a dream home?",
        options: ["Travel", "Dream Home"],
    },
    WyrQuestion {
        question: "Would you rather cuddle all night or go on a late-night adventure?",
        options: ["Cuddle", "Adventure"],
    },
    WyrQuestion {
        question: "Would you rather share your favorite playlist or cook your favorite meal for each other?",
        options: ["Playlist", "Meal"],
    },
    WyrQuestion {
        question: "Would you rather spend a rainy day reading together or dancing in the rain?",
        options: ["Reading", "Dancing"],
    },
    WyrQuestion {
        question: "Would you rather plan a surprise date or be surprised by your partner?",
        options: ["Plan", "Be Surprised"],
    },
    WyrQuestion {
        question: "Would you rather spend a weekend in the mountains or on the beach?",
        options: ["Mountains", "Beach"],
    },
    WyrQuestion {
        question: "Would you rather send long love texts or have late-night phone calls?",
        options: ["Love Texts", "Phone Calls"],
    },
    WyrQuestion {
        question: "Would you rather play video games together or binge-watch a series?",
        options: ["Video Games", "Series"],
    },
    WyrQuestion {
        question: "Would you rather laugh until your stomach hurts or talk until sunrise?",
        options: ["Laugh", "Talk"],
    },
    WyrQuestion {
        question: "Would you rather cook dinner together or order takeout and relax?",
        options: ["Cook Together", "Order Takeout"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    A,
    B,
}

/// A user's pending question. Keyed per user in Redis with a TTL, so the
/// state survives across service instances and cleans itself up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub partner_id: Uuid,
    pub question_idx: usize,
    pub answer: Option<Answer>,
}

fn session_key(user_id: Uuid) -> String {
    format!("{SESSION_PREFIX}:{user_id}")
}

fn score_key(a: Uuid, b: Uuid) -> String {
    let (lo, hi) = pair_key(a, b);
    format!("{SCORE_PREFIX}:{lo}:{hi}")
}

pub async fn save_session(redis: &RedisClient, user_id: Uuid, session: &GameSession) {
    if let Ok(data) = serde_json::to_string(session) {
        if let Err(e) = redis.set(&session_key(user_id), &data, SESSION_TTL).await {
            tracing::error!(error = %e, user_id = %user_id, "failed to save game session");
        }
    }
}

pub async fn load_session(redis: &RedisClient, user_id: Uuid) -> Option<GameSession> {
    match redis.get(&session_key(user_id)).await {
        Ok(Some(data)) => serde_json::from_str(&data).ok(),
        _ => None,
    }
}

pub async fn clear_session(redis: &RedisClient, user_id: Uuid) {
    let _ = redis.del(&session_key(user_id)).await;
}

/// Bump the pair's compatibility counter and return the new value.
pub async fn bump_score(redis: &RedisClient, a: Uuid, b: Uuid) -> i64 {
    let key = score_key(a, b);
    let score = redis.incr(&key).await.unwrap_or(0);
    let _ = redis.expire(&key, SCORE_TTL).await;
    score
}

pub async fn get_score(redis: &RedisClient, a: Uuid, b: Uuid) -> i64 {
    match redis.get(&score_key(a, b)).await {
        Ok(Some(v)) => v.parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_key_is_order_independent() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(score_key(a, b), score_key(b, a));
    }

    #[test]
    fn question_bank_is_well_formed() {
        assert!(!QUESTIONS.is_empty());
        for q in QUESTIONS {
            assert!(!q.question.is_empty());
            assert_ne!(q.options[0], q.options[1]);
        }
    }

    #[test]
    fn session_roundtrips_through_json() {
        let session = GameSession {
            partner_id: Uuid::now_v7(),
            question_idx: 3,
            answer: Some(Answer::A),
        };
        let data = serde_json::to_string(&session).unwrap();
        let back: GameSession = serde_json::from_str(&data).unwrap();
        assert_eq!(back.partner_id, session.partner_id);
        assert_eq!(back.question_idx, 3);
        assert_eq!(back.answer, Some(Answer::A));
    }
}
