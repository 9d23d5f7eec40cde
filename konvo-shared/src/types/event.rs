use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `konvo.{domain}.{entity}.{action}`
/// Example: `konvo.matching.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // User events
    pub const USER_PROFILE_CREATED: &str = "konvo.user.profile.created";
    pub const USER_PROFILE_UPDATED: &str = "konvo.user.profile.updated";
    pub const USER_PROFILE_DEACTIVATED: &str = "konvo.user.profile.deactivated";
    pub const USER_BANNED: &str = "konvo.user.user.banned";
    pub const USER_REFERRAL_COMPLETED: &str = "konvo.user.referral.completed";
    pub const USER_CREDIT_GRANTED: &str = "konvo.user.credit.granted";
    pub const USER_ANNOUNCEMENT_REQUESTED: &str = "konvo.user.announcement.requested";

    // Matching events
    pub const MATCHING_LIKE_SENT: &str = "konvo.matching.like.sent";
    pub const MATCHING_MATCH_CREATED: &str = "konvo.matching.match.created";

    // Messaging events
    pub const MESSAGING_MESSAGE_SENT: &str = "konvo.messaging.message.sent";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileCreated {
        pub user_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileDeactivated {
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserBanned {
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReferralCompleted {
        pub referrer_id: Uuid,
        pub referee_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CreditGranted {
        pub user_id: Uuid,
        pub amount: i32,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AnnouncementRequested {
        pub message: String,
        pub button_text: Option<String>,
        pub button_url: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LikeSent {
        pub liker_id: Uuid,
        pub liked_id: Uuid,
        pub liker_name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub user_a_id: Uuid,
        pub user_b_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessageSent {
        pub message_id: Uuid,
        pub sender_id: Uuid,
        pub recipient_id: Uuid,
        pub sender_name: String,
        pub content_preview: String,
    }
}
