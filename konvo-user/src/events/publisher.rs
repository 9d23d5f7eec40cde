use uuid::Uuid;

use konvo_shared::clients::rabbitmq::RabbitMQClient;
use konvo_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_profile_created(rabbitmq: &RabbitMQClient, user_id: Uuid, name: &str) {
    let event = Event::new(
        "konvo-user",
        routing_keys::USER_PROFILE_CREATED,
        payloads::ProfileCreated {
            user_id,
            name: name.to_string(),
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_PROFILE_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish profile.created event");
    }
}

pub async fn publish_profile_updated(rabbitmq: &RabbitMQClient, user_id: Uuid) {
    let event = Event::new(
        "konvo-user",
        routing_keys::USER_PROFILE_UPDATED,
        payloads::ProfileUpdated { user_id },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_PROFILE_UPDATED, &event).await {
        tracing::error!(error = %e, "failed to publish profile.updated event");
    }
}

pub async fn publish_profile_deactivated(rabbitmq: &RabbitMQClient, user_id: Uuid) {
    let event = Event::new(
        "konvo-user",
        routing_keys::USER_PROFILE_DEACTIVATED,
        payloads::ProfileDeactivated { user_id },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_PROFILE_DEACTIVATED, &event).await {
        tracing::error!(error = %e, "failed to publish profile.deactivated event");
    }
}

pub async fn publish_user_banned(rabbitmq: &RabbitMQClient, user_id: Uuid) {
    let event = Event::new(
        "konvo-user",
        routing_keys::USER_BANNED,
        payloads::UserBanned { user_id },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_BANNED, &event).await {
        tracing::error!(error = %e, "failed to publish user.banned event");
    }
}

pub async fn publish_referral_completed(
    rabbitmq: &RabbitMQClient,
    referrer_id: Uuid,
    referee_id: Uuid,
) {
    let event = Event::new(
        "konvo-user",
        routing_keys::USER_REFERRAL_COMPLETED,
        payloads::ReferralCompleted {
            referrer_id,
            referee_id,
        },
    )
    .with_user(referrer_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_REFERRAL_COMPLETED, &event).await {
        tracing::error!(error = %e, "failed to publish referral.completed event");
    }
}

pub async fn publish_credit_granted(rabbitmq: &RabbitMQClient, user_id: Uuid, amount: i32) {
    let event = Event::new(
        "konvo-user",
        routing_keys::USER_CREDIT_GRANTED,
        payloads::CreditGranted { user_id, amount },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_CREDIT_GRANTED, &event).await {
        tracing::error!(error = %e, "failed to publish credit.granted event");
    }
}

pub async fn publish_announcement_requested(
    rabbitmq: &RabbitMQClient,
    message: &str,
    button_text: Option<&str>,
    button_url: Option<&str>,
) {
    let event = Event::new(
        "konvo-user",
        routing_keys::USER_ANNOUNCEMENT_REQUESTED,
        payloads::AnnouncementRequested {
            message: message.to_string(),
            button_text: button_text.map(|s| s.to_string()),
            button_url: button_url.map(|s| s.to_string()),
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::USER_ANNOUNCEMENT_REQUESTED, &event).await {
        tracing::error!(error = %e, "failed to publish announcement.requested event");
    }
}
