use uuid::Uuid;

use konvo_shared::clients::rabbitmq::RabbitMQClient;
use konvo_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_like_sent(
    rabbitmq: &RabbitMQClient,
    liker_id: Uuid,
    liked_id: Uuid,
    liker_name: &str,
) {
    let event = Event::new(
        "konvo-matching",
        routing_keys::MATCHING_LIKE_SENT,
        payloads::LikeSent {
            liker_id,
            liked_id,
            liker_name: liker_name.to_string(),
        },
    )
    .with_user(liker_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_LIKE_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish like.sent event");
    }
}

pub async fn publish_match_created(rabbitmq: &RabbitMQClient, user_a_id: Uuid, user_b_id: Uuid) {
    let event = Event::new(
        "konvo-matching",
        routing_keys::MATCHING_MATCH_CREATED,
        payloads::MatchCreated { user_a_id, user_b_id },
    )
    .with_user(user_a_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_MATCH_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_message_sent(
    rabbitmq: &RabbitMQClient,
    message_id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    sender_name: &str,
    content_preview: &str,
) {
    let event = Event::new(
        "konvo-matching",
        routing_keys::MESSAGING_MESSAGE_SENT,
        payloads::MessageSent {
            message_id,
            sender_id,
            recipient_id,
            sender_name: sender_name.to_string(),
            content_preview: content_preview.to_string(),
        },
    )
    .with_user(sender_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MESSAGING_MESSAGE_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish message.sent event");
    }
}
