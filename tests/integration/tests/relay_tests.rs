//! Fan-out, intake gate, deletion and reaction tests
//!
//! Run with: cargo test -p integration-tests --test relay_tests

use std::time::{Duration, Instant};

use integration_tests::{listener, Sent, TestRelay};
use radio_core::{
    BadgeKind, ChannelId, ChatId, DeliveryError, DomainError, MediaKind, MessageId, Payload, PrisonEntry,
    PrisonRepository, Remaining, ReplyContext, TextFormat, UserRepository,
};
use radio_service::dto::{DeliveryReport, Intake};
use radio_service::{FanoutDispatcher, ReactionService, ServiceError};

fn origin(n: i32) -> MessageId {
    MessageId::new(n)
}

// ============================================================================
// Fan-out
// ============================================================================

#[tokio::test]
async fn test_text_reaches_everyone_but_sender() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 10).await;
    relay.place(listener(4), 20).await;

    let report = FanoutDispatcher::new(relay.ctx())
        .broadcast(&sender, origin(1), Payload::text("hello"))
        .await
        .unwrap();

    assert_eq!(report.delivered(), 2);
    assert!(relay.messenger.texts_to(listener(1)).is_empty());
    assert!(relay.messenger.texts_to(listener(4)).is_empty());
    for recipient in [listener(2), listener(3)] {
        let texts = relay.messenger.texts_to(recipient);
        assert_eq!(texts.len(), 1);
        let (request, _) = &texts[0];
        assert_eq!(request.text, "hello");
        assert_eq!(request.format, TextFormat::Plain);
        let badge = request.badge.as_ref().unwrap();
        assert_eq!(badge.kind, BadgeKind::Name);
        assert_eq!(badge.label, sender.display_name());
    }
}

#[tokio::test]
async fn test_alone_on_channel_sends_nothing() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;

    let report = FanoutDispatcher::new(relay.ctx())
        .broadcast(&sender, origin(1), Payload::text("anyone?"))
        .await
        .unwrap();

    assert!(matches!(report, DeliveryReport::NoRecipients { .. }));
    assert!(relay.messenger.sent().is_empty());
    assert!(relay.log.records().is_empty());
}

#[tokio::test]
async fn test_failed_recipient_does_not_stop_others() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 10).await;
    relay.place(listener(4), 10).await;
    relay
        .messenger
        .fail_for(listener(3), DeliveryError::Other("timeout".to_string()));

    let report = FanoutDispatcher::new(relay.ctx())
        .broadcast(&sender, origin(1), Payload::text("hello"))
        .await
        .unwrap();

    match report {
        DeliveryReport::Delivered {
            delivered,
            recipients,
            ..
        } => {
            assert_eq!(delivered, 2);
            assert_eq!(recipients, 3);
        }
        other => panic!("unexpected report {other:?}"),
    }
    // A transient failure keeps the user
    assert!(relay.user(listener(3)).await.is_some());
}

#[tokio::test]
async fn test_blocked_recipient_is_purged() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 10).await;
    relay.messenger.fail_for(listener(2), DeliveryError::Blocked);
    relay
        .prison
        .upsert(&PrisonEntry::new(listener(2), "spam".to_string(), None))
        .await
        .unwrap();

    let report = FanoutDispatcher::new(relay.ctx())
        .broadcast(&sender, origin(1), Payload::text("hello"))
        .await
        .unwrap();

    assert_eq!(report.delivered(), 1);
    assert!(relay.user(listener(2)).await.is_none());
    assert!(relay.prison.find(listener(2)).await.unwrap().is_none());
    assert!(relay.user(listener(3)).await.is_some());
}

#[tokio::test]
async fn test_failed_purge_still_records_delivered_copies() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 10).await;
    relay.messenger.fail_for(listener(3), DeliveryError::Blocked);
    relay.prison.fail_deletes();

    let report = FanoutDispatcher::new(relay.ctx())
        .broadcast(&sender, origin(1), Payload::text("hello"))
        .await
        .unwrap();

    assert_eq!(report.delivered(), 1);
    assert_eq!(relay.log.records().len(), 1);
    assert_eq!(relay.ctx.reactions().len(ChannelId::new(10)), 1);
}

#[tokio::test]
async fn test_fan_out_is_logged_for_every_copy() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 10).await;

    FanoutDispatcher::new(relay.ctx())
        .broadcast(&sender, origin(7), Payload::text("logged"))
        .await
        .unwrap();

    let records = relay.log.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.sender_id, listener(1));
    assert_eq!(record.origin_message, origin(7));
    assert_eq!(record.message_text, "logged");
    assert_eq!(record.deliveries.len(), 2);
    for (request, id) in relay.messenger.texts_to(listener(2)) {
        assert!(record.contains(request.chat, id));
    }
}

// ============================================================================
// Replies
// ============================================================================

#[tokio::test]
async fn test_reply_quotes_original_sender_and_copies_to_replier() {
    let relay = TestRelay::new();
    let alice = relay.place(listener(1), 10).await;
    let bob = relay.place(listener(2), 10).await;
    relay.place(listener(3), 10).await;
    let dispatcher = FanoutDispatcher::new(relay.ctx());

    dispatcher
        .broadcast(&alice, origin(1), Payload::text("hello"))
        .await
        .unwrap();
    let (_, bob_copy) = relay.messenger.texts_to(listener(2))[0].clone();
    relay.messenger.clear();

    let payload = Payload::Text {
        text: "hi back".to_string(),
        reply: Some(ReplyContext {
            message_id: bob_copy,
            text: "hello".to_string(),
            author_id: None,
            author_fallback_name: "Radio".to_string(),
        }),
    };
    let report = dispatcher.broadcast(&bob, origin(2), payload).await.unwrap();

    let expected = format!("╭─ {}\n╰ hello\n\nhi back", alice.display_name());
    for recipient in [listener(1), listener(3)] {
        let texts = relay.messenger.texts_to(recipient);
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].0.text, expected);
    }

    // The replier gets a threaded copy of their own text
    let own = relay.messenger.texts_to(listener(2));
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].0.text, "hi back");
    assert_eq!(own[0].0.reply_to, Some(bob_copy));

    match report {
        DeliveryReport::Delivered {
            delivered,
            deliveries,
            ..
        } => {
            assert_eq!(delivered, 2);
            assert_eq!(deliveries.len(), 3);
        }
        other => panic!("unexpected report {other:?}"),
    }
}

#[tokio::test]
async fn test_reply_to_unknown_message_uses_platform_name() {
    let relay = TestRelay::new();
    let alice = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;

    let payload = Payload::Text {
        text: "agreed".to_string(),
        reply: Some(ReplyContext {
            message_id: origin(99),
            text: "╭─ Someone\n╰ old\n\nnewest line".to_string(),
            author_id: None,
            author_fallback_name: "Radio".to_string(),
        }),
    };
    FanoutDispatcher::new(relay.ctx())
        .broadcast(&alice, origin(5), payload)
        .await
        .unwrap();

    let texts = relay.messenger.texts_to(listener(2));
    assert_eq!(texts[0].0.text, "╭─ Radio\n╰ newest line\n\nagreed");
}

// ============================================================================
// Media
// ============================================================================

#[tokio::test]
async fn test_media_keeps_caption_where_supported() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    let dispatcher = FanoutDispatcher::new(relay.ctx());

    let photo = Payload::Media {
        kind: MediaKind::Photo,
        file_id: "photo-1".to_string(),
        caption: Some("sunset".to_string()),
    };
    dispatcher.broadcast(&sender, origin(1), photo).await.unwrap();

    let sticker = Payload::Media {
        kind: MediaKind::Sticker,
        file_id: "sticker-1".to_string(),
        caption: Some("ignored".to_string()),
    };
    dispatcher.broadcast(&sender, origin(2), sticker).await.unwrap();

    let media = relay.messenger.media_to(listener(2));
    assert_eq!(media.len(), 2);
    assert_eq!(media[0].0.file_id, "photo-1");
    assert_eq!(media[0].0.caption.as_deref(), Some("sunset"));
    assert_eq!(media[1].0.kind, MediaKind::Sticker);
    assert_eq!(media[1].0.caption, None);
    assert!(relay.messenger.media_to(listener(1)).is_empty());
}

// ============================================================================
// Intake gate
// ============================================================================

#[tokio::test]
async fn test_second_message_inside_interval_is_rejected() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let dispatcher = FanoutDispatcher::new(relay.ctx());
    let start = Instant::now();

    let first = dispatcher.admit(listener(1), start).await.unwrap();
    assert!(matches!(first, Intake::Accepted(_)));

    let second = dispatcher
        .admit(listener(1), start + Duration::from_millis(1200))
        .await
        .unwrap();
    assert_eq!(second, Intake::RateLimited(Duration::from_millis(1800)));

    let third = dispatcher
        .admit(listener(1), start + Duration::from_millis(3000))
        .await
        .unwrap();
    assert!(matches!(third, Intake::Accepted(_)));
}

#[tokio::test]
async fn test_unregistered_sender_is_turned_away() {
    let relay = TestRelay::new();

    let intake = FanoutDispatcher::new(relay.ctx())
        .admit(listener(1), Instant::now())
        .await
        .unwrap();

    assert_eq!(intake, Intake::Unregistered);
}

#[tokio::test]
async fn test_suspended_sender_sees_remaining_time() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let until = chrono::Utc::now().timestamp() + 600;
    relay
        .prison
        .upsert(&PrisonEntry::new(listener(1), "spam".to_string(), Some(until)))
        .await
        .unwrap();
    let dispatcher = FanoutDispatcher::new(relay.ctx());
    let now = Instant::now();

    match dispatcher.admit(listener(1), now).await.unwrap() {
        Intake::Imprisoned(Remaining::Seconds(secs)) => assert!((598..=600).contains(&secs)),
        other => panic!("unexpected intake {other:?}"),
    }

    // Rejected messages do not start the rate timer
    let again = dispatcher.admit(listener(1), now).await.unwrap();
    assert!(matches!(again, Intake::Imprisoned(_)));
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_del_removes_every_copy_and_origin() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 10).await;
    let dispatcher = FanoutDispatcher::new(relay.ctx());

    dispatcher
        .broadcast(&sender, origin(4), Payload::text("oops"))
        .await
        .unwrap();
    let (_, copy) = relay.messenger.texts_to(listener(3))[0].clone();

    let deleted = dispatcher
        .delete_fanout(ChatId::from(listener(3)), copy)
        .await
        .unwrap();

    assert_eq!(deleted, 3);
    let deletions = relay.messenger.deletions();
    assert!(deletions
        .iter()
        .any(|d| d.chat == ChatId::from(listener(1)) && d.message == origin(4)));
    assert!(deletions.iter().any(|d| d.chat == ChatId::from(listener(2))));
    assert!(deletions.iter().any(|d| d.chat == ChatId::from(listener(3))));
}

#[tokio::test]
async fn test_del_without_record_fails() {
    let relay = TestRelay::new();

    let err = FanoutDispatcher::new(relay.ctx())
        .delete_fanout(ChatId::new(5), origin(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::DeliveryNotFound { .. })
    ));
    assert!(relay.messenger.deletions().is_empty());
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_reaction_is_mirrored_on_other_copies() {
    let relay = TestRelay::new();
    let sender = relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 10).await;

    FanoutDispatcher::new(relay.ctx())
        .broadcast(&sender, origin(1), Payload::text("react to me"))
        .await
        .unwrap();
    let (_, copy) = relay.messenger.texts_to(listener(2))[0].clone();

    let applied = ReactionService::new(relay.ctx())
        .propagate(listener(2), ChatId::from(listener(2)), copy, "🔥".to_string())
        .await
        .unwrap();

    assert_eq!(applied, 2);
    let reactions = relay.messenger.reactions();
    assert!(reactions.iter().all(|r| r.emoji == "🔥"));
    assert!(reactions
        .iter()
        .any(|r| r.chat == ChatId::from(listener(1)) && r.message == origin(1)));
    assert!(reactions.iter().any(|r| r.chat == ChatId::from(listener(3))));
    assert!(!reactions.iter().any(|r| r.chat == ChatId::from(listener(2))));
}

#[tokio::test]
async fn test_reaction_on_unknown_message_is_ignored() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;

    let applied = ReactionService::new(relay.ctx())
        .propagate(listener(1), ChatId::from(listener(1)), origin(3), "👍".to_string())
        .await
        .unwrap();

    assert_eq!(applied, 0);
    assert!(!relay
        .messenger
        .sent()
        .iter()
        .any(|s| matches!(s, Sent::Reaction(_))));
    assert_eq!(relay.users.find_all().await.unwrap().len(), 1);
}
