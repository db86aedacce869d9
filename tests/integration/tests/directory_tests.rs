//! Directory and channel assignment tests
//!
//! Run with: cargo test -p integration-tests --test directory_tests

use integration_tests::{listener, TestRelay, OWNER, PRISON};
use radio_core::{ChannelId, DomainError, NameRejection, UserRepository};
use radio_service::dto::{EmojiRequest, NameRequest};
use radio_service::{ChannelService, DirectoryService, ServiceError};

// ============================================================================
// Onboarding
// ============================================================================

#[tokio::test]
async fn test_repeated_start_keeps_one_record() {
    let relay = TestRelay::new();
    let directory = DirectoryService::new(relay.ctx());

    let first = directory.onboard(listener(1)).await.unwrap();
    let second = directory.onboard(listener(1)).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.user, second.user);
    assert_eq!(relay.users.find_all().await.unwrap().len(), 1);
    assert_eq!(second.population, 1);
}

#[tokio::test]
async fn test_onboarding_picks_least_populated_channel() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 20).await;

    let onboarding = DirectoryService::new(relay.ctx())
        .onboard(listener(4))
        .await
        .unwrap();

    assert_eq!(onboarding.user.channel, ChannelId::new(20));
    assert_eq!(onboarding.population, 2);
}

#[tokio::test]
async fn test_least_populated_ignores_prison() {
    let relay = TestRelay::new();
    relay.place(listener(1), PRISON).await;
    relay.place(listener(2), 30).await;

    let channel = ChannelService::new(relay.ctx())
        .least_populated_channel()
        .await
        .unwrap();

    assert_eq!(channel, ChannelId::new(30));
}

#[tokio::test]
async fn test_first_user_gets_channel_in_range() {
    let relay = TestRelay::new();

    let onboarding = DirectoryService::new(relay.ctx())
        .onboard(listener(1))
        .await
        .unwrap();

    let channel = onboarding.user.channel.into_inner();
    assert!((1..=999).contains(&channel));
    assert_eq!(onboarding.user.base_name, "Listener 1");
}

// ============================================================================
// Names
// ============================================================================

#[tokio::test]
async fn test_custom_name_is_shown() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;

    let user = DirectoryService::new(relay.ctx())
        .set_custom_name(
            listener(1),
            NameRequest {
                name: "Old Sailor".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(user.display_name(), "Old Sailor");
    assert_eq!(
        relay.user(listener(1)).await.unwrap().custom_name.as_deref(),
        Some("Old Sailor")
    );
}

#[tokio::test]
async fn test_lookalike_reserved_name_is_rejected() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;

    // Latin "e" in an otherwise Cyrillic word
    let err = DirectoryService::new(relay.ctx())
        .set_custom_name(
            listener(1),
            NameRequest {
                name: "Систeма".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InvalidName(NameRejection::Restricted))
    ));
    assert_eq!(relay.user(listener(1)).await.unwrap().custom_name, None);
}

#[tokio::test]
async fn test_owner_may_use_owner_name() {
    let relay = TestRelay::new();
    relay.place(OWNER, 10).await;
    relay.place(listener(1), 10).await;
    let directory = DirectoryService::new(relay.ctx());
    let request = || NameRequest {
        name: "Владелец".to_string(),
    };

    assert!(directory.set_custom_name(OWNER, request()).await.is_ok());
    assert!(directory.set_custom_name(listener(1), request()).await.is_err());
}

#[tokio::test]
async fn test_name_for_unknown_user_fails() {
    let relay = TestRelay::new();

    let err = DirectoryService::new(relay.ctx())
        .set_custom_name(
            listener(9),
            NameRequest {
                name: "Ghost".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::UserNotFound(_))));
}

#[tokio::test]
async fn test_reset_name_restores_generated_name() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let directory = DirectoryService::new(relay.ctx());
    directory
        .set_custom_name(
            listener(1),
            NameRequest {
                name: "Old Sailor".to_string(),
            },
        )
        .await
        .unwrap();

    let user = directory.reset_name(listener(1)).await.unwrap();

    assert_eq!(user.custom_name, None);
    assert_eq!(user.display_name(), format!("User {}", listener(1)));
}

#[tokio::test]
async fn test_emoji_prefixes_display_name() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;

    let user = DirectoryService::new(relay.ctx())
        .set_emoji(EmojiRequest {
            target: listener(1),
            emoji: "🌟".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(user.display_name(), format!("🌟 User {}", listener(1)));
}

// ============================================================================
// Manual moves
// ============================================================================

#[tokio::test]
async fn test_goto_moves_and_renames() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;

    let user = ChannelService::new(relay.ctx())
        .goto(listener(1), ChannelId::new(42))
        .await
        .unwrap();

    assert_eq!(user.channel, ChannelId::new(42));
    assert_eq!(user.base_name, "Listener 1");
    assert_eq!(relay.user(listener(1)).await.unwrap().channel, ChannelId::new(42));
}

#[tokio::test]
async fn test_goto_keeps_custom_name() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    DirectoryService::new(relay.ctx())
        .set_custom_name(
            listener(1),
            NameRequest {
                name: "Old Sailor".to_string(),
            },
        )
        .await
        .unwrap();

    let user = ChannelService::new(relay.ctx())
        .goto(listener(1), ChannelId::new(42))
        .await
        .unwrap();

    assert_eq!(user.display_name(), "Old Sailor");
}

#[tokio::test]
async fn test_goto_rejects_out_of_range_and_prison() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let channels = ChannelService::new(relay.ctx());

    let err = channels
        .goto(listener(1), ChannelId::new(1000))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::ChannelOutOfRange { .. })
    ));

    let err = channels
        .goto(listener(1), ChannelId::new(PRISON))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::ReservedChannel(_))));

    assert_eq!(relay.user(listener(1)).await.unwrap().channel, ChannelId::new(10));
}

#[tokio::test]
async fn test_scan_lists_populations_ascending() {
    let relay = TestRelay::new();
    relay.place(listener(1), 20).await;
    relay.place(listener(2), 10).await;
    relay.place(listener(3), 20).await;

    let scan = ChannelService::new(relay.ctx()).scan().await.unwrap();

    assert_eq!(
        scan,
        vec![(ChannelId::new(10), 1), (ChannelId::new(20), 2)]
    );
}
