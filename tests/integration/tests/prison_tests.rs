//! Prison registry tests
//!
//! Run with: cargo test -p integration-tests --test prison_tests

use chrono::Utc;
use integration_tests::{listener, TestRelay, OWNER, PRISON};
use radio_core::{
    Capabilities, ChannelId, DomainError, PrisonRepository, PrisonTerm, Remaining,
    DEFAULT_PRISON_REASON,
};
use radio_service::{ChannelService, PrisonService, ServiceError};

#[tokio::test]
async fn test_suspend_moves_to_prison_and_notifies() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let now = Utc::now().timestamp();

    let outcome = PrisonService::new(relay.ctx())
        .suspend(listener(1), PrisonTerm::parse(&["30m", "spam", "links"], now))
        .await
        .unwrap();

    assert_eq!(outcome.user.channel, ChannelId::new(PRISON));
    assert_eq!(outcome.entry.reason, "spam links");
    assert_eq!(outcome.entry.until, Some(now + 1800));
    assert_eq!(outcome.given_reason.as_deref(), Some("spam links"));
    assert_eq!(
        relay.user(listener(1)).await.unwrap().channel,
        ChannelId::new(PRISON)
    );

    let notices = relay.messenger.texts_to(listener(1));
    assert_eq!(notices.len(), 1);
    assert!(notices[0].0.text.contains("Ты не можешь говорить"));
}

#[tokio::test]
async fn test_suspend_without_arguments_is_indefinite() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let prison = PrisonService::new(relay.ctx());

    let outcome = prison
        .suspend(listener(1), PrisonTerm::parse(&[], Utc::now().timestamp()))
        .await
        .unwrap();

    assert_eq!(outcome.entry.until, None);
    assert_eq!(outcome.entry.reason, DEFAULT_PRISON_REASON);
    assert_eq!(outcome.given_reason, None);
    assert_eq!(prison.remaining(&outcome.entry), Remaining::Infinite);
}

#[tokio::test]
async fn test_suspend_again_replaces_entry() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let prison = PrisonService::new(relay.ctx());
    let now = Utc::now().timestamp();

    prison
        .suspend(listener(1), PrisonTerm::parse(&["1d"], now))
        .await
        .unwrap();
    prison
        .suspend(listener(1), PrisonTerm::parse(&["flood"], now))
        .await
        .unwrap();

    let entry = relay.prison.find(listener(1)).await.unwrap().unwrap();
    assert_eq!(entry.until, None);
    assert_eq!(entry.reason, "flood");
    assert_eq!(relay.prison.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_suspend_unknown_user_fails() {
    let relay = TestRelay::new();

    let err = PrisonService::new(relay.ctx())
        .suspend(listener(5), PrisonTerm::parse(&[], Utc::now().timestamp()))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::UserNotFound(_))));
    assert!(relay.prison.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_release_puts_user_back_on_air() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    relay.place(listener(2), 25).await;
    let prison = PrisonService::new(relay.ctx());
    prison
        .suspend(listener(1), PrisonTerm::parse(&[], Utc::now().timestamp()))
        .await
        .unwrap();
    relay.messenger.clear();

    let channel = prison.release(listener(1)).await.unwrap().unwrap();

    assert_ne!(channel, ChannelId::new(PRISON));
    assert_eq!(relay.user(listener(1)).await.unwrap().channel, channel);
    assert!(relay.prison.find(listener(1)).await.unwrap().is_none());
    let notices = relay.messenger.texts_to(listener(1));
    assert!(notices[0].0.text.contains("Ты пришел в себя"));
}

#[tokio::test]
async fn test_release_of_free_user_fails() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;

    let err = PrisonService::new(relay.ctx())
        .release(listener(1))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::NotImprisoned(_))));
    assert_eq!(relay.user(listener(1)).await.unwrap().channel, ChannelId::new(10));
}

#[tokio::test]
async fn test_expired_term_is_still_enforced() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let long_ago = Utc::now().timestamp() - 7_200;
    let prison = PrisonService::new(relay.ctx());

    prison
        .suspend(listener(1), PrisonTerm::parse(&["1h"], long_ago))
        .await
        .unwrap();

    let entry = prison.is_suspended(listener(1)).await.unwrap().unwrap();
    assert!(entry.is_expired(Utc::now().timestamp()));
    assert_eq!(prison.remaining(&entry), Remaining::Seconds(0));
}

#[tokio::test]
async fn test_suspended_user_cannot_goto() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    PrisonService::new(relay.ctx())
        .suspend(listener(1), PrisonTerm::parse(&[], Utc::now().timestamp()))
        .await
        .unwrap();

    let err = ChannelService::new(relay.ctx())
        .goto(listener(1), ChannelId::new(42))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::Imprisoned)));
    assert_eq!(
        relay.user(listener(1)).await.unwrap().channel,
        ChannelId::new(PRISON)
    );
}

#[tokio::test]
async fn test_only_owner_may_moderate() {
    let relay = TestRelay::new();
    let ctx = relay.ctx();

    assert!(ctx.require(OWNER, Capabilities::MODERATE).is_ok());
    assert!(ctx.require(listener(1), Capabilities::MODERATE).is_err());
    assert!(ctx.require(listener(1), Capabilities::RELAY).is_ok());
}
