//! Rotation scheduler tests on a paused clock
//!
//! Run with: cargo test -p integration-tests --test rotation_tests

use std::time::Duration;

use chrono::Utc;
use integration_tests::{channel_config, listener, rate_config, TestRelay};
use radio_core::{PrisonTerm, UserRepository};
use radio_service::dto::RotationOutcome;
use radio_service::{ChannelService, PrisonService, RotationScheduler};
use tokio::time::sleep;

/// Relay whose users rotate exactly every 100 seconds
fn fixed_window_relay() -> TestRelay {
    let mut channels = channel_config();
    channels.switch_min_secs = 100;
    channels.switch_max_secs = 100;
    TestRelay::with_config(channels, rate_config())
}

fn rotation_notices(relay: &TestRelay, n: i64) -> usize {
    relay
        .messenger
        .texts_to(listener(n))
        .iter()
        .filter(|(request, _)| request.text.contains("Моргнув"))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_user_is_rotated_once_per_window() {
    let relay = fixed_window_relay();
    relay.place(listener(1), 10).await;
    let (scheduler, handle) = RotationScheduler::seeded(relay.ctx.clone(), 3);
    let task = scheduler.spawn();

    handle.schedule(listener(1));
    sleep(Duration::from_secs(150)).await;

    assert_eq!(rotation_notices(&relay, 1), 1);
    assert_eq!(relay.user(listener(1)).await.unwrap().base_name, "Listener 1");

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_rotation_repeats() {
    let relay = fixed_window_relay();
    relay.place(listener(1), 10).await;
    let (scheduler, handle) = RotationScheduler::seeded(relay.ctx.clone(), 11);
    let task = scheduler.spawn();

    handle.schedule(listener(1));
    sleep(Duration::from_secs(550)).await;

    assert_eq!(rotation_notices(&relay, 1), 5);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_user_is_left_alone() {
    let relay = fixed_window_relay();
    relay.place(listener(1), 10).await;
    relay.place(listener(2), 10).await;
    let (scheduler, handle) = RotationScheduler::seeded(relay.ctx.clone(), 5);
    let task = scheduler.spawn();

    handle.schedule_all([listener(1), listener(2)]);
    handle.cancel(listener(1));
    sleep(Duration::from_secs(150)).await;

    assert_eq!(rotation_notices(&relay, 1), 0);
    assert_eq!(rotation_notices(&relay, 2), 1);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_rotation_step_is_clean() {
    let relay = fixed_window_relay();
    relay.place(listener(1), 10).await;
    let (scheduler, handle) = RotationScheduler::seeded(relay.ctx.clone(), 13);
    let task = scheduler.spawn();

    handle.schedule(listener(1));
    sleep(Duration::from_secs(100)).await;
    handle.shutdown();
    task.await.unwrap();

    // A step spawned before the stop still finishes on its own
    sleep(Duration::from_secs(1)).await;
    assert!(rotation_notices(&relay, 1) <= 1);
    assert!(relay.user(listener(1)).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_removed_user_stops_rotating() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    let (scheduler, handle) = RotationScheduler::seeded(relay.ctx.clone(), 9);
    let task = scheduler.spawn();

    handle.schedule(listener(1));
    relay.users.delete(listener(1)).await.unwrap();
    sleep(Duration::from_secs(600)).await;

    assert!(relay.messenger.sent().is_empty());

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn test_suspended_user_keeps_prison_channel() {
    let relay = TestRelay::new();
    relay.place(listener(1), 10).await;
    PrisonService::new(relay.ctx())
        .suspend(listener(1), PrisonTerm::parse(&[], Utc::now().timestamp()))
        .await
        .unwrap();

    let outcome = ChannelService::new(relay.ctx())
        .rotate(listener(1))
        .await
        .unwrap();

    assert_eq!(outcome, RotationOutcome::Skipped);
}

#[tokio::test]
async fn test_rotate_unknown_user_is_gone() {
    let relay = TestRelay::new();

    let outcome = ChannelService::new(relay.ctx())
        .rotate(listener(1))
        .await
        .unwrap();

    assert_eq!(outcome, RotationOutcome::Gone);
}
