//! Engines on top of the SQLite repositories
//!
//! Run with: cargo test -p integration-tests --test sqlite_stack_tests

use std::sync::Arc;

use integration_tests::{
    channel_config, listener, rate_config, RecordingMessenger, SequentialNames, OWNER,
};
use radio_core::{ChatId, MessageId, Payload, UserRepository};
use radio_db::{
    create_memory_pool, run_migrations, SqliteDeliveryLogRepository, SqlitePrisonRepository,
    SqliteUserRepository,
};
use radio_service::{DirectoryService, FanoutDispatcher, ServiceContext, ServiceContextBuilder};

async fn sqlite_context() -> (ServiceContext, Arc<SqliteUserRepository>, Arc<RecordingMessenger>) {
    let pool = create_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();

    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let messenger = Arc::new(RecordingMessenger::default());
    let ctx = ServiceContextBuilder::new()
        .user_repo(users.clone())
        .prison_repo(Arc::new(SqlitePrisonRepository::new(pool.clone())))
        .delivery_log(Arc::new(SqliteDeliveryLogRepository::new(pool)))
        .messenger(messenger.clone())
        .name_generator(Arc::new(SequentialNames::default()))
        .channel_config(channel_config())
        .rate_config(rate_config())
        .owner_id(OWNER)
        .build()
        .unwrap();
    (ctx, users, messenger)
}

#[tokio::test]
async fn test_onboarded_users_share_a_channel_and_relay() {
    let (ctx, users, messenger) = sqlite_context().await;
    let directory = DirectoryService::new(&ctx);

    let first = directory.onboard(listener(1)).await.unwrap();
    let second = directory.onboard(listener(2)).await.unwrap();
    assert!(first.created && second.created);
    assert_eq!(users.find_all().await.unwrap().len(), 2);

    // Both land on the only populated channel once it exists
    assert_eq!(second.user.channel, first.user.channel);
    assert_eq!(second.population, 2);

    let dispatcher = FanoutDispatcher::new(&ctx);
    let sender = directory.get(listener(1)).await.unwrap();
    let report = dispatcher
        .broadcast(&sender, MessageId::new(1), Payload::text("over"))
        .await
        .unwrap();
    assert_eq!(report.delivered(), 1);

    let (_, copy) = messenger.texts_to(listener(2))[0].clone();
    let deleted = dispatcher
        .delete_fanout(ChatId::from(listener(2)), copy)
        .await
        .unwrap();
    assert_eq!(deleted, 2);
}
