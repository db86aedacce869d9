//! In-memory ports
//!
//! Repositories backed by `parking_lot` mutexes and a messenger that records
//! every request. Failures can be injected per chat.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use radio_core::{
    ChannelId, ChatId, DeleteMessage, DeliveryError, DeliveryLogRepository, DeliveryRecord,
    DeliveryResult, DomainError, EditText, MessageId, Messenger, NameGenerator, PrisonEntry,
    PrisonRepository, RepoResult, SendMedia, SendText, SetReaction, UserId, UserRecord,
    UserRepository,
};

// ============================================================================
// Repositories
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        Ok(self.users.lock().iter().find(|u| u.user_id == id).cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<UserRecord>> {
        Ok(self.users.lock().clone())
    }

    async fn find_by_channel(&self, channel: ChannelId) -> RepoResult<Vec<UserRecord>> {
        Ok(self
            .users
            .lock()
            .iter()
            .filter(|u| u.channel == channel)
            .cloned()
            .collect())
    }

    async fn channel_populations(&self) -> RepoResult<Vec<(ChannelId, u64)>> {
        let mut counts: BTreeMap<ChannelId, u64> = BTreeMap::new();
        for user in self.users.lock().iter() {
            *counts.entry(user.channel).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn create_if_absent(&self, user: &UserRecord) -> RepoResult<bool> {
        let mut users = self.users.lock();
        if users.iter().any(|u| u.user_id == user.user_id) {
            return Ok(false);
        }
        users.push(user.clone());
        Ok(true)
    }

    async fn update(&self, user: &UserRecord) -> RepoResult<()> {
        if let Some(stored) = self
            .users
            .lock()
            .iter_mut()
            .find(|u| u.user_id == user.user_id)
        {
            *stored = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> RepoResult<bool> {
        let mut users = self.users.lock();
        let before = users.len();
        users.retain(|u| u.user_id != id);
        Ok(users.len() != before)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPrisonRepository {
    entries: Mutex<HashMap<UserId, PrisonEntry>>,
    fail_deletes: AtomicBool,
}

impl InMemoryPrisonRepository {
    /// Every later `delete` fails as a locked database would
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PrisonRepository for InMemoryPrisonRepository {
    async fn find(&self, user: UserId) -> RepoResult<Option<PrisonEntry>> {
        Ok(self.entries.lock().get(&user).cloned())
    }

    async fn upsert(&self, entry: &PrisonEntry) -> RepoResult<()> {
        self.entries.lock().insert(entry.user_id, entry.clone());
        Ok(())
    }

    async fn delete(&self, user: UserId) -> RepoResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("database is locked".into()));
        }
        Ok(self.entries.lock().remove(&user).is_some())
    }

    async fn find_all(&self) -> RepoResult<Vec<PrisonEntry>> {
        Ok(self.entries.lock().values().cloned().collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDeliveryLog {
    records: Mutex<Vec<DeliveryRecord>>,
}

impl InMemoryDeliveryLog {
    pub fn records(&self) -> Vec<DeliveryRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl DeliveryLogRepository for InMemoryDeliveryLog {
    async fn append(&self, record: &DeliveryRecord) -> RepoResult<i64> {
        let mut records = self.records.lock();
        records.push(record.clone());
        Ok(records.len() as i64)
    }

    async fn find_by_copy(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> RepoResult<Option<DeliveryRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .rev()
            .find(|r| r.contains(chat, message))
            .cloned())
    }
}

// ============================================================================
// Messenger
// ============================================================================

/// One outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(SendText, MessageId),
    Media(SendMedia, MessageId),
    Edit(EditText),
    Delete(DeleteMessage),
    Reaction(SetReaction),
}

/// Messenger that records every request and answers with fresh message ids
#[derive(Debug)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    failures: Mutex<HashMap<ChatId, DeliveryError>>,
    next_id: AtomicI32,
}

impl Default for RecordingMessenger {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1000),
        }
    }
}

impl RecordingMessenger {
    /// Every call to `chat` fails with `error` from now on
    pub fn fail_for(&self, chat: impl Into<ChatId>, error: DeliveryError) {
        self.failures.lock().insert(chat.into(), error);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    /// Texts delivered to `chat`, with the id each got
    pub fn texts_to(&self, chat: impl Into<ChatId>) -> Vec<(SendText, MessageId)> {
        let chat = chat.into();
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Text(request, id) if request.chat == chat => Some((request.clone(), *id)),
                _ => None,
            })
            .collect()
    }

    pub fn media_to(&self, chat: impl Into<ChatId>) -> Vec<(SendMedia, MessageId)> {
        let chat = chat.into();
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Media(request, id) if request.chat == chat => Some((request.clone(), *id)),
                _ => None,
            })
            .collect()
    }

    pub fn deletions(&self) -> Vec<DeleteMessage> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Delete(request) => Some(*request),
                _ => None,
            })
            .collect()
    }

    pub fn reactions(&self) -> Vec<SetReaction> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Reaction(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn check(&self, chat: ChatId) -> DeliveryResult<()> {
        match self.failures.lock().get(&chat) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> MessageId {
        MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, request: SendText) -> DeliveryResult<MessageId> {
        self.check(request.chat)?;
        let id = self.next_id();
        self.sent.lock().push(Sent::Text(request, id));
        Ok(id)
    }

    async fn send_media(&self, request: SendMedia) -> DeliveryResult<MessageId> {
        self.check(request.chat)?;
        let id = self.next_id();
        self.sent.lock().push(Sent::Media(request, id));
        Ok(id)
    }

    async fn edit_text(&self, request: EditText) -> DeliveryResult<()> {
        self.check(request.chat)?;
        self.sent.lock().push(Sent::Edit(request));
        Ok(())
    }

    async fn delete_message(&self, request: DeleteMessage) -> DeliveryResult<()> {
        self.check(request.chat)?;
        self.sent.lock().push(Sent::Delete(request));
        Ok(())
    }

    async fn set_reaction(&self, request: SetReaction) -> DeliveryResult<()> {
        self.check(request.chat)?;
        self.sent.lock().push(Sent::Reaction(request));
        Ok(())
    }
}

// ============================================================================
// Names
// ============================================================================

/// Hands out `Listener 1`, `Listener 2`, ...
#[derive(Debug, Default)]
pub struct SequentialNames {
    counter: AtomicUsize,
}

impl NameGenerator for SequentialNames {
    fn generate(&self) -> String {
        format!("Listener {}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
