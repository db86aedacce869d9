//! Rotation scheduler
//!
//! One task owns a min-heap of `(due, generation, user)` timers. Scheduling a
//! user again or cancelling them bumps or drops their generation, so stale
//! heap entries are skipped when they surface instead of being searched for.
//! Each fire runs one rotation step on its own task and reports back; the
//! user is rescheduled unless the step found them gone.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use radio_core::UserId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, instrument};

use super::channel::ChannelService;
use super::context::ServiceContext;
use crate::dto::RotationOutcome;

#[derive(Debug)]
enum Command {
    Schedule(UserId),
    Cancel(UserId),
    /// Result of a fire: `keep` is false once the user is gone
    Fired { user: UserId, generation: u64, keep: bool },
    Shutdown,
}

/// Cheap handle for talking to a running [`RotationScheduler`]
#[derive(Debug, Clone)]
pub struct RotationHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl RotationHandle {
    /// Start or restart the rotation timer of `user`
    pub fn schedule(&self, user: UserId) {
        self.send(Command::Schedule(user));
    }

    pub fn schedule_all(&self, users: impl IntoIterator<Item = UserId>) {
        for user in users {
            self.schedule(user);
        }
    }

    /// Drop the pending timer of `user`, if any
    pub fn cancel(&self, user: UserId) {
        self.send(Command::Cancel(user));
    }

    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            debug!("Rotation scheduler already stopped");
        }
    }
}

/// Single owner of every rotation timer
pub struct RotationScheduler {
    ctx: Arc<ServiceContext>,
    rx: mpsc::UnboundedReceiver<Command>,
    tx: mpsc::UnboundedSender<Command>,
    queue: BinaryHeap<Reverse<(Instant, u64, UserId)>>,
    generations: HashMap<UserId, u64>,
    next_generation: u64,
    rng: StdRng,
}

impl RotationScheduler {
    pub fn new(ctx: Arc<ServiceContext>) -> (Self, RotationHandle) {
        Self::with_rng(ctx, StdRng::from_entropy())
    }

    /// Scheduler with reproducible delays
    pub fn seeded(ctx: Arc<ServiceContext>, seed: u64) -> (Self, RotationHandle) {
        Self::with_rng(ctx, StdRng::seed_from_u64(seed))
    }

    fn with_rng(ctx: Arc<ServiceContext>, rng: StdRng) -> (Self, RotationHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = RotationHandle { tx: tx.clone() };
        let scheduler = Self {
            ctx,
            rx,
            tx,
            queue: BinaryHeap::new(),
            generations: HashMap::new(),
            next_generation: 0,
            rng,
        };
        (scheduler, handle)
    }

    /// Run the scheduler on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process commands and timers until shut down
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Rotation scheduler started");
        loop {
            let next_due = self.queue.peek().map(|Reverse((due, _, _))| *due);
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                () = wait_until(next_due) => self.fire_due(),
            }
        }
        info!(pending = self.generations.len(), "Rotation scheduler stopped");
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Schedule(user) => self.schedule(user),
            Command::Cancel(user) => {
                self.generations.remove(&user);
            }
            Command::Fired {
                user,
                generation,
                keep,
            } => {
                // Rescheduled or cancelled while the step was running
                if self.generations.get(&user) != Some(&generation) {
                    return;
                }
                if keep {
                    self.schedule(user);
                } else {
                    self.generations.remove(&user);
                }
            }
            Command::Shutdown => {}
        }
    }

    fn schedule(&mut self, user: UserId) {
        let generation = self.next_generation;
        self.next_generation += 1;

        let config = self.ctx.channel_config();
        let delay = rotation_delay(&mut self.rng, config.switch_min_secs, config.switch_max_secs);
        self.generations.insert(user, generation);
        self.queue
            .push(Reverse((Instant::now() + delay, generation, user)));
        debug!(user_id = %user, delay_secs = delay.as_secs(), "Rotation scheduled");
    }

    fn fire_due(&mut self) {
        let now = Instant::now();
        while let Some(Reverse((due, generation, user))) = self.queue.peek().copied() {
            if due > now {
                break;
            }
            self.queue.pop();
            if self.generations.get(&user) == Some(&generation) {
                self.fire(user, generation);
            }
        }
    }

    fn fire(&self, user: UserId, generation: u64) {
        let ctx = Arc::clone(&self.ctx);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let keep = match ChannelService::new(&ctx).rotate(user).await {
                Ok(RotationOutcome::Gone) => false,
                Ok(RotationOutcome::Moved(_) | RotationOutcome::Skipped) => true,
                Err(e) => {
                    error!(user_id = %user, error = %e, "Rotation step failed");
                    true
                }
            };
            let fired = Command::Fired {
                user,
                generation,
                keep,
            };
            if tx.send(fired).is_err() {
                debug!(user_id = %user, "Rotation scheduler stopped before the step finished");
            }
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Uniform delay in `[min_secs, max_secs]`
fn rotation_delay(rng: &mut impl Rng, min_secs: u64, max_secs: u64) -> Duration {
    let secs = if min_secs >= max_secs {
        min_secs
    } else {
        rng.gen_range(min_secs..=max_secs)
    };
    Duration::from_secs(secs)
}
