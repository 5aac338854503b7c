//! Single-writer event loop.
//!
//! Remote messages, button events and coalescing timers all arrive from
//! independent sources (a UDP task, the MIDI input thread, sleeping timer
//! tasks). They are funneled through one unbounded queue and consumed by a
//! single worker that owns the [`Bridge`], so mirror and controller state are
//! never touched concurrently.

use std::{future::Future, time::Duration};

use shared::{domain::ButtonEvent, protocol::RemoteMessage};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    bridge::Bridge,
    sinks::{DeviceSink, RemoteSink},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoalesceChannel {
    Lines,
    Params,
}

impl CoalesceChannel {
    pub const ALL: [CoalesceChannel; 2] = [CoalesceChannel::Lines, CoalesceChannel::Params];

    fn slot(self) -> usize {
        match self {
            CoalesceChannel::Lines => 0,
            CoalesceChannel::Params => 1,
        }
    }
}

/// Identifies one arming of a channel timer; firings from replaced timers
/// carry a stale token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

pub trait CoalesceTimers {
    /// Starts the quiet timer for `channel`, replacing any timer already
    /// pending there.
    fn arm(&mut self, channel: CoalesceChannel, after: Duration) -> TimerToken;
    fn cancel(&mut self, channel: CoalesceChannel);
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Remote(RemoteMessage),
    Button(ButtonEvent),
    TimerFired {
        channel: CoalesceChannel,
        token: TimerToken,
    },
}

#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: UnboundedSender<BridgeEvent>,
}

impl SchedulerHandle {
    /// Queues an event; returns false once the worker is gone.
    pub fn post(&self, event: BridgeEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn post_remote(&self, message: RemoteMessage) -> bool {
        self.post(BridgeEvent::Remote(message))
    }

    pub fn post_button(&self, event: ButtonEvent) -> bool {
        self.post(BridgeEvent::Button(event))
    }
}

pub struct Scheduler {
    tx: UnboundedSender<BridgeEvent>,
    rx: UnboundedReceiver<BridgeEvent>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            tx: self.tx.clone(),
        }
    }

    pub async fn next_event(&mut self) -> Option<BridgeEvent> {
        self.rx.recv().await
    }

    /// Drives `bridge` with queued events until `shutdown` resolves.
    pub async fn run<D, R, T>(
        mut self,
        bridge: &mut Bridge<D, R, T>,
        shutdown: impl Future<Output = ()>,
    ) where
        D: DeviceSink,
        R: RemoteSink,
        T: CoalesceTimers,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("scheduler: shutdown requested");
                    break;
                }
                event = self.rx.recv() => match event {
                    Some(event) => {
                        debug!(?event, "scheduler: dispatching event");
                        bridge.handle(event);
                    }
                    None => break,
                },
            }
        }
    }
}

/// Coalescing timers backed by tokio sleep tasks that post back into the
/// scheduler queue.
pub struct TokioTimers {
    handle: SchedulerHandle,
    pending: [Option<JoinHandle<()>>; 2],
    next_token: u64,
}

impl TokioTimers {
    pub fn new(handle: SchedulerHandle) -> Self {
        Self {
            handle,
            pending: [None, None],
            next_token: 0,
        }
    }
}

impl CoalesceTimers for TokioTimers {
    fn arm(&mut self, channel: CoalesceChannel, after: Duration) -> TimerToken {
        self.cancel(channel);
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let handle = self.handle.clone();
        self.pending[channel.slot()] = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            handle.post(BridgeEvent::TimerFired { channel, token });
        }));
        token
    }

    fn cancel(&mut self, channel: CoalesceChannel) {
        if let Some(task) = self.pending[channel.slot()].take() {
            task.abort();
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for task in self.pending.iter_mut().filter_map(Option::take) {
            task.abort();
        }
    }
}

/// Deterministic timers driven by an explicit clock.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: Duration,
    next_token: u64,
    armed: [Option<(TimerToken, Duration)>; 2],
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn deadline(&self, channel: CoalesceChannel) -> Option<Duration> {
        self.armed[channel.slot()].map(|(_, deadline)| deadline)
    }

    /// Moves the clock forward and returns the firings that came due, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<BridgeEvent> {
        self.now += by;
        let now = self.now;
        let mut due = Vec::new();
        for channel in CoalesceChannel::ALL {
            let slot = &mut self.armed[channel.slot()];
            if let Some((token, deadline)) = *slot {
                if deadline <= now {
                    *slot = None;
                    due.push((deadline, channel, token));
                }
            }
        }
        due.sort_by_key(|(deadline, _, _)| *deadline);
        due.into_iter()
            .map(|(_, channel, token)| BridgeEvent::TimerFired { channel, token })
            .collect()
    }
}

impl CoalesceTimers for ManualTimers {
    fn arm(&mut self, channel: CoalesceChannel, after: Duration) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.armed[channel.slot()] = Some((token, self.now + after));
        token
    }

    fn cancel(&mut self, channel: CoalesceChannel) {
        self.armed[channel.slot()] = None;
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
