use crate::keycodes::RawEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tracing::debug;

/// What a listener can hand to the processing thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMessage {
    Raw(RawEvent),
    /// The overlay lost input focus; held keys may never report a release.
    FocusLost,
    /// The OS withdrew the input-monitoring permission mid-session.
    PermissionRevoked(String),
}

/// Sending half given to a listener. Cheap to clone and `Send`, so a
/// platform hook can keep one per callback context.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<(u64, InputMessage)>,
    epoch: u64,
    current: Arc<AtomicU64>,
}

impl EventSink {
    /// Returns false once the queue has been invalidated or dropped.
    pub fn send(&self, message: InputMessage) -> bool {
        if !self.is_live() {
            return false;
        }
        self.tx.send((self.epoch, message)).is_ok()
    }

    pub fn is_live(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.epoch
    }
}

/// Single-consumer end of the listener hand-off.
///
/// Messages are stamped with the epoch of the sink that sent them. Bumping
/// the epoch in [`EventQueue::invalidate`] makes every outstanding sink
/// stale, and anything it managed to enqueue is discarded on drain.
pub struct EventQueue {
    tx: Sender<(u64, InputMessage)>,
    rx: Receiver<(u64, InputMessage)>,
    epoch: Arc<AtomicU64>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn sink(&self) -> EventSink {
        EventSink {
            tx: self.tx.clone(),
            epoch: self.epoch.load(Ordering::Acquire),
            current: Arc::clone(&self.epoch),
        }
    }

    /// Disowns every sink handed out so far and drops whatever is queued.
    pub fn invalidate(&self) {
        let old = self.epoch.fetch_add(1, Ordering::AcqRel);
        let mut dropped = 0usize;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        debug!("Queue epoch {} -> {} ({} dropped)", old, old + 1, dropped);
    }

    /// Non-blocking: everything currently queued from live sinks.
    pub fn drain(&self) -> Vec<InputMessage> {
        let current = self.epoch.load(Ordering::Acquire);
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok((epoch, msg)) if epoch == current => out.push(msg),
                Ok(_) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}
