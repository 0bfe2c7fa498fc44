//! Main-queue plumbing and the cross-thread shared flags.
//!
//! The engine runs on one logical main thread. Producer threads (the raw
//! multitouch callback, the frame clock) never touch engine state directly;
//! they post plain-data [`EngineMessage`]s through an [`EngineQueue`] and the
//! owning thread drains them in FIFO order.
//!
//! Exactly two pieces of state cross threads the other way, read by the event
//! interceptor callback without entering the main queue: the
//! actively-scrolling flag and a finger-count snapshot. [`SharedFlags`] guards
//! both behind a mutex with get/set accessors; holding it for more than a few
//! instructions is forbidden.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

use crate::contact::ContactFrame;

/// A message for the engine's main queue.
///
/// Producers copy the primitive fields out of OS-owned structs before
/// posting; no pointers to callback inputs cross this boundary.
#[derive(Debug, Clone)]
pub enum EngineMessage {
    /// One raw multitouch frame batch.
    Frames {
        frames: Vec<ContactFrame>,
        timestamp: f64,
        finger_count: u32,
    },
    /// One display-refresh tick for the inertia loop.
    InertiaTick { timestamp: f64 },
    /// Teardown request; the engine persists state and disables itself.
    Shutdown,
}

/// Sending half of the main queue. Cheap to clone, `Send`, lock-free on post.
#[derive(Clone)]
pub struct EngineQueue {
    tx: Sender<EngineMessage>,
}

impl EngineQueue {
    /// Posts a message. If the engine side is gone the message is dropped;
    /// producers must never block or fail on a dead consumer.
    pub fn post(&self, message: EngineMessage) {
        if self.tx.send(message).is_err() {
            log::trace!("engine queue closed; dropping message");
        }
    }
}

/// Receiving half of the main queue; owned by the engine's thread.
pub struct EngineInbox {
    rx: Receiver<EngineMessage>,
}

impl EngineInbox {
    /// Non-blocking receive of the next pending message.
    pub fn try_recv(&self) -> Option<EngineMessage> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocking receive, for hosts that park the main thread on the queue.
    pub fn recv(&self) -> Option<EngineMessage> {
        self.rx.recv().ok()
    }
}

/// Creates a connected queue pair.
pub fn engine_queue() -> (EngineQueue, EngineInbox) {
    let (tx, rx) = mpsc::channel();
    (EngineQueue { tx }, EngineInbox { rx })
}

#[derive(Debug, Default)]
struct FlagsInner {
    actively_scrolling: bool,
    finger_count: u8,
}

/// The two fields shared with the interceptor thread.
///
/// Both accessors take and release the lock immediately. Never call back into
/// engine state while holding it.
#[derive(Clone, Default)]
pub struct SharedFlags {
    inner: Arc<Mutex<FlagsInner>>,
}

impl SharedFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between the first activation-or-pending frame of a scroll-zone
    /// touch and the session reset.
    pub fn actively_scrolling(&self) -> bool {
        self.inner.lock().map(|g| g.actively_scrolling).unwrap_or(false)
    }

    pub fn set_actively_scrolling(&self, value: bool) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.actively_scrolling = value;
        }
    }

    pub fn finger_count(&self) -> u8 {
        self.inner.lock().map(|g| g.finger_count).unwrap_or(0)
    }

    pub fn set_finger_count(&self, value: u8) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.finger_count = value;
        }
    }
}
