//! Bounded hand-off channels connecting the pipeline stages.
//!
//! A courier is a multi-producer/multi-consumer FIFO with explicit endpoint
//! registration on top of a bounded crossbeam channel. Registration counters
//! let a stage block until a peer exists on the other end; dropping an
//! endpoint is how a stage signals it is done. When the last sender is gone,
//! receivers drain whatever is queued and then observe end-of-stream.
//!
//! The [`Courier`] value itself holds prototype endpoints so stages can be
//! registered one by one; it must be dropped once every stage is wired up,
//! otherwise end-of-stream is never observed.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};

struct Counts {
    senders: usize,
    receivers: usize,
}

struct Registry {
    counts: Mutex<Counts>,
    changed: Condvar,
}

impl Registry {
    fn new() -> Arc<Self> {
        Arc::new(Registry {
            counts: Mutex::new(Counts {
                senders: 0,
                receivers: 0,
            }),
            changed: Condvar::new(),
        })
    }

    fn adjust<F: FnOnce(&mut Counts)>(&self, f: F) {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut counts);
        self.changed.notify_all();
    }

    fn wait_for<F: Fn(&Counts) -> bool>(&self, ready: F) {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        while !ready(&counts) {
            counts = self
                .changed
                .wait(counts)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// Factory for the registered endpoints of one pipeline link.
pub struct Courier<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    registry: Arc<Registry>,
}

impl<T> Courier<T> {
    /// A courier holding at most `capacity` in-flight items.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Courier {
            tx,
            rx,
            registry: Registry::new(),
        }
    }

    /// Register one producing stage.
    pub fn register_sender(&self) -> CourierSender<T> {
        self.registry.adjust(|c| c.senders += 1);
        CourierSender {
            tx: self.tx.clone(),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Register one consuming stage.
    pub fn register_receiver(&self) -> CourierReceiver<T> {
        self.registry.adjust(|c| c.receivers += 1);
        CourierReceiver {
            rx: self.rx.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

/// A registered producer endpoint. Dropping it is `done_sending`.
pub struct CourierSender<T> {
    tx: Sender<T>,
    registry: Arc<Registry>,
}

impl<T> CourierSender<T> {
    /// Block until at least one receiver is registered.
    pub fn wait_until_ready_to_send(&self) {
        self.registry.wait_for(|c| c.receivers > 0);
    }

    /// Send one item, blocking while the queue is full.
    ///
    /// Ownership transfers to the receiving stage. Returns false when the
    /// channel is closed for sending (every receiver is gone).
    pub fn send(&self, item: T) -> bool {
        self.tx.send(item).is_ok()
    }
}

impl<T> Drop for CourierSender<T> {
    fn drop(&mut self) {
        self.registry.adjust(|c| c.senders -= 1);
    }
}

/// A registered consumer endpoint. Dropping it is `done_receiving`.
pub struct CourierReceiver<T> {
    rx: Receiver<T>,
    registry: Arc<Registry>,
}

impl<T> CourierReceiver<T> {
    /// Block until at least one sender is registered.
    pub fn wait_until_ready_to_receive(&self) {
        self.registry.wait_for(|c| c.senders > 0);
    }

    /// Receive the next item, blocking while the queue is empty and senders
    /// remain. Returns `None` at end-of-stream: the last sender is done and
    /// the queue has drained.
    pub fn receive(&self) -> Option<T> {
        self.rx.recv().ok()
    }
}

impl<T> Drop for CourierReceiver<T> {
    fn drop(&mut self) {
        self.registry.adjust(|c| c.receivers -= 1);
    }
}
