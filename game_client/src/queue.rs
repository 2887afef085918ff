//! Main-thread work queue.
//!
//! The socket reader runs on its own task; all world mutation happens
//! on the frame loop. This queue is the sole handoff between the two:
//! producers push from any context, the frame loop drains once per
//! tick. That single-consumer drain serializes every inbound-message
//! side effect against the per-frame position check without locks.
//!
//! The queue is owned by the application and injected where needed,
//! not process-wide state.

use tokio::sync::mpsc;

/// FIFO handoff queue with a single draining consumer.
pub struct WorkQueue<T> {
    tx: mpsc::UnboundedSender<T>,
    rx: mpsc::UnboundedReceiver<T>,
}

/// Producer side. Clonable into any execution context.
pub struct QueueHandle<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for QueueHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Returns a producer handle for another execution context.
    pub fn handle(&self) -> QueueHandle<T> {
        QueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Removes and returns everything queued so far, in push order.
    ///
    /// Items pushed while the caller is still working through the
    /// returned batch land in the next drain.
    pub fn drain(&mut self) -> Vec<T> {
        let mut batch = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            batch.push(item);
        }
        batch
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueueHandle<T> {
    /// Appends to the queue tail. Never executes anything synchronously.
    pub fn push(&self, item: T) {
        // The receiver lives as long as the frame loop; a push after
        // teardown is a no-op.
        let _ = self.tx.send(item);
    }
}
