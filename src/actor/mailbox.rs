//! Actor mailbox implementation for message passing.
//!
//! Every actor owns exactly one mailbox: a bounded FIFO with blocking put
//! and take. The bound is backpressure policy, not a buffering convenience:
//! a sender to a full mailbox waits until the owner drains a slot or the
//! mailbox closes.
//!
//! Close is observable from both ends and idempotent. Putters see
//! [`MailboxError::Closed`]; the taker keeps draining whatever was already
//! admitted and then sees end-of-stream. Blocked parties are woken.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::MailboxError;

/// The default mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 420;

/// Outcome of a deadline-bounded take.
#[derive(Debug)]
pub enum TakeTimeout<T> {
    /// A message arrived in time.
    Note(T),
    /// The mailbox closed and drained before a message arrived.
    Closed,
    /// The deadline elapsed with the mailbox still open and empty.
    Elapsed,
}

struct State<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// A bounded FIFO channel delivering messages to one actor.
///
/// Any task may put; only the owning task takes.
pub struct Mailbox<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> Mailbox<T> {
    /// Create a mailbox with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// The bound this mailbox enforces.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages currently queued.
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// True when no messages are queued.
    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    /// True once the mailbox has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Enqueue a message, waiting while the mailbox is full.
    pub fn put(&self, message: T) -> Result<(), MailboxError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(MailboxError::Closed);
            }
            if state.queue.len() < self.capacity {
                state.queue.push_back(message);
                self.not_empty.notify_one();
                return Ok(());
            }
            self.not_full.wait(&mut state);
        }
    }

    /// Enqueue a message without waiting.
    pub fn try_put(&self, message: T) -> Result<(), MailboxError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(MailboxError::Closed);
        }
        if state.queue.len() >= self.capacity {
            return Err(MailboxError::Full);
        }
        state.queue.push_back(message);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue the next message, waiting while the mailbox is empty.
    ///
    /// Returns `None` only once the mailbox is closed and fully drained.
    pub fn take(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(message) = state.queue.pop_front() {
                self.not_full.notify_one();
                return Some(message);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Dequeue the next message, waiting at most until `deadline`.
    pub fn take_until(&self, deadline: Instant) -> TakeTimeout<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(message) = state.queue.pop_front() {
                self.not_full.notify_one();
                return TakeTimeout::Note(message);
            }
            if state.closed {
                return TakeTimeout::Closed;
            }
            if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                return match state.queue.pop_front() {
                    Some(message) => {
                        self.not_full.notify_one();
                        TakeTimeout::Note(message)
                    }
                    None => TakeTimeout::Elapsed,
                };
            }
        }
    }

    /// Dequeue with a relative deadline. See [`Mailbox::take_until`].
    pub fn take_for(&self, wait: Duration) -> TakeTimeout<T> {
        self.take_until(Instant::now() + wait)
    }

    /// Put a stash of messages back at the front, preserving their order.
    ///
    /// Used by the ask correlator to restore messages it extracted while
    /// waiting for its reply. The messages were admitted once, so the
    /// capacity bound is not applied a second time.
    pub fn requeue(&self, mut stash: VecDeque<T>) {
        if stash.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        while let Some(message) = stash.pop_back() {
            state.queue.push_front(message);
        }
        self.not_empty.notify_one();
    }

    /// Close the mailbox. Idempotent; wakes every blocked putter and taker.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            self.not_empty.notify_all();
            self.not_full.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_put_take_fifo() {
        let mailbox = Mailbox::new(8);
        mailbox.put(1u32).unwrap();
        mailbox.put(2).unwrap();
        mailbox.put(3).unwrap();
        assert_eq!(mailbox.take(), Some(1));
        assert_eq!(mailbox.take(), Some(2));
        assert_eq!(mailbox.take(), Some(3));
    }

    #[test]
    fn test_try_put_full() {
        let mailbox = Mailbox::new(2);
        assert!(mailbox.try_put(1u32).is_ok());
        assert!(mailbox.try_put(2).is_ok());
        assert!(matches!(mailbox.try_put(3), Err(MailboxError::Full)));
    }

    #[test]
    fn test_put_blocks_until_drained() {
        let mailbox = Arc::new(Mailbox::new(2));
        mailbox.put(1u32).unwrap();
        mailbox.put(2).unwrap();

        let landed = Arc::new(AtomicBool::new(false));
        let sender = {
            let mailbox = mailbox.clone();
            let landed = landed.clone();
            thread::spawn(move || {
                mailbox.put(3).unwrap();
                landed.store(true, Ordering::SeqCst);
            })
        };

        // The third put must wait for a free slot.
        thread::sleep(Duration::from_millis(50));
        assert!(!landed.load(Ordering::SeqCst), "put should block while full");

        assert_eq!(mailbox.take(), Some(1));
        sender.join().unwrap();
        assert!(landed.load(Ordering::SeqCst));
        assert_eq!(mailbox.take(), Some(2));
        assert_eq!(mailbox.take(), Some(3));
    }

    #[test]
    fn test_close_rejects_put_and_drains_takes() {
        let mailbox = Mailbox::new(4);
        mailbox.put(1u32).unwrap();
        mailbox.put(2).unwrap();
        mailbox.close();
        mailbox.close(); // idempotent

        assert!(matches!(mailbox.put(3), Err(MailboxError::Closed)));
        assert_eq!(mailbox.take(), Some(1));
        assert_eq!(mailbox.take(), Some(2));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_close_wakes_blocked_putter() {
        let mailbox = Arc::new(Mailbox::new(1));
        mailbox.put(1u32).unwrap();

        let sender = {
            let mailbox = mailbox.clone();
            thread::spawn(move || mailbox.put(2))
        };

        thread::sleep(Duration::from_millis(50));
        mailbox.close();
        assert!(matches!(sender.join().unwrap(), Err(MailboxError::Closed)));
    }

    #[test]
    fn test_close_wakes_blocked_taker() {
        let mailbox: Arc<Mailbox<u32>> = Arc::new(Mailbox::new(1));
        let taker = {
            let mailbox = mailbox.clone();
            thread::spawn(move || mailbox.take())
        };

        thread::sleep(Duration::from_millis(50));
        mailbox.close();
        assert_eq!(taker.join().unwrap(), None);
    }

    #[test]
    fn test_requeue_preserves_order() {
        let mailbox = Mailbox::new(8);
        mailbox.put(4u32).unwrap();
        mailbox.put(5).unwrap();

        let stash: VecDeque<u32> = vec![1, 2, 3].into();
        mailbox.requeue(stash);

        assert_eq!(mailbox.take(), Some(1));
        assert_eq!(mailbox.take(), Some(2));
        assert_eq!(mailbox.take(), Some(3));
        assert_eq!(mailbox.take(), Some(4));
        assert_eq!(mailbox.take(), Some(5));
    }

    #[test]
    fn test_take_for_elapses() {
        let mailbox: Mailbox<u32> = Mailbox::new(1);
        let start = Instant::now();
        assert!(matches!(
            mailbox.take_for(Duration::from_millis(30)),
            TakeTimeout::Elapsed
        ));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_MAILBOX_CAPACITY, 420);
    }
}
