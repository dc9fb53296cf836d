// Unbounded MPMC message queue with a futex signal word for blocking reads

use crate::Core::futex::{futex_wait, futex_wait_timeout, futex_wake, WAKE_ALL};
use crate::Structs::Message_Structs::Message;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering::{Acquire, Release}};
use std::time::{Duration, Instant};

/// A FIFO of messages shared between threads.
///
/// ### Concurrency Design:
/// - Items live behind a `parking_lot::Mutex`; every operation holds it only
///   for the push/pop/drain itself.
/// - `signal` is bumped after every insertion. A blocked reader samples it
///   before looking at the items and sleeps on the futex only while it is
///   unchanged, so an insertion between the check and the sleep is never
///   missed.
pub struct MessageQueue {
    pub(crate) name: &'static str,
    pub(crate) items: Mutex<VecDeque<Message>>,
    pub(crate) signal: AtomicU32,
}

impl MessageQueue {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Mutex::new(VecDeque::new()),
            signal: AtomicU32::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append one message. Never blocks on readers.
    pub fn enqueue(&self, msg: Message) {
        self.items.lock().push_back(msg);
        self.notify(1);
    }

    /// Append all `msgs` in order under a single lock acquisition.
    pub fn bulk_enqueue<I: IntoIterator<Item = Message>>(&self, msgs: I) {
        let added = {
            let mut items = self.items.lock();
            let before = items.len();
            items.extend(msgs);
            items.len() - before
        };
        if added > 0 {
            self.notify(WAKE_ALL);
        }
    }

    /// Pop the oldest message, if any.
    pub fn try_dequeue(&self) -> Option<Message> {
        self.items.lock().pop_front()
    }

    /// Pop the oldest message, blocking until one is available.
    pub fn dequeue(&self) -> Message {
        loop {
            let seen = self.signal.load(Acquire);
            if let Some(msg) = self.try_dequeue() {
                return msg;
            }
            futex_wait(&self.signal, seen);
        }
    }

    /// Pop the oldest message, waiting at most `timeout`.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<Message> {
        let start = Instant::now();
        loop {
            let seen = self.signal.load(Acquire);
            if let Some(msg) = self.try_dequeue() {
                return Some(msg);
            }
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return None;
            }
            futex_wait_timeout(&self.signal, seen, remaining);
        }
    }

    /// Remove and return everything currently queued, oldest first.
    pub fn drain_all(&self) -> Vec<Message> {
        std::mem::take(&mut *self.items.lock()).into()
    }

    /// Move everything queued here onto the back of `target` ("export").
    ///
    /// This queue's lock is held only while its items are swapped out, so
    /// producers are not held up by contention on `target`.
    pub fn export_into(&self, target: &MessageQueue) -> usize {
        let mut drained = std::mem::take(&mut *self.items.lock());
        let moved = drained.len();
        if moved > 0 {
            target.items.lock().append(&mut drained);
            target.notify(WAKE_ALL);
        }
        moved
    }

    /// Move everything queued in `source` onto the back of this queue ("import").
    pub fn import_from(&self, source: &MessageQueue) -> usize {
        source.export_into(self)
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    fn notify(&self, waiters: i32) {
        self.signal.fetch_add(1, Release);
        futex_wake(&self.signal, waiters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn numbered(i: u8) -> Message {
        Message::from_bytes(&[i]).unwrap()
    }

    #[test]
    fn fifo_order() {
        let q = MessageQueue::new("test");
        for i in 0..5 {
            q.enqueue(numbered(i));
        }
        assert_eq!(q.len(), 5);
        for i in 0..5 {
            assert_eq!(q.try_dequeue().unwrap().as_bytes(), &[i]);
        }
        assert!(q.try_dequeue().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn export_appends_after_existing_items() {
        let src = MessageQueue::new("src");
        let dst = MessageQueue::new("dst");
        dst.enqueue(numbered(0));
        src.bulk_enqueue((1..4).map(numbered));

        assert_eq!(src.export_into(&dst), 3);
        assert!(src.is_empty());
        let order: Vec<u8> = dst.drain_all().iter().map(|m| m.as_bytes()[0]).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn dequeue_timeout_on_empty_queue() {
        let q = MessageQueue::new("empty");
        let start = Instant::now();
        assert!(q.dequeue_timeout(Duration::from_millis(20)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn blocking_dequeue_wakes_on_enqueue() {
        let q = Arc::new(MessageQueue::new("wake"));
        let reader = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.dequeue())
        };
        thread::sleep(Duration::from_millis(10));
        q.enqueue(numbered(7));
        assert_eq!(reader.join().unwrap().as_bytes(), &[7]);
    }
}
