//! Blocking work queue with a priority front door

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

/// Mutex/condvar guarded deque shared by one producer stage and one pool of
/// consumers.
///
/// Items are split into lanes; a blocking pop always drains lower lanes
/// first. Within a lane, normal pushes are FIFO and priority pushes jump
/// ahead of everything queued (LIFO among themselves).
pub struct WorkQueue<T> {
    lanes: Mutex<Vec<VecDeque<T>>>,
    available: Condvar,
}

impl<T> WorkQueue<T> {
    /// A single-lane queue.
    pub fn new() -> Self {
        Self::with_lanes(1)
    }

    pub fn with_lanes(count: usize) -> Self {
        Self {
            lanes: Mutex::new((0..count.max(1)).map(|_| VecDeque::new()).collect()),
            available: Condvar::new(),
        }
    }

    /// Append to the back of lane 0.
    pub fn push_normal(&self, item: T) {
        self.push_normal_to(0, item);
    }

    /// Insert at the front of lane 0.
    pub fn push_priority(&self, item: T) {
        self.push_priority_to(0, item);
    }

    pub fn push_normal_to(&self, lane: usize, item: T) {
        let mut lanes = self.lanes.lock();
        lanes[lane].push_back(item);
        self.available.notify_one();
    }

    pub fn push_priority_to(&self, lane: usize, item: T) {
        let mut lanes = self.lanes.lock();
        lanes[lane].push_front(item);
        self.available.notify_one();
    }

    /// Block until an item is available or `shutdown` is observed.
    ///
    /// Returns `None` once shutdown is set, even if items remain queued.
    pub fn pop_blocking(&self, shutdown: &AtomicBool) -> Option<T> {
        let mut lanes = self.lanes.lock();
        loop {
            if shutdown.load(Ordering::Acquire) {
                return None;
            }
            if let Some(item) = lanes.iter_mut().find_map(|lane| lane.pop_front()) {
                return Some(item);
            }
            self.available.wait(&mut lanes);
        }
    }

    /// Non-blocking pop, lowest lane first.
    pub fn try_pop(&self) -> Option<T> {
        self.lanes.lock().iter_mut().find_map(|lane| lane.pop_front())
    }

    /// Wake every blocked consumer so it can re-check the shutdown flag.
    pub fn wake_all(&self) {
        let _lanes = self.lanes.lock();
        self.available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lanes.lock().iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn priority_overtakes_normal_items() {
        let queue = WorkQueue::new();
        let shutdown = AtomicBool::new(false);
        queue.push_normal('A');
        queue.push_normal('B');
        queue.push_normal('C');
        queue.push_priority('D');

        let popped: Vec<_> = (0..4).filter_map(|_| queue.pop_blocking(&shutdown)).collect();
        assert_eq!(popped, vec!['D', 'A', 'B', 'C']);
    }

    #[test]
    fn lower_lanes_drain_first() {
        let queue = WorkQueue::with_lanes(2);
        queue.push_normal_to(1, "complex");
        queue.push_normal_to(0, "basic-1");
        queue.push_normal_to(0, "basic-2");

        assert_eq!(queue.try_pop(), Some("basic-1"));
        assert_eq!(queue.try_pop(), Some("basic-2"));
        assert_eq!(queue.try_pop(), Some("complex"));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn blocked_pop_receives_later_push() {
        let queue = Arc::new(WorkQueue::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let consumer = {
            let queue = Arc::clone(&queue);
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || queue.pop_blocking(&shutdown))
        };
        thread::sleep(Duration::from_millis(20));
        queue.push_normal(7u32);

        assert_eq!(consumer.join().unwrap(), Some(7));
    }

    #[test]
    fn shutdown_releases_all_blocked_consumers() {
        let queue: Arc<WorkQueue<u32>> = Arc::new(WorkQueue::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let shutdown = Arc::clone(&shutdown);
                thread::spawn(move || queue.pop_blocking(&shutdown))
            })
            .collect();
        thread::sleep(Duration::from_millis(20));

        let start = Instant::now();
        shutdown.store(true, Ordering::Release);
        queue.wake_all();
        for consumer in consumers {
            assert_eq!(consumer.join().unwrap(), None);
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
