//! Typed bounded worker pool: `enqueue`/`wait_till_done` over a fixed set of
//! OS threads, each blocking on a condition variable when the queue is empty.
//!
//! Items are dequeued in arbitrary order across workers; within one worker,
//! processing order matches dequeue order. Each worker builds its own
//! processor state once (e.g. a `GlobalSearch` with private DP buffers) via
//! `make_processor`, then applies it to every item it dequeues — `Process` is
//! never called re-entrantly for the same worker. Run a writer pool with a
//! single worker to preserve output order from one upstream producer.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

struct Shared<T> {
    queue: Mutex<QueueState<T>>,
    not_empty: Condvar,
    idle: Condvar,
}

struct QueueState<T> {
    items: std::collections::VecDeque<T>,
    stop: bool,
    in_flight: usize,
}

/// A bounded pool of `workers` threads processing items of type `T`.
pub struct WorkerPool<T> {
    shared: Arc<Shared<T>>,
    handles: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawns `workers` threads (at least 1). `make_processor` is called once
    /// per worker thread to build that worker's private processor state.
    pub fn new<Proc, Make>(workers: usize, make_processor: Make) -> Self
    where
        Make: Fn() -> Proc + Send + Sync + 'static,
        Proc: FnMut(T) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            queue: Mutex::new(QueueState {
                items: std::collections::VecDeque::new(),
                stop: false,
                in_flight: 0,
            }),
            not_empty: Condvar::new(),
            idle: Condvar::new(),
        });

        let make_processor = Arc::new(make_processor);
        let mut handles = Vec::with_capacity(workers.max(1));

        for _ in 0..workers.max(1) {
            let shared = Arc::clone(&shared);
            let make_processor = Arc::clone(&make_processor);
            handles.push(thread::spawn(move || {
                let mut processor = make_processor();
                loop {
                    let item = {
                        let mut state = shared.queue.lock().unwrap();
                        loop {
                            if let Some(item) = state.items.pop_front() {
                                break Some(item);
                            }
                            if state.stop {
                                break None;
                            }
                            state = shared.not_empty.wait(state).unwrap();
                        }
                    };
                    let Some(item) = item else { break };
                    processor(item);
                    let mut state = shared.queue.lock().unwrap();
                    state.in_flight -= 1;
                    if state.items.is_empty() && state.in_flight == 0 {
                        shared.idle.notify_all();
                    }
                }
            }));
        }

        Self { shared, handles }
    }

    /// Pushes one item onto the queue and wakes a waiting worker.
    pub fn enqueue(&self, item: T) {
        let mut state = self.shared.queue.lock().unwrap();
        state.items.push_back(item);
        state.in_flight += 1;
        self.shared.not_empty.notify_one();
    }

    /// Blocks until every item enqueued so far has been processed.
    pub fn wait_till_done(&self) {
        let state = self.shared.queue.lock().unwrap();
        let _state = self
            .shared
            .idle
            .wait_while(state, |s| !s.items.is_empty() || s.in_flight > 0)
            .unwrap();
    }
}

impl<T> Drop for WorkerPool<T> {
    /// Sets `stop`, wakes every worker, and joins them — no item in the
    /// queue at drop time is processed.
    fn drop(&mut self) {
        {
            let mut state = self.shared.queue.lock().unwrap();
            state.stop = true;
        }
        self.shared.not_empty.notify_all();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    #[test]
    fn processes_every_enqueued_item() {
        let seen = Arc::new(AtomicUsize::new(0));
        let pool: WorkerPool<u32> = {
            let seen = Arc::clone(&seen);
            WorkerPool::new(4, move || {
                let seen = Arc::clone(&seen);
                move |_item: u32| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        for i in 0..200 {
            pool.enqueue(i);
        }
        pool.wait_till_done();

        assert_eq!(seen.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn preserves_dequeue_order_within_one_worker() {
        let order = Arc::new(StdMutex::new(Vec::new()));
        let pool: WorkerPool<u32> = {
            let order = Arc::clone(&order);
            WorkerPool::new(1, move || {
                let order = Arc::clone(&order);
                move |item: u32| {
                    order.lock().unwrap().push(item);
                }
            })
        };

        for i in 0..50 {
            pool.enqueue(i);
        }
        pool.wait_till_done();

        assert_eq!(*order.lock().unwrap(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn wait_till_done_returns_immediately_on_empty_queue() {
        let pool: WorkerPool<u32> = WorkerPool::new(2, || |_item: u32| {});
        pool.wait_till_done();
    }
}
