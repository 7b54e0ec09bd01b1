//! Thread pool: a fixed-size FIFO worker pool with a completion barrier,
//! backing the chunked parallel driver in `driver.rs`. The pool is
//! process-global: a single instance is created lazily on first use and
//! sized from `available_parallelism()` when the caller asks for `0`
//! threads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    queue: Mutex<VecDeque<Task>>,
    work_available: Condvar,
    all_idle: Condvar,
    working: AtomicUsize,
    shutdown: AtomicBool,
}

/// A fixed-size worker pool with a FIFO task queue and a completion wait.
pub struct ThreadPool {
    shared: Arc<Shared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Spawns `num_threads.max(1)` worker threads, each running
    /// [`worker_loop`] against a shared queue.
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            work_available: Condvar::new(),
            all_idle: Condvar::new(),
            working: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
        });

        let mut handles = Vec::with_capacity(num_threads);
        for _ in 0..num_threads {
            let shared = Arc::clone(&shared);
            handles.push(thread::spawn(move || worker_loop(shared)));
        }

        Self {
            shared,
            handles: Mutex::new(handles),
        }
    }

    /// Appends `task` under lock and wakes one waiting worker. Never blocks.
    pub fn submit(&self, task: Task) {
        let mut queue = self.shared.queue.lock().unwrap();
        queue.push_back(task);
        drop(queue);
        self.shared.work_available.notify_one();
    }

    /// Blocks the calling thread until the queue is empty and no worker is
    /// mid-task.
    pub fn wait_all(&self) {
        let queue = self.shared.queue.lock().unwrap();
        let _ = self
            .shared
            .all_idle
            .wait_while(queue, |q| !q.is_empty() || self.shared.working.load(Ordering::Acquire) > 0)
            .unwrap();
    }

    /// Signals shutdown, wakes every worker so it drains the remaining
    /// queue and exits, then joins all of them. Intended for tests; the
    /// process-global pool returned by [`global_pool`] is never destroyed
    /// during normal operation: it outlives every individual search.
    pub fn destroy(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.work_available.notify_all();
        let mut handles = self.handles.lock().unwrap();
        for h in handles.drain(..) {
            let _ = h.join();
        }
        self.shared.queue.lock().unwrap().clear();
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let mut queue = shared.queue.lock().unwrap();
        while queue.is_empty() && !shared.shutdown.load(Ordering::Acquire) {
            queue = shared.work_available.wait(queue).unwrap();
        }
        if queue.is_empty() && shared.shutdown.load(Ordering::Acquire) {
            return;
        }
        let task = queue.pop_front();
        // Mark the task as in-flight before releasing the queue lock, so
        // `wait_all` (which only ever observes `working` while holding this
        // same lock) can never see an empty queue and `working == 0` in the
        // gap between dequeuing a task and running it.
        if task.is_some() {
            shared.working.fetch_add(1, Ordering::AcqRel);
        }
        drop(queue);

        if let Some(task) = task {
            task();
            let remaining = shared.working.fetch_sub(1, Ordering::AcqRel) - 1;
            let queue = shared.queue.lock().unwrap();
            if remaining == 0 && queue.is_empty() {
                shared.all_idle.notify_all();
            }
            drop(queue);
        }
    }
}

static GLOBAL_POOL: OnceLock<ThreadPool> = OnceLock::new();

/// Returns the process-wide pool, creating it on first call. `threads == 0`
/// sizes the pool from `std::thread::available_parallelism()`; later calls
/// with a different `threads` value reuse the already-created pool rather
/// than resizing it.
pub fn global_pool(threads: usize) -> &'static ThreadPool {
    GLOBAL_POOL.get_or_init(|| {
        let n = if threads == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            threads
        };
        log::debug!("grepcore: initializing thread pool with {n} workers");
        ThreadPool::new(n)
    })
}
