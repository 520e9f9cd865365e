//! Runtime abstraction layer for async operations
//!
//! Tile fetches are the only asynchronous work in the viewer. They are handed
//! to an injected [`AsyncSpawner`], so the crate works with Tokio, with a host
//! event loop that drives futures itself, or inline for headless use.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use futures::future::BoxFuture;

/// A trait for spawning async tasks (object-safe)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Ask the task to stop. Advisory: the task may still run to completion.
    fn cancel(&self);
}

/// Runs every future to completion on the calling thread.
///
/// Suitable for fetchers that do not need a reactor (fixtures, in-memory
/// sources, files). The fetch result still goes through the completion
/// channel, so it is only applied on the next drain.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSpawner;

struct FinishedHandle;

impl AsyncHandle for FinishedHandle {
    fn is_finished(&self) -> bool {
        true
    }

    fn cancel(&self) {}
}

impl AsyncSpawner for InlineSpawner {
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
        futures::executor::block_on(future);
        Box::new(FinishedHandle)
    }
}

type QueuedTask = (Arc<QueuedState>, BoxFuture<'static, ()>);

#[derive(Default)]
struct QueuedState {
    cancelled: AtomicBool,
    finished: AtomicBool,
}

/// Collects spawned futures until the host calls [`QueuedSpawner::run_pending`].
///
/// Lets an event loop decide when network work makes progress. Cancelled
/// tasks that have not started yet are dropped without running.
#[derive(Default, Clone)]
pub struct QueuedSpawner {
    queue: Arc<Mutex<Vec<QueuedTask>>>,
}

struct QueuedHandle(Arc<QueuedState>);

impl AsyncHandle for QueuedHandle {
    fn is_finished(&self) -> bool {
        self.0.finished.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::Release);
    }
}

impl QueuedSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run, cancelled ones included
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Runs every queued task that was not cancelled. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let tasks: Vec<QueuedTask> = match self.queue.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => return 0,
        };

        let mut ran = 0;
        for (state, future) in tasks {
            if state.cancelled.load(Ordering::Acquire) {
                log::trace!("dropping cancelled task before start");
                state.finished.store(true, Ordering::Release);
                continue;
            }
            futures::executor::block_on(future);
            state.finished.store(true, Ordering::Release);
            ran += 1;
        }
        ran
    }
}

impl AsyncSpawner for QueuedSpawner {
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
        let state = Arc::new(QueuedState::default());
        if let Ok(mut queue) = self.queue.lock() {
            queue.push((Arc::clone(&state), future));
        }
        Box::new(QueuedHandle(state))
    }
}

impl std::fmt::Debug for QueuedSpawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedSpawner")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(feature = "tokio-runtime")]
pub mod tokio_impl {
    use super::*;
    use ::tokio::{runtime::Handle, task::JoinHandle};

    /// Tokio-based async spawner bound to a runtime handle
    #[derive(Debug, Clone)]
    pub struct TokioSpawner {
        handle: Handle,
    }

    impl TokioSpawner {
        pub fn new(handle: Handle) -> Self {
            Self { handle }
        }

        /// Spawner for the runtime the caller is running in.
        /// Panics outside a Tokio runtime, like `Handle::current`.
        pub fn current() -> Self {
            Self::new(Handle::current())
        }
    }

    impl AsyncSpawner for TokioSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
            let handle = self.handle.spawn(future);
            Box::new(TokioHandle(handle))
        }
    }

    struct TokioHandle(JoinHandle<()>);

    impl AsyncHandle for TokioHandle {
        fn is_finished(&self) -> bool {
            self.0.is_finished()
        }

        fn cancel(&self) {
            self.0.abort();
        }
    }
}

#[cfg(feature = "tokio-runtime")]
pub use tokio_impl::TokioSpawner;
