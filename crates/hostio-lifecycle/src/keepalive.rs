//! Keep-alive accounting: which live resources hold the host process open.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

#[derive(Debug)]
struct RegistryInner {
    count: watch::Sender<usize>,
}

impl Default for RegistryInner {
    fn default() -> Self {
        Self {
            count: watch::Sender::new(0),
        }
    }
}

/// Counts ref'd resources. The host may exit once the count reaches zero.
#[derive(Debug, Clone, Default)]
pub struct KeepAliveRegistry {
    inner: Arc<RegistryInner>,
}

impl KeepAliveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources currently keeping the process alive.
    pub fn active_count(&self) -> usize {
        *self.inner.count.borrow()
    }

    pub fn is_idle(&self) -> bool {
        self.active_count() == 0
    }

    /// Resolves once no ref'd resource remains.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.count.subscribe();
        loop {
            let idle = *rx.borrow_and_update() == 0;
            if idle || rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Create a keep-alive reference, counted immediately when `refed`.
    pub fn acquire(&self, refed: bool) -> KeepAliveRef {
        if refed {
            self.increment();
        }
        KeepAliveRef {
            registry: self.clone(),
            state: Mutex::new(RefState {
                refed,
                released: false,
            }),
        }
    }

    fn increment(&self) {
        self.inner.count.send_modify(|count| *count += 1);
    }

    fn decrement(&self) {
        self.inner
            .count
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

#[derive(Debug)]
struct RefState {
    refed: bool,
    released: bool,
}

/// One resource's keep-alive flag.
///
/// Flipping the flag adjusts the registry count and nothing else. Once
/// released (the resource closed) the reference no longer counts and later
/// `ref_` calls are ignored. Dropping releases.
#[derive(Debug)]
pub struct KeepAliveRef {
    registry: KeepAliveRegistry,
    state: Mutex<RefState>,
}

impl KeepAliveRef {
    pub fn ref_(&self) {
        let mut state = self.lock();
        if !state.released && !state.refed {
            state.refed = true;
            self.registry.increment();
        }
    }

    pub fn unref(&self) {
        let mut state = self.lock();
        if state.refed {
            state.refed = false;
            self.registry.decrement();
        }
    }

    pub fn has_ref(&self) -> bool {
        self.lock().refed
    }

    /// Stop counting for good. Idempotent.
    pub fn release(&self) {
        let mut state = self.lock();
        if state.released {
            return;
        }
        state.released = true;
        if state.refed {
            state.refed = false;
            self.registry.decrement();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RefState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for KeepAliveRef {
    fn drop(&mut self) {
        self.release();
    }
}
