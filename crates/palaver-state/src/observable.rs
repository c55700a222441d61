//! Single-writer observable snapshot primitive.

use tokio::sync::watch;

/// Latest-value publish/subscribe cell backed by a watch channel.
///
/// The owning container is the single writer; readers either clone the
/// current snapshot with [`get`](Self::get) (lock-free fast path, callable
/// from any thread) or [`subscribe`](Self::subscribe) for subsequent
/// changes. [`update`](Self::update) runs the closure inside the channel's
/// internal critical section, which serializes writers and keeps partial
/// mutations invisible to readers.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T> Observable<T> {
    /// Create an observable holding `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the current value and notify subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Mutate the current value in place and notify subscribers.
    pub fn update(&self, mutate: impl FnOnce(&mut T)) {
        self.tx.send_modify(mutate);
    }

    /// Subscribe to subsequent changes. The receiver immediately sees the
    /// latest value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Read the current value through a borrow, without cloning.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.tx.borrow())
    }
}

impl<T: Clone> Observable<T> {
    /// Clone the current snapshot.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
