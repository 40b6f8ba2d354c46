//! Observable value cells.
//!
//! A [`Cell`] holds a value and notifies registered listeners whenever the
//! value changes. A [`Computed`] is a derived value recomputed from its
//! sources on every read, so it can never be stale relative to the last write.
//!
//! Cells are cheap to clone; clones share the same underlying value.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct CellInner<T> {
    value: RwLock<T>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_listener_id: AtomicU64,
    version: AtomicU64,
}

/// A mutable, observable value.
pub struct Cell<T> {
    inner: Arc<CellInner<T>>,
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Cell<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(CellInner {
                value: RwLock::new(value),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Clone the current value.
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not write to this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Number of changes applied since creation.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Replace the value. Listeners run only if the value actually changed.
    pub fn set(&self, value: T) {
        self.set_deferred(value).notify();
    }

    /// Mutate the value in place. Listeners run only if the value changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.update_deferred(f).notify();
    }

    /// Like [`set`](Self::set), but listeners run only once the returned
    /// [`PendingNotify`] is dropped.
    pub(crate) fn set_deferred(&self, value: T) -> PendingNotify {
        let changed = {
            let mut guard = self.inner.value.write();
            if *guard == value {
                false
            } else {
                *guard = value;
                true
            }
        };
        self.pending(changed)
    }

    /// Like [`update`](Self::update), but listeners run only once the
    /// returned [`PendingNotify`] is dropped.
    pub(crate) fn update_deferred(&self, f: impl FnOnce(&mut T)) -> PendingNotify {
        let changed = {
            let mut guard = self.inner.value.write();
            let before = guard.clone();
            f(&mut guard);
            *guard != before
        };
        self.pending(changed)
    }

    fn pending(&self, changed: bool) -> PendingNotify {
        if !changed {
            return PendingNotify::none();
        }
        self.inner.version.fetch_add(1, Ordering::AcqRel);
        let cell = self.clone();
        PendingNotify {
            run: Some(Box::new(move || cell.run_listeners())),
        }
    }

    /// Register a listener called with the new value after every change.
    ///
    /// The listener stays registered for as long as the returned
    /// [`Subscription`] is alive.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));

        let weak: Weak<CellInner<T>> = Arc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.listeners.lock().retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// A read-only handle onto this cell.
    pub fn read_only(&self) -> ReadOnlyCell<T> {
        ReadOnlyCell { cell: self.clone() }
    }

    /// Derive a value from this cell, recomputed on every read.
    pub fn map<U, F>(&self, f: F) -> Computed<U>
    where
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        Computed::new(move || source.with(|v| f(v)))
    }

    fn run_listeners(&self) {
        // Listeners run without any lock held so they may read this cell.
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        if listeners.is_empty() {
            return;
        }

        let snapshot = self.get();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl<T> fmt::Debug for Cell<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("value", &*self.inner.value.read())
            .field("version", &self.inner.version.load(Ordering::Relaxed))
            .finish()
    }
}

/// A cell handle that can be read and observed but not written.
#[derive(Clone)]
pub struct ReadOnlyCell<T> {
    cell: Cell<T>,
}

impl<T> ReadOnlyCell<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn get(&self) -> T {
        self.cell.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.with(f)
    }

    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(listener)
    }

    pub fn map<U, F>(&self, f: F) -> Computed<U>
    where
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        self.cell.map(f)
    }
}

/// A derived value, recomputed from its sources on every read.
pub struct Computed<T> {
    compute: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            compute: Arc::clone(&self.compute),
        }
    }
}

impl<T> Computed<T> {
    pub fn new(compute: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            compute: Arc::new(compute),
        }
    }

    pub fn get(&self) -> T {
        (self.compute)()
    }
}

/// Listeners owed for a write that has already happened.
///
/// Lets a caller finish a multi-cell update under its own lock and run the
/// listeners after releasing it. Dropping it runs the listeners.
#[must_use = "listeners run as soon as this is dropped"]
pub(crate) struct PendingNotify {
    run: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl PendingNotify {
    /// Nothing changed, nothing to run.
    pub(crate) fn none() -> Self {
        Self { run: None }
    }

    /// Run the listeners now.
    pub(crate) fn notify(self) {
        drop(self);
    }
}

impl Drop for PendingNotify {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            run();
        }
    }
}

/// Keeps a listener registered; dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keep the listener registered for the lifetime of the cell.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
