/// Readers-writer lock abstraction used by the fault barrier
///
/// The barrier holds the shared mode while an operation runs on the normal
/// path and the exclusive mode while a recovery attempt is in progress.
/// Implementations only have to provide RAII guards for both modes; the
/// guards release the lock when dropped, on every exit path.
use parking_lot::{Condvar, Mutex};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, ThreadId};

/// Lock with shared and exclusive acquisition modes
///
/// The lock guards no data of its own. The barrier keeps its attempt counter
/// next to the lock and relies on the lock for mutual exclusion only.
pub trait RecoveryLock {
    /// Guard held while the normal path runs
    type Shared<'a>
    where
        Self: 'a;

    /// Guard held while a recovery attempt runs
    type Exclusive<'a>
    where
        Self: 'a;

    /// Block until the shared mode is acquired
    fn shared(&self) -> Self::Shared<'_>;

    /// Block until the exclusive mode is acquired
    fn exclusive(&self) -> Self::Exclusive<'_>;
}

/// Per-thread bookkeeping of a [`ReentrantRwLock`]
#[derive(Debug, Default)]
struct Holders {
    writer: Option<ThreadId>,
    write_holds: usize,
    readers: HashMap<ThreadId, usize>,
    waiting_writers: usize,
}

impl Holders {
    fn holds_write(&self, thread: ThreadId) -> bool {
        self.writer == Some(thread)
    }

    fn holds_read(&self, thread: ThreadId) -> bool {
        self.readers.contains_key(&thread)
    }
}

/// Reentrant readers-writer lock, the barrier's default
///
/// - a thread holding the exclusive mode may take either mode again
/// - a thread holding the shared mode may take it again, even while a writer
///   is queued
/// - other readers wait while a writer is queued, so recoveries are not
///   starved by a steady stream of normal executions
///
/// Upgrading from shared to exclusive is not supported: it could never be
/// granted, so the attempt panics instead of hanging.
#[derive(Debug, Default)]
pub struct ReentrantRwLock {
    holders: Mutex<Holders>,
    released: Condvar,
}

impl ReentrantRwLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the shared mode for the current thread
    pub fn read(&self) -> ReentrantReadGuard<'_> {
        let me = thread::current().id();
        let mut holders = self.holders.lock();

        if !holders.holds_write(me) && !holders.holds_read(me) {
            while holders.writer.is_some() || holders.waiting_writers > 0 {
                self.released.wait(&mut holders);
            }
        }
        *holders.readers.entry(me).or_insert(0) += 1;

        ReentrantReadGuard {
            lock: self,
            owner: me,
            _not_send: PhantomData,
        }
    }

    /// Acquire the exclusive mode for the current thread
    ///
    /// # Panics
    ///
    /// If the current thread holds the shared mode but not the exclusive one.
    pub fn write(&self) -> ReentrantWriteGuard<'_> {
        let me = thread::current().id();
        let mut holders = self.holders.lock();

        if !holders.holds_write(me) {
            assert!(
                !holders.holds_read(me),
                "cannot upgrade a shared hold to exclusive"
            );

            holders.waiting_writers += 1;
            while holders.writer.is_some() || !holders.readers.is_empty() {
                self.released.wait(&mut holders);
            }
            holders.waiting_writers -= 1;
            holders.writer = Some(me);
        }
        holders.write_holds += 1;

        ReentrantWriteGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    #[cfg(test)]
    fn waiting_writers(&self) -> usize {
        self.holders.lock().waiting_writers
    }
}

/// Shared hold on a [`ReentrantRwLock`], released on drop
#[derive(Debug)]
pub struct ReentrantReadGuard<'a> {
    lock: &'a ReentrantRwLock,
    owner: ThreadId,
    // Holds are tracked per thread
    _not_send: PhantomData<*const ()>,
}

impl Drop for ReentrantReadGuard<'_> {
    fn drop(&mut self) {
        let mut holders = self.lock.holders.lock();
        if let Entry::Occupied(mut entry) = holders.readers.entry(self.owner) {
            *entry.get_mut() -= 1;
            if *entry.get() == 0 {
                entry.remove();
            }
        }
        drop(holders);
        self.lock.released.notify_all();
    }
}

/// Exclusive hold on a [`ReentrantRwLock`], released on drop
#[derive(Debug)]
pub struct ReentrantWriteGuard<'a> {
    lock: &'a ReentrantRwLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ReentrantWriteGuard<'_> {
    fn drop(&mut self) {
        let mut holders = self.lock.holders.lock();
        holders.write_holds -= 1;
        if holders.write_holds == 0 {
            holders.writer = None;
        }
        drop(holders);
        self.lock.released.notify_all();
    }
}

impl RecoveryLock for ReentrantRwLock {
    type Shared<'a> = ReentrantReadGuard<'a>;
    type Exclusive<'a> = ReentrantWriteGuard<'a>;

    fn shared(&self) -> Self::Shared<'_> {
        self.read()
    }

    fn exclusive(&self) -> Self::Exclusive<'_> {
        self.write()
    }
}

/// Non-reentrant lock backed by the standard library
///
/// Nested barrier calls on the same thread deadlock with this lock. Poisoning
/// is ignored: a panic inside an operation leaves no protected data in an
/// inconsistent state, so the next caller simply takes the lock.
impl RecoveryLock for RwLock<()> {
    type Shared<'a> = RwLockReadGuard<'a, ()>;
    type Exclusive<'a> = RwLockWriteGuard<'a, ()>;

    fn shared(&self) -> Self::Shared<'_> {
        self.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive(&self) -> Self::Exclusive<'_> {
        self.write().unwrap_or_else(PoisonError::into_inner)
    }
}
