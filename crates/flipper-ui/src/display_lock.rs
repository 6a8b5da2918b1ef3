//! Recursive lock serializing every draw on the shared panel.
//!
//! Helpers that draw take the lock themselves, so a caller that already holds
//! it can call them freely: nested acquires on the same thread never block.
//! Each acquire returns a [`DisplayGuard`]; dropping it releases one level.

use core::cell::{RefCell, RefMut};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Reentrant mutual exclusion around a display device.
pub struct DisplayLock<P> {
    inner: ReentrantMutex<RefCell<P>>,
}

impl<P> DisplayLock<P> {
    pub fn new(panel: P) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(panel)),
        }
    }

    /// Block until the lock is free or already owned by this thread.
    pub fn acquire(&self) -> DisplayGuard<'_, P> {
        DisplayGuard {
            guard: self.inner.lock(),
        }
    }

    /// Whether any thread currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Run `f` with exclusive access to the panel.
    pub fn with<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        let guard = self.acquire();
        let mut panel = guard.panel();
        f(&mut panel)
    }

    pub fn into_inner(self) -> P {
        self.inner.into_inner().into_inner()
    }
}

/// One level of ownership of a [`DisplayLock`].
pub struct DisplayGuard<'a, P> {
    guard: ReentrantMutexGuard<'a, RefCell<P>>,
}

impl<P> DisplayGuard<'_, P> {
    /// Borrow the panel for drawing.
    ///
    /// # Panics
    ///
    /// Panics if a panel borrow taken through an outer guard on this thread is
    /// still alive. Drop it before calling nested helpers that lock.
    pub fn panel(&self) -> RefMut<'_, P> {
        self.guard.borrow_mut()
    }

    /// Borrow the panel unless this thread already has it borrowed.
    pub fn try_panel(&self) -> Option<RefMut<'_, P>> {
        self.guard.try_borrow_mut().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    const RUN: usize = 16;

    fn draw_run(lock: &DisplayLock<Vec<u8>>, id: u8) {
        let guard = lock.acquire();
        for _ in 0..RUN {
            guard.panel().push(id);
            thread::yield_now();
        }
    }

    #[test]
    fn guarded_draw_runs_never_interleave() {
        let lock = Arc::new(DisplayLock::new(Vec::new()));
        let workers: Vec<_> = (0..4u8)
            .map(|id| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for _ in 0..8 {
                        draw_run(&lock, id);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let journal = Arc::try_unwrap(lock).ok().unwrap().into_inner();
        assert_eq!(journal.len(), 4 * 8 * RUN);
        for chunk in journal.chunks(RUN) {
            assert!(chunk.iter().all(|id| *id == chunk[0]), "interleaved: {chunk:?}");
        }
    }

    #[test]
    fn nested_acquire_holds_out_other_threads_until_outermost_release() {
        let lock = Arc::new(DisplayLock::new(Vec::<u8>::new()));
        let released = Arc::new(AtomicBool::new(false));
        let entered = Arc::new(AtomicBool::new(false));

        let outer = lock.acquire();
        let inner = lock.acquire();
        inner.panel().push(1);

        let contender = {
            let lock = Arc::clone(&lock);
            let released = Arc::clone(&released);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                let guard = lock.acquire();
                entered.store(true, Ordering::SeqCst);
                assert!(released.load(Ordering::SeqCst));
                guard.panel().push(2);
            })
        };

        drop(inner);
        thread::sleep(Duration::from_millis(30));
        assert!(!entered.load(Ordering::SeqCst));
        {
            let innermost = lock.acquire();
            innermost.panel().push(3);
        }
        released.store(true, Ordering::SeqCst);
        drop(outer);

        contender.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
        assert_eq!(lock.with(|journal| journal.clone()), vec![1, 3, 2]);
    }

    #[test]
    fn is_locked_tracks_guards() {
        let lock = DisplayLock::new(0u32);
        assert!(!lock.is_locked());
        let guard = lock.acquire();
        assert!(lock.is_locked());
        *guard.panel() += 1;
        drop(guard);
        assert!(!lock.is_locked());
        assert_eq!(lock.into_inner(), 1);
    }

    #[test]
    fn try_panel_refuses_outstanding_borrow() {
        let lock = DisplayLock::new(0u32);
        let outer = lock.acquire();
        let borrowed = outer.panel();
        let inner = lock.acquire();
        assert!(inner.try_panel().is_none());
        drop(borrowed);
        assert!(inner.try_panel().is_some());
    }
}
