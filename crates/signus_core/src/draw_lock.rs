use std::sync::atomic::{AtomicUsize, Ordering};

/// Depth-counted lock shared with the render/input loop. The loop skips
/// drawing while `is_locked()` is true.
#[derive(Debug, Default)]
pub struct DrawLock {
    depth: AtomicUsize,
}

impl DrawLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) {
        self.depth.fetch_add(1, Ordering::AcqRel);
    }

    /// Release one level. Unlocking an unlocked lock is a no-op.
    pub fn unlock(&self) {
        let _ = self
            .depth
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |d| d.checked_sub(1));
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    pub fn is_locked(&self) -> bool {
        self.depth() > 0
    }
}

/// Holds `levels` locks on a [`DrawLock`] and releases them on drop.
#[must_use = "the draw lock is released as soon as the guard is dropped"]
pub struct DrawLockGuard<'a> {
    lock: &'a DrawLock,
    levels: usize,
}

impl<'a> DrawLockGuard<'a> {
    pub fn acquire(lock: &'a DrawLock, levels: usize) -> Self {
        for _ in 0..levels {
            lock.lock();
        }
        Self { lock, levels }
    }
}

impl Drop for DrawLockGuard<'_> {
    fn drop(&mut self) {
        for _ in 0..self.levels {
            self.lock.unlock();
        }
    }
}
